use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::resume::filter::{
    department_options, training_category_options, AdvancedFilters, SimpleFilters,
};
use crate::resume::models::{ResumeRecord, ResumeRecordWithId, SectionKey, SectionPayload};
use crate::resume::projections::DirectoryView;
use crate::resume::repository::NewResumeInput;
use crate::resume::validation::validate_section;
use crate::state::AppState;

/// Directory query string: quick search, simple and advanced facets in one flat list.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DirectoryQuery {
    pub query: String,
    pub department: String,
    pub position: String,
    pub rank: String,
    pub school: String,
    pub degree: String,
    pub company: String,
    pub work_role: String,
    pub training_category: String,
    pub church_role: String,
    pub qualification: String,
    pub award: String,
    pub with_photo: bool,
    pub currently_employed: bool,
}

impl DirectoryQuery {
    fn into_filters(self) -> (SimpleFilters, AdvancedFilters) {
        (
            SimpleFilters {
                query: self.query,
                department: self.department,
                position: self.position,
                rank: self.rank,
            },
            AdvancedFilters {
                school: self.school,
                degree: self.degree,
                company: self.company,
                work_role: self.work_role,
                training_category: self.training_category,
                church_role: self.church_role,
                qualification: self.qualification,
                award: self.award,
                with_photo: self.with_photo,
                currently_employed: self.currently_employed,
            },
        )
    }
}

#[derive(Serialize)]
pub struct FacetsResponse {
    pub departments: Vec<String>,
    pub training_categories: Vec<String>,
}

#[derive(Serialize)]
pub struct SectionSaveResponse {
    pub id: String,
    pub section: SectionPayload,
    pub record: ResumeRecord,
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<DirectoryQuery>,
) -> Result<Json<DirectoryView>, AppError> {
    let (simple, advanced) = params.into_filters();
    let records = state.directory.records(&state.repository).await?;
    let view = state.projections.view(&records, &simple, &advanced);
    Ok(Json(view.as_ref().clone()))
}

/// GET /api/v1/resumes/facets
pub async fn handle_facets(
    State(state): State<AppState>,
) -> Result<Json<FacetsResponse>, AppError> {
    let records = state.directory.records(&state.repository).await?;
    Ok(Json(FacetsResponse {
        departments: department_options(&records),
        training_categories: training_category_options(&records),
    }))
}

/// GET /api/v1/resumes/current
pub async fn handle_current_resume(
    State(state): State<AppState>,
) -> Result<Json<ResumeRecordWithId>, AppError> {
    Ok(Json(state.repository.fetch_one(None).await?))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResumeRecordWithId>, AppError> {
    Ok(Json(state.repository.fetch_one(Some(&id)).await?))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(req): Json<NewResumeInput>,
) -> Result<(StatusCode, Json<ResumeRecordWithId>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    let created = state.repository.create(req).await?;
    state.directory.invalidate().await;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.repository.delete_record(&id).await?;
    state.directory.invalidate().await;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/resumes/:id/sections/:section
///
/// Body is the section content: an object for `profile`, an array of rows
/// for every other section.
pub async fn handle_update_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<SectionSaveResponse>, AppError> {
    let key: SectionKey = section.parse().map_err(AppError::Validation)?;
    let payload = SectionPayload::from_json(key, body)
        .map_err(|e| AppError::Validation(format!("Invalid {key} payload: {e}")))?;
    let payload = validate_section(payload)?;

    let result = state.repository.update_section(&id, payload).await;
    // Even a failed write may have changed upstream.
    state.directory.invalidate().await;
    let record = result?;

    Ok(Json(SectionSaveResponse {
        section: record.section(key),
        id,
        record,
    }))
}
