//! Record repository: the only component that talks to the upstream service.
//!
//! Reads go through the assembler; writes go through the encoders in
//! `resume::mapping`. Nothing is cached here, every call hits upstream.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::resume::assembler::assemble;
use crate::resume::mapping::encode_section;
use crate::resume::models::{ResumeRecord, ResumeRecordWithId, SectionKey, SectionPayload};
use crate::upstream::{NewResume, ResumeApi, UpstreamError};

pub const DEFAULT_PURPOSE: &str = "general";

/// Body of a create-record request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResumeInput {
    pub name: String,
    pub language: String,
    #[serde(default)]
    pub purpose: Option<String>,
    pub user_id: String,
}

#[derive(Clone)]
pub struct ResumeRepository {
    api: Arc<dyn ResumeApi>,
    default_purpose: String,
}

impl ResumeRepository {
    pub fn new(api: Arc<dyn ResumeApi>, default_purpose: impl Into<String>) -> Self {
        Self {
            api,
            default_purpose: default_purpose.into(),
        }
    }

    /// One record by id, or the first record the service lists when `id` is `None`.
    pub async fn fetch_one(&self, id: Option<&str>) -> Result<ResumeRecordWithId, AppError> {
        let id = match id {
            Some(id) => id.to_string(),
            None => self
                .api
                .list_resumes()
                .await?
                .into_iter()
                .next()
                .map(|summary| summary.id)
                .ok_or_else(|| AppError::NotFound("No resumes available".to_string()))?,
        };

        let detail = self
            .api
            .get_resume_detail(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
        Ok(assemble(detail))
    }

    /// Every record, in list order. Detail fetches run concurrently; a record
    /// whose detail fails or is missing is logged and left out.
    pub async fn fetch_all(&self) -> Result<Vec<ResumeRecordWithId>, AppError> {
        let summaries = self.api.list_resumes().await?;
        let total = summaries.len();

        let details = join_all(
            summaries
                .iter()
                .map(|summary| self.api.get_resume_detail(&summary.id)),
        )
        .await;

        let records: Vec<ResumeRecordWithId> = summaries
            .iter()
            .zip(details)
            .filter_map(|(summary, result)| match result {
                Ok(Some(detail)) => Some(assemble(detail)),
                Ok(None) => {
                    warn!("Resume {} listed but has no detail; skipping", summary.id);
                    None
                }
                Err(e) => {
                    warn!("Failed to load resume {}: {e}; skipping", summary.id);
                    None
                }
            })
            .collect();

        debug!("Loaded {}/{} resumes", records.len(), total);
        Ok(records)
    }

    /// Creates a record flagged as the user's current one and returns it as stored.
    pub async fn create(&self, input: NewResumeInput) -> Result<ResumeRecordWithId, AppError> {
        let purpose = input
            .purpose
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.default_purpose.clone());

        let created = self
            .api
            .create_resume(NewResume {
                name: input.name,
                language: input.language,
                purpose,
                user_id: input.user_id,
                status: "active".to_string(),
                is_current: true,
            })
            .await?;
        info!("Created resume {}", created.id);

        self.fetch_one(Some(&created.id)).await
    }

    /// Replaces one section of a record with `payload`.
    ///
    /// Every existing upstream item of the section is deleted, then the new
    /// items are created one by one in order, then the record is re-read.
    /// This is not atomic: callers must not run two updates of the same
    /// record and section concurrently. A failure once the first delete or
    /// create has gone through leaves the section partially written and is
    /// reported as [`AppError::IncompleteSectionWrite`]; an earlier failure is
    /// returned as [`AppError::Transport`].
    pub async fn update_section(
        &self,
        id: &str,
        payload: SectionPayload,
    ) -> Result<ResumeRecord, AppError> {
        let section = payload.key();
        let collection = section.collection();
        let bodies = encode_section(&payload).map_err(|e| AppError::Internal(e.into()))?;
        let expected = bodies.len();

        let detail = self
            .api
            .get_resume_detail(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
        let existing = detail.item_ids(collection);
        debug!(
            "Replacing {} of resume {id}: {} existing, {expected} new",
            collection.as_str(),
            existing.len()
        );

        // Until something is deleted or written, upstream is untouched and a
        // failure is a plain transport error.
        let mut touched = false;
        for item_id in &existing {
            self.api
                .delete_item(collection, item_id)
                .await
                .map_err(|e| write_failure(touched, section, 0, expected, e))?;
            touched = true;
        }

        for (written, body) in bodies.into_iter().enumerate() {
            self.api
                .create_item(collection, id, body)
                .await
                .map_err(|e| write_failure(touched, section, written, expected, e))?;
            touched = true;
        }

        let mut record = self.fetch_one(Some(id)).await?.record;
        if let SectionPayload::Profile(profile) = &payload {
            record.profile.rank_title = profile.rank_title.clone();
        }
        info!("Saved section {section} of resume {id}");
        Ok(record)
    }

    /// Persists every section in display order and returns the final record.
    pub async fn save_all(
        &self,
        id: &str,
        record: &ResumeRecord,
    ) -> Result<ResumeRecord, AppError> {
        let mut saved = None;
        for key in SectionKey::ALL {
            saved = Some(self.update_section(id, record.section(key)).await?);
        }
        let mut saved = match saved {
            Some(saved) => saved,
            None => self.fetch_one(Some(id)).await?.record,
        };
        saved.profile.rank_title = record.profile.rank_title.clone();
        Ok(saved)
    }

    pub async fn delete_record(&self, id: &str) -> Result<(), AppError> {
        self.api.delete_resume(id).await.map_err(|e| match e {
            UpstreamError::NotFound(_) => AppError::NotFound("Resume not found".to_string()),
            other => AppError::Transport(other),
        })?;
        info!("Deleted resume {id}");
        Ok(())
    }
}

fn write_failure(
    touched: bool,
    section: SectionKey,
    written: usize,
    expected: usize,
    e: UpstreamError,
) -> AppError {
    if !touched {
        return AppError::Transport(e);
    }
    AppError::IncompleteSectionWrite {
        section,
        written,
        expected,
        message: e.to_string(),
    }
}
