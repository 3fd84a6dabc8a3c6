//! In-process personnel-record store.
//!
//! Each instance owns its own state; there is no process-wide store. The call
//! log records every mutating call in order so tests can assert sequencing.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::models::{Collection, NewResume, ResumeDetail, ResumeSummary, UpstreamTimestamp};
use super::{ResumeApi, UpstreamError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    CreateResume(String),
    DeleteResume(String),
    CreateItem(Collection, String),
    DeleteItem(Collection, String),
}

#[derive(Debug, Clone)]
struct StoredResume {
    summary: ResumeSummary,
    items: BTreeMap<Collection, Vec<Value>>,
}

#[derive(Debug, Default)]
struct Store {
    resumes: Vec<StoredResume>,
    calls: Vec<StoreCall>,
}

#[derive(Debug, Default)]
pub struct InMemoryResumeApi {
    store: Mutex<Store>,
}

impl InMemoryResumeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with a handful of records for local demos.
    pub fn with_demo_data() -> Self {
        let api = Self::new();
        for detail in demo_details() {
            api.insert_detail(detail);
        }
        api
    }

    /// Inserts a full detail payload, assigning ids to items that lack one.
    /// Returns the record id.
    pub fn insert_detail(&self, detail: ResumeDetail) -> String {
        let mut value = serde_json::to_value(&detail).unwrap_or_else(|_| json!({}));
        let mut items = BTreeMap::new();
        for collection in Collection::ALL {
            let Some(Value::Array(entries)) = value
                .as_object_mut()
                .and_then(|map| map.remove(collection.as_str()))
            else {
                continue;
            };
            let stored = entries
                .into_iter()
                .map(|entry| assign_ids(entry, &detail.id))
                .collect();
            items.insert(collection, stored);
        }

        let summary = ResumeSummary {
            id: detail.id.clone(),
            name: detail.name,
            status: detail.status,
            version: detail.version,
            language: detail.language,
            purpose: detail.purpose,
            notes: detail.notes,
            user_id: detail.user_id,
            is_current: detail.is_current,
            updated_at: detail.updated_at,
        };
        let id = summary.id.clone();
        let mut store = self.lock();
        store.resumes.retain(|r| r.summary.id != id);
        store.resumes.push(StoredResume { summary, items });
        id
    }

    /// Mutating calls received so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn item_count(&self, resume_id: &str, collection: Collection) -> usize {
        self.lock()
            .resumes
            .iter()
            .find(|r| r.summary.id == resume_id)
            .and_then(|r| r.items.get(&collection))
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        // A poisoned lock only means a test panicked mid-call; the data is still usable.
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ResumeApi for InMemoryResumeApi {
    async fn list_resumes(&self) -> Result<Vec<ResumeSummary>, UpstreamError> {
        Ok(self
            .lock()
            .resumes
            .iter()
            .map(|r| r.summary.clone())
            .collect())
    }

    async fn get_resume_detail(&self, id: &str) -> Result<Option<ResumeDetail>, UpstreamError> {
        let store = self.lock();
        let Some(stored) = store.resumes.iter().find(|r| r.summary.id == id) else {
            return Ok(None);
        };

        let mut value = serde_json::to_value(&stored.summary)?;
        if let Some(map) = value.as_object_mut() {
            // Empty collections are omitted, the same way the real service does it.
            for (collection, entries) in &stored.items {
                if !entries.is_empty() {
                    map.insert(
                        collection.as_str().to_string(),
                        Value::Array(entries.clone()),
                    );
                }
            }
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    async fn create_resume(&self, resume: NewResume) -> Result<ResumeSummary, UpstreamError> {
        let summary = ResumeSummary {
            id: Uuid::new_v4().to_string(),
            name: Some(resume.name),
            status: Some(resume.status),
            version: Some("1".to_string()),
            language: Some(resume.language),
            purpose: Some(resume.purpose),
            notes: None,
            user_id: Some(resume.user_id),
            is_current: Some(resume.is_current),
            updated_at: Some(UpstreamTimestamp::now()),
        };
        let mut store = self.lock();
        if summary.is_current == Some(true) {
            for other in store
                .resumes
                .iter_mut()
                .filter(|r| r.summary.user_id == summary.user_id)
            {
                other.summary.is_current = Some(false);
            }
        }
        store.calls.push(StoreCall::CreateResume(summary.id.clone()));
        store.resumes.push(StoredResume {
            summary: summary.clone(),
            items: BTreeMap::new(),
        });
        Ok(summary)
    }

    async fn delete_resume(&self, id: &str) -> Result<(), UpstreamError> {
        let mut store = self.lock();
        let before = store.resumes.len();
        store.resumes.retain(|r| r.summary.id != id);
        if store.resumes.len() == before {
            return Err(UpstreamError::NotFound(format!("resume {id}")));
        }
        store.calls.push(StoreCall::DeleteResume(id.to_string()));
        Ok(())
    }

    async fn create_item(
        &self,
        collection: Collection,
        resume_id: &str,
        fields: Value,
    ) -> Result<Value, UpstreamError> {
        let Value::Object(fields) = fields else {
            return Err(UpstreamError::Api {
                status: 400,
                message: format!("{} item must be a JSON object", collection.as_str()),
            });
        };

        let mut store = self.lock();
        let Some(stored) = store.resumes.iter_mut().find(|r| r.summary.id == resume_id) else {
            return Err(UpstreamError::NotFound(format!("resume {resume_id}")));
        };

        let item_id = Uuid::new_v4().to_string();
        let mut item = fields;
        item.insert("id".to_string(), Value::String(item_id.clone()));
        item.insert(
            "resume_id".to_string(),
            Value::String(resume_id.to_string()),
        );
        let item = Value::Object(item);
        stored.items.entry(collection).or_default().push(item.clone());
        stored.summary.updated_at = Some(UpstreamTimestamp::now());
        store.calls.push(StoreCall::CreateItem(collection, item_id));
        Ok(item)
    }

    async fn delete_item(
        &self,
        collection: Collection,
        item_id: &str,
    ) -> Result<(), UpstreamError> {
        let mut store = self.lock();
        let removed = store.resumes.iter_mut().any(|r| {
            let Some(entries) = r.items.get_mut(&collection) else {
                return false;
            };
            let before = entries.len();
            entries.retain(|e| e.get("id").and_then(Value::as_str) != Some(item_id));
            entries.len() != before
        });
        if !removed {
            return Err(UpstreamError::NotFound(format!(
                "{} item {item_id}",
                collection.as_str()
            )));
        }
        store
            .calls
            .push(StoreCall::DeleteItem(collection, item_id.to_string()));
        Ok(())
    }
}

fn assign_ids(entry: Value, resume_id: &str) -> Value {
    let mut map = match entry {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let has_id = map.get("id").map(|v| !v.is_null()).unwrap_or(false);
    if !has_id {
        map.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    }
    map.insert(
        "resume_id".to_string(),
        Value::String(resume_id.to_string()),
    );
    Value::Object(map)
}

fn demo_details() -> Vec<ResumeDetail> {
    let records = [
        json!({
            "id": "demo-0001",
            "name": "김철수 이력서",
            "status": "active",
            "version": "3",
            "language": "ko",
            "purpose": "general",
            "updated_at": "2024-03-02T09:00:00Z",
            "personal_profiles": [{
                "name_korean": "김철수",
                "name_hanja": "金哲洙",
                "name_english": "Cheolsu Kim",
                "birth_date": "1984-05-17",
                "department": "Logistics",
                "mobile": "01012345678",
                "email": "cheolsu.kim@example.org",
                "organization": "Seoul Headquarters",
                "position": "Manager"
            }],
            "education_history": [{
                "institution": "Seoul National University",
                "major": "Business Administration",
                "degree": "Bachelor",
                "status": "Graduated",
                "start_date": "2003-03-01",
                "end_date": "2007-02-20"
            }],
            "work_experience": [{
                "company_name": "Hanbit Shipping",
                "department": "Operations",
                "position": "Team Lead",
                "start_date": "2012-01-01"
            }],
            "training_programs": [{
                "program_name": "Leadership Intensive",
                "category": "Leadership",
                "organizing_institution": "Training Center",
                "start_date": "2019-06-01",
                "end_date": "2019-06-05",
                "hours": 32.0
            }]
        }),
        json!({
            "id": "demo-0002",
            "name": "Jane Doe",
            "status": "active",
            "version": "1",
            "language": "en",
            "purpose": "general",
            "updated_at": 1709370000000i64,
            "personal_profiles": [{
                "name_english": "Jane Doe",
                "department": "Finance",
                "mobile": "0212345678",
                "photo_url": "https://cdn.example.org/photos/jane.jpg",
                "position": "Accountant"
            }],
            "education_history": [{
                "institution": "Yonsei University",
                "major": "Accounting",
                "degree": "Master of Science",
                "status": "completed"
            }],
            "certifications": [{
                "certification_name": "Certified Public Accountant",
                "issuing_authority": "Financial Services Commission",
                "acquisition_date": "2015-09-30T00:00:00Z"
            }],
            "organizational_activities": [{
                "organization_name": "Gangnam District",
                "role": "Treasurer",
                "start_date": "2020-01-01"
            }],
            "family_members": [{
                "member_name": "John Doe",
                "relationship": "husband"
            }]
        }),
    ];

    records
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_data_is_loadable() {
        let api = InMemoryResumeApi::with_demo_data();
        let summaries = api.list_resumes().await.unwrap();
        assert_eq!(summaries.len(), 2);
        let detail = api.get_resume_detail("demo-0001").await.unwrap().unwrap();
        assert_eq!(detail.education_history.as_ref().map(Vec::len), Some(1));
        assert!(detail.family_members.is_none());
    }

    #[tokio::test]
    async fn test_create_and_delete_item_are_logged() {
        let api = InMemoryResumeApi::new();
        let created = api
            .create_resume(NewResume {
                name: "Record".to_string(),
                language: "ko".to_string(),
                purpose: "general".to_string(),
                user_id: "u1".to_string(),
                status: "active".to_string(),
                is_current: true,
            })
            .await
            .unwrap();

        let item = api
            .create_item(
                Collection::Awards,
                &created.id,
                json!({ "award_name": "Merit" }),
            )
            .await
            .unwrap();
        let item_id = item["id"].as_str().unwrap().to_string();
        assert_eq!(api.item_count(&created.id, Collection::Awards), 1);

        api.delete_item(Collection::Awards, &item_id).await.unwrap();
        assert_eq!(api.item_count(&created.id, Collection::Awards), 0);
        assert_eq!(
            api.calls(),
            vec![
                StoreCall::CreateResume(created.id.clone()),
                StoreCall::CreateItem(Collection::Awards, item_id.clone()),
                StoreCall::DeleteItem(Collection::Awards, item_id),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_item_fails() {
        let api = InMemoryResumeApi::new();
        let err = api
            .delete_item(Collection::Awards, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_item_rejects_non_object() {
        let api = InMemoryResumeApi::with_demo_data();
        let err = api
            .create_item(Collection::Awards, "demo-0001", json!("Merit"))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_new_current_resume_clears_previous_flag() {
        let api = InMemoryResumeApi::new();
        let new = |name: &str| NewResume {
            name: name.to_string(),
            language: "ko".to_string(),
            purpose: "general".to_string(),
            user_id: "u1".to_string(),
            status: "active".to_string(),
            is_current: true,
        };
        let first = api.create_resume(new("first")).await.unwrap();
        api.create_resume(new("second")).await.unwrap();
        let first = api.get_resume_detail(&first.id).await.unwrap().unwrap();
        assert_eq!(first.is_current, Some(false));
    }
}
