//! Editing session over one record.
//!
//! Holds the loaded record behind a `watch` channel so any number of
//! consumers can observe it. Loads are tagged with a generation number and a
//! response that arrives after a newer load or a save has started is dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::resume::defaults::section_draft;
use crate::resume::models::{
    RecordMetadata, ResumeRecord, ResumeRecordWithId, SectionKey, SectionPayload,
};
use crate::resume::repository::ResumeRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub record: Option<ResumeRecordWithId>,
    pub status: SessionStatus,
    pub error: Option<String>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            record: None,
            status: SessionStatus::Idle,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load or save started while this one was in flight.
    Superseded,
}

pub struct ResumeSession {
    repository: ResumeRepository,
    target: Option<String>,
    generation: AtomicU64,
    state: watch::Sender<SessionSnapshot>,
}

impl ResumeSession {
    /// `target` pins the session to one record; `None` follows the first listed record.
    pub fn new(repository: ResumeRepository, target: Option<String>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            repository,
            target,
            generation: AtomicU64::new(0),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Fetches the target record. The previously held record stays visible
    /// while loading and survives a failed load.
    pub async fn load(&self) -> Result<LoadOutcome, AppError> {
        let generation = self.next_generation();
        self.state.send_modify(|snapshot| {
            snapshot.status = SessionStatus::Loading;
        });

        let result = self.repository.fetch_one(self.target.as_deref()).await;

        if !self.is_current(generation) {
            warn!("Discarding stale resume load (generation {generation})");
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(record) => {
                debug!("Session loaded resume {}", record.id);
                self.state.send_modify(|snapshot| {
                    snapshot.record = Some(record);
                    snapshot.status = SessionStatus::Ready;
                    snapshot.error = None;
                });
                Ok(LoadOutcome::Applied)
            }
            Err(e) => Err(self.mark_failed(e)),
        }
    }

    pub async fn reload(&self) -> Result<LoadOutcome, AppError> {
        self.load().await
    }

    /// Persists one section and swaps it into the held record. Returns the
    /// section as the service stored it.
    pub async fn update_section(
        &self,
        payload: SectionPayload,
    ) -> Result<SectionPayload, AppError> {
        let id = self.active_id()?;
        let key = payload.key();
        self.next_generation();

        let saved = match self.repository.update_section(&id, payload).await {
            Ok(saved) => saved,
            Err(e) => return Err(self.mark_failed(e)),
        };
        let merged = saved.section(key);

        let section = merged.clone();
        self.state.send_modify(move |snapshot| match snapshot.record.as_mut() {
            Some(held) if held.id == id => held.record.replace_section(section),
            _ => {
                snapshot.record = Some(ResumeRecordWithId {
                    id,
                    record: saved,
                    metadata: RecordMetadata::default(),
                });
            }
        });
        self.mark_ready();
        Ok(merged)
    }

    /// Persists every section and replaces the held record.
    pub async fn save_all(&self, record: ResumeRecord) -> Result<ResumeRecord, AppError> {
        let id = self.active_id()?;
        self.next_generation();

        let saved = match self.repository.save_all(&id, &record).await {
            Ok(saved) => saved,
            Err(e) => return Err(self.mark_failed(e)),
        };

        let stored = saved.clone();
        self.state.send_modify(move |snapshot| match snapshot.record.as_mut() {
            Some(held) if held.id == id => held.record = stored,
            _ => {
                snapshot.record = Some(ResumeRecordWithId {
                    id,
                    record: stored,
                    metadata: RecordMetadata::default(),
                });
            }
        });
        self.mark_ready();
        Ok(saved)
    }

    /// Editing draft of one section; never empty for list sections.
    pub fn draft(&self, section: SectionKey) -> SectionPayload {
        let snapshot = self.state.borrow();
        let current = match snapshot.record.as_ref() {
            Some(held) => held.record.section(section),
            None => ResumeRecord::blank().section(section),
        };
        section_draft(current)
    }

    fn active_id(&self) -> Result<String, AppError> {
        self.state
            .borrow()
            .record
            .as_ref()
            .map(|held| held.id.clone())
            .or_else(|| self.target.clone())
            .ok_or(AppError::MissingActiveRecord)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// A failed save also ends any load it superseded, so the status must
    /// leave `Loading` here. The held record is kept.
    fn mark_failed(&self, e: AppError) -> AppError {
        let message = e.to_string();
        self.state.send_modify(|snapshot| {
            snapshot.status = SessionStatus::Error;
            snapshot.error = Some(message);
        });
        e
    }

    fn mark_ready(&self) {
        self.state.send_modify(|snapshot| {
            snapshot.status = SessionStatus::Ready;
            snapshot.error = None;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::{oneshot, Notify};

    use super::*;
    use crate::resume::models::{AwardEntry, FamilyRelation};
    use crate::resume::repository::tests::seeded;
    use crate::resume::repository::DEFAULT_PURPOSE;
    use crate::upstream::{
        Collection, InMemoryResumeApi, NewResume, ResumeApi, ResumeDetail, ResumeSummary,
        UpstreamError,
    };

    /// Holds back the first detail response until the test releases it.
    struct GatedApi {
        inner: InMemoryResumeApi,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        entered: Notify,
        reject_creates: bool,
    }

    impl GatedApi {
        fn new(inner: InMemoryResumeApi, gate: Option<oneshot::Receiver<()>>) -> Self {
            Self {
                inner,
                gate: Mutex::new(gate),
                entered: Notify::new(),
                reject_creates: false,
            }
        }
    }

    #[async_trait]
    impl ResumeApi for GatedApi {
        async fn list_resumes(&self) -> Result<Vec<ResumeSummary>, UpstreamError> {
            self.inner.list_resumes().await
        }

        async fn get_resume_detail(
            &self,
            id: &str,
        ) -> Result<Option<ResumeDetail>, UpstreamError> {
            let detail = self.inner.get_resume_detail(id).await;
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                self.entered.notify_one();
                let _ = gate.await;
            }
            detail
        }

        async fn create_resume(&self, resume: NewResume) -> Result<ResumeSummary, UpstreamError> {
            self.inner.create_resume(resume).await
        }

        async fn delete_resume(&self, id: &str) -> Result<(), UpstreamError> {
            self.inner.delete_resume(id).await
        }

        async fn create_item(
            &self,
            collection: Collection,
            resume_id: &str,
            fields: Value,
        ) -> Result<Value, UpstreamError> {
            if self.reject_creates {
                return Err(UpstreamError::Api {
                    status: 503,
                    message: "write rejected".to_string(),
                });
            }
            self.inner.create_item(collection, resume_id, fields).await
        }

        async fn delete_item(
            &self,
            collection: Collection,
            item_id: &str,
        ) -> Result<(), UpstreamError> {
            self.inner.delete_item(collection, item_id).await
        }
    }

    fn session(api: Arc<dyn ResumeApi>, target: Option<&str>) -> ResumeSession {
        ResumeSession::new(
            ResumeRepository::new(api, DEFAULT_PURPOSE),
            target.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_load_follows_first_record_without_target() {
        let session = session(Arc::new(seeded()), None);
        assert_eq!(session.snapshot().status, SessionStatus::Idle);

        let outcome = session.load().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Applied);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Ready);
        assert_eq!(snapshot.record.unwrap().id, "r1");
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_record() {
        let api = Arc::new(seeded());
        let session = session(api.clone(), Some("r1"));
        session.load().await.unwrap();

        api.delete_resume("r1").await.unwrap();
        let err = session.reload().await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert_eq!(snapshot.error.as_deref(), Some("Resume not found"));
        assert_eq!(snapshot.record.unwrap().id, "r1");
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let (release, gate) = oneshot::channel();
        let api = Arc::new(GatedApi::new(seeded(), Some(gate)));
        let session = Arc::new(session(api.clone(), Some("r2")));

        let slow = {
            let session = session.clone();
            tokio::spawn(async move { session.load().await })
        };
        api.entered.notified().await;

        api.inner.insert_detail(ResumeDetail {
            id: "r2".to_string(),
            name: Some("Renamed".to_string()),
            ..Default::default()
        });
        assert_eq!(session.load().await.unwrap(), LoadOutcome::Applied);

        release.send(()).unwrap();
        assert_eq!(slow.await.unwrap().unwrap(), LoadOutcome::Superseded);

        let held = session.snapshot().record.unwrap();
        assert_eq!(held.metadata.display_name, "Renamed");
    }

    #[tokio::test]
    async fn test_failed_save_during_load_leaves_error_state() {
        let (release, gate) = oneshot::channel();
        let mut api = GatedApi::new(seeded(), Some(gate));
        api.reject_creates = true;
        let api = Arc::new(api);
        let session = Arc::new(session(api.clone(), Some("r2")));

        let slow = {
            let session = session.clone();
            tokio::spawn(async move { session.load().await })
        };
        api.entered.notified().await;

        let err = session
            .update_section(SectionPayload::Awards(vec![AwardEntry {
                award_type: "Long service".to_string(),
                ..Default::default()
            }]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));

        release.send(()).unwrap();
        assert_eq!(slow.await.unwrap().unwrap(), LoadOutcome::Superseded);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert!(snapshot.error.is_some());
        assert!(snapshot.record.is_none());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_held_record() {
        let mut api = GatedApi::new(seeded(), None);
        api.reject_creates = true;
        let session = session(Arc::new(api), Some("r1"));
        session.load().await.unwrap();

        let mut record = session.snapshot().record.unwrap().record;
        record.awards.clear();
        let err = session.save_all(record).await.unwrap_err();
        assert!(matches!(err, AppError::IncompleteSectionWrite { .. }));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert_eq!(snapshot.error, Some(err.to_string()));
        assert_eq!(snapshot.record.unwrap().id, "r1");
    }

    #[tokio::test]
    async fn test_update_section_requires_active_record() {
        let session = session(Arc::new(seeded()), None);
        let err = session
            .update_section(SectionPayload::Awards(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingActiveRecord));
    }

    #[tokio::test]
    async fn test_update_section_merges_only_that_section() {
        let session = session(Arc::new(seeded()), Some("r1"));
        session.load().await.unwrap();
        let before = session.snapshot().record.unwrap();

        let merged = session
            .update_section(SectionPayload::Awards(vec![AwardEntry {
                award_type: "Long service".to_string(),
                ..Default::default()
            }]))
            .await
            .unwrap();
        assert_eq!(merged.len(), 1);

        let after = session.snapshot().record.unwrap();
        assert_eq!(after.record.awards[0].award_type, "Long service");
        assert_eq!(after.metadata, before.metadata);
        assert_eq!(after.record.family, before.record.family);
        assert_eq!(after.record.family[0].relation, FamilyRelation::Mother);
        assert_eq!(after.record.education, before.record.education);
    }

    #[tokio::test]
    async fn test_save_all_replaces_record() {
        let session = session(Arc::new(seeded()), Some("r3"));
        let mut record = ResumeRecord::blank();
        record.profile.korean_name = "최민준".to_string();
        record.awards.clear();

        let saved = session.save_all(record).await.unwrap();
        assert_eq!(saved.profile.korean_name, "최민준");

        let held = session.snapshot().record.unwrap();
        assert_eq!(held.id, "r3");
        assert_eq!(held.record.profile.korean_name, "최민준");
        assert_eq!(session.snapshot().status, SessionStatus::Ready);
    }

    #[tokio::test]
    async fn test_draft_pads_empty_sections() {
        let session = session(Arc::new(seeded()), Some("r2"));
        assert_eq!(session.draft(SectionKey::Education).len(), 1);

        session.load().await.unwrap();
        assert_eq!(session.draft(SectionKey::Training).len(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let session = session(Arc::new(seeded()), Some("r1"));
        let mut rx = session.subscribe();
        session.load().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status, SessionStatus::Ready);
    }
}
