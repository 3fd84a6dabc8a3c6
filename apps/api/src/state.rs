use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use crate::config::Config;
use crate::errors::AppError;
use crate::resume::models::ResumeRecordWithId;
use crate::resume::projections::ProjectionCache;
use crate::resume::repository::ResumeRepository;
use crate::upstream::ResumeApi;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub repository: ResumeRepository,
    pub config: Config,
    /// Short-lived copy of every record for the directory listing.
    pub directory: Arc<DirectorySnapshot>,
    pub projections: Arc<ProjectionCache>,
}

impl AppState {
    pub fn new(api: Arc<dyn ResumeApi>, config: Config) -> Self {
        Self {
            repository: ResumeRepository::new(api, config.default_resume_purpose.clone()),
            directory: Arc::new(DirectorySnapshot::new(config.directory_cache_ttl)),
            projections: Arc::new(ProjectionCache::new()),
            config,
        }
    }
}

/// All records as last fetched, reused until the TTL runs out or a write
/// invalidates it. The upstream service stays the source of truth.
pub struct DirectorySnapshot {
    ttl: Duration,
    cached: Mutex<Option<(Instant, Arc<Vec<ResumeRecordWithId>>)>>,
}

impl DirectorySnapshot {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cached: Mutex::new(None),
        }
    }

    pub async fn records(
        &self,
        repository: &ResumeRepository,
    ) -> Result<Arc<Vec<ResumeRecordWithId>>, AppError> {
        let mut cached = self.cached.lock().await;
        if let Some((fetched_at, records)) = cached.as_ref() {
            if fetched_at.elapsed() < self.ttl {
                return Ok(records.clone());
            }
        }

        let records = Arc::new(repository.fetch_all().await?);
        debug!("Directory snapshot refreshed ({} records)", records.len());
        if !self.ttl.is_zero() {
            *cached = Some((Instant::now(), records.clone()));
        }
        Ok(records)
    }

    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
