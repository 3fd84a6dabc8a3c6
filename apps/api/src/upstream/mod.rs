//! Boundary to the remote personnel-record service.
//!
//! The rest of the crate talks to the service only through [`ResumeApi`].
//! `client` is the production HTTP adapter, `memory` an explicit in-process
//! store used by tests and the demo mode.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod client;
pub mod memory;
pub mod models;

pub use client::HttpResumeApi;
pub use memory::InMemoryResumeApi;
pub use models::{Collection, NewResume, ResumeDetail, ResumeSummary};

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Upstream item not found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait ResumeApi: Send + Sync {
    async fn list_resumes(&self) -> Result<Vec<ResumeSummary>, UpstreamError>;

    /// `Ok(None)` when the service has no record with this id.
    async fn get_resume_detail(&self, id: &str) -> Result<Option<ResumeDetail>, UpstreamError>;

    async fn create_resume(&self, resume: NewResume) -> Result<ResumeSummary, UpstreamError>;

    async fn delete_resume(&self, id: &str) -> Result<(), UpstreamError>;

    /// Creates one item in a per-section collection. `fields` is a JSON object
    /// without `id`; the service assigns it and returns the stored item.
    async fn create_item(
        &self,
        collection: Collection,
        resume_id: &str,
        fields: Value,
    ) -> Result<Value, UpstreamError>;

    async fn delete_item(&self, collection: Collection, item_id: &str)
        -> Result<(), UpstreamError>;
}
