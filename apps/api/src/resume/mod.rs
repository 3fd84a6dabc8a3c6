//! Resume record composition, editing and directory filtering.
//!
//! Upstream detail payloads are normalized into [`models::ResumeRecord`] by
//! the assembler, edited and saved one section at a time through the
//! repository or a [`session::ResumeSession`], and searched with the filter
//! engine before being projected into table rows.

pub mod assembler;
pub mod defaults;
pub mod filter;
pub mod handlers;
pub mod mapping;
pub mod models;
pub mod normalize;
pub mod projections;
pub mod repository;
pub mod session;
pub mod validation;

pub use models::{ResumeRecord, ResumeRecordWithId, SectionKey, SectionPayload};
pub use repository::ResumeRepository;
pub use session::ResumeSession;
