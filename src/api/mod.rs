//! Resource API contract consumed by the scheduler
//!
//! The portal backend owns every record durably. The scheduler only sees it
//! through [`ResourceApi`], a shape-level contract with two implementations:
//!
//! - [`client::HttpResourceApi`] - the portal's REST endpoints over HTTP
//! - [`memory::InMemoryApi`] - an in-process backend with the same server
//!   rules, used for tests and offline demos

pub mod client;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AssignmentId, AssignmentPair, BulkAssignOutcome, ClassSection, NewSlotInput, SlotId,
    SlotPatch, Subject, Teacher, TeacherAssignment, TeacherId, TimetableSlot,
};

/// Result type for resource API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by a resource API backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// Record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request collides with an existing record
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend refused the payload (validation, permissions)
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Any other non-success status
    #[error("HTTP error ({status}): {body}")]
    Http { status: u16, body: String },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Transient failures worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Operations the scheduler needs from the backend
#[async_trait]
pub trait ResourceApi: Send + Sync {
    // Timetable

    async fn list_slots(&self) -> ApiResult<Vec<TimetableSlot>>;

    async fn create_slot(&self, input: &NewSlotInput) -> ApiResult<TimetableSlot>;

    /// Some backends echo the updated record, others return an empty body
    async fn patch_slot(&self, id: SlotId, patch: &SlotPatch) -> ApiResult<Option<TimetableSlot>>;

    async fn delete_slot(&self, id: SlotId) -> ApiResult<()>;

    // Read-only catalogs for labels and form pickers

    async fn list_class_sections(&self) -> ApiResult<Vec<ClassSection>>;

    async fn list_subjects(&self) -> ApiResult<Vec<Subject>>;

    async fn list_teachers(&self) -> ApiResult<Vec<Teacher>>;

    // Teacher assignments

    async fn list_assignments(&self) -> ApiResult<Vec<TeacherAssignment>>;

    async fn bulk_assign(
        &self,
        teacher_id: TeacherId,
        pairs: &[AssignmentPair],
    ) -> ApiResult<BulkAssignOutcome>;

    async fn delete_assignment(&self, id: AssignmentId) -> ApiResult<()>;
}
