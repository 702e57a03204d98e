//! Unified error handling for the classgrid crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`ClassgridErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use classgrid::error::{ClassgridErrorTrait, Error};
//!
//! fn report(err: &Error) {
//!     if err.is_recoverable() {
//!         eprintln!("{} (try again)", err.user_message());
//!     } else {
//!         eprintln!("{}", err.user_message());
//!     }
//! }
//! ```

use std::fmt;
use thiserror::Error;

pub use crate::api::ApiError;
pub use crate::timetable::clock::ParseTimeError;
pub use crate::timetable::grid::GridError;

use crate::models::{AssignmentId, SlotId};
use crate::timetable::clock::TimeOfDay;

/// Common trait for all classgrid error types
pub trait ClassgridErrorTrait: std::error::Error {
    /// Check if this error is recoverable (the operator can retry)
    fn is_recoverable(&self) -> bool;

    /// Short message suitable for a toast or CLI status line
    fn user_message(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Initial data could not be loaded
    Load,
    /// A create, move, delete, or assignment call failed
    Mutation,
    /// Input rejected before any request was sent
    Validation,
    /// Transport-level failures
    Network,
    /// Configuration and setup errors
    Config,
    /// Other/unknown errors
    Other,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Mutation => "mutation",
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Config => "config",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Operations
// ============================================================================

/// User-visible commands that mutate backend state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateSlot,
    DeleteSlot,
    MoveToDay,
    MoveToBin,
    BulkAssign,
    RemoveAssignment,
}

impl Operation {
    /// Message shown when the operation fails at the backend
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::CreateSlot => "Failed to add slot",
            Self::DeleteSlot => "Failed to delete slot",
            Self::MoveToDay => "Failed to move slot",
            Self::MoveToBin => "Failed to reschedule",
            Self::BulkAssign => "Failed to create assignments",
            Self::RemoveAssignment => "Failed to remove assignment",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateSlot => "create_slot",
            Self::DeleteSlot => "delete_slot",
            Self::MoveToDay => "move_to_day",
            Self::MoveToBin => "move_to_bin",
            Self::BulkAssign => "bulk_assign",
            Self::RemoveAssignment => "remove_assignment",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Input problems detected before a request is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a class")]
    MissingClass,

    #[error("Please select a weekday")]
    MissingWeekday,

    #[error("Start and end time are both {0}; a slot needs a non-empty window")]
    EmptyWindow(TimeOfDay),

    #[error("Unknown slot {0}")]
    UnknownSlot(SlotId),

    #[error("Unknown assignment {0}")]
    UnknownAssignment(AssignmentId),

    #[error("Please select a teacher")]
    NoTeacherSelected,

    #[error("Please add at least one valid assignment")]
    NoValidAssignments,

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Time(#[from] ParseTimeError),
}

// ============================================================================
// Unified Error
// ============================================================================

/// Unified error type for the classgrid crate
#[derive(Error, Debug)]
pub enum Error {
    /// The slot list could not be fetched
    #[error("Failed to load timetable: {0}")]
    Load(#[source] ApiError),

    /// A mutating call was refused or failed in transit
    #[error("{op} failed: {source}")]
    Mutation {
        op: Operation,
        #[source]
        source: ApiError,
    },

    /// Input rejected client-side
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ClassgridErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Load(e) => e.is_transient(),
            // Backend state is unchanged after a failed mutation, so the same
            // command can always be issued again
            Self::Mutation { .. } => true,
            Self::Validation(_) => true,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Load(_) => "Failed to load timetable".to_string(),
            Self::Mutation { op, .. } => op.failure_message().to_string(),
            Self::Validation(e) => e.to_string(),
            Self::Config(msg) => format!("Configuration error: {msg}"),
            Self::Other { context, .. } => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Load(ApiError::Network(_)) => ErrorCategory::Network,
            Self::Load(_) => ErrorCategory::Load,
            Self::Mutation { .. } => ErrorCategory::Mutation,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a mutation error
    pub fn mutation(op: Operation, source: ApiError) -> Self {
        Self::Mutation { op, source }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The backend error behind a load or mutation failure
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Load(e) | Self::Mutation { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for Error {
    fn from(err: GridError) -> Self {
        Self::Validation(err.into())
    }
}

impl From<ParseTimeError> for Error {
    fn from(err: ParseTimeError) -> Self {
        Self::Validation(err.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
