//! classgrid - Weekly class timetable scheduler
//!
//! Manages a school's weekly grid of class periods against a portal REST
//! backend: create and delete periods, and reschedule them by dropping onto
//! another day or a 45-minute lesson bin while keeping their duration.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`timetable`] - Time arithmetic, the bin grid, slot store, scheduling
//!   engine, and drag/drop interaction
//! - [`assignments`] - Teacher/subject/class assignment resolver
//! - [`api`] - Resource API contract with HTTP and in-memory backends
//! - [`models`] - Core data structures and types
//! - [`notify`] - Operator notifications and confirmation prompts
//! - [`config`] - Configuration management and settings
//! - [`error`] - Unified error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use classgrid::api::client::{ClientConfig, HttpResourceApi};
//! use classgrid::notify::{AutoConfirm, TracingNotifier};
//! use classgrid::timetable::{SchedulingEngine, Weekday};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = HttpResourceApi::new(ClientConfig::new("http://localhost:8000/api"))?;
//!     let mut engine = SchedulingEngine::new(
//!         Arc::new(api),
//!         Arc::new(TracingNotifier),
//!         Arc::new(AutoConfirm(true)),
//!     );
//!     engine.load().await?;
//!     engine.move_to_day(7, Weekday::Friday).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assignments;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod timetable;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{ApiError, ResourceApi};
    pub use crate::assignments::{AssignmentResolver, AssignmentRow};
    pub use crate::config::Config;
    pub use crate::error::{ClassgridErrorTrait, Error, ErrorCategory, Result};
    pub use crate::models::{ClassSection, Subject, Teacher, TeacherAssignment, TimetableSlot};
    pub use crate::notify::{Confirm, Notification, Notifier};
    pub use crate::timetable::{
        CellKey, GridEvent, GridInteraction, Outcome, SchedulingEngine, SlotForm, TimeOfDay,
        Weekday,
    };
}

// Direct re-exports for convenience
pub use models::{TeacherAssignment, TimetableSlot};
pub use timetable::{TimeOfDay, Weekday};
