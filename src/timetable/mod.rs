//! Weekly timetable scheduling
//!
//! This module contains the weekly timetable subsystem:
//!
//! - [`clock`] - wrap-around minute arithmetic on wall-clock times
//! - [`grid`] - weekdays and the fixed 45-minute lesson bins
//! - [`store`] - confirmed slot list and reference catalogs
//! - [`engine`] - create, delete, and move commands against the backend
//! - [`interaction`] - drag/drop event handling and the week view model
//!
//! # Example
//!
//! ```rust,ignore
//! use classgrid::timetable::{SchedulingEngine, Weekday};
//!
//! let mut engine = SchedulingEngine::new(api, notifier, confirm);
//! engine.load().await?;
//! let bin = "14:00".parse()?;
//! engine.move_to_bin(slot_id, Weekday::Wednesday, bin).await?;
//! ```

pub mod clock;
pub mod engine;
pub mod grid;
pub mod interaction;
pub mod store;

pub use clock::TimeOfDay;
pub use engine::{SchedulingEngine, SlotForm};
pub use grid::{CellKey, Weekday};
pub use interaction::{GridEvent, GridInteraction, WeekView};
pub use store::{LoadReport, SlotStore};

/// Result of a command that may be declined by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The backend confirmed the change
    Done,
    /// The operator declined the confirmation; nothing was sent
    Cancelled,
}
