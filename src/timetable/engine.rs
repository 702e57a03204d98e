//! Timetable scheduling engine
//!
//! The engine owns the [`SlotStore`] and is its only writer. Each command
//! validates its input, issues at most one backend call, and commits to the
//! store only after the call succeeds. A failed call leaves the store as it
//! was and reports through the [`Notifier`].
//!
//! Commands take `&mut self`, so one engine never has two requests in
//! flight.

use std::sync::Arc;

use crate::api::{ApiError, ResourceApi};
use crate::assignments::AssignmentIndex;
use crate::error::{ClassgridErrorTrait, Error, Operation, Result, ValidationError};
use crate::models::{
    ClassId, NewSlotInput, SlotId, SlotPatch, SubjectId, TeacherId, TimetableSlot,
};
use crate::notify::{Confirm, Notification, Notifier};

use super::clock::{self, TimeOfDay};
use super::grid::{CellKey, Weekday, BIN_MINUTES};
use super::store::{LoadReport, SlotStore};
use super::Outcome;

/// Default lesson start for a fresh form
pub const DEFAULT_START: TimeOfDay = TimeOfDay::from_hm(9, 0);

/// Default lesson end for a fresh form
pub const DEFAULT_END: TimeOfDay = TimeOfDay::from_hm(9, 45);

// ============================================================================
// Slot Form
// ============================================================================

/// Draft of a new slot as entered by the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotForm {
    pub class_assigned: Option<ClassId>,
    pub weekday: Option<Weekday>,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub subject: Option<SubjectId>,
    pub teacher: Option<TeacherId>,
}

impl Default for SlotForm {
    fn default() -> Self {
        Self {
            class_assigned: None,
            weekday: Some(Weekday::Monday),
            start_time: DEFAULT_START,
            end_time: DEFAULT_END,
            subject: None,
            teacher: None,
        }
    }
}

impl SlotForm {
    /// Form for `class` on `weekday` with default times
    pub fn new(class: ClassId, weekday: Weekday) -> Self {
        Self {
            class_assigned: Some(class),
            weekday: Some(weekday),
            ..Self::default()
        }
    }

    pub fn with_times(mut self, start: TimeOfDay, end: TimeOfDay) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn with_subject(mut self, subject: SubjectId) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_teacher(mut self, teacher: TeacherId) -> Self {
        self.teacher = Some(teacher);
        self
    }

    /// Check required fields and build the create payload
    pub fn to_input(&self) -> std::result::Result<NewSlotInput, ValidationError> {
        let class_assigned = self.class_assigned.ok_or(ValidationError::MissingClass)?;
        let weekday = self.weekday.ok_or(ValidationError::MissingWeekday)?;
        if self.start_time == self.end_time {
            return Err(ValidationError::EmptyWindow(self.start_time));
        }
        Ok(NewSlotInput {
            class_assigned,
            weekday,
            start_time: self.start_time,
            end_time: self.end_time,
            subject: self.subject,
            teacher: self.teacher,
        })
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Single writer for the confirmed timetable
pub struct SchedulingEngine {
    api: Arc<dyn ResourceApi>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    store: SlotStore,
    form: SlotForm,
    assignments: Option<AssignmentIndex>,
}

impl SchedulingEngine {
    pub fn new(
        api: Arc<dyn ResourceApi>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            api,
            notifier,
            confirm,
            store: SlotStore::new(),
            form: SlotForm::default(),
            assignments: None,
        }
    }

    /// Engine over an already-populated store
    pub fn with_store(mut self, store: SlotStore) -> Self {
        self.store = store;
        self
    }

    /// Enable the teacher-assignment soft check
    pub fn set_assignment_index(&mut self, index: AssignmentIndex) {
        self.assignments = Some(index);
    }

    pub fn store(&self) -> &SlotStore {
        &self.store
    }

    pub fn form(&self) -> &SlotForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SlotForm {
        &mut self.form
    }

    pub fn slot(&self, id: SlotId) -> Option<&TimetableSlot> {
        self.store.get(id)
    }

    /// Fetch the timetable and catalogs
    pub async fn load(&mut self) -> Result<LoadReport> {
        let result = self.store.load_all(self.api.as_ref()).await;
        if let Err(e) = &result {
            self.notifier.notify(Notification::error(e.user_message()));
        }
        result
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Create a slot from `form`
    pub async fn create(&mut self, form: &SlotForm) -> Result<TimetableSlot> {
        let input = form.to_input().map_err(|e| self.reject(e))?;
        self.check_assignment(input.teacher, input.subject, input.class_assigned);

        match self.api.create_slot(&input).await {
            Ok(slot) => {
                tracing::info!(
                    slot_id = slot.id,
                    class = slot.class_assigned,
                    weekday = %slot.weekday,
                    span = %slot.span(),
                    "Slot created"
                );
                self.store.insert(slot.clone());
                self.notifier.notify(Notification::success("Slot added"));
                Ok(slot)
            }
            Err(e) => Err(self.fail(Operation::CreateSlot, None, e)),
        }
    }

    /// Create a slot from the engine's own form, resetting it on success
    pub async fn submit_form(&mut self) -> Result<TimetableSlot> {
        let form = self.form.clone();
        let slot = self.create(&form).await?;
        self.form = SlotForm::default();
        Ok(slot)
    }

    /// Delete a slot after confirmation
    pub async fn delete(&mut self, id: SlotId) -> Result<Outcome> {
        self.require_slot(id)?;
        if !self.confirm.confirm("Delete this slot?") {
            tracing::debug!(slot_id = id, "Delete cancelled");
            return Ok(Outcome::Cancelled);
        }

        match self.api.delete_slot(id).await {
            Ok(()) => {
                self.store.remove(id);
                tracing::info!(slot_id = id, "Slot deleted");
                self.notifier.notify(Notification::success("Slot deleted"));
                Ok(Outcome::Done)
            }
            Err(e) => Err(self.fail(Operation::DeleteSlot, Some(id), e)),
        }
    }

    /// Move a slot to another weekday, keeping its times
    pub async fn move_to_day(&mut self, id: SlotId, weekday: Weekday) -> Result<TimetableSlot> {
        self.require_slot(id)?;
        let patch = SlotPatch::weekday(weekday);

        match self.api.patch_slot(id, &patch).await {
            Ok(echo) => {
                let slot = self.commit(id, &patch, echo)?;
                tracing::info!(slot_id = id, weekday = %weekday, "Slot moved to day");
                self.notifier.notify(Notification::success("Moved slot"));
                Ok(slot)
            }
            Err(e) => Err(self.fail(Operation::MoveToDay, Some(id), e)),
        }
    }

    /// Move a slot to a lesson bin, keeping its duration.
    ///
    /// A zero-length slot is given the default lesson length.
    pub async fn move_to_bin(
        &mut self,
        id: SlotId,
        weekday: Weekday,
        bin_start: TimeOfDay,
    ) -> Result<TimetableSlot> {
        let cell = CellKey::new(weekday, bin_start)
            .map_err(|e| self.reject(ValidationError::Grid(e)))?;
        let current = self.require_slot(id)?;

        let duration = match current.duration_minutes() {
            0 => i32::from(BIN_MINUTES),
            minutes => minutes,
        };
        let end = clock::add_minutes(cell.bin(), duration);
        let patch = SlotPatch::placement(weekday, cell.bin(), end);

        match self.api.patch_slot(id, &patch).await {
            Ok(echo) => {
                let slot = self.commit(id, &patch, echo)?;
                tracing::info!(slot_id = id, cell = %cell, span = %slot.span(), "Slot moved to bin");
                self.notifier.notify(Notification::success(format!(
                    "Moved to {} {}",
                    weekday.label(),
                    cell.bin()
                )));
                Ok(slot)
            }
            Err(e) => Err(self.fail(Operation::MoveToBin, Some(id), e)),
        }
    }

    /// Bin drop addressed by cell key
    pub async fn move_to_cell(&mut self, id: SlotId, cell: CellKey) -> Result<TimetableSlot> {
        self.move_to_bin(id, cell.weekday(), cell.bin()).await
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn require_slot(&self, id: SlotId) -> Result<TimetableSlot> {
        self.store
            .get(id)
            .cloned()
            .ok_or_else(|| self.reject(ValidationError::UnknownSlot(id)))
    }

    // Prefer the server's copy when the backend echoes one
    fn commit(
        &mut self,
        id: SlotId,
        patch: &SlotPatch,
        echo: Option<TimetableSlot>,
    ) -> Result<TimetableSlot> {
        let committed = match echo {
            Some(slot) if slot.id == id => self.store.replace(slot).cloned(),
            _ => self.store.apply_patch(id, patch).cloned(),
        };
        committed.ok_or_else(|| self.reject(ValidationError::UnknownSlot(id)))
    }

    fn check_assignment(
        &self,
        teacher: Option<TeacherId>,
        subject: Option<SubjectId>,
        class: ClassId,
    ) {
        let (Some(index), Some(teacher), Some(subject)) = (&self.assignments, teacher, subject)
        else {
            return;
        };
        if !index.contains(&(teacher, subject, class)) {
            tracing::warn!(
                teacher,
                subject,
                class,
                "Teacher has no assignment for this subject and class"
            );
        }
    }

    fn reject(&self, error: ValidationError) -> Error {
        tracing::debug!(error = %error, "Command rejected before sending");
        self.notifier.notify(Notification::error(error.to_string()));
        Error::Validation(error)
    }

    fn fail(&self, op: Operation, id: Option<SlotId>, source: ApiError) -> Error {
        tracing::warn!(%op, slot_id = ?id, error = %source, "Mutation failed");
        self.notifier.notify(Notification::error(op.failure_message()));
        Error::mutation(op, source)
    }
}
