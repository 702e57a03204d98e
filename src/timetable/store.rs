//! Client-side holder of confirmed timetable state
//!
//! The store keeps the last slot list the backend confirmed, plus the
//! reference catalogs used for labels and pickers. Only the engine mutates
//! it, and only after a backend call has succeeded.

use crate::api::{ApiError, ResourceApi};
use crate::error::{Error, Result};
use crate::models::{
    ClassId, ClassSection, SlotId, SlotPatch, Subject, SubjectId, Teacher, TeacherId,
    TimetableSlot,
};

use super::grid::Weekday;

/// Auxiliary list that failed during a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedList {
    pub list: &'static str,
    pub error: ApiError,
}

/// Summary of a [`SlotStore::load_all`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub slots: usize,
    pub classes: usize,
    pub subjects: usize,
    pub teachers: usize,
    /// Lists that were replaced with empty ones because their fetch failed
    pub degraded: Vec<DegradedList>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }
}

/// Confirmed slot list plus reference catalogs
#[derive(Debug, Clone, Default)]
pub struct SlotStore {
    slots: Vec<TimetableSlot>,
    classes: Vec<ClassSection>,
    subjects: Vec<Subject>,
    teachers: Vec<Teacher>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a slot list, no catalogs
    pub fn with_slots(slots: Vec<TimetableSlot>) -> Self {
        Self {
            slots,
            ..Self::default()
        }
    }

    /// Fetch slots and catalogs concurrently.
    ///
    /// A slot list failure is returned as [`Error::Load`] and leaves the
    /// store as it was. A failed catalog becomes empty and is listed in the
    /// report.
    pub async fn load_all(&mut self, api: &dyn ResourceApi) -> Result<LoadReport> {
        let (slots, classes, subjects, teachers) = tokio::join!(
            api.list_slots(),
            api.list_class_sections(),
            api.list_subjects(),
            api.list_teachers(),
        );

        let slots = slots.map_err(|e| {
            tracing::warn!(error = %e, "Slot list failed to load");
            Error::Load(e)
        })?;

        let mut report = LoadReport::default();
        self.classes = degrade("classes", classes, &mut report);
        self.subjects = degrade("subjects", subjects, &mut report);
        self.teachers = degrade("teachers", teachers, &mut report);
        self.slots = slots;

        report.slots = self.slots.len();
        report.classes = self.classes.len();
        report.subjects = self.subjects.len();
        report.teachers = self.teachers.len();

        tracing::info!(
            slots = report.slots,
            classes = report.classes,
            subjects = report.subjects,
            teachers = report.teachers,
            degraded = report.degraded.len(),
            "Timetable loaded"
        );
        Ok(report)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn slots(&self) -> &[TimetableSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: SlotId) -> Option<&TimetableSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    pub fn classes(&self) -> &[ClassSection] {
        &self.classes
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    /// Slots of one class, or all of them, in store order
    pub fn filter_by_class(&self, class: Option<ClassId>) -> Vec<&TimetableSlot> {
        self.slots
            .iter()
            .filter(|s| class.map_or(true, |c| s.class_assigned == c))
            .collect()
    }

    /// Slots on `weekday`, optionally for one class, sorted by start time
    pub fn slots_for_day(&self, weekday: Weekday, class: Option<ClassId>) -> Vec<&TimetableSlot> {
        let mut day: Vec<_> = self
            .filter_by_class(class)
            .into_iter()
            .filter(|s| s.weekday == weekday)
            .collect();
        day.sort_by_key(|s| s.start_time);
        day
    }

    // ------------------------------------------------------------------------
    // Labels
    // ------------------------------------------------------------------------

    pub fn class_label(&self, id: ClassId) -> String {
        self.classes
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.label())
            .unwrap_or_else(|| format!("Class #{id}"))
    }

    pub fn subject_label(&self, id: SubjectId) -> String {
        self.subjects
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("Subject #{id}"))
    }

    pub fn teacher_label(&self, id: TeacherId) -> String {
        self.teachers
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.display_name())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Teacher #{id}"))
    }

    /// Class label for a slot, preferring the server-rendered one
    pub fn slot_class_label(&self, slot: &TimetableSlot) -> String {
        slot.class_name
            .clone()
            .unwrap_or_else(|| self.class_label(slot.class_assigned))
    }

    /// Subject label for a slot, `"-"` when no subject is set
    pub fn slot_subject_label(&self, slot: &TimetableSlot) -> String {
        match (&slot.subject_name, slot.subject) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => self.subject_label(id),
            (None, None) => "-".to_string(),
        }
    }

    /// Teacher label for a slot, `"-"` when no teacher is set
    pub fn slot_teacher_label(&self, slot: &TimetableSlot) -> String {
        match (&slot.teacher_name, slot.teacher) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => self.teacher_label(id),
            (None, None) => "-".to_string(),
        }
    }

    // ------------------------------------------------------------------------
    // Mutation (engine only)
    // ------------------------------------------------------------------------

    pub(crate) fn insert(&mut self, slot: TimetableSlot) {
        self.slots.push(slot);
    }

    pub(crate) fn remove(&mut self, id: SlotId) -> Option<TimetableSlot> {
        let index = self.slots.iter().position(|s| s.id == id)?;
        Some(self.slots.remove(index))
    }

    /// Replace a slot with the server's copy
    pub(crate) fn replace(&mut self, slot: TimetableSlot) -> Option<&TimetableSlot> {
        let existing = self.slots.iter_mut().find(|s| s.id == slot.id)?;
        *existing = slot;
        Some(&*existing)
    }

    pub(crate) fn apply_patch(&mut self, id: SlotId, patch: &SlotPatch) -> Option<&TimetableSlot> {
        let slot = self.slots.iter_mut().find(|s| s.id == id)?;
        patch.apply_to(slot);
        Some(&*slot)
    }
}

fn degrade<T>(
    list: &'static str,
    result: std::result::Result<Vec<T>, ApiError>,
    report: &mut LoadReport,
) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(error) => {
            tracing::warn!(list, error = %error, "Auxiliary list failed, continuing with empty list");
            report.degraded.push(DegradedList { list, error });
            Vec::new()
        }
    }
}
