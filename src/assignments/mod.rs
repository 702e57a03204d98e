//! Teacher assignment resolver
//!
//! Maintains which teachers may teach which subjects to which classes.
//! Assignments are created in bulk for one teacher and removed one at a
//! time. The resolver also answers [`AssignmentResolver::is_assigned`], the
//! soft consistency rule the timetable engine checks when a slot names both
//! a teacher and a subject.

use std::collections::HashSet;
use std::sync::Arc;

use crate::api::ResourceApi;
use crate::error::{Error, Operation, Result, ValidationError};
use crate::models::{
    AssignmentId, AssignmentPair, BulkAssignOutcome, ClassId, SubjectId, Teacher,
    TeacherAssignment, TeacherId,
};
use crate::notify::{Confirm, Notification, Notifier};
use crate::timetable::Outcome;

/// Set of (teacher, subject, class) triples known to be assigned
pub type AssignmentIndex = HashSet<(TeacherId, SubjectId, ClassId)>;

/// One editable row of the bulk-assign form; either side may be unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentRow {
    pub subject_id: Option<SubjectId>,
    pub class_id: Option<ClassId>,
}

impl AssignmentRow {
    pub fn new(subject_id: SubjectId, class_id: ClassId) -> Self {
        Self {
            subject_id: Some(subject_id),
            class_id: Some(class_id),
        }
    }

    /// Complete rows become a wire pair
    pub fn to_pair(self) -> Option<AssignmentPair> {
        Some(AssignmentPair {
            subject_id: self.subject_id?,
            class_id: self.class_id?,
        })
    }
}

/// Keeps the teacher-assignment list in sync with the backend
pub struct AssignmentResolver {
    api: Arc<dyn ResourceApi>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    assignments: Vec<TeacherAssignment>,
    teachers: Vec<Teacher>,
}

impl AssignmentResolver {
    pub fn new(
        api: Arc<dyn ResourceApi>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            api,
            notifier,
            confirm,
            assignments: Vec::new(),
            teachers: Vec::new(),
        }
    }

    /// Load assignments and the teacher picker list.
    ///
    /// A teacher list failure leaves the picker empty; an assignment list
    /// failure is a load error.
    pub async fn load(&mut self) -> Result<()> {
        let (assignments, teachers) =
            tokio::join!(self.api.list_assignments(), self.api.list_teachers());

        self.assignments = assignments.map_err(|e| {
            tracing::warn!(error = %e, "Assignment list failed to load");
            Error::Load(e)
        })?;
        self.teachers = teachers.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Teacher list failed, continuing with empty list");
            Vec::new()
        });

        tracing::info!(
            assignments = self.assignments.len(),
            teachers = self.teachers.len(),
            "Assignments loaded"
        );
        Ok(())
    }

    /// Re-fetch only the assignment list
    async fn reload_assignments(&mut self) -> Result<()> {
        self.assignments = self.api.list_assignments().await.map_err(Error::Load)?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn assignments(&self) -> &[TeacherAssignment] {
        &self.assignments
    }

    /// Teachers eligible for new assignments
    pub fn approved_teachers(&self) -> Vec<&Teacher> {
        self.teachers.iter().filter(|t| t.is_approved()).collect()
    }

    pub fn for_teacher(&self, teacher: TeacherId) -> Vec<&TeacherAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.teacher == teacher)
            .collect()
    }

    pub fn is_assigned(&self, teacher: TeacherId, subject: SubjectId, class: ClassId) -> bool {
        self.assignments
            .iter()
            .any(|a| a.key() == (teacher, subject, class))
    }

    /// Snapshot of all assigned triples
    pub fn index(&self) -> AssignmentIndex {
        self.assignments.iter().map(TeacherAssignment::key).collect()
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Assign a teacher to every complete (subject, class) row.
    ///
    /// Incomplete rows are dropped and duplicate pairs collapsed. Nothing is
    /// sent when no teacher is selected or no complete row remains. After a
    /// successful call the assignment list is reloaded.
    pub async fn bulk_assign(
        &mut self,
        teacher: Option<TeacherId>,
        rows: &[AssignmentRow],
    ) -> Result<BulkAssignOutcome> {
        let Some(teacher_id) = teacher else {
            return Err(self.reject(ValidationError::NoTeacherSelected));
        };

        let mut seen = HashSet::new();
        let pairs: Vec<AssignmentPair> = rows
            .iter()
            .filter_map(|row| row.to_pair())
            .filter(|pair| seen.insert(*pair))
            .collect();
        if pairs.is_empty() {
            return Err(self.reject(ValidationError::NoValidAssignments));
        }

        let outcome = match self.api.bulk_assign(teacher_id, &pairs).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(teacher_id, pairs = pairs.len(), error = %e, "Bulk assign failed");
                self.notifier
                    .notify(Notification::error(Operation::BulkAssign.failure_message()));
                return Err(Error::mutation(Operation::BulkAssign, e));
            }
        };

        tracing::info!(
            teacher_id,
            requested = pairs.len(),
            created = outcome.created,
            errors = outcome.errors.len(),
            "Bulk assign completed"
        );
        if outcome.errors.is_empty() {
            self.notifier.notify(Notification::success(format!(
                "{} assignment(s) created!",
                outcome.created
            )));
        } else {
            self.notifier.notify(Notification::warning(format!(
                "{} assignment(s) created, {} failed",
                outcome.created,
                outcome.errors.len()
            )));
        }

        if let Err(e) = self.reload_assignments().await {
            tracing::warn!(error = %e, "Assignment reload after bulk assign failed");
            self.notifier.notify(Notification::warning(
                "Assignments saved, but the list could not be refreshed. Reload to see them.",
            ));
        }
        Ok(outcome)
    }

    /// Remove one assignment after confirmation
    pub async fn remove(&mut self, id: AssignmentId) -> Result<Outcome> {
        if !self.assignments.iter().any(|a| a.id == id) {
            return Err(self.reject(ValidationError::UnknownAssignment(id)));
        }
        if !self.confirm.confirm("Remove this assignment?") {
            tracing::debug!(assignment_id = id, "Removal cancelled");
            return Ok(Outcome::Cancelled);
        }

        match self.api.delete_assignment(id).await {
            Ok(()) => {
                self.assignments.retain(|a| a.id != id);
                tracing::info!(assignment_id = id, "Assignment removed");
                self.notifier
                    .notify(Notification::success("Assignment removed"));
                Ok(Outcome::Done)
            }
            Err(e) => {
                tracing::warn!(assignment_id = id, error = %e, "Assignment removal failed");
                self.notifier.notify(Notification::error(
                    Operation::RemoveAssignment.failure_message(),
                ));
                Err(Error::mutation(Operation::RemoveAssignment, e))
            }
        }
    }

    fn reject(&self, error: ValidationError) -> Error {
        self.notifier.notify(Notification::error(error.to_string()));
        Error::Validation(error)
    }
}
