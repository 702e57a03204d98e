//! In-process backend with the portal's server-side rules
//!
//! [`InMemoryApi`] assigns ids, renders labels, and enforces the same
//! constraints as the real backend:
//!
//! - one slot per (class, weekday, start time)
//! - get-or-create semantics for (teacher, subject, class) assignments
//!
//! It also counts calls per operation and supports failure injection, which
//! makes it the test double for the engine and resolver.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::Mutex;

use super::{ApiError, ApiResult, ResourceApi};
use crate::models::{
    AssignmentId, AssignmentPair, BulkAssignOutcome, ClassId, ClassSection, NewSlotInput, SlotId,
    SlotPatch, Subject, SubjectId, Teacher, TeacherAssignment, TeacherId, TeacherUser,
    TimetableSlot,
};
use crate::timetable::clock::TimeOfDay;
use crate::timetable::grid::Weekday;

/// Operations exposed by [`ResourceApi`], used for counters and injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOp {
    ListSlots,
    CreateSlot,
    PatchSlot,
    DeleteSlot,
    ListClassSections,
    ListSubjects,
    ListTeachers,
    ListAssignments,
    BulkAssign,
    DeleteAssignment,
}

#[derive(Debug, Default)]
struct State {
    classes: Vec<ClassSection>,
    subjects: Vec<Subject>,
    teachers: Vec<Teacher>,
    slots: Vec<TimetableSlot>,
    assignments: Vec<TeacherAssignment>,
    next_id: u64,
    calls: HashMap<ApiOp, usize>,
    queued_failures: HashMap<ApiOp, VecDeque<ApiError>>,
    broken: HashSet<ApiOp>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // Record the call and return an injected failure, if any
    fn enter(&mut self, op: ApiOp) -> ApiResult<()> {
        *self.calls.entry(op).or_insert(0) += 1;
        if let Some(err) = self.queued_failures.get_mut(&op).and_then(|q| q.pop_front()) {
            return Err(err);
        }
        if self.broken.contains(&op) {
            return Err(ApiError::Network(format!("{op:?} unavailable")));
        }
        Ok(())
    }

    fn class_name(&self, id: ClassId) -> Option<String> {
        self.classes.iter().find(|c| c.id == id).map(|c| c.label())
    }

    fn subject_name(&self, id: Option<SubjectId>) -> Option<String> {
        id.and_then(|id| self.subjects.iter().find(|s| s.id == id))
            .map(|s| s.name.clone())
    }

    fn teacher_name(&self, id: Option<TeacherId>) -> Option<String> {
        id.and_then(|id| self.teachers.iter().find(|t| t.id == id))
            .map(|t| t.display_name())
    }

    fn check_references(
        &self,
        class: ClassId,
        subject: Option<SubjectId>,
        teacher: Option<TeacherId>,
    ) -> ApiResult<()> {
        if !self.classes.iter().any(|c| c.id == class) {
            return Err(ApiError::Rejected(format!("Invalid class id {class}")));
        }
        if let Some(subject) = subject {
            if !self.subjects.iter().any(|s| s.id == subject) {
                return Err(ApiError::Rejected(format!("Invalid subject id {subject}")));
            }
        }
        if let Some(teacher) = teacher {
            if !self.teachers.iter().any(|t| t.id == teacher) {
                return Err(ApiError::Rejected(format!("Invalid teacher id {teacher}")));
            }
        }
        Ok(())
    }

    fn start_taken(
        &self,
        class: ClassId,
        weekday: Weekday,
        start: TimeOfDay,
        except: Option<SlotId>,
    ) -> bool {
        self.slots.iter().any(|s| {
            Some(s.id) != except
                && s.class_assigned == class
                && s.weekday == weekday
                && s.start_time == start
        })
    }

    fn sorted_slots(&self) -> Vec<TimetableSlot> {
        let mut slots = self.slots.clone();
        slots.sort_by_key(|s| (s.class_assigned, s.weekday, s.start_time));
        slots
    }
}

/// In-memory [`ResourceApi`] implementation
#[derive(Debug, Default)]
pub struct InMemoryApi {
    state: Mutex<State>,
}

impl InMemoryApi {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class section; returns self for chaining
    pub fn with_class(mut self, id: ClassId, name: &str, section: Option<&str>) -> Self {
        let state = self.state.get_mut();
        state.classes.push(ClassSection {
            id,
            name: name.to_string(),
            section: section.map(str::to_string),
        });
        state.next_id = state.next_id.max(id);
        self
    }

    pub fn with_subject(mut self, id: SubjectId, name: &str) -> Self {
        let state = self.state.get_mut();
        state.subjects.push(Subject {
            id,
            name: name.to_string(),
            code: None,
        });
        state.next_id = state.next_id.max(id);
        self
    }

    /// Add an approved teacher
    pub fn with_teacher(mut self, id: TeacherId, first_name: &str, last_name: &str) -> Self {
        let state = self.state.get_mut();
        state.teachers.push(Teacher {
            id,
            user: TeacherUser {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: None,
                status: Some("approved".to_string()),
            },
        });
        state.next_id = state.next_id.max(id);
        self
    }

    /// Add a teacher whose account is still pending approval
    pub fn with_pending_teacher(mut self, id: TeacherId, first_name: &str, last_name: &str) -> Self {
        let state = self.state.get_mut();
        state.teachers.push(Teacher {
            id,
            user: TeacherUser {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: None,
                status: Some("pending".to_string()),
            },
        });
        state.next_id = state.next_id.max(id);
        self
    }

    /// Small seeded school used by the offline CLI mode
    pub fn demo() -> Self {
        Self::new()
            .with_class(1, "10", Some("A"))
            .with_class(2, "10", Some("B"))
            .with_class(3, "9", None)
            .with_subject(11, "Mathematics")
            .with_subject(12, "Physics")
            .with_subject(13, "English")
            .with_teacher(21, "Nadia", "Islam")
            .with_teacher(22, "Rahim", "Uddin")
            .with_pending_teacher(23, "Tariq", "Hasan")
    }

    /// Add a slot as if it had been created earlier
    pub fn with_slot(mut self, input: NewSlotInput) -> Self {
        let state = self.state.get_mut();
        let slot = TimetableSlot {
            id: state.next_id(),
            class_assigned: input.class_assigned,
            weekday: input.weekday,
            start_time: input.start_time,
            end_time: input.end_time,
            subject: input.subject,
            teacher: input.teacher,
            class_name: state.class_name(input.class_assigned),
            subject_name: state.subject_name(input.subject),
            teacher_name: state.teacher_name(input.teacher),
        };
        state.slots.push(slot);
        self
    }

    /// [`InMemoryApi::demo`] plus a few scheduled periods
    pub fn demo_week() -> Self {
        let period = |class, weekday, start: (u16, u16), subject, teacher| {
            let start = TimeOfDay::from_hm(start.0, start.1);
            NewSlotInput {
                class_assigned: class,
                weekday,
                start_time: start,
                end_time: start.add_minutes(45),
                subject: Some(subject),
                teacher: Some(teacher),
            }
        };
        Self::demo()
            .with_slot(period(1, Weekday::Monday, (8, 0), 11, 21))
            .with_slot(period(1, Weekday::Monday, (8, 45), 12, 22))
            .with_slot(period(1, Weekday::Wednesday, (10, 15), 13, 22))
            .with_slot(period(2, Weekday::Tuesday, (9, 30), 11, 21))
            .with_slot(period(2, Weekday::Thursday, (14, 0), 12, 22))
    }

    /// Number of calls made to `op`
    pub async fn calls(&self, op: ApiOp) -> usize {
        self.state.lock().await.calls.get(&op).copied().unwrap_or(0)
    }

    /// Total number of mutating calls (create, patch, delete, bulk assign)
    pub async fn mutation_calls(&self) -> usize {
        let state = self.state.lock().await;
        [
            ApiOp::CreateSlot,
            ApiOp::PatchSlot,
            ApiOp::DeleteSlot,
            ApiOp::BulkAssign,
            ApiOp::DeleteAssignment,
        ]
        .iter()
        .map(|op| state.calls.get(op).copied().unwrap_or(0))
        .sum()
    }

    /// Make the next call to `op` fail with `error`
    pub async fn fail_next(&self, op: ApiOp, error: ApiError) {
        self.state
            .lock()
            .await
            .queued_failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Make every call to `op` fail with a network error
    pub async fn break_op(&self, op: ApiOp) {
        self.state.lock().await.broken.insert(op);
    }

    /// Server-side view of all slots
    pub async fn slots(&self) -> Vec<TimetableSlot> {
        self.state.lock().await.sorted_slots()
    }

    /// Server-side view of all assignments
    pub async fn assignments(&self) -> Vec<TeacherAssignment> {
        self.state.lock().await.assignments.clone()
    }
}

#[async_trait]
impl ResourceApi for InMemoryApi {
    async fn list_slots(&self) -> ApiResult<Vec<TimetableSlot>> {
        let mut state = self.state.lock().await;
        state.enter(ApiOp::ListSlots)?;
        Ok(state.sorted_slots())
    }

    async fn create_slot(&self, input: &NewSlotInput) -> ApiResult<TimetableSlot> {
        let mut state = self.state.lock().await;
        state.enter(ApiOp::CreateSlot)?;
        state.check_references(input.class_assigned, input.subject, input.teacher)?;
        if state.start_taken(input.class_assigned, input.weekday, input.start_time, None) {
            return Err(ApiError::Conflict(format!(
                "class {} already has a slot on {} at {}",
                input.class_assigned, input.weekday, input.start_time
            )));
        }

        let slot = TimetableSlot {
            id: state.next_id(),
            class_assigned: input.class_assigned,
            weekday: input.weekday,
            start_time: input.start_time,
            end_time: input.end_time,
            subject: input.subject,
            teacher: input.teacher,
            class_name: state.class_name(input.class_assigned),
            subject_name: state.subject_name(input.subject),
            teacher_name: state.teacher_name(input.teacher),
        };
        state.slots.push(slot.clone());
        Ok(slot)
    }

    async fn patch_slot(&self, id: SlotId, patch: &SlotPatch) -> ApiResult<Option<TimetableSlot>> {
        let mut state = self.state.lock().await;
        state.enter(ApiOp::PatchSlot)?;

        let mut updated = state
            .slots
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("slot {id}")))?;
        patch.apply_to(&mut updated);

        if state.start_taken(updated.class_assigned, updated.weekday, updated.start_time, Some(id)) {
            return Err(ApiError::Conflict(format!(
                "class {} already has a slot on {} at {}",
                updated.class_assigned, updated.weekday, updated.start_time
            )));
        }

        if let Some(slot) = state.slots.iter_mut().find(|s| s.id == id) {
            *slot = updated.clone();
        }
        Ok(Some(updated))
    }

    async fn delete_slot(&self, id: SlotId) -> ApiResult<()> {
        let mut state = self.state.lock().await;
        state.enter(ApiOp::DeleteSlot)?;
        let before = state.slots.len();
        state.slots.retain(|s| s.id != id);
        if state.slots.len() == before {
            return Err(ApiError::NotFound(format!("slot {id}")));
        }
        Ok(())
    }

    async fn list_class_sections(&self) -> ApiResult<Vec<ClassSection>> {
        let mut state = self.state.lock().await;
        state.enter(ApiOp::ListClassSections)?;
        Ok(state.classes.clone())
    }

    async fn list_subjects(&self) -> ApiResult<Vec<Subject>> {
        let mut state = self.state.lock().await;
        state.enter(ApiOp::ListSubjects)?;
        Ok(state.subjects.clone())
    }

    async fn list_teachers(&self) -> ApiResult<Vec<Teacher>> {
        let mut state = self.state.lock().await;
        state.enter(ApiOp::ListTeachers)?;
        Ok(state.teachers.clone())
    }

    async fn list_assignments(&self) -> ApiResult<Vec<TeacherAssignment>> {
        let mut state = self.state.lock().await;
        state.enter(ApiOp::ListAssignments)?;
        let mut assignments = state.assignments.clone();
        assignments.sort_by_key(|a| (a.teacher, a.class_assigned, a.subject));
        Ok(assignments)
    }

    async fn bulk_assign(
        &self,
        teacher_id: TeacherId,
        pairs: &[AssignmentPair],
    ) -> ApiResult<BulkAssignOutcome> {
        let mut state = self.state.lock().await;
        state.enter(ApiOp::BulkAssign)?;

        if pairs.is_empty() {
            return Err(ApiError::Rejected(
                "teacher_id and assignments are required".to_string(),
            ));
        }
        if !state.teachers.iter().any(|t| t.id == teacher_id) {
            return Err(ApiError::NotFound("Teacher not found".to_string()));
        }

        let mut outcome = BulkAssignOutcome::default();
        for pair in pairs {
            if let Err(e) = state.check_references(pair.class_id, Some(pair.subject_id), None) {
                outcome
                    .errors
                    .push(format!("Error creating assignment {pair:?}: {e}"));
                continue;
            }
            let exists = state
                .assignments
                .iter()
                .any(|a| a.key() == (teacher_id, pair.subject_id, pair.class_id));
            if exists {
                continue;
            }

            let assignment = TeacherAssignment {
                id: state.next_id(),
                teacher: teacher_id,
                subject: pair.subject_id,
                class_assigned: pair.class_id,
                teacher_name: state.teacher_name(Some(teacher_id)),
                subject_name: state.subject_name(Some(pair.subject_id)),
                class_name: state.class_name(pair.class_id),
            };
            state.assignments.push(assignment);
            outcome.created += 1;
        }
        outcome.message = Some(format!("{} assignments created", outcome.created));
        Ok(outcome)
    }

    async fn delete_assignment(&self, id: AssignmentId) -> ApiResult<()> {
        let mut state = self.state.lock().await;
        state.enter(ApiOp::DeleteAssignment)?;
        let before = state.assignments.len();
        state.assignments.retain(|a| a.id != id);
        if state.assignments.len() == before {
            return Err(ApiError::NotFound(format!("assignment {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn input(class: ClassId, weekday: Weekday, start: &str, end: &str) -> NewSlotInput {
        NewSlotInput {
            class_assigned: class,
            weekday,
            start_time: t(start),
            end_time: t(end),
            subject: None,
            teacher: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_labels() {
        let api = InMemoryApi::demo();
        let mut req = input(1, Weekday::Monday, "09:00", "09:45");
        req.subject = Some(11);
        let slot = api.create_slot(&req).await.unwrap();

        assert!(slot.id > 23);
        assert_eq!(slot.class_name.as_deref(), Some("10 - A"));
        assert_eq!(slot.subject_name.as_deref(), Some("Mathematics"));
        assert_eq!(api.calls(ApiOp::CreateSlot).await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_start_is_conflict() {
        let api = InMemoryApi::demo();
        api.create_slot(&input(1, Weekday::Monday, "09:00", "09:45"))
            .await
            .unwrap();
        let err = api
            .create_slot(&input(1, Weekday::Monday, "09:00", "10:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        // Another class may use the same start
        assert!(api
            .create_slot(&input(2, Weekday::Monday, "09:00", "09:45"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unknown_class_is_rejected() {
        let api = InMemoryApi::demo();
        let err = api
            .create_slot(&input(99, Weekday::Monday, "09:00", "09:45"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let api = InMemoryApi::demo();
        api.fail_next(ApiOp::ListSubjects, ApiError::Network("down".into()))
            .await;
        assert!(api.list_subjects().await.is_err());
        assert_eq!(api.list_subjects().await.unwrap().len(), 3);
        assert_eq!(api.calls(ApiOp::ListSubjects).await, 2);
    }

    #[tokio::test]
    async fn test_bulk_assign_get_or_create() {
        let api = InMemoryApi::demo();
        let pair = AssignmentPair {
            subject_id: 11,
            class_id: 1,
        };
        let first = api.bulk_assign(21, &[pair]).await.unwrap();
        let second = api.bulk_assign(21, &[pair, pair]).await.unwrap();

        assert_eq!(first.created, 1);
        assert_eq!(second.created, 0);
        assert_eq!(api.assignments().await.len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_assign_reports_bad_pairs() {
        let api = InMemoryApi::demo();
        let outcome = api
            .bulk_assign(
                21,
                &[
                    AssignmentPair {
                        subject_id: 11,
                        class_id: 1,
                    },
                    AssignmentPair {
                        subject_id: 99,
                        class_id: 1,
                    },
                ],
            )
            .await
            .unwrap();
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_slot_is_not_found() {
        let api = InMemoryApi::demo();
        assert!(matches!(
            api.delete_slot(404).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
