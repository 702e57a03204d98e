// Core data structures for the timetable scheduler

use serde::{Deserialize, Serialize};

use crate::timetable::clock::{self, TimeOfDay};
use crate::timetable::grid::Weekday;

pub type SlotId = u64;
pub type ClassId = u64;
pub type SubjectId = u64;
pub type TeacherId = u64;
pub type AssignmentId = u64;

// ============================================================================
// Reference Entities (owned by other portal pages)
// ============================================================================

/// Class/section, e.g. "10" section "A"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSection {
    pub id: ClassId,
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
}

impl ClassSection {
    /// Display label: `"{name} - {section}"`, or just the name
    pub fn label(&self) -> String {
        match self.section.as_deref().filter(|s| !s.is_empty()) {
            Some(section) => format!("{} - {}", self.name, section),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Account details nested inside a teacher record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherUser {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Account approval status (pending, approved, rejected)
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    #[serde(default)]
    pub user: TeacherUser,
}

impl Teacher {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.user.first_name, self.user.last_name)
            .trim()
            .to_string()
    }

    /// Only approved teachers may receive new assignments
    pub fn is_approved(&self) -> bool {
        self.user.status.as_deref() == Some("approved")
    }
}

// ============================================================================
// Timetable Slot
// ============================================================================

/// One scheduled class period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableSlot {
    pub id: SlotId,
    pub class_assigned: ClassId,
    pub weekday: Weekday,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default)]
    pub subject: Option<SubjectId>,
    #[serde(default)]
    pub teacher: Option<TeacherId>,

    // Labels rendered by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_name: Option<String>,
}

impl TimetableSlot {
    /// Length in minutes, wrapping past midnight; 0 for an empty window
    pub fn duration_minutes(&self) -> i32 {
        clock::duration_minutes(self.start_time, self.end_time)
    }

    /// Display string like `09:00-09:45`
    pub fn span(&self) -> String {
        format!("{}-{}", self.start_time, self.end_time)
    }
}

/// Payload for creating a slot; the server assigns the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSlotInput {
    pub class_assigned: ClassId,
    pub weekday: Weekday,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub subject: Option<SubjectId>,
    pub teacher: Option<TeacherId>,
}

/// Partial update for a slot's placement. Absent fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<TimeOfDay>,
}

impl SlotPatch {
    /// Change only the weekday
    pub fn weekday(weekday: Weekday) -> Self {
        Self {
            weekday: Some(weekday),
            ..Default::default()
        }
    }

    /// Change weekday and both times together
    pub fn placement(weekday: Weekday, start_time: TimeOfDay, end_time: TimeOfDay) -> Self {
        Self {
            weekday: Some(weekday),
            start_time: Some(start_time),
            end_time: Some(end_time),
        }
    }

    /// Copy the present fields onto `slot`
    pub fn apply_to(&self, slot: &mut TimetableSlot) {
        if let Some(weekday) = self.weekday {
            slot.weekday = weekday;
        }
        if let Some(start) = self.start_time {
            slot.start_time = start;
        }
        if let Some(end) = self.end_time {
            slot.end_time = end;
        }
    }
}

// ============================================================================
// Teacher Assignments
// ============================================================================

/// Standing record that a teacher teaches a subject to a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherAssignment {
    pub id: AssignmentId,
    pub teacher: TeacherId,
    pub subject: SubjectId,
    pub class_assigned: ClassId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl TeacherAssignment {
    /// The uniqueness triple
    pub fn key(&self) -> (TeacherId, SubjectId, ClassId) {
        (self.teacher, self.subject, self.class_assigned)
    }
}

/// One (subject, class) pair inside a bulk-assign request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentPair {
    pub subject_id: SubjectId,
    pub class_id: ClassId,
}

/// Wire body for the bulk-assign endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAssignRequest {
    pub teacher_id: TeacherId,
    pub assignments: Vec<AssignmentPair>,
}

/// Result of a bulk-assign call as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkAssignOutcome {
    #[serde(default)]
    pub message: Option<String>,
    /// Number of new assignments; pairs that already existed are not counted
    #[serde(default)]
    pub created: usize,
    /// Per-pair problems the backend skipped
    #[serde(default)]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    #[test]
    fn test_class_label() {
        let with_section = ClassSection {
            id: 1,
            name: "10".to_string(),
            section: Some("A".to_string()),
        };
        let without = ClassSection {
            id: 2,
            name: "Nursery".to_string(),
            section: Some(String::new()),
        };
        assert_eq!(with_section.label(), "10 - A");
        assert_eq!(without.label(), "Nursery");
    }

    #[test]
    fn test_slot_decodes_backend_payload() {
        let json = r#"{
            "id": 7, "class_assigned": 3, "class_name": "10 - A",
            "weekday": 2, "start_time": "14:00:00", "end_time": "14:45:00",
            "subject": null, "subject_name": null, "teacher": 5, "teacher_name": "Rahim Uddin"
        }"#;
        let slot: TimetableSlot = serde_json::from_str(json).unwrap();
        assert_eq!(slot.weekday, Weekday::Wednesday);
        assert_eq!(slot.start_time, t("14:00"));
        assert_eq!(slot.duration_minutes(), 45);
        assert_eq!(slot.subject, None);
        assert_eq!(slot.teacher_name.as_deref(), Some("Rahim Uddin"));
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let json = serde_json::to_value(SlotPatch::weekday(Weekday::Friday)).unwrap();
        assert_eq!(json, serde_json::json!({ "weekday": 4 }));

        let json =
            serde_json::to_value(SlotPatch::placement(Weekday::Monday, t("08:00"), t("08:45")))
                .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "weekday": 0, "start_time": "08:00", "end_time": "08:45" })
        );
    }

    #[test]
    fn test_new_slot_sends_explicit_nulls() {
        let input = NewSlotInput {
            class_assigned: 1,
            weekday: Weekday::Monday,
            start_time: t("09:00"),
            end_time: t("09:45"),
            subject: None,
            teacher: None,
        };
        let json = serde_json::to_value(input).unwrap();
        assert!(json["subject"].is_null());
        assert!(json["teacher"].is_null());
    }

    #[test]
    fn test_teacher_approval_and_name() {
        let teacher: Teacher = serde_json::from_str(
            r#"{"id": 1, "user": {"first_name": "Nadia", "last_name": "Islam", "status": "approved"}}"#,
        )
        .unwrap();
        assert!(teacher.is_approved());
        assert_eq!(teacher.display_name(), "Nadia Islam");

        let pending: Teacher = serde_json::from_str(r#"{"id": 2, "user": {"status": "pending"}}"#).unwrap();
        assert!(!pending.is_approved());
        assert_eq!(pending.display_name(), "");
    }

    #[test]
    fn test_bulk_outcome_tolerates_missing_fields() {
        let outcome: BulkAssignOutcome = serde_json::from_str(r#"{"created": 2}"#).unwrap();
        assert_eq!(outcome.created, 2);
        assert!(outcome.errors.is_empty());
    }
}
