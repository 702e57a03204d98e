//! Teacher assignment resolver against the in-memory backend

mod common;

use std::sync::Arc;

use classgrid::api::memory::{ApiOp, InMemoryApi};
use classgrid::api::ApiError;
use classgrid::assignments::AssignmentRow;
use classgrid::error::{Error, Operation, ValidationError};
use classgrid::notify::{NotificationLevel, NotificationLog};
use classgrid::timetable::Outcome;

use common::resolver;

fn setup() -> (Arc<InMemoryApi>, Arc<NotificationLog>) {
    (
        Arc::new(InMemoryApi::demo()),
        Arc::new(NotificationLog::new()),
    )
}

#[tokio::test]
async fn test_empty_rows_send_nothing() {
    let (api, log) = setup();
    let mut resolver = resolver(&api, &log, true);

    let err = resolver.bulk_assign(Some(21), &[]).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::NoValidAssignments)
    ));
    assert_eq!(api.calls(ApiOp::BulkAssign).await, 0);
    assert_eq!(
        log.messages(),
        vec!["Please add at least one valid assignment"]
    );
}

#[tokio::test]
async fn test_incomplete_rows_are_dropped() {
    let (api, log) = setup();
    let mut resolver = resolver(&api, &log, true);

    let rows = [
        AssignmentRow {
            subject_id: Some(11),
            class_id: None,
        },
        AssignmentRow {
            subject_id: None,
            class_id: Some(1),
        },
    ];
    assert!(resolver.bulk_assign(Some(21), &rows).await.is_err());
    assert_eq!(api.calls(ApiOp::BulkAssign).await, 0);

    let rows = [rows[0], AssignmentRow::new(12, 2)];
    let outcome = resolver.bulk_assign(Some(21), &rows).await.unwrap();
    assert_eq!(outcome.created, 1);
}

#[tokio::test]
async fn test_duplicate_pairs_create_one_assignment() {
    let (api, log) = setup();
    let mut resolver = resolver(&api, &log, true);

    let rows = [
        AssignmentRow::new(11, 1),
        AssignmentRow::new(11, 1),
        AssignmentRow::new(12, 1),
    ];
    let outcome = resolver.bulk_assign(Some(21), &rows).await.unwrap();

    assert_eq!(outcome.created, 2);
    assert_eq!(resolver.assignments().len(), 2);
    assert_eq!(log.messages(), vec!["2 assignment(s) created!"]);

    // Re-sending is get-or-create on the backend
    let again = resolver.bulk_assign(Some(21), &rows).await.unwrap();
    assert_eq!(again.created, 0);
    assert_eq!(api.assignments().await.len(), 2);
}

#[tokio::test]
async fn test_bulk_assign_reloads_list() {
    let (api, log) = setup();
    let mut resolver = resolver(&api, &log, true);
    resolver.load().await.unwrap();

    resolver
        .bulk_assign(Some(22), &[AssignmentRow::new(13, 2)])
        .await
        .unwrap();

    assert_eq!(api.calls(ApiOp::ListAssignments).await, 2);
    assert!(resolver.is_assigned(22, 13, 2));
    assert_eq!(
        resolver.assignments()[0].class_name.as_deref(),
        Some("10 - B")
    );
}

#[tokio::test]
async fn test_reload_failure_after_bulk_assign_warns() {
    let (api, log) = setup();
    let mut resolver = resolver(&api, &log, true);
    api.fail_next(ApiOp::ListAssignments, ApiError::Network("reset".into()))
        .await;

    let outcome = resolver
        .bulk_assign(Some(21), &[AssignmentRow::new(11, 1)])
        .await
        .unwrap();

    assert_eq!(outcome.created, 1);
    assert_eq!(api.assignments().await.len(), 1);
    assert!(resolver.assignments().is_empty());
    assert!(!resolver.is_assigned(21, 11, 1));

    let last = log.last().unwrap();
    assert_eq!(last.level, NotificationLevel::Warning);
    assert!(last.message.contains("could not be refreshed"));
}

#[tokio::test]
async fn test_bulk_assign_failure() {
    let (api, log) = setup();
    let mut resolver = resolver(&api, &log, true);
    api.fail_next(ApiOp::BulkAssign, ApiError::Rejected("nope".into()))
        .await;

    let err = resolver
        .bulk_assign(Some(21), &[AssignmentRow::new(11, 1)])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Mutation {
            op: Operation::BulkAssign,
            ..
        }
    ));
    assert_eq!(log.messages(), vec!["Failed to create assignments"]);
}

#[tokio::test]
async fn test_unknown_teacher_is_mutation_failure() {
    let (api, log) = setup();
    let mut resolver = resolver(&api, &log, true);

    let err = resolver
        .bulk_assign(Some(999), &[AssignmentRow::new(11, 1)])
        .await
        .unwrap_err();
    assert!(matches!(err.api_error(), Some(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_remove_with_and_without_confirmation() {
    let (api, log) = setup();
    let mut seeding = resolver(&api, &log, true);
    seeding
        .bulk_assign(Some(21), &[AssignmentRow::new(11, 1), AssignmentRow::new(12, 2)])
        .await
        .unwrap();

    let mut declining = resolver(&api, &log, false);
    declining.load().await.unwrap();
    let id = declining.assignments()[0].id;
    assert_eq!(declining.remove(id).await.unwrap(), Outcome::Cancelled);
    assert_eq!(api.calls(ApiOp::DeleteAssignment).await, 0);

    let mut accepting = resolver(&api, &log, true);
    accepting.load().await.unwrap();
    assert_eq!(accepting.remove(id).await.unwrap(), Outcome::Done);
    assert_eq!(accepting.assignments().len(), 1);
    assert_eq!(api.assignments().await.len(), 1);
    assert_eq!(log.last().unwrap().message, "Assignment removed");
}

#[tokio::test]
async fn test_engine_soft_check_uses_resolver_index() {
    let (api, log) = setup();
    let mut resolver = resolver(&api, &log, true);
    resolver
        .bulk_assign(Some(21), &[AssignmentRow::new(11, 1)])
        .await
        .unwrap();

    let mut engine = classgrid::timetable::SchedulingEngine::new(
        api.clone(),
        log.clone(),
        Arc::new(classgrid::notify::AutoConfirm(true)),
    );
    engine.set_assignment_index(resolver.index());

    // Mismatched teacher is only a warning
    let form = classgrid::timetable::SlotForm::new(1, classgrid::Weekday::Monday)
        .with_subject(11)
        .with_teacher(22);
    assert!(engine.create(&form).await.is_ok());
}
