use anyhow::{bail, Result};

use classgrid::assignments::{AssignmentResolver, AssignmentRow};
use classgrid::models::{AssignmentId, TeacherId};
use classgrid::timetable::Outcome;

use super::Session;

async fn open_resolver(session: &Session, assume_yes: bool) -> Result<AssignmentResolver> {
    let mut resolver = AssignmentResolver::new(
        session.api.clone(),
        session.notifier.clone(),
        session.confirm(assume_yes),
    );
    resolver.load().await?;
    Ok(resolver)
}

/// Parse `SUBJECT:CLASS`; an empty or non-numeric side stays unset
fn parse_pair(raw: &str) -> Result<AssignmentRow> {
    let Some((subject, class)) = raw.split_once(':') else {
        bail!("Invalid --pair '{raw}', expected SUBJECT_ID:CLASS_ID");
    };
    Ok(AssignmentRow {
        subject_id: subject.trim().parse().ok(),
        class_id: class.trim().parse().ok(),
    })
}

pub async fn list_assignments(session: &Session, teacher: Option<TeacherId>) -> Result<()> {
    let resolver = open_resolver(session, false).await?;

    println!("Teacher Assignments");
    println!("========================");
    let rows = match teacher {
        Some(id) => resolver.for_teacher(id),
        None => resolver.assignments().iter().collect(),
    };
    if rows.is_empty() {
        println!("(none)");
    }
    for a in rows {
        println!(
            "  #{:<5} {:<20} {:<16} {}",
            a.id,
            a.teacher_name.as_deref().unwrap_or("-"),
            a.subject_name.as_deref().unwrap_or("-"),
            a.class_name.as_deref().unwrap_or("-"),
        );
    }

    println!("\nApproved teachers:");
    for t in resolver.approved_teachers() {
        println!("  {:>5}  {}", t.id, t.display_name());
    }
    Ok(())
}

pub async fn assign(session: &Session, teacher: Option<TeacherId>, pairs: &[String]) -> Result<()> {
    let rows = pairs
        .iter()
        .map(|p| parse_pair(p))
        .collect::<Result<Vec<_>>>()?;

    let mut resolver = open_resolver(session, true).await?;
    let outcome = resolver.bulk_assign(teacher, &rows).await?;
    for error in &outcome.errors {
        println!("  ! {error}");
    }
    Ok(())
}

pub async fn unassign(session: &Session, id: AssignmentId, assume_yes: bool) -> Result<()> {
    let mut resolver = open_resolver(session, assume_yes).await?;
    if resolver.remove(id).await? == Outcome::Cancelled {
        println!("Cancelled");
    }
    Ok(())
}
