use anyhow::{Context, Result};
use std::sync::Arc;

use classgrid::assignments::AssignmentResolver;
use classgrid::models::{ClassId, SlotId, SubjectId, TeacherId};
use classgrid::notify::AutoConfirm;
use classgrid::timetable::grid::{all_cells, time_bins};
use classgrid::timetable::interaction::week_view;
use classgrid::timetable::{Outcome, SchedulingEngine, SlotForm, TimeOfDay, Weekday};

use super::Session;

async fn open_engine(session: &Session, assume_yes: bool) -> Result<SchedulingEngine> {
    let mut engine = SchedulingEngine::new(
        session.api.clone(),
        session.notifier.clone(),
        session.confirm(assume_yes),
    );
    let report = engine.load().await?;
    for degraded in &report.degraded {
        println!("! {} unavailable: {}", degraded.list, degraded.error);
    }
    Ok(engine)
}

fn parse_day(day: &str) -> Result<Weekday> {
    day.parse::<Weekday>()
        .with_context(|| format!("Invalid --day '{day}'"))
}

fn parse_time(flag: &str, value: &str) -> Result<TimeOfDay> {
    TimeOfDay::parse(value).with_context(|| format!("Invalid {flag} '{value}'"))
}

pub async fn show(session: &Session, class: Option<ClassId>) -> Result<()> {
    let engine = open_engine(session, false).await?;

    match class {
        Some(id) => println!("Weekly Timetable: {}", engine.store().class_label(id)),
        None => println!("Weekly Timetable: all classes"),
    }
    println!("========================");
    print!("{}", week_view(&engine, class));
    Ok(())
}

pub struct AddParams {
    pub class: ClassId,
    pub day: String,
    pub start: String,
    pub end: Option<String>,
    pub subject: Option<SubjectId>,
    pub teacher: Option<TeacherId>,
}

pub async fn add(session: &Session, params: AddParams) -> Result<()> {
    let mut engine = open_engine(session, true).await?;

    let weekday = parse_day(&params.day)?;
    let start = parse_time("--start", &params.start)?;
    let end = match &params.end {
        Some(end) => parse_time("--end", end)?,
        None => start.add_minutes(45),
    };

    let mut form = SlotForm::new(params.class, weekday).with_times(start, end);
    form.subject = params.subject;
    form.teacher = params.teacher;

    // Soft check against standing assignments
    if form.subject.is_some() && form.teacher.is_some() {
        let mut resolver = AssignmentResolver::new(
            session.api.clone(),
            session.notifier.clone(),
            Arc::new(AutoConfirm(false)),
        );
        match resolver.load().await {
            Ok(()) => engine.set_assignment_index(resolver.index()),
            Err(e) => tracing::warn!(error = %e, "Skipping assignment check"),
        }
    }

    let slot = engine.create(&form).await?;
    println!(
        "  #{} {} {} ({})",
        slot.id,
        slot.weekday,
        slot.span(),
        engine.store().slot_class_label(&slot)
    );
    Ok(())
}

pub async fn delete(session: &Session, id: SlotId, assume_yes: bool) -> Result<()> {
    let mut engine = open_engine(session, assume_yes).await?;
    if engine.delete(id).await? == Outcome::Cancelled {
        println!("Cancelled");
    }
    Ok(())
}

pub async fn move_slot(
    session: &Session,
    id: SlotId,
    day: String,
    at: Option<String>,
) -> Result<()> {
    let mut engine = open_engine(session, true).await?;
    let weekday = parse_day(&day)?;

    let slot = match at {
        Some(at) => {
            let bin = parse_time("--at", &at)?;
            engine.move_to_bin(id, weekday, bin).await?
        }
        None => engine.move_to_day(id, weekday).await?,
    };
    println!("  #{} {} {}", slot.id, slot.weekday, slot.span());
    Ok(())
}

/// Print the drop targets of the week grid
pub fn cells(keys: bool) -> Result<()> {
    if keys {
        for cell in all_cells() {
            println!("{cell}");
        }
        return Ok(());
    }

    let bins: Vec<String> = time_bins().iter().map(ToString::to_string).collect();
    for day in Weekday::ALL {
        println!("{} ({}): {}", day.short_label(), day.index(), bins.join(" "));
    }
    Ok(())
}
