//! Drag/drop interaction over the week grid
//!
//! Pointer activity arrives as discrete [`GridEvent`]s. [`GridInteraction`]
//! remembers which slot is being dragged and which bin is hovered, and turns
//! drops into engine commands:
//!
//! | Event | Engine call |
//! |-------|-------------|
//! | `DropOnBin(cell)` | [`SchedulingEngine::move_to_bin`] (weekday + start + end) |
//! | `DropOnDay(day)` | [`SchedulingEngine::move_to_day`] (weekday only) |
//!
//! A drop consumes the dragged id. A second drop for the same drag, such as
//! the day column receiving a drop that already landed on one of its bins,
//! finds nothing to move and is ignored.

use std::fmt;

use crate::error::Result;
use crate::models::{ClassId, SlotId, TimetableSlot};

use super::clock::TimeOfDay;
use super::engine::SchedulingEngine;
use super::grid::{self, CellKey, Weekday};
use super::store::SlotStore;

/// Pointer events emitted by the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    DragStart(SlotId),
    DragOverBin(CellKey),
    DragLeaveBin,
    DropOnBin(CellKey),
    DropOnDay(Weekday),
    DragEnd,
}

/// Transient drag state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridInteraction {
    dragging: Option<SlotId>,
    hover: Option<CellKey>,
}

impl GridInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragging(&self) -> Option<SlotId> {
        self.dragging
    }

    pub fn hover(&self) -> Option<CellKey> {
        self.hover
    }

    /// Apply one event. Drops return the moved slot; every other event, and
    /// a drop with nothing dragged, returns `Ok(None)`.
    pub async fn handle(
        &mut self,
        engine: &mut SchedulingEngine,
        event: GridEvent,
    ) -> Result<Option<TimetableSlot>> {
        match event {
            GridEvent::DragStart(id) => {
                tracing::trace!(slot_id = id, "drag start");
                self.dragging = Some(id);
                Ok(None)
            }
            GridEvent::DragOverBin(cell) => {
                self.hover = Some(cell);
                Ok(None)
            }
            GridEvent::DragLeaveBin => {
                self.hover = None;
                Ok(None)
            }
            GridEvent::DragEnd => {
                self.dragging = None;
                self.hover = None;
                Ok(None)
            }
            GridEvent::DropOnBin(cell) => {
                self.hover = None;
                let Some(id) = self.dragging.take() else {
                    tracing::debug!(cell = %cell, "Bin drop with nothing dragged");
                    return Ok(None);
                };
                engine.move_to_cell(id, cell).await.map(Some)
            }
            GridEvent::DropOnDay(weekday) => {
                self.hover = None;
                let Some(id) = self.dragging.take() else {
                    tracing::debug!(weekday = %weekday, "Day drop with nothing dragged");
                    return Ok(None);
                };
                engine.move_to_day(id, weekday).await.map(Some)
            }
        }
    }

    /// Render model for the current engine state
    pub fn week_view(&self, engine: &SchedulingEngine, class: Option<ClassId>) -> WeekView {
        build_view(engine.store(), class, self)
    }
}

/// Week view without any drag in progress
pub fn week_view(engine: &SchedulingEngine, class: Option<ClassId>) -> WeekView {
    GridInteraction::default().week_view(engine, class)
}

// ============================================================================
// View Model
// ============================================================================

/// One drop target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinCell {
    pub key: CellKey,
    pub start: TimeOfDay,
    pub hovered: bool,
}

/// One scheduled period as drawn in a day column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCard {
    pub id: SlotId,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    /// Bin the start time falls in, if within teaching hours
    pub bin: Option<TimeOfDay>,
    pub class_label: String,
    pub subject_label: String,
    pub teacher_label: String,
    pub dragging: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayColumn {
    pub weekday: Weekday,
    pub bins: Vec<BinCell>,
    pub slots: Vec<SlotCard>,
}

/// Seven day columns, Monday first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekView {
    pub class_filter: Option<ClassId>,
    pub days: Vec<DayColumn>,
}

impl WeekView {
    pub fn day(&self, weekday: Weekday) -> Option<&DayColumn> {
        self.days.iter().find(|d| d.weekday == weekday)
    }

    pub fn slot_count(&self) -> usize {
        self.days.iter().map(|d| d.slots.len()).sum()
    }
}

fn build_view(store: &SlotStore, class: Option<ClassId>, state: &GridInteraction) -> WeekView {
    let days = Weekday::ALL
        .into_iter()
        .map(|weekday| DayColumn {
            weekday,
            bins: grid::time_bins()
                .iter()
                .filter_map(|&start| CellKey::new(weekday, start).ok())
                .map(|key| BinCell {
                    key,
                    start: key.bin(),
                    hovered: state.hover == Some(key),
                })
                .collect(),
            slots: store
                .slots_for_day(weekday, class)
                .into_iter()
                .map(|slot| SlotCard {
                    id: slot.id,
                    start: slot.start_time,
                    end: slot.end_time,
                    bin: grid::bin_containing(slot.start_time),
                    class_label: store.slot_class_label(slot),
                    subject_label: store.slot_subject_label(slot),
                    teacher_label: store.slot_teacher_label(slot),
                    dragging: state.dragging == Some(slot.id),
                })
                .collect(),
        })
        .collect();

    WeekView {
        class_filter: class,
        days,
    }
}

impl fmt::Display for WeekView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, day) in self.days.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", day.weekday)?;

            let bins: Vec<String> = day
                .bins
                .iter()
                .map(|b| {
                    if b.hovered {
                        format!("[{}]", b.start)
                    } else {
                        b.start.to_string()
                    }
                })
                .collect();
            writeln!(f, "  bins: {}", bins.join(" "))?;

            if day.slots.is_empty() {
                writeln!(f, "  (no periods)")?;
            }
            for card in &day.slots {
                let marker = if card.dragging { '>' } else { ' ' };
                writeln!(
                    f,
                    " {marker}#{:<5} {}-{}  {:<14} {:<20} {}",
                    card.id,
                    card.start,
                    card.end,
                    card.class_label,
                    card.subject_label,
                    card.teacher_label
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::{ApiOp, InMemoryApi};
    use crate::api::ApiError;
    use crate::notify::{AutoConfirm, NotificationLog};
    use crate::timetable::engine::SlotForm;
    use std::sync::Arc;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    async fn setup() -> (Arc<InMemoryApi>, SchedulingEngine, SlotId) {
        let api = Arc::new(InMemoryApi::demo());
        let mut engine = SchedulingEngine::new(
            api.clone(),
            Arc::new(NotificationLog::new()),
            Arc::new(AutoConfirm(true)),
        );
        engine.load().await.unwrap();
        let slot = engine
            .create(&SlotForm::new(1, Weekday::Monday).with_subject(11))
            .await
            .unwrap();
        (api, engine, slot.id)
    }

    #[tokio::test]
    async fn test_drop_without_drag_is_ignored() {
        let (api, mut engine, _) = setup().await;
        let mut ui = GridInteraction::new();

        let cell = CellKey::new(Weekday::Friday, t("08:00")).unwrap();
        assert_eq!(ui.handle(&mut engine, GridEvent::DropOnBin(cell)).await.unwrap(), None);
        assert_eq!(ui.handle(&mut engine, GridEvent::DropOnDay(Weekday::Friday)).await.unwrap(), None);
        assert_eq!(api.calls(ApiOp::PatchSlot).await, 0);
    }

    #[tokio::test]
    async fn test_bubbled_day_drop_after_bin_drop_is_ignored() {
        let (api, mut engine, id) = setup().await;
        let mut ui = GridInteraction::new();
        let cell = CellKey::new(Weekday::Wednesday, t("14:00")).unwrap();

        ui.handle(&mut engine, GridEvent::DragStart(id)).await.unwrap();
        ui.handle(&mut engine, GridEvent::DragOverBin(cell)).await.unwrap();
        assert_eq!(ui.hover(), Some(cell));

        let moved = ui
            .handle(&mut engine, GridEvent::DropOnBin(cell))
            .await
            .unwrap();
        assert!(moved.is_some());
        assert_eq!(ui.hover(), None);

        let second = ui
            .handle(&mut engine, GridEvent::DropOnDay(Weekday::Wednesday))
            .await
            .unwrap();
        assert_eq!(second, None);
        assert_eq!(api.calls(ApiOp::PatchSlot).await, 1);
    }

    #[tokio::test]
    async fn test_failed_drop_clears_hover() {
        let (api, mut engine, id) = setup().await;
        let before = engine.slot(id).cloned();
        let mut ui = GridInteraction::new();
        let cell = CellKey::new(Weekday::Friday, t("08:00")).unwrap();
        api.fail_next(ApiOp::PatchSlot, ApiError::Network("reset".into()))
            .await;

        ui.handle(&mut engine, GridEvent::DragStart(id)).await.unwrap();
        ui.handle(&mut engine, GridEvent::DragOverBin(cell)).await.unwrap();
        assert!(ui.handle(&mut engine, GridEvent::DropOnBin(cell)).await.is_err());
        ui.handle(&mut engine, GridEvent::DragEnd).await.unwrap();

        assert_eq!(ui.dragging(), None);
        assert_eq!(ui.hover(), None);
        assert_eq!(engine.slot(id).cloned(), before);
        let view = ui.week_view(&engine, None);
        assert!(view.days.iter().flat_map(|d| &d.bins).all(|b| !b.hovered));
    }

    #[tokio::test]
    async fn test_drag_end_clears_hover() {
        let (_api, mut engine, id) = setup().await;
        let mut ui = GridInteraction::new();
        let cell = CellKey::new(Weekday::Tuesday, t("10:15")).unwrap();

        ui.handle(&mut engine, GridEvent::DragStart(id)).await.unwrap();
        ui.handle(&mut engine, GridEvent::DragOverBin(cell)).await.unwrap();
        ui.handle(&mut engine, GridEvent::DragEnd).await.unwrap();

        assert_eq!(ui, GridInteraction::new());
    }

    #[tokio::test]
    async fn test_week_view_marks_drag_and_hover() {
        let (_api, mut engine, id) = setup().await;
        let mut ui = GridInteraction::new();
        let cell = CellKey::new(Weekday::Tuesday, t("08:45")).unwrap();
        ui.handle(&mut engine, GridEvent::DragStart(id)).await.unwrap();
        ui.handle(&mut engine, GridEvent::DragOverBin(cell)).await.unwrap();

        let view = ui.week_view(&engine, None);
        assert_eq!(view.days.len(), 7);
        assert!(view.days.iter().all(|d| d.bins.len() == 12));

        let monday = view.day(Weekday::Monday).unwrap();
        assert_eq!(monday.slots.len(), 1);
        assert!(monday.slots[0].dragging);
        assert_eq!(monday.slots[0].subject_label, "Mathematics");
        assert_eq!(monday.slots[0].bin, Some(t("08:45")));

        let tuesday = view.day(Weekday::Tuesday).unwrap();
        assert_eq!(tuesday.bins.iter().filter(|b| b.hovered).count(), 1);

        let text = view.to_string();
        assert!(text.contains("[08:45]"));
        assert!(text.contains("09:00-09:45"));
    }

    #[tokio::test]
    async fn test_week_view_respects_class_filter() {
        let (_api, engine, _) = setup().await;
        assert_eq!(week_view(&engine, Some(1)).slot_count(), 1);
        assert_eq!(week_view(&engine, Some(2)).slot_count(), 0);
    }
}
