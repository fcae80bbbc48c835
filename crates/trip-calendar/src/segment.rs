//! Segment materialization: one record per span per visible day.
//!
//! A segment's position is judged against the whole stay, not the clipped
//! window, so a stay that began last month shows its first visible day as
//! `Middle`. Row-boundary flags are independent of that and come from the
//! shared week convention in [`crate::week`].

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::grid::CalendarDay;
use crate::slots::SlotAssignment;
use crate::span::AssignmentSpan;
use crate::week::{days_from_week_start, is_row_end, is_row_start};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentPosition {
    /// The stay is a single night.
    Single,
    Start,
    Middle,
    End,
}

impl SegmentPosition {
    /// Position of `date` within a stay covering `first..=last`.
    pub fn classify(date: NaiveDate, first: NaiveDate, last: NaiveDate) -> Self {
        match (date == first, date == last) {
            (true, true) => SegmentPosition::Single,
            (true, false) => SegmentPosition::Start,
            (false, true) => SegmentPosition::End,
            (false, false) => SegmentPosition::Middle,
        }
    }

    fn opens(self) -> bool {
        matches!(self, SegmentPosition::Single | SegmentPosition::Start)
    }

    fn closes(self) -> bool {
        matches!(self, SegmentPosition::Single | SegmentPosition::End)
    }
}

/// How a segment is drawn.
///
/// A segment that starts a new week row gets a rounded left edge even in the
/// middle of a stay, because it begins a new visual line. The label repeats
/// on every row start except a stay's final sliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStyle {
    pub rounded_left: bool,
    pub rounded_right: bool,
    pub show_label: bool,
}

impl SegmentStyle {
    pub fn new(position: SegmentPosition, is_row_start: bool, is_row_end: bool) -> Self {
        Self {
            rounded_left: position.opens() || is_row_start,
            rounded_right: position.closes() || is_row_end,
            show_label: position.opens() || (is_row_start && position != SegmentPosition::End),
        }
    }
}

/// One day's fragment of a span.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySegment {
    #[serde(rename = "spanId", serialize_with = "serialize_span_id")]
    pub span: Arc<AssignmentSpan>,
    pub date: NaiveDate,
    pub position: SegmentPosition,
    pub slot: usize,
    /// Column within the week row (0 = first column).
    pub day_of_week: u8,
    pub is_row_start: bool,
    pub is_row_end: bool,
    pub style: SegmentStyle,
}

impl DaySegment {
    pub fn span_id(&self) -> &str {
        &self.span.id
    }
}

fn serialize_span_id<S: Serializer>(span: &Arc<AssignmentSpan>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&span.id)
}

/// Expand spans into per-day segments over the visible days.
///
/// Output is ordered by day, then by slot. Spans without a slot are skipped.
pub fn materialize(
    spans: &[Arc<AssignmentSpan>],
    slots: &SlotAssignment,
    visible_days: &[CalendarDay],
) -> Vec<DaySegment> {
    let visible: HashSet<NaiveDate> = visible_days.iter().map(|day| day.date).collect();

    let mut segments = Vec::new();
    for span in spans {
        let Some(slot) = slots.get(&span.id) else {
            debug!(span_id = %span.id, "span has no slot, not materialized");
            continue;
        };
        for date in span.days().filter(|date| visible.contains(date)) {
            let position = SegmentPosition::classify(date, span.start_date, span.last_night);
            let row_start = is_row_start(date);
            let row_end = is_row_end(date);
            segments.push(DaySegment {
                span: Arc::clone(span),
                date,
                position,
                slot,
                day_of_week: days_from_week_start(date.weekday()) as u8,
                is_row_start: row_start,
                is_row_end: row_end,
                style: SegmentStyle::new(position, row_start, row_end),
            });
        }
    }

    segments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.slot.cmp(&b.slot)));
    segments
}
