//! Span extraction: room assignments → visible occupancy spans.
//!
//! An assignment occupies the nights `[start_date, end_date)`. The checkout
//! day is never occupied, so a same-day check-in/check-out has no nights and
//! produces no span at all.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::color::{contrast_text_color, valid_color_or, TextColor, DEFAULT_PERSON_COLOR};
use crate::grid::VisibleRange;
use crate::model::{parse_iso_date, Assignment, Person, Room};

/// Placeholder used when a person or room reference does not resolve.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Fallback label and color for spans with dangling references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanDefaults {
    pub unknown_label: String,
    pub default_color: String,
}

impl Default for SpanDefaults {
    fn default() -> Self {
        Self {
            unknown_label: UNKNOWN_LABEL.to_string(),
            default_color: DEFAULT_PERSON_COLOR.to_string(),
        }
    }
}

/// One room assignment's occupancy within the visible range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSpan {
    /// Source assignment id; identifies the span across days and slots.
    pub id: String,
    pub person: Option<Person>,
    pub room: Option<Room>,
    pub person_name: String,
    pub room_name: String,
    pub label: String,
    pub color: String,
    pub text_color: TextColor,
    /// Check-in day (unclipped).
    pub start_date: NaiveDate,
    /// Last occupied night (unclipped): the day before checkout.
    pub last_night: NaiveDate,
    /// First visible occupied day.
    pub effective_start: NaiveDate,
    /// Last visible occupied day.
    pub effective_end: NaiveDate,
    /// Occupied nights of the whole stay, ignoring the visible range.
    pub total_days: i64,
}

impl AssignmentSpan {
    /// Occupied days inside the visible range.
    pub fn visible_days(&self) -> i64 {
        (self.effective_end - self.effective_start).num_days() + 1
    }

    /// Iterate the visible occupied days in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.effective_start
            .iter_days()
            .take_while(move |date| *date <= self.effective_end)
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.effective_start <= date && date <= self.effective_end
    }

    /// The stay started before the visible range.
    pub fn continues_before(&self) -> bool {
        self.start_date < self.effective_start
    }

    /// The stay runs past the visible range.
    pub fn continues_after(&self) -> bool {
        self.last_night > self.effective_end
    }
}

/// Convert assignments into spans clipped to `range`.
///
/// Malformed records are skipped, dangling person/room references fall back
/// to `defaults`. Extraction never fails.
pub fn extract_spans(
    assignments: &[Assignment],
    people: &[Person],
    rooms: &[Room],
    range: &VisibleRange,
    defaults: &SpanDefaults,
) -> Vec<AssignmentSpan> {
    let people_by_id: HashMap<&str, &Person> =
        people.iter().map(|p| (p.id.as_str(), p)).collect();
    let rooms_by_id: HashMap<&str, &Room> = rooms.iter().map(|r| (r.id.as_str(), r)).collect();
    let (range_start_iso, range_end_iso) = range.iso_bounds();
    let mut seen: HashSet<String> = HashSet::new();

    assignments
        .iter()
        .filter(|a| may_overlap(a, &range_start_iso, &range_end_iso))
        .filter_map(|a| {
            build_span(
                a,
                people_by_id.get(a.person_id.as_str()).copied(),
                rooms_by_id.get(a.room_id.as_str()).copied(),
                range,
                defaults,
            )
        })
        .filter(|span| {
            // Slots are keyed by id, so a repeated id would share a lane.
            let first = seen.insert(span.id.clone());
            if !first {
                debug!(assignment_id = %span.id, "skipping assignment with duplicate id");
            }
            first
        })
        .collect()
}

/// Lexical pre-filter on the `YYYY-MM-DD` prefix of each date. Strings too
/// short to carry that prefix pass through so parsing can reject them.
fn may_overlap(assignment: &Assignment, range_start_iso: &str, range_end_iso: &str) -> bool {
    match (
        iso_date_prefix(&assignment.start_date),
        iso_date_prefix(&assignment.end_date),
    ) {
        (Some(start), Some(end)) => start <= range_end_iso && end > range_start_iso,
        _ => true,
    }
}

fn iso_date_prefix(s: &str) -> Option<&str> {
    s.trim().get(..10)
}

fn build_span(
    assignment: &Assignment,
    person: Option<&Person>,
    room: Option<&Room>,
    range: &VisibleRange,
    defaults: &SpanDefaults,
) -> Option<AssignmentSpan> {
    let (Some(start_date), Some(end_date)) = (
        parse_iso_date(&assignment.start_date),
        parse_iso_date(&assignment.end_date),
    ) else {
        debug!(
            assignment_id = %assignment.id,
            start_date = %assignment.start_date,
            end_date = %assignment.end_date,
            "skipping assignment with unparseable dates"
        );
        return None;
    };

    let last_night = end_date.pred_opt()?;
    if last_night < start_date {
        debug!(assignment_id = %assignment.id, "skipping zero-night assignment");
        return None;
    }

    let effective_start = start_date.max(range.start);
    let effective_end = last_night.min(range.end);
    if effective_end < effective_start {
        return None;
    }

    let person_name = person
        .map(|p| p.name.clone())
        .unwrap_or_else(|| defaults.unknown_label.clone());
    let room_name = room
        .map(|r| r.name.clone())
        .unwrap_or_else(|| defaults.unknown_label.clone());
    let color = person
        .map(|p| valid_color_or(&p.color, &defaults.default_color))
        .unwrap_or(defaults.default_color.as_str())
        .to_string();
    let text_color = contrast_text_color(&color);

    Some(AssignmentSpan {
        id: assignment.id.clone(),
        person: person.cloned(),
        room: room.cloned(),
        label: format!("{person_name} - {room_name}"),
        person_name,
        room_name,
        color,
        text_color,
        start_date,
        last_night,
        effective_start,
        effective_end,
        total_days: (last_night - start_date).num_days() + 1,
    })
}
