//! The full month layout pipeline.
//!
//! grid → spans → slots → segments → day buckets, run synchronously over an
//! in-memory [`TripSnapshot`]. Each call produces a fresh, immutable
//! [`CalendarLayout`]; nothing is cached between calls.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::color::DEFAULT_PERSON_COLOR;
use crate::grid::{build_visible_days_with_options, CalendarDay, GridOptions, VisibleRange};
use crate::grouper::{group_by_day, DayCell, DayEntries, DayLayout, DisplayLimits};
use crate::model::TripSnapshot;
use crate::segment::materialize;
use crate::slots::{allocate_slots, SlotAssignment};
use crate::span::{extract_spans, AssignmentSpan, SpanDefaults, UNKNOWN_LABEL};
use crate::transport::{extract_transport_indicators, TransportIndicator};

/// Tunables for a layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Day flagged as today. `None` flags nothing.
    pub today: Option<NaiveDate>,
    pub max_visible_slots: usize,
    pub max_visible_transports: usize,
    /// Placeholder for unresolved person or room names.
    pub unknown_label: String,
    /// Badge color for unresolved people or unusable colors.
    pub default_color: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        let limits = DisplayLimits::default();
        Self {
            today: None,
            max_visible_slots: limits.max_visible_slots,
            max_visible_transports: limits.max_visible_transports,
            unknown_label: UNKNOWN_LABEL.to_string(),
            default_color: DEFAULT_PERSON_COLOR.to_string(),
        }
    }
}

impl LayoutOptions {
    pub fn span_defaults(&self) -> SpanDefaults {
        SpanDefaults {
            unknown_label: self.unknown_label.clone(),
            default_color: self.default_color.clone(),
        }
    }

    pub fn display_limits(&self) -> DisplayLimits {
        DisplayLimits {
            max_visible_slots: self.max_visible_slots,
            max_visible_transports: self.max_visible_transports,
        }
    }
}

/// Result of one layout pass.
#[derive(Debug, Clone, Default)]
pub struct CalendarLayout {
    pub days: Vec<CalendarDay>,
    pub spans: Vec<Arc<AssignmentSpan>>,
    pub slots: SlotAssignment,
    pub by_day: DayLayout,
}

impl CalendarLayout {
    pub fn range(&self) -> Option<VisibleRange> {
        VisibleRange::from_days(&self.days)
    }

    pub fn entries(&self, date: NaiveDate) -> &DayEntries {
        self.by_day.entries(date)
    }

    pub fn cell(&self, date: NaiveDate) -> DayCell<'_> {
        self.by_day.cell(date)
    }

    /// Grid days grouped into week rows.
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarDay]> {
        self.days.chunks(crate::week::DAYS_PER_WEEK as usize)
    }

    pub fn span(&self, id: &str) -> Option<&Arc<AssignmentSpan>> {
        self.spans.iter().find(|span| span.id == id)
    }

    pub fn transports(&self) -> impl Iterator<Item = &TransportIndicator> {
        self.by_day
            .busy_days()
            .flat_map(|(_, entries)| entries.transports.iter())
    }
}

/// Lay out the month containing `focus_month` for one trip.
///
/// Never fails: malformed records are skipped, dangling references get
/// placeholders, and slot overflow is logged.
pub fn compute_layout(
    focus_month: NaiveDate,
    snapshot: &TripSnapshot,
    options: &LayoutOptions,
) -> CalendarLayout {
    let grid_options = GridOptions {
        today: options.today,
        trip_bounds: snapshot.trip_bounds(),
    };
    let days = build_visible_days_with_options(focus_month, &grid_options);
    let Some(range) = VisibleRange::from_days(&days) else {
        return CalendarLayout::default();
    };

    let defaults = options.span_defaults();
    let spans: Vec<Arc<AssignmentSpan>> = extract_spans(
        &snapshot.assignments,
        &snapshot.people,
        &snapshot.rooms,
        &range,
        &defaults,
    )
    .into_iter()
    .map(Arc::new)
    .collect();
    let slots = allocate_slots(&spans);
    let segments = materialize(&spans, &slots, &days);
    let indicators =
        extract_transport_indicators(&snapshot.transports, &snapshot.people, &range, &defaults);

    debug!(
        start = %range.start,
        end = %range.end,
        spans = spans.len(),
        segments = segments.len(),
        transports = indicators.len(),
        max_slot = ?slots.max_slot(),
        "computed calendar layout"
    );

    let by_day = group_by_day(segments, indicators, options.display_limits());
    CalendarLayout {
        days,
        spans,
        slots,
        by_day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, Person, Room, Transport, TransportType, Trip};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn snapshot() -> TripSnapshot {
        TripSnapshot {
            trip: Some(Trip {
                id: "t1".to_string(),
                owner_id: "u1".to_string(),
                name: "Summer".to_string(),
                start_date: Some("2024-07-14".to_string()),
                end_date: Some("2024-07-21".to_string()),
            }),
            rooms: vec![Room {
                id: "r1".to_string(),
                trip_id: "t1".to_string(),
                name: "Room 1".to_string(),
            }],
            people: vec![Person {
                id: "p1".to_string(),
                trip_id: "t1".to_string(),
                name: "Alice".to_string(),
                color: "#2563eb".to_string(),
            }],
            assignments: vec![Assignment {
                id: "a1".to_string(),
                trip_id: "t1".to_string(),
                room_id: "r1".to_string(),
                person_id: "p1".to_string(),
                start_date: "2024-07-15".to_string(),
                end_date: "2024-07-20".to_string(),
            }],
            transports: vec![Transport {
                id: "x1".to_string(),
                trip_id: "t1".to_string(),
                person_id: "p1".to_string(),
                transport_type: TransportType::Arrival,
                datetime: "2024-07-15T10:30".to_string(),
                location: "Airport".to_string(),
                transport_mode: None,
                driver_id: None,
                needs_pickup: true,
            }],
        }
    }

    #[test]
    fn test_layout_end_to_end() {
        let options = LayoutOptions {
            today: Some(d(2024, 7, 16)),
            ..LayoutOptions::default()
        };
        let layout = compute_layout(d(2024, 7, 1), &snapshot(), &options);
        assert_eq!(layout.days.len(), 35);
        assert_eq!(layout.spans.len(), 1);
        assert_eq!(layout.slots.get("a1"), Some(0));
        assert_eq!(layout.entries(d(2024, 7, 15)).segments.len(), 1);
        assert_eq!(layout.entries(d(2024, 7, 15)).transports.len(), 1);
        assert!(layout.entries(d(2024, 7, 20)).is_empty());
        assert!(layout.days.iter().any(|day| day.is_today && day.date == d(2024, 7, 16)));
        assert_eq!(layout.days.iter().filter(|day| day.in_trip).count(), 8);
        assert_eq!(layout.weeks().count(), 5);
        assert_eq!(layout.transports().count(), 1);
        assert_eq!(layout.span("a1").map(|s| s.label.as_str()), Some("Alice - Room 1"));
    }

    #[test]
    fn test_layout_of_empty_snapshot() {
        let layout = compute_layout(
            d(2024, 7, 1),
            &TripSnapshot::default(),
            &LayoutOptions::default(),
        );
        assert_eq!(layout.days.len(), 35);
        assert!(layout.spans.is_empty());
        assert!(layout.slots.is_empty());
        assert!(layout.days.iter().all(|day| !day.in_trip && !day.is_today));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: LayoutOptions =
            serde_json::from_str(r#"{"maxVisibleSlots": 5, "today": "2024-07-16"}"#).unwrap();
        assert_eq!(options.max_visible_slots, 5);
        assert_eq!(options.max_visible_transports, 2);
        assert_eq!(options.today, Some(d(2024, 7, 16)));
        assert_eq!(options.unknown_label, "Unknown");
    }

    #[test]
    fn test_custom_unknown_label() {
        let mut snap = snapshot();
        snap.people.clear();
        let options = LayoutOptions {
            unknown_label: "?".to_string(),
            ..LayoutOptions::default()
        };
        let layout = compute_layout(d(2024, 7, 1), &snap, &options);
        assert_eq!(layout.spans[0].label, "? - Room 1");
    }
}
