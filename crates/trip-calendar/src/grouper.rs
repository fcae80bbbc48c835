//! Day grouping: bucket segments and transport indicators per day.
//!
//! Days without entries all resolve to one shared, immutable empty bucket,
//! so a consumer comparing by reference sees the same value every time.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::segment::DaySegment;
use crate::transport::TransportIndicator;

/// Per-day display caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayLimits {
    /// Lanes shown per day; segments in higher lanes count as overflow.
    pub max_visible_slots: usize,
    /// Transport indicators shown per day.
    pub max_visible_transports: usize,
}

impl Default for DisplayLimits {
    fn default() -> Self {
        Self {
            max_visible_slots: 3,
            max_visible_transports: 2,
        }
    }
}

/// Everything that happens on one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayEntries {
    /// Ordered by slot.
    pub segments: Vec<DaySegment>,
    /// Ordered by time.
    pub transports: Vec<TransportIndicator>,
}

impl DayEntries {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.transports.is_empty()
    }

    pub fn total(&self) -> usize {
        self.segments.len() + self.transports.len()
    }
}

static EMPTY_DAY: DayEntries = DayEntries {
    segments: Vec::new(),
    transports: Vec::new(),
};

/// The shared empty bucket.
pub fn empty_day() -> &'static DayEntries {
    &EMPTY_DAY
}

/// What a single day cell shows after applying the display caps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    pub segments: &'a [DaySegment],
    pub transports: &'a [TransportIndicator],
    /// Entries not shown: total entries minus displayed entries.
    pub hidden_count: usize,
}

/// Day → entries mapping for a whole visible range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayLayout {
    by_day: BTreeMap<NaiveDate, DayEntries>,
    limits: DisplayLimits,
}

impl DayLayout {
    /// Entries for `date`; the shared empty bucket if nothing happens.
    pub fn entries(&self, date: NaiveDate) -> &DayEntries {
        self.by_day.get(&date).unwrap_or(empty_day())
    }

    /// The capped view of `date`.
    pub fn cell(&self, date: NaiveDate) -> DayCell<'_> {
        let entries = self.entries(date);
        let visible_segments = entries
            .segments
            .partition_point(|s| s.slot < self.limits.max_visible_slots);
        let visible_transports = entries
            .transports
            .len()
            .min(self.limits.max_visible_transports);

        DayCell {
            date,
            segments: &entries.segments[..visible_segments],
            transports: &entries.transports[..visible_transports],
            hidden_count: entries.total() - visible_segments - visible_transports,
        }
    }

    pub fn limits(&self) -> DisplayLimits {
        self.limits
    }

    /// Days that have at least one entry, in order.
    pub fn busy_days(&self) -> impl Iterator<Item = (NaiveDate, &DayEntries)> {
        self.by_day.iter().map(|(date, entries)| (*date, entries))
    }
}

/// Bucket segments and indicators by day. Segments keep slot order within a
/// day and indicators keep their incoming order.
pub fn group_by_day(
    segments: Vec<DaySegment>,
    transports: Vec<TransportIndicator>,
    limits: DisplayLimits,
) -> DayLayout {
    let mut by_day: BTreeMap<NaiveDate, DayEntries> = BTreeMap::new();
    for segment in segments {
        by_day.entry(segment.date).or_default().segments.push(segment);
    }
    for indicator in transports {
        by_day.entry(indicator.date).or_default().transports.push(indicator);
    }
    for entries in by_day.values_mut() {
        entries.segments.sort_by_key(|s| s.slot);
    }
    DayLayout { by_day, limits }
}
