//! Slot allocation: give every span a vertical lane so that spans sharing a
//! day never share a lane.
//!
//! This is greedy interval coloring. Spans are taken by start day, longer
//! spans first on ties, and each gets the lowest lane free on every day it
//! covers. It does not minimize the number of lanes; it is deterministic,
//! and callers rely on the resulting lane order staying stable.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::span::AssignmentSpan;

/// Lane ceiling for the normal search. Spans that cannot fit below it get
/// unique lanes above it instead.
pub const MAX_SLOTS: usize = 100;

/// Span id → lane. Built once per layout pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SlotAssignment {
    slots: BTreeMap<String, usize>,
}

impl SlotAssignment {
    pub fn get(&self, span_id: &str) -> Option<usize> {
        self.slots.get(span_id).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Highest lane handed out, if any.
    pub fn max_slot(&self) -> Option<usize> {
        self.slots.values().copied().max()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.slots.iter().map(|(id, slot)| (id.as_str(), *slot))
    }
}

/// Assign a lane to every span. Accepts owned or shared spans.
pub fn allocate_slots<S: Borrow<AssignmentSpan>>(spans: &[S]) -> SlotAssignment {
    allocate_slots_with_ceiling(spans, MAX_SLOTS)
}

/// [`allocate_slots`] with an explicit lane ceiling.
pub fn allocate_slots_with_ceiling<S: Borrow<AssignmentSpan>>(
    spans: &[S],
    ceiling: usize,
) -> SlotAssignment {
    let mut order: Vec<&AssignmentSpan> = spans.iter().map(Borrow::borrow).collect();
    order.sort_by(|a, b| {
        a.effective_start
            .cmp(&b.effective_start)
            .then_with(|| b.total_days.cmp(&a.total_days))
    });

    let mut occupied: HashMap<NaiveDate, HashSet<usize>> = HashMap::new();
    let mut slots = BTreeMap::new();
    let mut next_overflow = ceiling;

    for span in order {
        let is_free = |slot: usize| {
            span.days()
                .all(|day| occupied.get(&day).is_none_or(|taken| !taken.contains(&slot)))
        };

        let slot = match (0..ceiling).find(|slot| is_free(*slot)) {
            Some(slot) => slot,
            None => {
                let slot = next_overflow;
                next_overflow += 1;
                warn!(
                    span_id = %span.id,
                    slot,
                    ceiling,
                    "slot ceiling exceeded, assigning overflow lane"
                );
                slot
            }
        };

        for day in span.days() {
            occupied.entry(day).or_default().insert(slot);
        }
        slots.insert(span.id.clone(), slot);
    }

    SlotAssignment { slots }
}
