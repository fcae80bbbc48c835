//! # trip-calendar
//!
//! Deterministic month layout for vacation trips.
//!
//! Given a trip's room assignments and transports, the engine computes a
//! day-by-day, lane-by-lane rendering plan: which stays cover which days,
//! which vertical lane each stay occupies, where a stay's bar starts, ends or
//! wraps onto a new week row, and which arrivals/departures show on each day.
//!
//! ## Modules
//!
//! - [`grid`] — month → whole-week day grid
//! - [`week`] — the shared Monday-first week convention
//! - [`span`] — assignments → clipped occupancy spans (checkout day excluded)
//! - [`slots`] — greedy lane allocation so overlapping spans never collide
//! - [`segment`] — spans → per-day segments with position and row-boundary flags
//! - [`transport`] — transports → per-day arrival/departure indicators
//! - [`grouper`] — per-day buckets with display caps and overflow counts
//! - [`layout`] — the whole pipeline over a [`TripSnapshot`]
//! - [`event`] — tagged assignment/transport event for edit and delete flows
//! - [`store`] — in-memory record store with ownership checks
//! - [`color`] — badge colors and text contrast
//! - [`model`] — source records
//! - [`error`] — Error types

pub mod color;
pub mod error;
pub mod event;
pub mod grid;
pub mod grouper;
pub mod layout;
pub mod model;
pub mod segment;
pub mod slots;
pub mod span;
pub mod store;
pub mod transport;
pub mod week;

pub use color::{contrast_text_color, relative_luminance, TextColor, DEFAULT_PERSON_COLOR};
pub use error::CalendarError;
pub use event::{CalendarEvent, EditTarget};
pub use grid::{
    build_visible_days, build_visible_days_with_options, month_start, parse_month, CalendarDay,
    GridOptions, VisibleRange,
};
pub use grouper::{empty_day, group_by_day, DayCell, DayEntries, DayLayout, DisplayLimits};
pub use layout::{compute_layout, CalendarLayout, LayoutOptions};
pub use model::{Assignment, Person, Room, Transport, TransportType, Trip, TripSnapshot};
pub use segment::{materialize, DaySegment, SegmentPosition, SegmentStyle};
pub use slots::{allocate_slots, SlotAssignment, MAX_SLOTS};
pub use span::{extract_spans, AssignmentSpan, SpanDefaults};
pub use store::{MemoryStore, NewAssignment, NewTransport, NewTrip, TripStore};
pub use transport::{extract_transport_indicators, TransportIndicator};
pub use week::WEEK_START;
