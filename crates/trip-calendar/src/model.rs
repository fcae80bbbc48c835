//! Source records read by the layout pipeline.
//!
//! These mirror what the local store persists. Dates stay as raw ISO strings
//! because the store does not validate historical data: the pipeline parses
//! them itself and skips whatever does not parse.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// A trip owned by a single user. All other records hang off a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    #[serde(default)]
    pub owner_id: String,
    pub name: String,
    /// First day of the trip (ISO date), if known.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Last day of the trip (ISO date, inclusive), if known.
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub trip_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub trip_id: String,
    pub name: String,
    /// Badge color as `#rrggbb` or `#rgb`. Anything else falls back to gray.
    #[serde(default)]
    pub color: String,
}

/// A person staying in a room. `end_date` is the checkout day and is not an
/// occupied night.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    #[serde(default)]
    pub trip_id: String,
    pub room_id: String,
    pub person_id: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Arrival,
    Departure,
}

impl TransportType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportType::Arrival => "arrival",
            TransportType::Departure => "departure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transport {
    pub id: String,
    #[serde(default)]
    pub trip_id: String,
    pub person_id: String,
    #[serde(rename = "type")]
    pub transport_type: TransportType,
    /// ISO datetime, with or without an offset. The wall-clock date and time
    /// as written are what the calendar shows.
    pub datetime: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub transport_mode: Option<String>,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub needs_pickup: bool,
}

/// Everything the layout pipeline needs for one trip, fully loaded in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    #[serde(default)]
    pub trip: Option<Trip>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub transports: Vec<Transport>,
}

impl TripSnapshot {
    /// Parse a snapshot from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidRecord`] if the JSON does not match the
    /// snapshot shape.
    pub fn from_json(json: &str) -> Result<Self, CalendarError> {
        serde_json::from_str(json).map_err(|e| CalendarError::InvalidRecord(e.to_string()))
    }

    /// Trip boundaries as parsed dates. Missing or unparseable bounds yield `None`.
    pub fn trip_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let trip = self.trip.as_ref()?;
        let start = parse_iso_date(trip.start_date.as_deref()?)?;
        let end = parse_iso_date(trip.end_date.as_deref()?)?;
        Some((start, end))
    }
}

/// Parse a `YYYY-MM-DD` date. Longer ISO strings are accepted by reading only
/// their leading date portion.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date_part = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
