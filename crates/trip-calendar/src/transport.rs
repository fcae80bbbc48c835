//! Arrival and departure indicators.
//!
//! Transports are not slot-allocated. Each one becomes a single indicator on
//! the day of its wall-clock datetime.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::color::{contrast_text_color, valid_color_or, TextColor};
use crate::grid::VisibleRange;
use crate::model::{Person, Transport, TransportType};
use crate::span::SpanDefaults;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// One arrival or departure on a specific day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportIndicator {
    /// Source transport id.
    pub id: String,
    pub person: Option<Person>,
    pub person_name: String,
    pub color: String,
    pub text_color: TextColor,
    #[serde(rename = "type")]
    pub transport_type: TransportType,
    pub date: NaiveDate,
    /// Clock time as `HH:MM`.
    pub time: String,
    pub location: String,
    pub transport_mode: Option<String>,
    pub needs_pickup: bool,
    /// Resolved driver name, if a driver is set and still exists.
    pub driver_name: Option<String>,
}

/// Parse an ISO datetime into its wall-clock value. An offset, if present, is
/// kept as written rather than converted.
pub fn parse_wall_clock(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Build indicators for transports falling inside `range`, ordered by day,
/// then time, then id.
pub fn extract_transport_indicators(
    transports: &[Transport],
    people: &[Person],
    range: &VisibleRange,
    defaults: &SpanDefaults,
) -> Vec<TransportIndicator> {
    let people_by_id: HashMap<&str, &Person> =
        people.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut indicators: Vec<TransportIndicator> = transports
        .iter()
        .filter_map(|transport| {
            let Some(at) = parse_wall_clock(&transport.datetime) else {
                debug!(
                    transport_id = %transport.id,
                    datetime = %transport.datetime,
                    "skipping transport with unparseable datetime"
                );
                return None;
            };
            if !range.contains(at.date()) {
                return None;
            }

            let person = people_by_id.get(transport.person_id.as_str()).copied();
            let color = person
                .map(|p| valid_color_or(&p.color, &defaults.default_color))
                .unwrap_or(defaults.default_color.as_str())
                .to_string();
            let driver_name = transport
                .driver_id
                .as_deref()
                .and_then(|id| people_by_id.get(id))
                .map(|driver| driver.name.clone());

            Some(TransportIndicator {
                id: transport.id.clone(),
                person_name: person
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| defaults.unknown_label.clone()),
                person: person.cloned(),
                text_color: contrast_text_color(&color),
                color,
                transport_type: transport.transport_type,
                date: at.date(),
                time: at.format("%H:%M").to_string(),
                location: transport.location.clone(),
                transport_mode: transport.transport_mode.clone(),
                needs_pickup: transport.needs_pickup,
                driver_name,
            })
        })
        .collect();

    indicators.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.time.cmp(&b.time))
            .then_with(|| a.id.cmp(&b.id))
    });
    indicators
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::DEFAULT_PERSON_COLOR;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn july_range() -> VisibleRange {
        VisibleRange {
            start: d(2024, 7, 1),
            end: d(2024, 8, 4),
        }
    }

    fn transport(id: &str, kind: TransportType, datetime: &str) -> Transport {
        Transport {
            id: id.to_string(),
            trip_id: "t1".to_string(),
            person_id: "p1".to_string(),
            transport_type: kind,
            datetime: datetime.to_string(),
            location: "Station".to_string(),
            transport_mode: Some("train".to_string()),
            driver_id: None,
            needs_pickup: false,
        }
    }

    fn people() -> Vec<Person> {
        vec![
            Person {
                id: "p1".to_string(),
                trip_id: "t1".to_string(),
                name: "Alice".to_string(),
                color: "#ffffff".to_string(),
            },
            Person {
                id: "p2".to_string(),
                trip_id: "t1".to_string(),
                name: "Bob".to_string(),
                color: "#000000".to_string(),
            },
        ]
    }

    fn extract(transports: &[Transport]) -> Vec<TransportIndicator> {
        extract_transport_indicators(
            transports,
            &people(),
            &july_range(),
            &SpanDefaults::default(),
        )
    }

    #[test]
    fn test_parse_wall_clock_variants() {
        let expected = d(2024, 7, 16).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(parse_wall_clock("2024-07-16T09:00"), Some(expected));
        assert_eq!(parse_wall_clock("2024-07-16T09:00:00"), Some(expected));
        assert_eq!(parse_wall_clock("2024-07-16 09:00"), Some(expected));
        assert_eq!(parse_wall_clock("2024-07-16T09:00:00.000"), Some(expected));
        // Offset kept as written, not converted to UTC
        assert_eq!(parse_wall_clock("2024-07-16T09:00:00+02:00"), Some(expected));
        assert_eq!(parse_wall_clock("tomorrow"), None);
    }

    #[test]
    fn test_indicator_fields_resolved() {
        let mut t = transport("x1", TransportType::Arrival, "2024-07-16T09:05:00Z");
        t.driver_id = Some("p2".to_string());
        t.needs_pickup = true;
        let indicators = extract(&[t]);
        assert_eq!(indicators.len(), 1);
        let ind = &indicators[0];
        assert_eq!(ind.date, d(2024, 7, 16));
        assert_eq!(ind.time, "09:05");
        assert_eq!(ind.person_name, "Alice");
        assert_eq!(ind.text_color, TextColor::Dark);
        assert_eq!(ind.driver_name.as_deref(), Some("Bob"));
        assert!(ind.needs_pickup);
    }

    #[test]
    fn test_out_of_range_and_malformed_skipped() {
        let transports = [
            transport("early", TransportType::Arrival, "2024-06-30T23:00"),
            transport("bad", TransportType::Arrival, "16/07/2024 09:00"),
            transport("ok", TransportType::Departure, "2024-08-04T18:00"),
        ];
        let indicators = extract(&transports);
        let ids: Vec<_> = indicators.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[test]
    fn test_dangling_person_uses_placeholder() {
        let mut t = transport("x1", TransportType::Departure, "2024-07-20T10:00");
        t.person_id = "ghost".to_string();
        t.driver_id = Some("ghost".to_string());
        let indicators = extract(&[t]);
        assert_eq!(indicators[0].person_name, "Unknown");
        assert_eq!(indicators[0].color, DEFAULT_PERSON_COLOR);
        assert_eq!(indicators[0].driver_name, None);
    }

    #[test]
    fn test_sorted_by_day_then_time() {
        let transports = [
            transport("c", TransportType::Arrival, "2024-07-17T08:00"),
            transport("b", TransportType::Arrival, "2024-07-16T14:00"),
            transport("a", TransportType::Departure, "2024-07-16T09:00"),
        ];
        let indicators = extract(&transports);
        let ids: Vec<_> = indicators.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
