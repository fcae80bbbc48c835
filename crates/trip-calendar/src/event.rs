//! A clicked calendar item, as handed to edit and delete flows.

use serde::Serialize;

use crate::model::TransportType;
use crate::span::AssignmentSpan;
use crate::transport::TransportIndicator;

/// Where the edit action for an event routes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditTarget {
    Assignment { assignment_id: String },
    Transport { transport_id: String },
}

/// Either a room assignment or a transport, with an explicit discriminant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CalendarEvent {
    Assignment(AssignmentSpan),
    Transport(TransportIndicator),
}

impl CalendarEvent {
    /// Source record id.
    pub fn id(&self) -> &str {
        match self {
            CalendarEvent::Assignment(span) => &span.id,
            CalendarEvent::Transport(indicator) => &indicator.id,
        }
    }

    pub fn title(&self) -> String {
        match self {
            CalendarEvent::Assignment(span) => span.label.clone(),
            CalendarEvent::Transport(indicator) => {
                let verb = match indicator.transport_type {
                    TransportType::Arrival => "arrives",
                    TransportType::Departure => "departs",
                };
                if indicator.location.is_empty() {
                    format!("{} {} at {}", indicator.person_name, verb, indicator.time)
                } else {
                    format!(
                        "{} {} at {} ({})",
                        indicator.person_name, verb, indicator.time, indicator.location
                    )
                }
            }
        }
    }

    /// Confirmation prompt shown before deleting the source record.
    pub fn delete_confirmation(&self) -> String {
        match self {
            CalendarEvent::Assignment(span) => format!(
                "Remove {} from {} ({} to {})?",
                span.person_name,
                span.room_name,
                span.start_date.format("%Y-%m-%d"),
                (span.last_night + chrono::Duration::days(1)).format("%Y-%m-%d"),
            ),
            CalendarEvent::Transport(indicator) => format!(
                "Delete the {} of {} on {} at {}?",
                indicator.transport_type.as_str(),
                indicator.person_name,
                indicator.date.format("%Y-%m-%d"),
                indicator.time,
            ),
        }
    }

    pub fn edit_target(&self) -> EditTarget {
        match self {
            CalendarEvent::Assignment(span) => EditTarget::Assignment {
                assignment_id: span.id.clone(),
            },
            CalendarEvent::Transport(indicator) => EditTarget::Transport {
                transport_id: indicator.id.clone(),
            },
        }
    }
}
