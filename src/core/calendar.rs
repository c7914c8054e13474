//! Calendar-event payloads for the reference bulk-create run
//!
//! The engine treats payloads as opaque JSON; this module only exists so the
//! binary and the tests have realistic records to push through it. Field
//! casing follows the Graph API.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::batch::OperationDraft;
use crate::utils::error::Result;

/// Wire format for date-time values: local time plus a named zone
const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Event body content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    /// `html` or `text`
    pub content_type: String,
    /// The body itself
    pub content: String,
}

/// A point in time within a named time zone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    /// Local date-time, `yyyy-MM-ddTHH:mm:ss`
    pub date_time: String,
    /// IANA or Windows time zone name
    pub time_zone: String,
}

impl DateTimeTimeZone {
    /// Render a UTC instant in the wire format
    pub fn utc(instant: DateTime<Utc>) -> Self {
        Self {
            date_time: instant.format(EVENT_TIME_FORMAT).to_string(),
            time_zone: "UTC".to_string(),
        }
    }
}

/// Event location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Human-readable name
    pub display_name: String,
}

/// A calendar event in the provider's shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Event subject line
    pub subject: String,
    /// Event body
    pub body: ItemBody,
    /// Start instant
    pub start: DateTimeTimeZone,
    /// End instant
    pub end: DateTimeTimeZone,
    /// Location
    pub location: Location,
}

/// Path of the events collection for a mailbox
pub fn events_collection_path(email: &str) -> String {
    format!("/users/{}/events", email)
}

/// Generate `count` half-hour events staggered one hour apart
pub fn sample_events(count: usize) -> Vec<CalendarEvent> {
    let now = Utc::now();
    (0..count)
        .map(|i| {
            let start = now + Duration::hours(i as i64);
            CalendarEvent {
                subject: format!("Subject{}", i),
                body: ItemBody {
                    content_type: "html".to_string(),
                    content: format!("Content{}", i),
                },
                start: DateTimeTimeZone::utc(start),
                end: DateTimeTimeZone::utc(start + Duration::minutes(30)),
                location: Location {
                    display_name: "Dummy location".to_string(),
                },
            }
        })
        .collect()
}

/// Build one create draft per event, targeting the mailbox's collection
pub fn event_drafts(email: &str, events: &[CalendarEvent]) -> Result<Vec<OperationDraft>> {
    let path = events_collection_path(email);
    events
        .iter()
        .map(|event| Ok(OperationDraft::post(path.clone(), serde_json::to_value(event)?)))
        .collect()
}
