use crate::model::{CalendarEvent, Classifier, MonitoredCalendar};
use crate::newspaper::{CalendarSource, SourceError};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Timelike};
use reqwest::Client;
use serde_json::Value;

const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// The team's working hours; only events around them matter for the digest.
const WORKING_HOURS: (u32, u32) = (9, 19);

/// One monitored Google calendar, queried over the Calendar REST API with a
/// bearer token. Events are classified at ingestion with the calendar's own
/// rule.
pub struct GoogleCalendar {
    http: Client,
    name: String,
    calendar_id: String,
    access_token: String,
    classifier: Classifier,
}

// Create
impl GoogleCalendar {
    pub fn new(calendar: MonitoredCalendar, access_token: impl ToString) -> Self {
        Self {
            http: Client::new(),
            name: calendar.name,
            calendar_id: calendar.id,
            access_token: access_token.to_string(),
            classifier: calendar.classifier,
        }
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    async fn events_for_day(
        &self,
        day: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>, SourceError> {
        let start = at_hour(day, WORKING_HOURS.0);
        let end = at_hour(day, WORKING_HOURS.1);

        let response = self
            .http
            .get(format!("{EVENTS_URL}/{}/events", self.calendar_id))
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", start.to_rfc3339()),
                ("timeMax", end.to_rfc3339()),
                ("singleEvents", "true".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let payload = response.json::<Value>().await?;

        parse_events(&payload, &self.classifier)
    }
}

fn at_hour(day: DateTime<FixedOffset>, hour: u32) -> DateTime<FixedOffset> {
    day.with_hour(hour)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .expect("fixed-offset times map whole hours uniquely")
}

fn parse_events(payload: &Value, classifier: &Classifier) -> Result<Vec<CalendarEvent>, SourceError> {
    let Some(items) = payload["items"].as_array() else {
        return Err(SourceError::Payload(
            "events response has no 'items' field".to_string(),
        ));
    };

    let mut events = Vec::new();
    for item in items {
        let title = item["summary"].as_str().unwrap_or_default();
        let starts_at = event_time(item, title, "start")?;
        let ends_at = event_time(item, title, "end")?;
        if ends_at < starts_at {
            return Err(SourceError::Payload(format!(
                "event '{title}' ends before it starts"
            )));
        }

        events.push(CalendarEvent::new(
            title,
            classifier.classify(title),
            starts_at,
            ends_at,
        ));
    }
    Ok(events)
}

// An all-day event carries a 'date' instead of 'dateTime'. Events without a
// concrete time cannot be placed in the day's timeline and fail the fetch.
fn event_time(item: &Value, title: &str, field: &str) -> Result<DateTime<FixedOffset>, SourceError> {
    let Some(datetime) = item[field]["dateTime"].as_str() else {
        return Err(SourceError::Payload(format!(
            "event '{title}' has no '{field}' time"
        )));
    };
    DateTime::parse_from_rfc3339(datetime).map_err(|err| {
        SourceError::Payload(format!("event '{title}' has a malformed '{field}' time: {err}"))
    })
}
