use crate::model::{merge_overlapping, CalendarEvent, EventKind};
use crate::mrkdwn;
use crate::newspaper::{
    ContentBlock, Page, SourceError, WriteError, Writer, WriterOutcome, DEFAULT_AUTHOR_NAME,
};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::future;
use itertools::Itertools;

const TOPIC: &str = "Release Forecast";

/// Kitchen-clock rendering of event times, e.g. `9:30AM`.
const TIME_FORMAT: &str = "%-I:%M%p";

/// Access to the events of one monitored calendar. The implementation owns
/// the definition of the day's working-hours window.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    fn name(&self) -> &str;

    async fn events_for_day(
        &self,
        day: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>, SourceError>;
}

/// Writes the page classifying how risky a release is today, based on what
/// the monitored calendars have scheduled.
pub struct ReleaseForecast {
    calendars: Vec<Box<dyn CalendarSource>>,
    now: DateTime<FixedOffset>,
}

impl ReleaseForecast {
    pub fn new(calendars: Vec<Box<dyn CalendarSource>>, now: DateTime<FixedOffset>) -> Self {
        Self { calendars, now }
    }
}

#[async_trait]
impl Writer for ReleaseForecast {
    fn topic(&self) -> &str {
        TOPIC
    }

    async fn write(&self) -> Result<WriterOutcome, WriteError> {
        let results =
            future::join_all(self.calendars.iter().map(|c| c.events_for_day(self.now))).await;

        let mut events = Vec::new();
        for (calendar, result) in self.calendars.iter().zip(results) {
            events.extend(result.map_err(|source| WriteError::CalendarFetch {
                calendar: calendar.name().to_string(),
                source,
            })?);
        }

        let mut push_notifications = Vec::new();
        let mut campaigns = Vec::new();
        let mut code_freezes = Vec::new();
        for event in events {
            match event.kind {
                EventKind::PushNotification => push_notifications.push(event),
                EventKind::Campaign => campaigns.push(event),
                EventKind::CodeFreeze => code_freezes.push(event),
                EventKind::Unclassified => {}
            }
        }

        let mut page = Page {
            headline_emoji: "sun_behind_rain_cloud".to_string(),
            headline: TOPIC.to_string(),
            author: DEFAULT_AUTHOR_NAME.to_string(),
            content: Vec::new(),
        };

        let mut lines = vec![format!(
            "{} {}",
            summary(&push_notifications, &campaigns, &code_freezes),
            recommendation(&push_notifications, &campaigns, &code_freezes),
        )];

        // A code freeze outweighs everything else scheduled for the day.
        if !code_freezes.is_empty() {
            page.content.push(ContentBlock::Text(lines.iter().join("\n")));
            return Ok(WriterOutcome::Page(page));
        }

        if !push_notifications.is_empty() {
            lines.push(String::new());
            lines.push(
                "A thunderstorm of Push Notifications is expected during the following \
                 hours (local time):"
                    .to_string(),
            );
            lines.extend(merge_overlapping(&push_notifications).iter().map(|pn| {
                mrkdwn::bold(format!("    {}", pn.starts_at.format(TIME_FORMAT)))
            }));
        }

        if !campaigns.is_empty() {
            lines.push(String::new());
            lines.push(
                "Heavy rain of Campaigns is expected during the following hours \
                 (local time):"
                    .to_string(),
            );
            lines.extend(merge_overlapping(&campaigns).iter().map(|c| {
                mrkdwn::bold(format!(
                    "    {} - {}",
                    c.starts_at.format(TIME_FORMAT),
                    c.ends_at.format(TIME_FORMAT),
                ))
            }));
        }

        page.content.push(ContentBlock::Text(lines.iter().join("\n")));
        Ok(WriterOutcome::Page(page))
    }
}

fn summary(
    push_notifications: &[CalendarEvent],
    campaigns: &[CalendarEvent],
    code_freezes: &[CalendarEvent],
) -> String {
    if !code_freezes.is_empty() {
        return mrkdwn::emoji("snowflake") + " The day is freezingly cold due to the Code Freeze.";
    }

    if !push_notifications.is_empty() && !campaigns.is_empty() {
        return mrkdwn::emoji("thunder_cloud_and_rain")
            + " The day is cloudy due to Push Notifications and Campaigns.";
    }

    if !push_notifications.is_empty() {
        return mrkdwn::emoji("thunder_cloud_and_rain")
            + " The day is cloudy due to Push Notifications.";
    }

    if !campaigns.is_empty() {
        return mrkdwn::emoji("thunder_cloud_and_rain") + " The day is cloudy due to Campaigns.";
    }

    mrkdwn::emoji("sunny") + " The day is sunny and the sky is clear."
}

fn recommendation(
    push_notifications: &[CalendarEvent],
    campaigns: &[CalendarEvent],
    code_freezes: &[CalendarEvent],
) -> &'static str {
    if !code_freezes.is_empty() {
        return "Totally bad day for a release!";
    }

    if !push_notifications.is_empty() || !campaigns.is_empty() {
        return "Be careful with a release today!";
    }

    "Looks like a good day for a release!"
}
