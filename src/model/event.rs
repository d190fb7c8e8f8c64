use chrono::{DateTime, FixedOffset};

/// A calendar event relevant to the day's release risk. The event occupies
/// the half-open interval `[starts_at, ends_at)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub title: String,
    pub kind: EventKind,
    pub starts_at: DateTime<FixedOffset>,
    pub ends_at: DateTime<FixedOffset>,
}

// Create
impl CalendarEvent {
    pub fn new(
        title: impl ToString,
        kind: EventKind,
        starts_at: DateTime<FixedOffset>,
        ends_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            title: title.to_string(),
            kind,
            starts_at,
            ends_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Unclassified,
    PushNotification,
    Campaign,
    CodeFreeze,
}

impl EventKind {
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "push-notification" => Some(EventKind::PushNotification),
            "campaign" => Some(EventKind::Campaign),
            "code-freeze" => Some(EventKind::CodeFreeze),
            _ => None,
        }
    }
}

/// Ingestion-time classification rule of a single monitored calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classifier {
    /// Events whose title contains the needle (case-insensitive) get the
    /// kind; everything else stays unclassified.
    TitleContains { needle: String, kind: EventKind },
    /// Every event of the calendar gets the kind.
    Always(EventKind),
}

impl Classifier {
    pub fn classify(&self, title: &str) -> EventKind {
        match self {
            Classifier::TitleContains { needle, kind } => {
                if title.to_lowercase().contains(&needle.to_lowercase()) {
                    *kind
                } else {
                    EventKind::Unclassified
                }
            }
            Classifier::Always(kind) => *kind,
        }
    }
}

/// Collapses overlapping and touching events into the minimal list of
/// covering intervals, ascending by start. Titles and kinds of absorbed
/// events are discarded in favor of the earliest event's.
pub fn merge_overlapping(events: &[CalendarEvent]) -> Vec<CalendarEvent> {
    if events.len() <= 1 {
        return events.to_vec();
    }

    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| {
        a.starts_at
            .cmp(&b.starts_at)
            .then(a.ends_at.cmp(&b.ends_at))
    });

    let mut merged: Vec<CalendarEvent> = Vec::with_capacity(sorted.len());
    for event in sorted {
        match merged.last_mut() {
            Some(current) if event.starts_at <= current.ends_at => {
                if current.ends_at < event.ends_at {
                    current.ends_at = event.ends_at;
                }
            }
            _ => merged.push(event),
        }
    }

    merged
}
