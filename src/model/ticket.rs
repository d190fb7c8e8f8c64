use chrono::{DateTime, FixedOffset};
use std::cmp::Ordering;

/// A ticket that is waiting for somebody's code review.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: String,
    pub url: String,
    pub summary: String,
    pub current_status: String,
    /// When the ticket transitioned into its current status. `None` when the
    /// tracker's changelog has no record of the transition.
    pub in_status_since: Option<DateTime<FixedOffset>>,
}

// Create
impl Ticket {
    pub fn new(
        id: impl ToString,
        url: impl ToString,
        summary: impl ToString,
        current_status: impl ToString,
        in_status_since: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            summary: summary.to_string(),
            current_status: current_status.to_string(),
            in_status_since,
        }
    }
}

// Staleness
impl Ticket {
    pub fn staleness(&self, now: DateTime<FixedOffset>) -> Staleness {
        match self.in_status_since {
            Some(since) => Staleness::Days((now - since).num_seconds() as f64 / 86_400.0),
            None => Staleness::Unknown,
        }
    }
}

/// How long a ticket has been sitting in its current status.
///
/// `Unknown` ranks above every known value so that tickets with a broken
/// changelog surface at the top of the ranking instead of being buried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Staleness {
    Days(f64),
    Unknown,
}

impl Eq for Staleness {}

impl PartialOrd for Staleness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Staleness {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Staleness::Unknown, Staleness::Unknown) => Ordering::Equal,
            (Staleness::Unknown, Staleness::Days(_)) => Ordering::Greater,
            (Staleness::Days(_), Staleness::Unknown) => Ordering::Less,
            (Staleness::Days(a), Staleness::Days(b)) => a.total_cmp(b),
        }
    }
}

impl Staleness {
    /// Whole days, truncated towards zero.
    pub fn whole_days(&self) -> Option<i64> {
        match self {
            Staleness::Days(d) => Some(*d as i64),
            Staleness::Unknown => None,
        }
    }
}
