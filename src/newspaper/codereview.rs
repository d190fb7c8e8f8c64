use crate::model::{Staleness, Ticket};
use crate::mrkdwn;
use crate::newspaper::{
    ContentBlock, Page, SourceError, WriteError, Writer, WriterOutcome, DEFAULT_AUTHOR_NAME,
};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use itertools::Itertools;

const TOPIC: &str = "Code Review Market";

/// Access to tickets of the team's issue tracker. Implementations return the
/// complete result set per call; pagination is theirs to deal with.
#[async_trait]
pub trait TicketSource: Send + Sync {
    async fn tickets_awaiting_review(&self) -> Result<Vec<Ticket>, SourceError>;
}

/// Writes the page ranking tickets by how long they have been waiting for a
/// code review, most stale first.
pub struct CodeReviewMarket<S> {
    source: S,
    now: DateTime<FixedOffset>,
}

impl<S: TicketSource> CodeReviewMarket<S> {
    pub fn new(source: S, now: DateTime<FixedOffset>) -> Self {
        Self { source, now }
    }
}

#[async_trait]
impl<S: TicketSource> Writer for CodeReviewMarket<S> {
    fn topic(&self) -> &str {
        TOPIC
    }

    async fn write(&self) -> Result<WriterOutcome, WriteError> {
        let tickets = self
            .source
            .tickets_awaiting_review()
            .await
            .map_err(WriteError::TicketFetch)?;

        // Staleness is computed once per ticket; the sort is stable, so
        // tickets of equal staleness keep their fetch order.
        let mut ranked = tickets
            .iter()
            .map(|t| (t.staleness(self.now), t))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        let mut page = Page {
            headline_emoji: "chart_with_upwards_trend".to_string(),
            headline: TOPIC.to_string(),
            author: DEFAULT_AUTHOR_NAME.to_string(),
            content: Vec::new(),
        };

        if ranked.is_empty() {
            page.content.push(ContentBlock::Text(
                "Looks like there is no demand for code reviews today.".to_string(),
            ));
            return Ok(WriterOutcome::Page(page));
        }

        let mut lines = vec![
            "Here is a list of hot tickets which index of waiting for code review \
             is trending up. Hurry up before someone else reviews them ahead of you!"
                .to_string(),
            String::new(),
        ];
        lines.extend(ranked.iter().map(|(staleness, ticket)| {
            mrkdwn::bold(format!(
                "   {}   {}",
                mrkdwn::link(&ticket.id, &ticket.url),
                staleness_label(staleness),
            ))
        }));

        page.content.push(ContentBlock::Text(lines.iter().join("\n")));
        Ok(WriterOutcome::Page(page))
    }
}

fn staleness_label(staleness: &Staleness) -> String {
    match staleness.whole_days() {
        Some(days) => format!("+{}", plural(days, "day", "days")),
        None => "in review since who knows when".to_string(),
    }
}

fn plural(n: i64, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}
