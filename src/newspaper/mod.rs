pub mod codereview;
pub mod release;

pub use codereview::CodeReviewMarket;
pub use codereview::TicketSource;
pub use release::CalendarSource;
pub use release::ReleaseForecast;

use async_trait::async_trait;
use futures::future;
use thiserror::Error;

pub(crate) const DEFAULT_AUTHOR_NAME: &str = "The Gazette Newsroom";

/// A page of the newspaper, its main building block. Rendering-agnostic: the
/// publisher decides how headline, author and content appear in the
/// destination's markup.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub headline_emoji: String,
    pub headline: String,
    pub author: String,
    pub content: Vec<ContentBlock>,
}

/// A rendering primitive of a page. Writers currently only ever emit text,
/// but a page carries an ordered list of these.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(String),
}

/// A collection of pages that forms one issue of the newspaper.
pub type Issue = Vec<Page>;

/// What a writer handed in for today's issue.
#[derive(Debug, Clone, PartialEq)]
pub enum WriterOutcome {
    Page(Page),
    /// The writer has nothing to report today. Not a fault; the editor
    /// simply moves on to the next writer.
    Declined,
}

#[async_trait]
pub trait Writer: Send + Sync {
    /// The topic the writer covers, used to attribute failures.
    fn topic(&self) -> &str;

    async fn write(&self) -> Result<WriterOutcome, WriteError>;
}

#[async_trait]
pub trait Publisher {
    async fn publish(&self, issue: Issue) -> Result<(), PublishError>;
}

/// Failure of a concrete source collaborator while fetching its signals.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected payload: {0}")]
    Payload(String),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("could not fetch tickets awaiting review")]
    TicketFetch(#[source] SourceError),
    #[error("could not fetch calendar events from \"{calendar}\"")]
    CalendarFetch {
        calendar: String,
        #[source]
        source: SourceError,
    },
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat API rejected the message: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum EditionError {
    #[error("writer of \"{topic}\" failed")]
    Write {
        topic: String,
        #[source]
        source: WriteError,
    },
    #[error("could not publish the issue")]
    Publish(#[source] PublishError),
}

/// Prepares an issue of the newspaper from the pages supplied by the writers
/// and publishes it.
///
/// Writers are dispatched concurrently, and their outcomes are collected in
/// declaration order: page order in the issue equals writer order, and the
/// first failure by declaration order is the one surfaced. A declined writer
/// contributes nothing; a failed writer aborts the run before anything is
/// published.
pub async fn edit_and_publish<P: Publisher>(
    publisher: &P,
    writers: &[Box<dyn Writer>],
) -> Result<(), EditionError> {
    let outcomes = future::join_all(writers.iter().map(|w| w.write())).await;

    let mut issue = Issue::new();
    for (writer, outcome) in writers.iter().zip(outcomes) {
        match outcome {
            Ok(WriterOutcome::Page(page)) => issue.push(page),
            Ok(WriterOutcome::Declined) => continue,
            Err(err) => {
                return Err(EditionError::Write {
                    topic: writer.topic().to_string(),
                    source: err,
                })
            }
        }
    }

    publisher.publish(issue).await.map_err(EditionError::Publish)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    fn page(headline: &str) -> Page {
        Page {
            headline_emoji: "newspaper".to_string(),
            headline: headline.to_string(),
            author: DEFAULT_AUTHOR_NAME.to_string(),
            content: vec![ContentBlock::Text("...".to_string())],
        }
    }

    struct PageWriter {
        topic: String,
        delay: Duration,
    }

    impl PageWriter {
        fn new(topic: &str) -> Self {
            Self {
                topic: topic.to_string(),
                delay: Duration::ZERO,
            }
        }

        fn slow(topic: &str, delay: Duration) -> Self {
            Self {
                topic: topic.to_string(),
                delay,
            }
        }
    }

    #[async_trait]
    impl Writer for PageWriter {
        fn topic(&self) -> &str {
            &self.topic
        }

        async fn write(&self) -> Result<WriterOutcome, WriteError> {
            tokio::time::sleep(self.delay).await;
            Ok(WriterOutcome::Page(page(&self.topic)))
        }
    }

    struct DecliningWriter;

    #[async_trait]
    impl Writer for DecliningWriter {
        fn topic(&self) -> &str {
            "nothing today"
        }

        async fn write(&self) -> Result<WriterOutcome, WriteError> {
            Ok(WriterOutcome::Declined)
        }
    }

    struct FailingWriter;

    #[async_trait]
    impl Writer for FailingWriter {
        fn topic(&self) -> &str {
            "doomed"
        }

        async fn write(&self) -> Result<WriterOutcome, WriteError> {
            Err(WriteError::TicketFetch(SourceError::Payload(
                "boom".to_string(),
            )))
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<Issue>>,
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        async fn publish(&self, issue: Issue) -> Result<(), PublishError> {
            self.published.lock().unwrap().push(issue);
            Ok(())
        }
    }

    struct BrokenPress;

    #[async_trait]
    impl Publisher for BrokenPress {
        async fn publish(&self, _: Issue) -> Result<(), PublishError> {
            Err(PublishError::Rejected("channel_not_found".to_string()))
        }
    }

    #[tokio::test]
    async fn pages_keep_writer_declaration_order() {
        // The first writer finishes last; declaration order must still win.
        let writers: Vec<Box<dyn Writer>> = vec![
            Box::new(PageWriter::slow("first", Duration::from_millis(50))),
            Box::new(PageWriter::new("second")),
            Box::new(PageWriter::new("third")),
        ];
        let publisher = RecordingPublisher::default();

        edit_and_publish(&publisher, &writers).await.unwrap();

        let published = publisher.published.lock().unwrap();
        let headlines = published[0]
            .iter()
            .map(|p| p.headline.as_str())
            .collect::<Vec<_>>();
        assert_eq!(headlines, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn declined_writer_is_skipped_without_aborting() {
        let writers: Vec<Box<dyn Writer>> = vec![
            Box::new(PageWriter::new("first")),
            Box::new(DecliningWriter),
            Box::new(PageWriter::new("third")),
        ];
        let publisher = RecordingPublisher::default();

        edit_and_publish(&publisher, &writers).await.unwrap();

        let published = publisher.published.lock().unwrap();
        assert_eq!(published[0].len(), 2);
    }

    #[tokio::test]
    async fn failing_writer_aborts_the_run_before_publishing() {
        let writers: Vec<Box<dyn Writer>> = vec![
            Box::new(PageWriter::new("first")),
            Box::new(FailingWriter),
        ];
        let publisher = RecordingPublisher::default();

        let err = edit_and_publish(&publisher, &writers).await.unwrap_err();

        assert!(matches!(err, EditionError::Write { ref topic, .. } if topic == "doomed"));
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_writer_list_publishes_an_empty_issue() {
        let publisher = RecordingPublisher::default();

        edit_and_publish(&publisher, &[]).await.unwrap();

        let published = publisher.published.lock().unwrap();
        assert_eq!(published[0], Issue::new());
    }

    #[tokio::test]
    async fn publish_failure_is_the_run_error() {
        let writers: Vec<Box<dyn Writer>> = vec![Box::new(PageWriter::new("first"))];

        let err = edit_and_publish(&BrokenPress, &writers).await.unwrap_err();

        assert!(matches!(err, EditionError::Publish(_)));
    }
}
