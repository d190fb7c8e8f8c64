use crate::model::Ticket;
use crate::newspaper::{SourceError, TicketSource};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde_json::Value;

const SEARCH_PAGE_SIZE: usize = 50;

/// Jira changelog timestamps look like `2024-03-01T09:15:00.000+0800`.
const JIRA_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// A Jira project board queried over Jira's REST API with basic auth.
pub struct JiraBoard {
    http: Client,
    base_url: String,
    username: String,
    api_token: String,
    jql: String,
}

// Create
impl JiraBoard {
    pub fn new(
        base_url: impl ToString,
        username: impl ToString,
        api_token: impl ToString,
        project: &str,
        review_status: &str,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.to_string().trim_end_matches('/').to_string(),
            username: username.to_string(),
            api_token: api_token.to_string(),
            jql: format!(r#"project = "{project}" AND status = "{review_status}""#),
        }
    }
}

// Fetch
impl JiraBoard {
    async fn search_page(&self, start_at: usize) -> Result<Value, SourceError> {
        let response = self
            .http
            .get(format!("{}/rest/api/2/search", self.base_url))
            .basic_auth(&self.username, Some(&self.api_token))
            .query(&[
                ("jql", self.jql.clone()),
                ("startAt", start_at.to_string()),
                ("maxResults", SEARCH_PAGE_SIZE.to_string()),
                ("expand", "changelog".to_string()),
                ("fields", "summary,status".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl TicketSource for JiraBoard {
    /// Pages through the search results until the complete set is in hand;
    /// the core never sees a partial result.
    async fn tickets_awaiting_review(&self) -> Result<Vec<Ticket>, SourceError> {
        let mut tickets: Vec<Ticket> = Vec::new();
        loop {
            let payload = self.search_page(tickets.len()).await?;
            let (page, total) = parse_search_page(&payload, &self.base_url)?;
            if page.is_empty() {
                return Ok(tickets);
            }
            tickets.extend(page);
            if tickets.len() >= total {
                return Ok(tickets);
            }
        }
    }
}

fn parse_search_page(payload: &Value, base_url: &str) -> Result<(Vec<Ticket>, usize), SourceError> {
    let Some(total) = payload["total"].as_u64() else {
        return Err(SourceError::Payload(
            "search response has no 'total' field".to_string(),
        ));
    };
    let Some(issues) = payload["issues"].as_array() else {
        return Err(SourceError::Payload(
            "search response has no 'issues' field".to_string(),
        ));
    };

    let mut tickets = Vec::new();
    for issue in issues {
        let Some(key) = issue["key"].as_str() else {
            return Err(SourceError::Payload("issue has no 'key' field".to_string()));
        };
        let Some(summary) = issue["fields"]["summary"].as_str() else {
            return Err(SourceError::Payload(format!("issue {key} has no summary")));
        };
        let Some(status) = issue["fields"]["status"]["name"].as_str() else {
            return Err(SourceError::Payload(format!("issue {key} has no status")));
        };

        tickets.push(Ticket::new(
            key,
            format!("{base_url}/browse/{key}"),
            summary,
            status,
            transition_to_current_status(issue, status),
        ));
    }
    Ok((tickets, total as usize))
}

/// Walks the issue's changelog for the history entry that moved it into its
/// current status. Histories missing from the payload or carrying a
/// malformed timestamp yield `None`, which the ranking reports as unknown
/// staleness.
fn transition_to_current_status(issue: &Value, status: &str) -> Option<DateTime<FixedOffset>> {
    let histories = issue["changelog"]["histories"].as_array()?;
    for history in histories {
        let Some(items) = history["items"].as_array() else {
            continue;
        };
        let moved = items.iter().any(|item| {
            item["field"].as_str() == Some("status") && item["toString"].as_str() == Some(status)
        });
        if moved {
            let created = history["created"].as_str()?;
            return DateTime::parse_from_str(created, JIRA_TIME_FORMAT).ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SEARCH_PAGE: &str = r#"{
        "total": 2,
        "issues": [
            {
                "key": "MB-17",
                "fields": {
                    "summary": "Fix flaky push scheduler",
                    "status": {"name": "Awaiting Review"}
                },
                "changelog": {
                    "histories": [
                        {
                            "created": "2024-03-08T10:30:00.000+0800",
                            "items": [
                                {"field": "assignee", "toString": "someone"}
                            ]
                        },
                        {
                            "created": "2024-03-01T09:15:00.000+0800",
                            "items": [
                                {"field": "status", "toString": "Awaiting Review"}
                            ]
                        }
                    ]
                }
            },
            {
                "key": "MB-23",
                "fields": {
                    "summary": "Bump campaign SDK",
                    "status": {"name": "Awaiting Review"}
                },
                "changelog": {"histories": []}
            }
        ]
    }"#;

    #[test]
    fn parses_tickets_with_their_transition_timestamps() {
        let payload: Value = serde_json::from_str(SEARCH_PAGE).unwrap();
        let (tickets, total) = parse_search_page(&payload, "https://tracker.example.com").unwrap();

        assert_eq!(total, 2);
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].id, "MB-17");
        assert_eq!(tickets[0].url, "https://tracker.example.com/browse/MB-17");
        assert_eq!(tickets[0].summary, "Fix flaky push scheduler");
        assert_eq!(tickets[0].current_status, "Awaiting Review");
        assert_eq!(
            tickets[0].in_status_since,
            Some(
                FixedOffset::east_opt(8 * 3600)
                    .unwrap()
                    .with_ymd_and_hms(2024, 3, 1, 9, 15, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn missing_transition_history_yields_no_timestamp() {
        let payload: Value = serde_json::from_str(SEARCH_PAGE).unwrap();
        let (tickets, _) = parse_search_page(&payload, "https://tracker.example.com").unwrap();
        assert_eq!(tickets[1].in_status_since, None);
    }

    #[test]
    fn issue_without_status_is_a_payload_error() {
        let payload: Value = serde_json::from_str(
            r#"{"total": 1, "issues": [{"key": "MB-1", "fields": {"summary": "x"}}]}"#,
        )
        .unwrap();
        let err = parse_search_page(&payload, "http://x").unwrap_err();
        assert!(matches!(err, SourceError::Payload(_)));
    }
}
