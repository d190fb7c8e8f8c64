use crate::mrkdwn;
use crate::newspaper::{ContentBlock, Issue, PublishError, Publisher};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// A Slack channel the newspaper gets delivered to, via `chat.postMessage`.
pub struct SlackChannel {
    http: Client,
    api_token: String,
    channel_id: String,
}

// Create
impl SlackChannel {
    pub fn new(api_token: impl ToString, channel_id: impl ToString) -> Self {
        Self {
            http: Client::new(),
            api_token: api_token.to_string(),
            channel_id: channel_id.to_string(),
        }
    }
}

#[async_trait]
impl Publisher for SlackChannel {
    async fn publish(&self, issue: Issue) -> Result<(), PublishError> {
        let response = self
            .http
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.api_token)
            .json(&json!({
                "channel": self.channel_id,
                "blocks": issue_blocks(&issue),
            }))
            .send()
            .await?
            .error_for_status()?;
        let payload = response.json::<Value>().await?;

        // Slack reports application failures inside a 200 response.
        if payload["ok"].as_bool() != Some(true) {
            let reason = payload["error"].as_str().unwrap_or("unknown error");
            return Err(PublishError::Rejected(reason.to_string()));
        }
        Ok(())
    }
}

/// Turns the issue's pages into Slack message blocks: a headline header,
/// the content sections, an author context line and a divider per page,
/// with a small empty space before the first page and after the last one.
fn issue_blocks(issue: &Issue) -> Vec<Value> {
    let mut blocks = vec![spacer()];

    for page in issue {
        blocks.push(json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("{} {}", mrkdwn::emoji(&page.headline_emoji), page.headline),
            },
        }));

        for content in &page.content {
            let ContentBlock::Text(text) = content;
            blocks.push(section(text));
        }

        blocks.push(json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": mrkdwn::italic(format!("By {}", page.author)),
            }],
        }));
        blocks.push(json!({"type": "divider"}));
    }

    blocks.push(spacer());
    blocks
}

fn section(text: &str) -> Value {
    json!({
        "type": "section",
        "text": {"type": "mrkdwn", "text": text},
    })
}

fn spacer() -> Value {
    section(" ")
}
