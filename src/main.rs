mod google;
mod jira;
mod model;
mod mrkdwn;
mod newspaper;
mod slack;
mod utils;

use crate::google::GoogleCalendar;
use crate::jira::JiraBoard;
use crate::model::MonitoredCalendar;
use crate::newspaper::{
    edit_and_publish, CalendarSource, CodeReviewMarket, ReleaseForecast, Writer,
};
use crate::slack::SlackChannel;
use crate::utils::MultiProgressExt;
use anyhow::Context;
use chrono::{FixedOffset, Utc};
use clap::Parser;
use indicatif::MultiProgress;

#[derive(Parser, Debug, Clone)]
struct Args {
    /// Config file listing the calendars the forecast watches.
    #[arg(long = "calendars", default_value = "calendars.json")]
    calendars_path: String,
    #[arg(long, env = "JIRA_BASE_URL")]
    jira_base_url: String,
    #[arg(long, env = "JIRA_USERNAME")]
    jira_username: String,
    #[arg(long, env = "JIRA_API_TOKEN")]
    jira_api_token: String,
    #[arg(long, env = "JIRA_PROJECT")]
    jira_project: String,
    #[arg(long, env = "REVIEW_STATUS", default_value = "Awaiting Review")]
    review_status: String,
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN")]
    google_access_token: String,
    #[arg(long, env = "SLACK_API_TOKEN")]
    slack_api_token: String,
    #[arg(long, env = "SLACK_CHANNEL_ID")]
    slack_channel_id: String,
    /// The team's UTC offset in hours; defines "today" and how event times
    /// are rendered.
    #[arg(long, env = "TEAM_UTC_OFFSET_HOURS", default_value_t = 8)]
    utc_offset_hours: i32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    run(&args).await
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let offset = FixedOffset::east_opt(args.utc_offset_hours * 3600)
        .context("the UTC offset is out of range")?;
    let now = Utc::now().with_timezone(&offset);

    let multi_progress = MultiProgress::new();

    let config_pb = multi_progress.add_message_spinner();
    config_pb.set_message(format!("Reading `{}` ...", args.calendars_path));
    let monitored = MonitoredCalendar::from_config(&args.calendars_path)
        .context("could not load the monitored calendars")?;
    config_pb.finish_with_message(format!(
        "✅ Watching {} calendars for release risks",
        monitored.len()
    ));

    let board = JiraBoard::new(
        &args.jira_base_url,
        &args.jira_username,
        &args.jira_api_token,
        &args.jira_project,
        &args.review_status,
    );
    let calendars = monitored
        .into_iter()
        .map(|calendar| {
            Box::new(GoogleCalendar::new(calendar, &args.google_access_token))
                as Box<dyn CalendarSource>
        })
        .collect::<Vec<_>>();

    let writers: Vec<Box<dyn Writer>> = vec![
        Box::new(CodeReviewMarket::new(board, now)),
        Box::new(ReleaseForecast::new(calendars, now)),
    ];
    let channel = SlackChannel::new(&args.slack_api_token, &args.slack_channel_id);

    let edition_pb = multi_progress.add_message_spinner();
    edition_pb.set_message("Writing and publishing today's issue ...");
    edit_and_publish(&channel, &writers)
        .await
        .context("could not deliver today's issue")?;
    edition_pb.finish_with_message("✅ Today's issue is out");

    Ok(())
}
