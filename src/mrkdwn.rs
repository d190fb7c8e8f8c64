//! Formatting helpers for Slack's mrkdwn dialect.

pub fn bold(s: impl AsRef<str>) -> String {
    format!("*{}*", s.as_ref())
}

pub fn italic(s: impl AsRef<str>) -> String {
    format!("_{}_", s.as_ref())
}

pub fn link(s: impl AsRef<str>, url: impl AsRef<str>) -> String {
    format!("<{}|{}>", url.as_ref(), s.as_ref())
}

pub fn emoji(name: impl AsRef<str>) -> String {
    format!(":{}:", name.as_ref())
}
