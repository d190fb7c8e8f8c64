use crate::model::event::{Classifier, EventKind};
use indexmap::IndexMap;
use serde_json::{from_str, Value};
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read calendars config: {0}")]
    Read(#[from] std::io::Error),
    #[error("could not parse calendars config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid calendars config: {0}")]
    Invalid(String),
}

/// One calendar the forecast keeps an eye on. Entries keep the order they
/// appear in within the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredCalendar {
    pub name: String,
    pub id: String,
    pub classifier: Classifier,
}

// Create
impl MonitoredCalendar {
    pub fn from_config(path: &str) -> Result<Vec<Self>, ConfigError> {
        let json_str = fs::read_to_string(path)?;
        Self::parse(&json_str)
    }

    fn new(name: impl ToString, id: impl ToString, classifier: Classifier) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
            classifier,
        }
    }
}

// Parser
impl MonitoredCalendar {
    fn parse(json_str: &str) -> Result<Vec<Self>, ConfigError> {
        let elements: IndexMap<String, Value> = from_str(json_str)?;
        let mut result = Vec::new();
        for (name, details) in elements {
            let Some(id) = details["id"].as_str() else {
                return Err(ConfigError::Invalid(format!(
                    "calendar '{name}' has no 'id' field"
                )));
            };
            let Some(kind) = details["kind"].as_str() else {
                return Err(ConfigError::Invalid(format!(
                    "calendar '{name}' has no 'kind' field"
                )));
            };
            let Some(kind) = EventKind::from_config_name(kind) else {
                return Err(ConfigError::Invalid(format!(
                    "calendar '{name}' has an unsupported kind: {kind}"
                )));
            };
            let classifier = match details["title-tag"].as_str() {
                Some(needle) => Classifier::TitleContains {
                    needle: needle.to_string(),
                    kind,
                },
                None => Classifier::Always(kind),
            };
            result.push(Self::new(name, id, classifier));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "CRM Dispatches": {
            "id": "dispatches@group.calendar.google.com",
            "kind": "push-notification",
            "title-tag": "[PN]"
        },
        "Campaigns": {
            "id": "campaigns@group.calendar.google.com",
            "kind": "campaign"
        },
        "Dev Milestones": {
            "id": "milestones@group.calendar.google.com",
            "kind": "code-freeze",
            "title-tag": "code freeze"
        }
    }"#;

    #[test]
    fn parses_calendars_in_file_order() {
        let calendars = MonitoredCalendar::parse(CONFIG).unwrap();
        assert_eq!(
            calendars,
            vec![
                MonitoredCalendar::new(
                    "CRM Dispatches",
                    "dispatches@group.calendar.google.com",
                    Classifier::TitleContains {
                        needle: "[PN]".to_string(),
                        kind: EventKind::PushNotification,
                    },
                ),
                MonitoredCalendar::new(
                    "Campaigns",
                    "campaigns@group.calendar.google.com",
                    Classifier::Always(EventKind::Campaign),
                ),
                MonitoredCalendar::new(
                    "Dev Milestones",
                    "milestones@group.calendar.google.com",
                    Classifier::TitleContains {
                        needle: "code freeze".to_string(),
                        kind: EventKind::CodeFreeze,
                    },
                ),
            ]
        );
    }

    #[test]
    fn rejects_entry_without_id() {
        let err = MonitoredCalendar::parse(r#"{"Campaigns": {"kind": "campaign"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unsupported_kind() {
        let err = MonitoredCalendar::parse(r#"{"X": {"id": "x", "kind": "holiday"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
