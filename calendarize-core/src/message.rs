//! User-facing messages accumulated during an import run.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub severity: Severity,
    pub title: String,
    pub body: String,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.title, self.body)
    }
}

/// Ordered message queue. Every message is also sent to the log.
#[derive(Debug, Default, Clone)]
pub struct Messages {
    messages: Vec<Message>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, title: &str, body: impl Into<String>) {
        self.push(Severity::Info, title, body.into());
    }

    pub fn warning(&mut self, title: &str, body: impl Into<String>) {
        self.push(Severity::Warning, title, body.into());
    }

    pub fn error(&mut self, title: &str, body: impl Into<String>) {
        self.push(Severity::Error, title, body.into());
    }

    fn push(&mut self, severity: Severity, title: &str, body: String) {
        match severity {
            Severity::Info => log::info!("{}: {}", title, body),
            Severity::Warning => log::warn!("{}: {}", title, body),
            Severity::Error => log::error!("{}: {}", title, body),
        }
        self.messages.push(Message {
            severity,
            title: title.to_string(),
            body,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.messages.iter().filter(|m| m.severity == severity).count()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_vec(self) -> Vec<Message> {
        self.messages
    }
}
