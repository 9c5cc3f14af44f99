use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Structured log event with JSON serialization, recording the handful
/// of things the engine itself logs: per-segment transient/checkpoint
/// failures and per-cycle summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl LogEvent {
    pub fn new(component: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        LogEvent {
            timestamp: Utc::now(),
            level,
            component: component.into(),
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"timestamp":"{}","level":"{}","component":"{}","message":"{}"}}"#,
                self.timestamp.to_rfc3339(),
                self.level,
                self.component,
                self.message
            )
        })
    }

    pub fn to_text(&self) -> String {
        let mut output = format!(
            "[{}] {} {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level,
            self.component,
            self.message
        );

        if let Some(context) = &self.context {
            write!(output, " context={}", context).unwrap();
        }

        output
    }
}

/// Bounded in-memory event log, for the CLI demo and for tests that
/// want to assert on what the engine logged without capturing stderr.
pub struct EventLog {
    events: Vec<LogEvent>,
    max_size: usize,
}

impl EventLog {
    pub fn new(max_size: usize) -> Self {
        EventLog {
            events: Vec::new(),
            max_size,
        }
    }

    pub fn log(&mut self, event: LogEvent) {
        self.events.push(event);
        if self.events.len() > self.max_size {
            self.events.remove(0);
        }
    }

    pub fn get_events(&self) -> &[LogEvent] {
        &self.events
    }

    pub fn get_events_by_level(&self, level: LogLevel) -> Vec<&LogEvent> {
        self.events.iter().filter(|e| e.level == level).collect()
    }

    pub fn export_jsonl(&self) -> String {
        self.events
            .iter()
            .map(|e| e.to_json())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
