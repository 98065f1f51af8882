// Alert events written to the alert log

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Timestamp format inside the `[...]` prefix of alert-log lines.
pub const ALERT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Warning,
    Critical,
    ServiceDown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    /// Metric key ("load", "memory", ...) or service name for `ServiceDown`.
    pub metric: String,
    /// Observed value, formatted with its unit.
    pub value: String,
    /// Threshold that was exceeded; `None` for `ServiceDown`.
    pub threshold: Option<String>,
    pub timestamp: DateTime<Local>,
}

impl AlertEvent {
    pub fn message(&self) -> String {
        match self.kind {
            AlertKind::ServiceDown => format!("Service {} is {}", self.metric, self.value),
            AlertKind::Warning | AlertKind::Critical => {
                let level = if self.kind == AlertKind::Critical {
                    "CRITICAL"
                } else {
                    "WARNING"
                };
                match &self.threshold {
                    Some(t) => format!("{} {} at {} (threshold {})", level, self.metric, self.value, t),
                    None => format!("{} {} at {}", level, self.metric, self.value),
                }
            }
        }
    }

    /// `[timestamp] ALERT: <message>`, one line, no trailing newline.
    pub fn log_line(&self) -> String {
        format!(
            "[{}] ALERT: {}",
            self.timestamp.format(ALERT_TIME_FORMAT),
            self.message()
        )
    }
}
