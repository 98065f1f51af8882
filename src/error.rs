// Error types at module seams. Collection failures never surface here: they degrade
// to defaults inside the collector.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Writing an artifact or the alert log failed; downstream readers will see stale data.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("serializing {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failed alert-loop tick, tagged with the step that failed.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("appending alert log: {0}")]
    AlertLog(#[source] PublishError),

    #[error("publishing metrics: {0}")]
    Publish(#[source] PublishError),
}

impl TickError {
    /// Value for the `operation` log field.
    pub fn operation(&self) -> &'static str {
        match self {
            TickError::AlertLog(_) => "append_alert_log",
            TickError::Publish(_) => "publish_metrics",
        }
    }
}

/// One news source could not be fetched; the aggregator skips it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("empty response")]
    Empty,
}

/// A fetched body did not match the source's parse strategy.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}
