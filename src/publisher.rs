// JSON artifacts for the dashboard and terminal view. Every write is a full overwrite
// via a sibling temp file and rename; readers never see a merged document.
// Readers polling on filesystems without atomic rename may still catch a partial file.

use crate::config::PathsConfig;
use crate::error::PublishError;
use crate::models::{MetricsDocument, NewsItem, NewsMeta};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct ArtifactPublisher {
    metrics_path: PathBuf,
    news_path: PathBuf,
    news_meta_path: PathBuf,
}

impl ArtifactPublisher {
    pub fn new(metrics_path: PathBuf, news_path: PathBuf, news_meta_path: PathBuf) -> Self {
        Self {
            metrics_path,
            news_path,
            news_meta_path,
        }
    }

    pub fn from_paths(paths: &PathsConfig) -> Self {
        Self::new(paths.metrics_json(), paths.news_json(), paths.news_meta_json())
    }

    /// All artifacts (and the alert log) in one directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(
            dir.join("metrics.json"),
            dir.join("news.json"),
            dir.join("news_meta.json"),
        )
    }

    pub fn metrics_path(&self) -> &Path {
        &self.metrics_path
    }

    pub fn news_path(&self) -> &Path {
        &self.news_path
    }

    pub fn news_meta_path(&self) -> &Path {
        &self.news_meta_path
    }

    /// Creates parent directories of every artifact. Failure here is fatal at start-up.
    pub async fn ensure_dirs(&self) -> Result<(), PublishError> {
        for path in [&self.metrics_path, &self.news_path, &self.news_meta_path] {
            ensure_parent(path).await?;
        }
        Ok(())
    }

    #[instrument(skip_all, fields(operation = "publish_metrics"))]
    pub async fn publish_metrics(&self, doc: &MetricsDocument) -> Result<(), PublishError> {
        write_json(&self.metrics_path, "metrics", doc).await
    }

    #[instrument(skip_all, fields(operation = "publish_news", items = items.len()))]
    pub async fn publish_news(&self, items: &[NewsItem]) -> Result<(), PublishError> {
        write_json(&self.news_path, "news", items).await
    }

    #[instrument(skip_all, fields(operation = "publish_news_meta"))]
    pub async fn publish_news_meta(&self, meta: &NewsMeta) -> Result<(), PublishError> {
        write_json(&self.news_meta_path, "news metadata", meta).await
    }
}

pub async fn ensure_parent(path: &Path) -> Result<(), PublishError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| PublishError::Io {
                path: parent.to_path_buf(),
                source,
            }),
        _ => Ok(()),
    }
}

async fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    what: &'static str,
    value: &T,
) -> Result<(), PublishError> {
    let mut body = serde_json::to_vec_pretty(value)
        .map_err(|source| PublishError::Serialize { what, source })?;
    body.push(b'\n');

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &body)
        .await
        .map_err(|source| PublishError::Io {
            path: tmp.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| PublishError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), bytes = body.len(), "artifact written");
    Ok(())
}

/// Reads an artifact back (status command, tests).
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
