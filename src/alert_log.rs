// Append-only alert log: one `[timestamp] ALERT: <message>` line per event.
// Rotation and cleanup belong to whoever owns the file outside this process.

use crate::error::PublishError;
use crate::models::{AlertEvent, AlertSummary};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Bytes read per step when scanning the log for newlines.
const READ_CHUNK: usize = 8 * 1024;

pub struct AlertLog {
    path: PathBuf,
    /// Line count as of `len` bytes, so each summary only scans what was added since.
    counted: Option<Counted>,
}

#[derive(Debug, Clone, Copy)]
struct Counted {
    lines: u64,
    len: u64,
}

impl AlertLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            counted: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends every event; no-op (and no file creation) for an empty slice.
    pub async fn append(&mut self, events: &[AlertEvent]) -> Result<(), PublishError> {
        if events.is_empty() {
            return Ok(());
        }
        let mut buf = String::new();
        for event in events {
            buf.push_str(&event.log_line());
            buf.push('\n');
        }
        let io_err = |source| PublishError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;
        file.write_all(buf.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }

    /// Line count and the last `recent` lines joined with `|`. A missing log is empty.
    /// Only the tail and bytes appended since the previous call are read.
    pub async fn summary(&mut self, recent: usize) -> AlertSummary {
        match self.try_summary(recent).await {
            Ok(summary) => summary,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.counted = None;
                AlertSummary::default()
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "alert_summary",
                    path = %self.path.display(),
                    "alert log unreadable"
                );
                AlertSummary::default()
            }
        }
    }

    async fn try_summary(&mut self, recent: usize) -> std::io::Result<AlertSummary> {
        let mut file = File::open(&self.path).await?;
        let len = file.metadata().await?.len();

        // a shorter file was rotated or truncated underneath us: recount from the start
        let from = match self.counted {
            Some(c) if c.len <= len => c,
            _ => Counted { lines: 0, len: 0 },
        };
        let lines = from.lines + count_newlines(&mut file, from.len, len).await?;
        self.counted = Some(Counted { lines, len });

        let tail = read_tail(&mut file, len, recent).await?;
        Ok(AlertSummary {
            count: lines,
            recent: tail.join("|"),
        })
    }
}

async fn count_newlines(file: &mut File, start: u64, end: u64) -> std::io::Result<u64> {
    file.seek(SeekFrom::Start(start)).await?;
    let mut remaining = end - start;
    let mut buf = vec![0u8; READ_CHUNK];
    let mut count = 0;
    while remaining > 0 {
        let want = remaining.min(READ_CHUNK as u64) as usize;
        let n = file.read(&mut buf[..want]).await?;
        if n == 0 {
            break;
        }
        count += buf[..n].iter().filter(|b| **b == b'\n').count() as u64;
        remaining -= n as u64;
    }
    Ok(count)
}

/// Last `n` non-empty lines of the first `len` bytes, read backwards in chunks.
async fn read_tail(file: &mut File, len: u64, n: usize) -> std::io::Result<Vec<String>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut pos = len;
    let mut tail: Vec<u8> = Vec::new();
    // n + 1 newlines guarantee n complete lines even if the first chunk starts mid-line
    while pos > 0 && tail.iter().filter(|b| **b == b'\n').count() <= n {
        let step = pos.min(READ_CHUNK as u64);
        pos -= step;
        file.seek(SeekFrom::Start(pos)).await?;
        let mut chunk = vec![0u8; step as usize];
        file.read_exact(&mut chunk).await?;
        chunk.extend_from_slice(&tail);
        tail = chunk;
    }

    // when the read stopped mid-file the first line may be a fragment
    let body = match (pos, tail.iter().position(|b| *b == b'\n')) {
        (0, _) => &tail[..],
        (_, Some(i)) => &tail[i + 1..],
        (_, None) => &tail[..0],
    };
    let text = String::from_utf8_lossy(body);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].iter().map(|l| l.to_string()).collect())
}
