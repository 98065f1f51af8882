// Artifact writes and the alert log

use chrono::TimeZone;
use homewatch::alert_log::AlertLog;
use homewatch::models::*;
use homewatch::publisher::{ArtifactPublisher, read_json};

fn event(metric: &str, value: &str) -> AlertEvent {
    AlertEvent {
        kind: AlertKind::Warning,
        metric: metric.into(),
        value: value.into(),
        threshold: Some("80%".into()),
        timestamp: chrono::Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn artifacts_are_replaced_whole() {
    let dir = tempfile::TempDir::new().unwrap();
    let publisher = ArtifactPublisher::in_dir(dir.path());

    let meta = |count| NewsMeta {
        updated: "2024-05-01T12:00:00+00:00".into(),
        count,
        sources: Default::default(),
    };
    publisher.publish_news_meta(&meta(10)).await.unwrap();
    publisher.publish_news_meta(&meta(3)).await.unwrap();

    let back: NewsMeta = read_json(publisher.news_meta_path()).await.unwrap();
    assert_eq!(back, meta(3));

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["news_meta.json".to_string()]);
}

#[tokio::test]
async fn ensure_dirs_creates_nested_parents() {
    let dir = tempfile::TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let publisher = ArtifactPublisher::in_dir(&nested);
    publisher.ensure_dirs().await.unwrap();
    publisher.publish_news(&[]).await.unwrap();
    assert_eq!(std::fs::read_to_string(nested.join("news.json")).unwrap(), "[]\n");
}

#[tokio::test]
async fn alert_log_appends_and_summarises() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut log = AlertLog::new(dir.path().join("alerts.log"));

    assert_eq!(log.summary(5).await, AlertSummary::default());
    log.append(&[]).await.unwrap();
    assert!(!log.path().exists());

    log.append(&[event("memory", "81%"), event("disk", "82%")]).await.unwrap();
    log.append(&[event("disk", "83%")]).await.unwrap();

    let content = std::fs::read_to_string(log.path()).unwrap();
    assert_eq!(
        content.lines().next(),
        Some("[2024-05-01 12:00:00] ALERT: WARNING memory at 81% (threshold 80%)")
    );

    let summary = log.summary(2).await;
    assert_eq!(summary.count, 3);
    assert_eq!(
        summary.recent,
        "[2024-05-01 12:00:00] ALERT: WARNING disk at 82% (threshold 80%)|\
         [2024-05-01 12:00:00] ALERT: WARNING disk at 83% (threshold 80%)"
    );
}

#[tokio::test]
async fn summary_tail_spans_read_chunks() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut log = AlertLog::new(dir.path().join("alerts.log"));

    // ~70 bytes a line, well past a single read chunk
    let events: Vec<AlertEvent> = (0..600).map(|i| event("disk", &format!("{}%", i))).collect();
    log.append(&events).await.unwrap();

    let summary = log.summary(3).await;
    assert_eq!(summary.count, 600);
    let recent: Vec<&str> = summary.recent.split('|').collect();
    assert_eq!(recent.len(), 3);
    assert!(recent[0].ends_with("WARNING disk at 597% (threshold 80%)"));
    assert!(recent[2].ends_with("WARNING disk at 599% (threshold 80%)"));
    assert!(recent.iter().all(|l| l.starts_with("[2024-05-01 12:00:00] ALERT: ")));

    assert_eq!(log.summary(0).await.recent, "");
    assert_eq!(log.summary(1000).await.recent.split('|').count(), 600);
}

#[tokio::test]
async fn summary_count_follows_appends_and_rotation() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("alerts.log");
    let mut log = AlertLog::new(&path);

    log.append(&[event("memory", "81%"), event("memory", "82%")]).await.unwrap();
    assert_eq!(log.summary(5).await.count, 2);

    log.append(&[event("memory", "83%")]).await.unwrap();
    // another writer appending to the same file
    let mut other = AlertLog::new(&path);
    other.append(&[event("disk", "84%")]).await.unwrap();
    let summary = log.summary(1).await;
    assert_eq!(summary.count, 4);
    assert!(summary.recent.contains("disk at 84%"));

    // rotated away and restarted
    std::fs::write(&path, "").unwrap();
    log.append(&[event("load", "6.50")]).await.unwrap();
    let summary = log.summary(5).await;
    assert_eq!(summary.count, 1);
    assert!(summary.recent.contains("load at 6.50"));

    std::fs::remove_file(&path).unwrap();
    assert_eq!(log.summary(5).await, AlertSummary::default());
}
