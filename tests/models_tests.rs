// Artifact shape and serialization tests

mod common;

use homewatch::models::*;

fn document(snapshot: MetricSnapshot) -> MetricsDocument {
    MetricsDocument {
        snapshot,
        alerts: AlertSummary {
            count: 2,
            recent: "[2026-01-01 00:00:00] ALERT: a|[2026-01-01 00:00:30] ALERT: b".into(),
        },
        updated: "2026-01-01T00:00:30+00:00".into(),
    }
}

#[test]
fn test_metrics_document_field_names() {
    let json = serde_json::to_value(document(common::calm_snapshot())).unwrap();
    for key in ["cpu", "memory", "disk", "gpu", "uptime", "network", "services", "alerts"] {
        assert!(json.get(key).is_some(), "missing top-level key {}", key);
    }
    assert!(json["cpu"]["load"].is_f64());
    assert!(json["cpu"]["cores"].is_u64());
    assert!(json["memory"]["used"].is_u64());
    assert!(json["memory"]["total"].is_u64());
    assert!(json["memory"]["percent"].is_u64());
    assert!(json["disk"]["percent"].is_u64());
    assert!(json["disk"]["available"].is_string());
    assert!(json["uptime"]["text"].is_string());
    assert!(json["uptime"]["days"].is_u64());
    assert!(json["network"]["connections"].is_u64());
    assert_eq!(json["services"]["docker"], "active");
    assert!(json["alerts"]["count"].is_u64());
    assert!(json["alerts"]["recent"].is_string());
}

#[test]
fn test_metrics_document_roundtrip_preserves_types() {
    let mut snapshot = common::calm_snapshot();
    snapshot.cpu.load = 3.17;
    snapshot.memory.percent = 83;
    snapshot
        .services
        .insert("ollama".into(), ServiceStatus::Unknown);
    let doc = document(snapshot);

    let json = serde_json::to_string(&doc).unwrap();
    let back: MetricsDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
    assert_eq!(back.snapshot.cpu.load, 3.17);
    assert_eq!(back.snapshot.memory.percent, 83u8);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["memory"]["percent"], serde_json::json!(83));
    assert!(value["memory"]["percent"].is_u64());
}

#[test]
fn test_gpu_sentinel_is_never_null() {
    let mut snapshot = common::calm_snapshot();
    snapshot.gpu = GpuStats::UNAVAILABLE;
    let json = serde_json::to_value(document(snapshot.clone())).unwrap();
    assert_eq!(json["gpu"]["temp"], serde_json::json!(GPU_UNAVAILABLE));
    assert_eq!(json["gpu"]["util"], serde_json::json!(-1));
    assert_eq!(json["gpu"]["mem"], serde_json::json!(-1));

    let back: MetricsDocument = serde_json::from_value(json).unwrap();
    assert_eq!(back.snapshot.gpu, GpuStats::UNAVAILABLE);
    assert_eq!(back.snapshot, snapshot);
}

#[test]
fn test_unknown_service_state_reads_as_unknown() {
    let status: ServiceStatus = serde_json::from_str("\"activating\"").unwrap();
    assert_eq!(status, ServiceStatus::Unknown);
}

#[test]
fn test_snapshot_equality_counts_gpu_sentinel() {
    let a = common::calm_snapshot();
    let mut b = a.clone();
    assert_eq!(a, b);
    b.gpu.temp = None;
    assert_ne!(a, b);
}

#[test]
fn test_news_item_camel_case_fields() {
    let item = NewsItem {
        source: "bbc".into(),
        title: "Headline".into(),
        url: "https://example.com/a".into(),
        bias_score: -3,
        bias_label: "Center".into(),
        category: Category::World,
        timestamp: "2026-01-01T00:00:00+00:00".into(),
    };
    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["biasScore"], -3);
    assert_eq!(json["biasLabel"], "Center");
    assert_eq!(json["category"], "world");
    assert!(json.get("bias_score").is_none());
}

#[test]
fn test_news_titles_with_quotes_newlines_and_unicode_survive() {
    let titles = [
        r#"Minister says "no comment" on \ leak"#,
        "Line one\nline two\r\n",
        "東京 stocks rally 📈 as yen slides",
        "Tab\tand </script> and \u{0000} nul",
    ];
    let items: Vec<NewsItem> = titles
        .iter()
        .map(|t| NewsItem {
            source: "test".into(),
            title: t.to_string(),
            url: "https://example.com/?a=1&b=\"2\"".into(),
            bias_score: 0,
            bias_label: "Center".into(),
            category: Category::Technology,
            timestamp: "2026-01-01T00:00:00+00:00".into(),
        })
        .collect();
    let json = serde_json::to_string(&items).unwrap();
    let back: Vec<NewsItem> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, items);
}

#[test]
fn test_alert_log_line_format() {
    use chrono::TimeZone;
    let event = AlertEvent {
        kind: AlertKind::Critical,
        metric: "disk".into(),
        value: "95%".into(),
        threshold: Some("90%".into()),
        timestamp: chrono::Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap(),
    };
    assert_eq!(
        event.log_line(),
        "[2026-03-04 05:06:07] ALERT: CRITICAL disk at 95% (threshold 90%)"
    );

    let down = AlertEvent {
        kind: AlertKind::ServiceDown,
        metric: "docker".into(),
        value: "inactive".into(),
        threshold: None,
        timestamp: event.timestamp,
    };
    assert!(down.log_line().ends_with("ALERT: Service docker is inactive"));
}
