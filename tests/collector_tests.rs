// Live collection on the test host: must degrade, never fail

use homewatch::collector::{Collector, SystemCollector, read_gpu, read_services};
use homewatch::config::MonitoringConfig;
use homewatch::models::{GpuStats, ServiceStatus};
use homewatch::thresholds::evaluate;
use std::time::Duration;

fn config() -> MonitoringConfig {
    MonitoringConfig {
        services: vec!["homewatch-test-no-such-unit".into()],
        command_timeout_secs: 2,
        ..MonitoringConfig::default()
    }
}

#[tokio::test]
async fn missing_gpu_tool_reads_as_unavailable() {
    let gpu = read_gpu("homewatch-test-no-such-binary", Duration::from_secs(1)).await;
    assert_eq!(gpu, GpuStats::UNAVAILABLE);
}

#[tokio::test]
async fn unknown_unit_is_never_active() {
    let names = vec!["homewatch-test-no-such-unit".to_string()];
    let services = read_services(&names, Duration::from_secs(2)).await;
    assert_eq!(services.len(), 1);
    assert_ne!(services[&names[0]], ServiceStatus::Active);
}

#[tokio::test]
async fn snapshot_is_always_complete() {
    let mut collector =
        SystemCollector::new(&config()).with_gpu_tool("homewatch-test-no-such-binary");
    let snapshot = collector.collect().await;

    assert!(snapshot.memory.percent <= 100);
    assert!(snapshot.disk.percent <= 100);
    assert!(snapshot.cpu.load >= 0.0);
    assert!(!snapshot.uptime.text.is_empty());
    assert_eq!(snapshot.gpu, GpuStats::UNAVAILABLE);
    assert_eq!(snapshot.services.len(), 1);

    // an unavailable GPU never produces a GPU alert
    let alerts = evaluate(&snapshot, &Default::default());
    assert!(alerts.iter().all(|a| a.metric != "gpu_temp"));
}

#[tokio::test]
async fn disabled_gpu_is_not_queried() {
    let config = MonitoringConfig {
        enable_gpu_monitoring: false,
        services: Vec::new(),
        ..MonitoringConfig::default()
    };
    // even a real nvidia-smi would be ignored here
    let mut collector = SystemCollector::new(&config);
    let snapshot = collector.collect().await;
    assert_eq!(snapshot.gpu, GpuStats::UNAVAILABLE);
    assert!(snapshot.services.is_empty());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["gpu"]["temp"], -1);
}
