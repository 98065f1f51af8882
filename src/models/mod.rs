// Domain models: metric snapshots, alerts, news items

mod alert;
mod news;
mod snapshot;

pub use alert::{ALERT_TIME_FORMAT, AlertEvent, AlertKind};
pub use news::{BIAS_SCORE_MAX, BIAS_SCORE_MIN, Category, NewsItem, NewsMeta};
pub use snapshot::{
    AlertSummary, CpuStats, DiskStats, GPU_UNAVAILABLE, GpuStats, MemoryStats, MetricSnapshot,
    MetricsDocument, NetworkStats, ServiceStatus, UptimeStats,
};
