// Metric snapshot and the metrics artifact document

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Written in place of a GPU reading that is unavailable (no GPU, tool missing, monitoring disabled).
pub const GPU_UNAVAILABLE: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CpuStats {
    /// 1-minute load average.
    pub load: f64,
    pub cores: u32,
}

/// Memory in MiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryStats {
    pub used: u64,
    pub total: u64,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskStats {
    pub percent: u8,
    /// Human readable free space on the monitored mount, e.g. "112G".
    pub available: String,
}

impl Default for DiskStats {
    fn default() -> Self {
        Self {
            percent: 0,
            available: "0B".into(),
        }
    }
}

/// GPU readings; `None` is the unavailable sentinel and serializes as [`GPU_UNAVAILABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GpuStats {
    #[serde(with = "gpu_sentinel")]
    pub temp: Option<u32>,
    #[serde(with = "gpu_sentinel")]
    pub util: Option<u32>,
    /// VRAM used in MiB.
    #[serde(with = "gpu_sentinel")]
    pub mem: Option<u32>,
}

impl GpuStats {
    pub const UNAVAILABLE: Self = Self {
        temp: None,
        util: None,
        mem: None,
    };
}

mod gpu_sentinel {
    use super::GPU_UNAVAILABLE;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_u32(*v),
            None => s.serialize_i64(GPU_UNAVAILABLE),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        let raw = i64::deserialize(d)?;
        Ok(u32::try_from(raw).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UptimeStats {
    /// e.g. "3 days, 4:05"
    pub text: String,
    pub days: u64,
}

impl Default for UptimeStats {
    fn default() -> Self {
        Self {
            text: "unknown".into(),
            days: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkStats {
    /// Established TCP connections (IPv4 + IPv6).
    pub connections: u32,
}

/// systemd unit state; serializes to lowercase JSON (e.g. "active").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Active,
    Inactive,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Active => "active",
            ServiceStatus::Inactive => "inactive",
            ServiceStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tick's readings. Deliberately carries no timestamp so consecutive
/// snapshots compare equal when nothing observable changed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub disk: DiskStats,
    pub gpu: GpuStats,
    pub uptime: UptimeStats,
    pub network: NetworkStats,
    pub services: BTreeMap<String, ServiceStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertSummary {
    /// Lines in the alert log.
    pub count: u64,
    /// Last N raw alert-log lines joined with `|`.
    pub recent: String,
}

/// The metrics artifact: snapshot fields at the top level plus alert summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsDocument {
    #[serde(flatten)]
    pub snapshot: MetricSnapshot,
    pub alerts: AlertSummary,
    /// RFC 3339 local time of publication.
    pub updated: String,
}
