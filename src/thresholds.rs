// Two-tier threshold evaluation over a snapshot. Pure: no I/O.

use crate::config::{ThresholdConfig, ThresholdPair};
use crate::models::{AlertEvent, AlertKind, MetricSnapshot, ServiceStatus};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Ok,
    Warning,
    Critical,
}

/// Critical wins over warning; both are strict `>` comparisons.
pub fn tier<T: PartialOrd>(value: T, pair: &ThresholdPair<T>) -> Tier {
    if value > pair.crit {
        Tier::Critical
    } else if value > pair.warn {
        Tier::Warning
    } else {
        Tier::Ok
    }
}

pub fn evaluate(snapshot: &MetricSnapshot, config: &ThresholdConfig) -> Vec<AlertEvent> {
    evaluate_at(snapshot, config, Local::now())
}

/// As [`evaluate`] with a fixed timestamp on every event.
pub fn evaluate_at(
    snapshot: &MetricSnapshot,
    config: &ThresholdConfig,
    now: DateTime<Local>,
) -> Vec<AlertEvent> {
    let mut alerts = Vec::new();

    check(&mut alerts, now, "load", snapshot.cpu.load, &config.load, |v| {
        format!("{:.2}", v)
    });
    check(&mut alerts, now, "memory", snapshot.memory.percent, &config.memory, |v| {
        format!("{}%", v)
    });
    check(&mut alerts, now, "disk", snapshot.disk.percent, &config.disk, |v| {
        format!("{}%", v)
    });
    if let Some(temp) = snapshot.gpu.temp {
        check(&mut alerts, now, "gpu_temp", temp, &config.gpu_temp, |v| {
            format!("{}C", v)
        });
    }
    check(&mut alerts, now, "uptime_days", snapshot.uptime.days, &config.uptime_days, |v| {
        format!("{} days", v)
    });

    for (name, status) in &snapshot.services {
        if *status != ServiceStatus::Active {
            alerts.push(AlertEvent {
                kind: AlertKind::ServiceDown,
                metric: name.clone(),
                value: status.to_string(),
                threshold: None,
                timestamp: now,
            });
        }
    }

    alerts
}

fn check<T, F>(
    alerts: &mut Vec<AlertEvent>,
    now: DateTime<Local>,
    metric: &str,
    value: T,
    pair: &ThresholdPair<T>,
    fmt: F,
) where
    T: PartialOrd + Copy,
    F: Fn(T) -> String,
{
    let (kind, threshold) = match tier(value, pair) {
        Tier::Critical => (AlertKind::Critical, pair.crit),
        Tier::Warning => (AlertKind::Warning, pair.warn),
        Tier::Ok => return,
    };
    alerts.push(AlertEvent {
        kind,
        metric: metric.into(),
        value: fmt(value),
        threshold: Some(fmt(threshold)),
        timestamp: now,
    });
}

/// Comparison key for snapshot change detection: the raw values thresholds and
/// service checks look at. Display-only fields (uptime text, MiB used, free space,
/// connection count, GPU utilisation and memory) are left out.
#[derive(Debug, Clone, PartialEq)]
pub struct GateKey {
    pub load: f64,
    pub memory: u8,
    pub disk: u8,
    /// `None` is the unavailable sentinel and compares as a value.
    pub gpu_temp: Option<u32>,
    pub uptime_days: u64,
    pub services: BTreeMap<String, ServiceStatus>,
}

impl GateKey {
    pub fn of(snapshot: &MetricSnapshot) -> Self {
        Self {
            load: snapshot.cpu.load,
            memory: snapshot.memory.percent,
            disk: snapshot.disk.percent,
            gpu_temp: snapshot.gpu.temp,
            uptime_days: snapshot.uptime.days,
            services: snapshot.services.clone(),
        }
    }
}

/// Comparison key for tier-based change detection: which tier each metric sits in
/// plus raw service states. Value movement inside a tier leaves the key unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierKey {
    pub load: Tier,
    pub memory: Tier,
    pub disk: Tier,
    /// `None` while the GPU is unavailable.
    pub gpu_temp: Option<Tier>,
    pub uptime_days: Tier,
    pub services: BTreeMap<String, ServiceStatus>,
}

impl TierKey {
    pub fn of(snapshot: &MetricSnapshot, config: &ThresholdConfig) -> Self {
        Self {
            load: tier(snapshot.cpu.load, &config.load),
            memory: tier(snapshot.memory.percent, &config.memory),
            disk: tier(snapshot.disk.percent, &config.disk),
            gpu_temp: snapshot.gpu.temp.map(|t| tier(t, &config.gpu_temp)),
            uptime_days: tier(snapshot.uptime.days, &config.uptime_days),
            services: snapshot.services.clone(),
        }
    }
}
