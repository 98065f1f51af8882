// Shared test helpers
#![allow(dead_code)]

use homewatch::collector::Collector;
use homewatch::models::*;
use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};

/// A quiet machine: everything below default thresholds, all services active.
pub fn calm_snapshot() -> MetricSnapshot {
    let mut services = BTreeMap::new();
    services.insert("docker".to_string(), ServiceStatus::Active);
    services.insert("postgres".to_string(), ServiceStatus::Active);
    MetricSnapshot {
        cpu: CpuStats {
            load: 0.42,
            cores: 8,
        },
        memory: MemoryStats {
            used: 4096,
            total: 16384,
            percent: 25,
        },
        disk: DiskStats {
            percent: 40,
            available: "280G".into(),
        },
        gpu: GpuStats {
            temp: Some(45),
            util: Some(3),
            mem: Some(512),
        },
        uptime: UptimeStats {
            text: "2 days, 3:04".into(),
            days: 2,
        },
        network: NetworkStats { connections: 12 },
        services,
    }
}

/// Hands out snapshots in order, then repeats the last one. Counts calls.
pub struct ScriptedCollector {
    script: VecDeque<MetricSnapshot>,
    last: MetricSnapshot,
    pub calls: Arc<Mutex<usize>>,
}

impl ScriptedCollector {
    pub fn new(script: Vec<MetricSnapshot>) -> Self {
        let last = script.last().cloned().unwrap_or_default();
        Self {
            script: script.into(),
            last,
            calls: Arc::new(Mutex::new(0)),
        }
    }
}

impl Collector for ScriptedCollector {
    fn collect(&mut self) -> impl Future<Output = MetricSnapshot> + Send {
        *self.calls.lock().unwrap() += 1;
        let next = self.script.pop_front().unwrap_or_else(|| self.last.clone());
        async move { next }
    }
}
