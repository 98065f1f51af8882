// Metric collection via sysinfo, /proc and a couple of CLI tools.
// Every reading falls back to a default on failure; collect() never errors.

mod command;
mod gpu;
mod linux;
mod services;

pub use command::{CommandError, run_command};
pub use gpu::{NVIDIA_SMI, parse_nvidia_smi, read_gpu};
pub use linux::{count_established, format_uptime, humanize_bytes};
pub use services::{parse_systemctl_state, read_services};

use crate::config::MonitoringConfig;
use crate::models::*;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sysinfo::{Disks, System};
use tracing::instrument;

/// Source of snapshots for the alert loop.
pub trait Collector {
    fn collect(&mut self) -> impl Future<Output = MetricSnapshot> + Send;
}

pub struct SystemCollector {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    services: Vec<String>,
    disk_mount: PathBuf,
    gpu_enabled: bool,
    gpu_tool: String,
    command_timeout: Duration,
}

impl SystemCollector {
    pub fn new(config: &MonitoringConfig) -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(disks)),
            services: config.services.clone(),
            disk_mount: config.disk_mount.clone(),
            gpu_enabled: config.enable_gpu_monitoring,
            gpu_tool: NVIDIA_SMI.into(),
            command_timeout: Duration::from_secs(config.command_timeout_secs),
        }
    }

    /// Replace the GPU query program (e.g. a wrapper script, or a missing one in tests).
    pub fn with_gpu_tool(mut self, program: impl Into<String>) -> Self {
        self.gpu_tool = program.into();
        self
    }

    #[instrument(skip(self), fields(operation = "collect"))]
    pub async fn collect_snapshot(&self) -> MetricSnapshot {
        let cpu = self.read_cpu().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "read_cpu", "load average unreadable");
            CpuStats::default()
        });
        let memory = self.read_memory().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "read_memory", "memory unreadable");
            MemoryStats::default()
        });
        let disk = self.read_disk().await.unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                operation = "read_disk",
                mount = %self.disk_mount.display(),
                "disk usage unreadable"
            );
            DiskStats::default()
        });
        let gpu = if self.gpu_enabled {
            read_gpu(&self.gpu_tool, self.command_timeout).await
        } else {
            GpuStats::UNAVAILABLE
        };
        let uptime_secs = System::uptime();
        let uptime = UptimeStats {
            text: format_uptime(uptime_secs),
            days: uptime_secs / 86_400,
        };
        let network = NetworkStats {
            connections: linux::read_established_connections(),
        };
        let services = read_services(&self.services, self.command_timeout).await;

        MetricSnapshot {
            cpu,
            memory,
            disk,
            gpu,
            uptime,
            network,
            services,
        }
    }

    async fn read_cpu(&self) -> anyhow::Result<CpuStats> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            let load = System::load_average().one;
            anyhow::ensure!(load.is_finite() && load >= 0.0, "invalid load average {}", load);
            Ok(CpuStats {
                // two decimals, as the kernel reports it
                load: (load * 100.0).round() / 100.0,
                cores: sys.cpus().len() as u32,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    async fn read_memory(&self) -> anyhow::Result<MemoryStats> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_memory();

            let total = sys.total_memory();
            anyhow::ensure!(total > 0, "total memory reported as 0");
            let used = total.saturating_sub(sys.available_memory());
            Ok(MemoryStats {
                used: used / (1024 * 1024),
                total: total / (1024 * 1024),
                percent: percent(used, total),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    async fn read_disk(&self) -> anyhow::Result<DiskStats> {
        let disks = self.disks.clone();
        let mount = self.disk_mount.clone();
        tokio::task::spawn_blocking(move || {
            let mut disks = disks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
            disks.refresh(false);
            let disk = disks
                .list()
                .iter()
                .filter(|d| mount.starts_with(d.mount_point()))
                .max_by_key(|d| d.mount_point().as_os_str().len())
                .ok_or_else(|| anyhow::anyhow!("no filesystem mounted at {}", mount.display()))?;

            let total = disk.total_space();
            let available = disk.available_space();
            Ok(DiskStats {
                percent: percent(total.saturating_sub(available), total),
                available: humanize_bytes(available),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}

impl Collector for SystemCollector {
    fn collect(&mut self) -> impl Future<Output = MetricSnapshot> + Send {
        self.collect_snapshot()
    }
}

/// Integer percentage in [0, 100], rounded to nearest.
pub(crate) fn percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}
