// GPU temperature / utilisation / memory via nvidia-smi

use super::command::{CommandError, run_command};
use crate::models::GpuStats;
use std::time::Duration;

pub const NVIDIA_SMI: &str = "nvidia-smi";

const QUERY_ARGS: [&str; 2] = [
    "--query-gpu=temperature.gpu,utilization.gpu,memory.used",
    "--format=csv,noheader,nounits",
];

/// Queries the first GPU. A missing tool means "no GPU" and is not logged as a failure.
pub async fn read_gpu(program: &str, timeout: Duration) -> GpuStats {
    let output = match run_command(program, &QUERY_ARGS, timeout).await {
        Ok(o) => o,
        Err(CommandError::NotFound { .. }) => {
            tracing::debug!(program, "GPU tool not installed; GPU readings unavailable");
            return GpuStats::UNAVAILABLE;
        }
        Err(e) => {
            tracing::warn!(error = %e, operation = "read_gpu", "GPU query failed");
            return GpuStats::UNAVAILABLE;
        }
    };
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!(
            operation = "read_gpu",
            status = %output.status,
            stderr = %stderr.trim(),
            "GPU query exited with failure"
        );
        return GpuStats::UNAVAILABLE;
    }
    parse_nvidia_smi(&String::from_utf8_lossy(&output.stdout)).unwrap_or_else(|| {
        tracing::warn!(operation = "read_gpu", "unrecognised nvidia-smi output");
        GpuStats::UNAVAILABLE
    })
}

/// Parses the first CSV line, e.g. `"54, 12, 1873"`. Fields such as `[N/A]` become `None`.
pub fn parse_nvidia_smi(stdout: &str) -> Option<GpuStats> {
    let line = stdout.lines().map(str::trim).find(|l| !l.is_empty())?;
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return None;
    }
    let field = |s: &str| s.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v.round() as u32);
    Some(GpuStats {
        temp: field(fields[0]),
        util: field(fields[1]),
        mem: field(fields[2]),
    })
}
