// Layered configuration: built-in defaults -> installation file -> user override -> env.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Installation config location when `CONFIG_FILE` is unset.
pub const INSTALL_CONFIG_PATH: &str = "/etc/homewatch/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monitoring: MonitoringConfig,
    pub thresholds: ThresholdConfig,
    pub paths: PathsConfig,
    pub news: NewsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDetection {
    /// Any change of an alert-relevant value (load, percentages, GPU temperature,
    /// uptime days, service states) re-evaluates.
    #[default]
    Snapshot,
    /// Only a change of threshold tier or service status re-evaluates.
    Tier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub check_interval_secs: u64,
    pub enable_gpu_monitoring: bool,
    pub services: Vec<String>,
    pub disk_mount: PathBuf,
    pub change_detection: ChangeDetection,
    /// How many alert-log lines go into the metrics artifact.
    pub recent_alerts: usize,
    /// Upper bound for each external command (systemctl, nvidia-smi).
    pub command_timeout_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 30,
            enable_gpu_monitoring: true,
            services: vec!["docker".into(), "postgres".into(), "ollama".into()],
            disk_mount: PathBuf::from("/"),
            change_detection: ChangeDetection::Snapshot,
            recent_alerts: 5,
            command_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPair<T> {
    pub warn: T,
    pub crit: T,
}

impl<T> ThresholdPair<T> {
    pub const fn new(warn: T, crit: T) -> Self {
        Self { warn, crit }
    }
}

/// Warning/critical pairs per metric. Immutable after start-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub load: ThresholdPair<f64>,
    pub memory: ThresholdPair<u8>,
    pub disk: ThresholdPair<u8>,
    pub gpu_temp: ThresholdPair<u32>,
    pub uptime_days: ThresholdPair<u64>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            load: ThresholdPair::new(6.0, 8.0),
            memory: ThresholdPair::new(80, 90),
            disk: ThresholdPair::new(80, 90),
            gpu_temp: ThresholdPair::new(75, 85),
            uptime_days: ThresholdPair::new(14, 30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Holds metrics.json, news.json and news_meta.json.
    pub data_dir: PathBuf,
    /// Empty means `<data_dir>/alerts.log`.
    pub alert_log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join("homewatch"))
            .unwrap_or_else(|| PathBuf::from("data"));
        Self {
            data_dir,
            alert_log: PathBuf::new(),
        }
    }
}

impl PathsConfig {
    pub fn data_dir(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }

    pub fn alert_log(&self) -> PathBuf {
        if self.alert_log.as_os_str().is_empty() {
            self.data_dir().join("alerts.log")
        } else {
            expand_home(&self.alert_log)
        }
    }

    pub fn metrics_json(&self) -> PathBuf {
        self.data_dir().join("metrics.json")
    }

    pub fn news_json(&self) -> PathBuf {
        self.data_dir().join("news.json")
    }

    pub fn news_meta_json(&self) -> PathBuf {
        self.data_dir().join("news_meta.json")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Search term for the local-news source; empty disables it.
    pub local_region: String,
    pub user_agent: String,
    /// Per-source enable flags keyed by source name; absent means enabled.
    pub sources: BTreeMap<String, bool>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            local_region: String::new(),
            user_agent: format!("homewatch/{}", env!("CARGO_PKG_VERSION")),
            sources: BTreeMap::new(),
        }
    }
}

impl NewsConfig {
    pub fn is_enabled(&self, source: &str) -> bool {
        self.sources.get(source).copied().unwrap_or(true)
    }
}

impl AppConfig {
    /// Loads every layer that exists, applies env overrides and validates.
    pub fn load() -> anyhow::Result<Self> {
        let install = std::env::var("CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(INSTALL_CONFIG_PATH));
        let user = dirs::config_dir().map(|d| d.join("homewatch").join("config.toml"));

        let mut layers = Vec::new();
        for path in std::iter::once(install).chain(user) {
            if let Some(s) = read_layer(&path)? {
                tracing::debug!(path = %path.display(), "config layer loaded");
                layers.push(s);
            }
        }
        let layers: Vec<&str> = layers.iter().map(String::as_str).collect();
        let mut config = Self::merge_layers(&layers)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a single layer over the defaults (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        Self::load_from_layers(&[s])
    }

    /// Merge TOML layers over the defaults in order (later wins) and validate.
    pub fn load_from_layers(layers: &[&str]) -> anyhow::Result<Self> {
        let config = Self::merge_layers(layers)?;
        config.validate()?;
        Ok(config)
    }

    fn merge_layers(layers: &[&str]) -> anyhow::Result<Self> {
        let mut merged = match toml::Value::try_from(AppConfig::default())? {
            toml::Value::Table(t) => t,
            _ => anyhow::bail!("default config did not serialize to a table"),
        };
        for layer in layers {
            let table: toml::Table = toml::from_str(layer)?;
            merge_tables(&mut merged, table);
        }
        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// `CHECK_INTERVAL` and `ENABLE_GPU_MONITORING` override every file layer.
    pub fn apply_env<F>(&mut self, get: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get("CHECK_INTERVAL") {
            self.monitoring.check_interval_secs = v
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("CHECK_INTERVAL must be an integer, got {:?}: {}", v, e))?;
        }
        if let Some(v) = get("ENABLE_GPU_MONITORING") {
            self.monitoring.enable_gpu_monitoring = parse_flag(&v)
                .ok_or_else(|| anyhow::anyhow!("ENABLE_GPU_MONITORING must be a boolean, got {:?}", v))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let m = &self.monitoring;
        anyhow::ensure!(
            m.check_interval_secs > 0,
            "monitoring.check_interval_secs must be > 0, got {}",
            m.check_interval_secs
        );
        anyhow::ensure!(
            m.command_timeout_secs > 0,
            "monitoring.command_timeout_secs must be > 0, got {}",
            m.command_timeout_secs
        );
        anyhow::ensure!(
            m.services.iter().all(|s| !s.trim().is_empty()),
            "monitoring.services must not contain empty names"
        );

        let t = &self.thresholds;
        anyhow::ensure!(
            t.load.warn >= 0.0 && t.load.warn <= t.load.crit,
            "thresholds.load must satisfy 0 <= warn <= crit, got ({}, {})",
            t.load.warn,
            t.load.crit
        );
        anyhow::ensure!(
            t.memory.warn <= t.memory.crit && t.memory.crit <= 100,
            "thresholds.memory must satisfy warn <= crit <= 100, got ({}, {})",
            t.memory.warn,
            t.memory.crit
        );
        anyhow::ensure!(
            t.disk.warn <= t.disk.crit && t.disk.crit <= 100,
            "thresholds.disk must satisfy warn <= crit <= 100, got ({}, {})",
            t.disk.warn,
            t.disk.crit
        );
        anyhow::ensure!(
            t.gpu_temp.warn <= t.gpu_temp.crit,
            "thresholds.gpu_temp must satisfy warn <= crit, got ({}, {})",
            t.gpu_temp.warn,
            t.gpu_temp.crit
        );
        anyhow::ensure!(
            t.uptime_days.warn <= t.uptime_days.crit,
            "thresholds.uptime_days must satisfy warn <= crit, got ({}, {})",
            t.uptime_days.warn,
            t.uptime_days.crit
        );

        anyhow::ensure!(
            !self.paths.data_dir.as_os_str().is_empty(),
            "paths.data_dir must be non-empty"
        );
        anyhow::ensure!(
            !self.news.user_agent.trim().is_empty(),
            "news.user_agent must be non-empty"
        );
        Ok(())
    }
}

/// Returns `Ok(None)` when the file does not exist; any other read error is fatal.
fn read_layer(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow::anyhow!("reading {}: {}", path.display(), e)),
    }
}

/// Deep merge: nested tables merge key by key, everything else is replaced.
fn merge_tables(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expands a leading `~/` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
