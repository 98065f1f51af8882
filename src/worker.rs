// Change-gated alert loop: collect -> compare with previous -> (evaluate, log, publish).
// The previous snapshot lives in the loop value; nothing here is process-global.

use crate::alert_log::AlertLog;
use crate::collector::Collector;
use crate::config::{AppConfig, ChangeDetection, ThresholdConfig};
use crate::error::TickError;
use crate::models::{MetricSnapshot, MetricsDocument};
use crate::publisher::ArtifactPublisher;
use crate::thresholds::{GateKey, TierKey, evaluate};
use tokio::time::{Duration, interval};
use tracing::Instrument;

/// Evaluation settings, fixed for the lifetime of the loop.
#[derive(Debug, Clone)]
pub struct AlertLoopConfig {
    pub thresholds: ThresholdConfig,
    pub change_detection: ChangeDetection,
    /// Alert-log lines copied into the metrics artifact.
    pub recent_alerts: usize,
}

impl AlertLoopConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            thresholds: config.thresholds.clone(),
            change_detection: config.monitoring.change_detection,
            recent_alerts: config.monitoring.recent_alerts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Same as the previous snapshot: nothing evaluated or published.
    Unchanged,
    /// Evaluated, logged and published; `alerts` events were appended.
    Evaluated { alerts: usize },
    /// Unchanged, but the last publish failed and has now been redone. No alerts.
    Republished,
}

pub struct AlertLoop<C> {
    collector: C,
    config: AlertLoopConfig,
    alert_log: AlertLog,
    publisher: ArtifactPublisher,
    previous: Option<MetricSnapshot>,
    /// `previous` was evaluated and logged but its document never reached disk.
    unpublished: bool,
}

impl<C: Collector> AlertLoop<C> {
    pub fn new(
        collector: C,
        config: AlertLoopConfig,
        alert_log: AlertLog,
        publisher: ArtifactPublisher,
    ) -> Self {
        Self {
            collector,
            config,
            alert_log,
            publisher,
            previous: None,
            unpublished: false,
        }
    }

    /// Last snapshot whose alerts were evaluated and logged.
    pub fn previous(&self) -> Option<&MetricSnapshot> {
        self.previous.as_ref()
    }

    /// True while the metrics artifact lags behind `previous`.
    pub fn has_unpublished(&self) -> bool {
        self.unpublished
    }

    fn changed(&self, snapshot: &MetricSnapshot) -> bool {
        let Some(prev) = &self.previous else {
            return true;
        };
        match self.config.change_detection {
            ChangeDetection::Snapshot => GateKey::of(prev) != GateKey::of(snapshot),
            ChangeDetection::Tier => {
                let t = &self.config.thresholds;
                TierKey::of(prev, t) != TierKey::of(snapshot, t)
            }
        }
    }

    /// One tick. Alerts are logged once per change; a failed publish is retried on
    /// later ticks without logging them again.
    pub async fn tick(&mut self) -> Result<TickOutcome, TickError> {
        let snapshot = self.collector.collect().await;
        if !self.changed(&snapshot) {
            if !self.unpublished {
                tracing::trace!("snapshot unchanged");
                return Ok(TickOutcome::Unchanged);
            }
            self.publish(snapshot).await?;
            return Ok(TickOutcome::Republished);
        }

        let alerts = evaluate(&snapshot, &self.config.thresholds);
        for alert in &alerts {
            tracing::warn!(
                kind = ?alert.kind,
                metric = %alert.metric,
                value = %alert.value,
                "{}",
                alert.message()
            );
        }
        self.alert_log
            .append(&alerts)
            .await
            .map_err(TickError::AlertLog)?;
        self.previous = Some(snapshot.clone());
        self.unpublished = true;

        self.publish(snapshot).await?;
        Ok(TickOutcome::Evaluated {
            alerts: alerts.len(),
        })
    }

    async fn publish(&mut self, snapshot: MetricSnapshot) -> Result<(), TickError> {
        let doc = MetricsDocument {
            snapshot,
            alerts: self.alert_log.summary(self.config.recent_alerts).await,
            updated: chrono::Local::now().to_rfc3339(),
        };
        self.publisher
            .publish_metrics(&doc)
            .await
            .map_err(TickError::Publish)?;
        self.unpublished = false;
        Ok(())
    }
}

/// Runs ticks every `interval_secs` until `shutdown_rx` fires. Ticks never overlap; a slow
/// tick delays (skips) the next one rather than queueing it.
pub fn spawn<C>(
    mut alert_loop: AlertLoop<C>,
    interval_secs: u64,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()>
where
    C: Collector + Send + 'static,
{
    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut ticks_total: u64 = 0;
        let mut evaluated_total: u64 = 0;
        let mut alerts_total: u64 = 0;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    ticks_total += 1;
                    match alert_loop.tick().await {
                        Ok(TickOutcome::Evaluated { alerts }) => {
                            evaluated_total += 1;
                            alerts_total += alerts as u64;
                            tracing::debug!(alerts, "snapshot changed; metrics published");
                        }
                        Ok(TickOutcome::Republished) => {
                            tracing::info!("metrics artifact caught up");
                        }
                        Ok(TickOutcome::Unchanged) => {}
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                operation = e.operation(),
                                "tick failed; dashboard artifact is stale"
                            );
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::info!(
                        ticks_total,
                        evaluated_total,
                        alerts_total,
                        "alert loop shutting down"
                    );
                    break;
                }
            }
        }
    }
    .instrument(tracing::debug_span!("alert_loop", interval_secs)))
}
