use anyhow::Result;
use clap::{Parser, Subcommand};
use homewatch::alert_log::AlertLog;
use homewatch::collector::SystemCollector;
use homewatch::config::AppConfig;
use homewatch::models::MetricsDocument;
use homewatch::news::{HttpFetcher, NewsAggregator, SOURCES, resolve_sources};
use homewatch::publisher::ArtifactPublisher;
use homewatch::worker::{self, AlertLoop, AlertLoopConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[derive(Parser)]
#[command(name = "homewatch", version, about = "Workstation metrics alerting and news aggregation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the change-gated alert loop until SIGINT/SIGTERM
    Monitor,
    /// Fetch every enabled news source once and overwrite the news artifacts
    News,
    /// Collect one snapshot, evaluate it and print the metrics document without writing anything
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app_config = AppConfig::load()?;

    match cli.command {
        Command::Monitor => monitor(app_config).await,
        Command::News => news(app_config).await,
        Command::Status => status(app_config).await,
    }
}

async fn monitor(app_config: AppConfig) -> Result<()> {
    let publisher = ArtifactPublisher::from_paths(&app_config.paths);
    publisher.ensure_dirs().await?;
    let alert_log = AlertLog::new(app_config.paths.alert_log());
    homewatch::publisher::ensure_parent(alert_log.path()).await?;

    tracing::info!(
        interval_secs = app_config.monitoring.check_interval_secs,
        gpu = app_config.monitoring.enable_gpu_monitoring,
        services = ?app_config.monitoring.services,
        change_detection = ?app_config.monitoring.change_detection,
        metrics = %publisher.metrics_path().display(),
        alert_log = %alert_log.path().display(),
        "alert loop starting"
    );

    let collector = SystemCollector::new(&app_config.monitoring);
    let alert_loop = AlertLoop::new(
        collector,
        AlertLoopConfig::from_app(&app_config),
        alert_log,
        publisher,
    );
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = worker::spawn(
        alert_loop,
        app_config.monitoring.check_interval_secs,
        shutdown_rx,
    );

    shutdown_signal().await;
    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    handle.await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn news(app_config: AppConfig) -> Result<()> {
    let publisher = ArtifactPublisher::from_paths(&app_config.paths);
    publisher.ensure_dirs().await?;

    let sources = resolve_sources(SOURCES, &app_config.news);
    let fetcher = HttpFetcher::new(&app_config.news.user_agent)?;
    let aggregator = NewsAggregator::new(fetcher, sources);
    let meta = aggregator.run(&publisher).await?;
    tracing::info!(
        items = meta.count,
        news = %publisher.news_path().display(),
        "news run complete"
    );
    Ok(())
}

async fn status(app_config: AppConfig) -> Result<()> {
    let collector = SystemCollector::new(&app_config.monitoring);
    let snapshot = collector.collect_snapshot().await;
    for alert in homewatch::thresholds::evaluate(&snapshot, &app_config.thresholds) {
        tracing::warn!("{}", alert.message());
    }
    let mut alert_log = AlertLog::new(app_config.paths.alert_log());
    let doc = MetricsDocument {
        snapshot,
        alerts: alert_log
            .summary(app_config.monitoring.recent_alerts)
            .await,
        updated: chrono::Local::now().to_rfc3339(),
    };
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
