// src/main.rs

use anyhow::Result;
use perimeter_watch::session::{DetectionBackend, DetectionSession};
use perimeter_watch::types::{BackendKind, Config};
use perimeter_watch::{AlertBridge, HeuristicDetector, RemoteDetector, SyntheticSource};
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default("config.yaml")?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("perimeter_watch={}", config.logging.level))
        .init();

    info!("🛰️  Perimeter Watch Starting");
    info!(
        "Detection config: backend={:?}, interval={}ms, threshold={:.2}, frame={}x{}",
        config.detection.backend,
        config.detection.interval_ms,
        config.detection.confidence_threshold,
        config.detection.frame_width,
        config.detection.frame_height
    );

    let backend = match config.detection.backend {
        BackendKind::Local => DetectionBackend::Local(HeuristicDetector::new(
            config.proposers.clone(),
            config.detection.confidence_threshold,
        )),
        BackendKind::Remote => {
            info!("📡 Remote detector URL: {}", config.remote.url);
            DetectionBackend::Remote(RemoteDetector::new(
                &config.remote,
                &config.detection.camera_id,
                config.detection.confidence_threshold,
            )?)
        }
    };

    let mut detection = config.detection.clone();
    if detection.backend == BackendKind::Remote {
        // The HTTP round trip dominates tick cost; remote runs slower.
        detection.interval_ms = config.remote.interval_ms;
    }

    let source = Box::new(SyntheticSource::new(
        detection.frame_width,
        detection.frame_height,
    ));
    let tick_interval = Duration::from_millis(detection.interval_ms);
    let session = DetectionSession::new(detection, backend, source);
    let mut alert_bridge = AlertBridge::new(&config.alerts);

    // Remote backends need a health probe round trip before they go ready.
    if !wait_for_ready(&session, Duration::from_secs(30)).await {
        anyhow::bail!("backend never became ready");
    }

    session.start()?;
    info!("✓ Detection session running on {}", session.camera_id());

    for _ in 0..50 {
        tokio::time::sleep(tick_interval).await;

        let Some(result) = session.latest_result() else {
            continue;
        };
        info!(
            "Result: {} object(s), {} threat(s) (persons={}, vehicles={}, drones={}, weapons={})",
            result.objects.len(),
            result.threats.len(),
            result.counts.persons,
            result.counts.vehicles,
            result.counts.drones,
            result.counts.weapons
        );

        for alert in alert_bridge.process(&result, session.camera_id()) {
            warn!(
                "🚨 [{:?}] {}: {}",
                alert.severity, alert.title, alert.description
            );
            session
                .metrics()
                .inc(&session.metrics().alerts_raised);
        }
    }

    session.stop();

    let summary = session.metrics().summary();
    info!("\n📊 Final Report:");
    info!("  Ticks: {} ({} skipped, {} failed)", summary.ticks_total, summary.ticks_skipped, summary.ticks_failed);
    info!("  Objects detected: {}", summary.objects_detected);
    info!("  Threats detected: {}", summary.threats_detected);
    info!("  Alerts raised: {}", summary.alerts_raised);
    if summary.remote_successes + summary.remote_failures > 0 {
        info!(
            "  Remote round trips: {} ok, {} failed",
            summary.remote_successes, summary.remote_failures
        );
    }
    info!("  Tick rate: {:.1}/s", summary.tick_rate);
    info!("  Last tick: {}µs", summary.last_tick_us);

    if let Some(err) = session.status().last_error {
        warn!("Last error: {}", err);
    }

    Ok(())
}

async fn wait_for_ready(session: &DetectionSession, budget: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + budget;
    loop {
        if session.status().is_model_ready {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
