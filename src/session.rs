// src/session.rs
//
// Detection session: owns the tick loop that samples a frame, runs the
// configured backend, and publishes the result. One session per camera.
//
// Lifecycle is Idle -> Starting -> Running -> Stopping -> Idle. Starts and
// stops are keyed by an epoch counter: every start bumps it, every stop
// bumps it again, and a tick result is published only if the epoch it was
// started under is still current. A stop therefore takes effect immediately
// even while a tick is in flight; the stale result is discarded.
//
// Ticks never overlap. The interval uses MissedTickBehavior::Skip, so a
// slow tick delays the next one instead of stacking.

use crate::detector::HeuristicDetector;
use crate::error::DetectError;
use crate::metrics::DetectionMetrics;
use crate::remote::RemoteDetector;
use crate::sampler::{sample_frame, FrameSource};
use crate::types::{DetectionConfig, DetectionResult, PixelBuffer, SessionStatus};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

// ============================================================================
// BACKEND
// ============================================================================

/// The two ways a session can turn a frame into detections.
pub enum DetectionBackend {
    Local(HeuristicDetector),
    Remote(RemoteDetector),
}

impl DetectionBackend {
    pub fn name(&self) -> &'static str {
        match self {
            DetectionBackend::Local(_) => "local",
            DetectionBackend::Remote(_) => "remote",
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, DetectionBackend::Remote(_))
    }

    pub fn is_ready(&self) -> bool {
        match self {
            DetectionBackend::Local(d) => d.is_ready(),
            DetectionBackend::Remote(d) => d.is_ready(),
        }
    }

    pub async fn detect(&self, buf: &PixelBuffer) -> Result<DetectionResult, DetectError> {
        match self {
            DetectionBackend::Local(d) => d.detect(buf),
            DetectionBackend::Remote(d) => d.detect(buf).await,
        }
    }
}

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Starting,
    Running,
    Stopping,
}

struct SessionInner {
    phase: RwLock<SessionPhase>,
    /// Bumped on every start and stop. A tick publishes only while the
    /// epoch it captured at spawn is still current.
    epoch: AtomicU64,
    published: RwLock<Option<Arc<DetectionResult>>>,
    last_error: RwLock<Option<String>>,
    metrics: DetectionMetrics,
}

impl SessionInner {
    /// Store a result unless the loop that produced it has been stopped.
    fn publish(&self, epoch: u64, result: Arc<DetectionResult>) -> bool {
        let mut slot = self.published.write().expect("published poisoned");
        if self.epoch.load(Ordering::Acquire) != epoch {
            return false;
        }
        *slot = Some(result);
        true
    }

    fn set_error(&self, message: Option<String>) {
        *self.last_error.write().expect("last_error poisoned") = message;
    }

    fn set_phase(&self, phase: SessionPhase) {
        *self.phase.write().expect("phase poisoned") = phase;
    }

    fn phase(&self) -> SessionPhase {
        *self.phase.read().expect("phase poisoned")
    }
}

pub struct DetectionSession {
    inner: Arc<SessionInner>,
    backend: Arc<DetectionBackend>,
    source: Arc<tokio::sync::Mutex<Box<dyn FrameSource>>>,
    config: DetectionConfig,
    task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl DetectionSession {
    pub fn new(
        config: DetectionConfig,
        backend: DetectionBackend,
        source: Box<dyn FrameSource>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                phase: RwLock::new(SessionPhase::Idle),
                epoch: AtomicU64::new(0),
                published: RwLock::new(None),
                last_error: RwLock::new(None),
                metrics: DetectionMetrics::new(),
            }),
            backend: Arc::new(backend),
            source: Arc::new(tokio::sync::Mutex::new(source)),
            config,
            task: Mutex::new(None),
        }
    }

    /// Begin ticking. A second call while running is a no-op. Fails if the
    /// backend has not signaled readiness.
    pub fn start(&self) -> Result<(), DetectError> {
        {
            let phase = self.inner.phase();
            if phase == SessionPhase::Running || phase == SessionPhase::Starting {
                debug!("start ignored: session already {:?}", phase);
                return Ok(());
            }
        }
        if !self.backend.is_ready() {
            return Err(DetectError::BackendUnavailable(format!(
                "{} backend not ready",
                self.backend.name()
            )));
        }

        self.inner.set_phase(SessionPhase::Starting);
        self.inner.set_error(None);
        let epoch = self.inner.epoch.fetch_add(1, Ordering::AcqRel) + 1;

        let inner = Arc::clone(&self.inner);
        let backend = Arc::clone(&self.backend);
        let source = Arc::clone(&self.source);
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(Duration::from_millis(config.interval_ms.max(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if inner.epoch.load(Ordering::Acquire) != epoch {
                    break;
                }
                if !run_tick(&inner, &backend, &source, &config, epoch).await {
                    break;
                }
            }
            debug!("detection loop for {} exited (epoch {})", config.camera_id, epoch);
        });

        *self.task.lock().expect("task poisoned") = Some(handle);
        self.inner.set_phase(SessionPhase::Running);
        info!(
            "Detection started on {} ({} backend, {}ms interval)",
            self.config.camera_id,
            self.backend.name(),
            self.config.interval_ms
        );
        Ok(())
    }

    /// Stop ticking. Takes effect immediately: a tick already in flight
    /// will not publish. The last published result stays visible.
    pub fn stop(&self) {
        let phase = self.inner.phase();
        if phase == SessionPhase::Idle || phase == SessionPhase::Stopping {
            return;
        }
        self.inner.set_phase(SessionPhase::Stopping);
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        if let Some(handle) = self.task.lock().expect("task poisoned").take() {
            handle.abort();
        }
        // A publish that already passed its epoch check holds the write
        // lock; taking it here means any such publish completes before
        // stop() returns, and every later one observes the bumped epoch.
        drop(self.inner.published.write().expect("published poisoned"));
        self.inner.set_phase(SessionPhase::Idle);
        info!("Detection stopped on {}", self.config.camera_id);
    }

    /// The most recent published result, if any tick has completed.
    pub fn latest_result(&self) -> Option<Arc<DetectionResult>> {
        self.inner
            .published
            .read()
            .expect("published poisoned")
            .clone()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            is_detecting: self.inner.phase() == SessionPhase::Running,
            is_model_ready: self.backend.is_ready(),
            last_error: self
                .inner
                .last_error
                .read()
                .expect("last_error poisoned")
                .clone(),
        }
    }

    pub fn metrics(&self) -> &DetectionMetrics {
        &self.inner.metrics
    }

    pub fn camera_id(&self) -> &str {
        &self.config.camera_id
    }
}

impl Drop for DetectionSession {
    fn drop(&mut self) {
        if let Some(handle) = self.task.lock().expect("task poisoned").take() {
            handle.abort();
        }
    }
}

/// One scheduled tick. Returns false when the loop should stop.
async fn run_tick(
    inner: &SessionInner,
    backend: &DetectionBackend,
    source: &tokio::sync::Mutex<Box<dyn FrameSource>>,
    config: &DetectionConfig,
    epoch: u64,
) -> bool {
    let tick_start = Instant::now();
    inner.metrics.inc(&inner.metrics.ticks_total);

    let frame = {
        let mut src = source.lock().await;
        sample_frame(src.as_mut(), config.frame_width, config.frame_height)
    };
    let buf = match frame {
        Ok(buf) => buf,
        Err(e) if e.is_capture_unavailable() => {
            // No frame yet. Not an error, just nothing to do this tick.
            inner.metrics.inc(&inner.metrics.ticks_skipped);
            return true;
        }
        Err(e) => {
            inner.metrics.inc(&inner.metrics.ticks_failed);
            inner.set_error(Some(e.to_string()));
            warn!("frame sampling failed on {}: {}", config.camera_id, e);
            return true;
        }
    };

    let outcome = backend.detect(&buf).await;
    if backend.is_remote() {
        let counter = if outcome.is_ok() {
            &inner.metrics.remote_successes
        } else {
            &inner.metrics.remote_failures
        };
        inner.metrics.inc(counter);
    }

    match outcome {
        Ok(result) => {
            inner
                .metrics
                .add(&inner.metrics.objects_detected, result.objects.len() as u64);
            inner
                .metrics
                .add(&inner.metrics.threats_detected, result.threats.len() as u64);
            inner
                .metrics
                .set_timing(&inner.metrics.tick_time_us, tick_start.elapsed().as_micros() as u64);
            inner.set_error(None);
            if !inner.publish(epoch, Arc::new(result)) {
                debug!("discarding stale result on {}", config.camera_id);
                return false;
            }
            true
        }
        Err(e) if e.is_backend_unavailable() => {
            // The backend dropped out from under us. Stop ticking and leave
            // the error visible; a fresh start() can resume once the health
            // probe sees it again.
            inner.metrics.inc(&inner.metrics.ticks_failed);
            inner.set_error(Some(e.to_string()));
            inner.epoch.fetch_add(1, Ordering::AcqRel);
            inner.set_phase(SessionPhase::Idle);
            warn!("backend unavailable on {}: {}", config.camera_id, e);
            false
        }
        Err(e) => {
            // Transient classification failure. Previous result stays up.
            inner.metrics.inc(&inner.metrics.ticks_failed);
            inner.set_error(Some(e.to_string()));
            warn!("detection tick failed on {}: {}", config.camera_id, e);
            true
        }
    }
}
