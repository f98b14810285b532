// src/remote.rs
//
// Remote detection backend. The per-tick work becomes one HTTP round trip:
// the sampled frame goes out as a base64 JPEG data URL, a structured
// detection result comes back. Readiness is driven by a periodic /health
// probe instead of a local constant; request failures are transient and do
// not tear down the detection loop.
//
// The wire shapes mirror the existing detector service and must stay
// field-for-field compatible:
//   POST /detect   {image, confidence, camera_id}
//                  -> {success, detections, counts, threats, error?}
//   GET  /health   -> {model_loaded}

use crate::assembler::assemble;
use crate::error::DetectError;
use crate::types::{now_epoch_secs, DetectedObject, DetectionResult, ObjectType, PixelBuffer,
    Region, RemoteConfig};
use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct DetectRequest {
    /// JPEG data URL, `data:image/jpeg;base64,...`
    image: String,
    confidence: f32,
    camera_id: String,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    success: bool,
    #[serde(default)]
    detections: Vec<WireDetection>,
    #[serde(default)]
    error: Option<String>,
}

/// A detection as the remote service reports it. Coordinates arrive as
/// signed ints and are clamped into the sampled buffer before use.
#[derive(Debug, Deserialize)]
struct WireDetection {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    object_type: String,
    confidence: f32,
    bbox: WireBBox,
    #[serde(default)]
    timestamp: f64,
    #[serde(default)]
    original_class: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireBBox {
    x: i64,
    y: i64,
    width: i64,
    height: i64,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    model_loaded: bool,
}

fn parse_object_type(s: &str) -> ObjectType {
    match s {
        "person" => ObjectType::Person,
        "vehicle" => ObjectType::Vehicle,
        "drone" => ObjectType::Drone,
        "weapon" => ObjectType::Weapon,
        _ => ObjectType::Unknown,
    }
}

// ============================================================================
// REMOTE DETECTOR
// ============================================================================

pub struct RemoteDetector {
    http: reqwest::Client,
    base_url: String,
    camera_id: String,
    confidence_threshold: f32,
    model_ready: Arc<AtomicBool>,
    probe_error: Arc<Mutex<Option<String>>>,
    probe_handle: Option<tokio::task::JoinHandle<()>>,
}

impl RemoteDetector {
    /// Build the client and start the health probe. Must be called from
    /// within a tokio runtime.
    pub fn new(config: &RemoteConfig, camera_id: &str, confidence_threshold: f32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let mut detector = Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            camera_id: camera_id.to_string(),
            confidence_threshold,
            model_ready: Arc::new(AtomicBool::new(false)),
            probe_error: Arc::new(Mutex::new(Some("health not probed yet".to_string()))),
            probe_handle: None,
        };
        detector.probe_handle = Some(detector.spawn_health_probe(Duration::from_secs(
            config.probe_interval_secs.max(1),
        )));
        Ok(detector)
    }

    pub fn is_ready(&self) -> bool {
        self.model_ready.load(Ordering::Relaxed)
    }

    pub fn probe_error(&self) -> Option<String> {
        self.probe_error.lock().expect("probe_error poisoned").clone()
    }

    fn spawn_health_probe(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let http = self.http.clone();
        let url = format!("{}/health", self.base_url);
        let ready = Arc::clone(&self.model_ready);
        let probe_error = Arc::clone(&self.probe_error);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match check_health(&http, &url).await {
                    Ok(true) => {
                        if !ready.swap(true, Ordering::Relaxed) {
                            info!("Remote detector ready: model loaded");
                        }
                        *probe_error.lock().expect("probe_error poisoned") = None;
                    }
                    Ok(false) => {
                        if ready.swap(false, Ordering::Relaxed) {
                            warn!("Remote detector lost readiness: model not loaded");
                        }
                        *probe_error.lock().expect("probe_error poisoned") =
                            Some("remote model not loaded".to_string());
                    }
                    Err(e) => {
                        if ready.swap(false, Ordering::Relaxed) {
                            warn!("Remote detector unreachable: {e:#}");
                        }
                        *probe_error.lock().expect("probe_error poisoned") =
                            Some(format!("health probe failed: {e:#}"));
                    }
                }
            }
        })
    }

    /// One detection round trip for a sampled buffer.
    pub async fn detect(&self, buf: &PixelBuffer) -> Result<DetectionResult, DetectError> {
        if !self.is_ready() {
            return Err(DetectError::BackendUnavailable(
                self.probe_error()
                    .unwrap_or_else(|| "remote backend not ready".to_string()),
            ));
        }

        let image = encode_frame(buf)?;
        let request = DetectRequest {
            image,
            confidence: self.confidence_threshold,
            camera_id: self.camera_id.clone(),
        };

        let url = format!("{}/detect", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DetectError::ClassificationFailure(format!("detect request: {e}")))?;

        if !response.status().is_success() {
            return Err(DetectError::ClassificationFailure(format!(
                "detect returned HTTP {}",
                response.status()
            )));
        }

        let body: DetectResponse = response
            .json()
            .await
            .map_err(|e| DetectError::ClassificationFailure(format!("detect response: {e}")))?;

        if !body.success {
            return Err(DetectError::ClassificationFailure(
                body.error.unwrap_or_else(|| "detection failed".to_string()),
            ));
        }

        debug!(
            "Remote tick for {}: {} raw detections",
            self.camera_id,
            body.detections.len()
        );

        // Counts and threats are re-derived locally so the published result
        // always satisfies its own invariants, whatever the server sent.
        let objects = body
            .detections
            .into_iter()
            .filter_map(|d| sanitize_detection(d, buf.width, buf.height))
            .collect();
        Ok(assemble(objects))
    }
}

impl Drop for RemoteDetector {
    fn drop(&mut self) {
        if let Some(handle) = self.probe_handle.take() {
            handle.abort();
        }
    }
}

async fn check_health(http: &reqwest::Client, url: &str) -> Result<bool> {
    let response = http.get(url).send().await.context("health request")?;
    if !response.status().is_success() {
        anyhow::bail!("health returned HTTP {}", response.status());
    }
    let health: HealthResponse = response.json().await.context("health response")?;
    Ok(health.model_loaded)
}

fn sanitize_detection(wire: WireDetection, width: usize, height: usize) -> Option<DetectedObject> {
    let object_type = parse_object_type(&wire.object_type);
    if object_type == ObjectType::Unknown {
        return None;
    }

    let x = wire.bbox.x.max(0) as usize;
    let y = wire.bbox.y.max(0) as usize;
    let w = wire.bbox.width.max(0) as usize;
    let h = wire.bbox.height.max(0) as usize;
    let bbox = Region::new(x, y, w, h).clamped(width, height);
    if bbox.width == 0 || bbox.height == 0 {
        error!("Dropping remote detection with degenerate bbox: {:?}", wire);
        return None;
    }

    let id = if wire.id.is_empty() {
        format!("obj_{}", uuid::Uuid::new_v4().simple())
    } else {
        wire.id
    };
    let timestamp = if wire.timestamp > 0.0 {
        wire.timestamp
    } else {
        now_epoch_secs()
    };

    Some(DetectedObject {
        id,
        object_type,
        confidence: wire.confidence.clamp(0.0, 1.0),
        bbox,
        timestamp,
        original_class: wire.original_class,
    })
}

/// Encode an RGBA buffer as a JPEG data URL for the wire.
fn encode_frame(buf: &PixelBuffer) -> Result<String, DetectError> {
    let mut rgb = Vec::with_capacity(buf.width * buf.height * 3);
    for px in buf.data.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }

    let img: image::RgbImage =
        image::ImageBuffer::from_raw(buf.width as u32, buf.height as u32, rgb).ok_or_else(
            || DetectError::ClassificationFailure("frame buffer size mismatch".to_string()),
        )?;

    let mut out = std::io::Cursor::new(Vec::new());
    // Quality 80 balances size against detector accuracy.
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 80);
    img.write_with_encoder(encoder)
        .map_err(|e| DetectError::ClassificationFailure(format!("jpeg encode: {e}")))?;

    let b64 = base64::engine::general_purpose::STANDARD.encode(out.into_inner());
    Ok(format!("data:image/jpeg;base64,{b64}"))
}
