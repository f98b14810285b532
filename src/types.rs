// src/types.rs

use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub proposers: ProposersConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub backend: BackendKind,
    /// Tick interval for the local heuristic backend.
    pub interval_ms: u64,
    /// Minimum confidence for a classified region to be emitted.
    pub confidence_threshold: f32,
    /// Sampled buffer resolution. Frames are downscaled to this size.
    pub frame_width: usize,
    pub frame_height: usize,
    pub camera_id: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            interval_ms: 200,
            confidence_threshold: 0.4,
            frame_width: 640,
            frame_height: 480,
            camera_id: "camera-1".to_string(),
        }
    }
}

/// Grid scan parameters for one region proposer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlockRule {
    /// Side of the square scan block, in pixels.
    pub block_px: usize,
    /// Fraction of scored pixels a block must exceed to become a candidate.
    pub min_fraction: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposersConfig {
    pub skin: BlockRule,
    pub contour: BlockRule,
    pub motion: BlockRule,
    pub edge: BlockRule,
}

impl Default for ProposersConfig {
    fn default() -> Self {
        Self {
            skin: BlockRule {
                block_px: 40,
                min_fraction: 0.3,
            },
            contour: BlockRule {
                block_px: 60,
                min_fraction: 0.2,
            },
            motion: BlockRule {
                block_px: 32,
                min_fraction: 0.3,
            },
            edge: BlockRule {
                block_px: 32,
                min_fraction: 0.2,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// Tick interval when the remote backend drives detection.
    pub interval_ms: u64,
    /// How often the /health endpoint is probed.
    pub probe_interval_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
            interval_ms: 300,
            probe_interval_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Suppress repeat alerts of the same kind from the same camera
    /// within this window.
    pub cooldown_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { cooldown_secs: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// PIXEL DATA
// ============================================================================

/// Immutable RGBA snapshot of one frame, row-major, 4 bytes per pixel.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * 4);
        Self {
            width,
            height,
            data,
        }
    }

    /// Solid-color buffer, handy for tests and padding.
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn rgb_at(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let idx = (y * self.width + x) * 4;
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    /// Average of R, G, B as a float, the luminance proxy used by the
    /// proposers and classifier.
    #[inline]
    pub fn intensity_at(&self, x: usize, y: usize) -> f32 {
        let (r, g, b) = self.rgb_at(x, y);
        (r as f32 + g as f32 + b as f32) / 3.0
    }
}

/// Candidate rectangular area in buffer coordinates. Plain value data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }

    /// AABB overlap test. Touching edges count as overlap.
    pub fn overlaps(&self, other: &Region) -> bool {
        !(self.x + self.width < other.x
            || other.x + other.width < self.x
            || self.y + self.height < other.y
            || other.y + other.height < self.y)
    }

    /// Bounding union of two regions.
    pub fn union(&self, other: &Region) -> Region {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Region {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }

    /// Clamp the region so it lies entirely within a width×height buffer.
    pub fn clamped(&self, width: usize, height: usize) -> Region {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Region {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        }
    }
}

// ============================================================================
// DETECTION RESULTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Person,
    Vehicle,
    Drone,
    Weapon,
    Unknown,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Person => "person",
            ObjectType::Vehicle => "vehicle",
            ObjectType::Drone => "drone",
            ObjectType::Weapon => "weapon",
            ObjectType::Unknown => "unknown",
        }
    }

    /// Operationally significant types. Vehicles are never threats.
    pub fn is_threat(&self) -> bool {
        matches!(
            self,
            ObjectType::Person | ObjectType::Drone | ObjectType::Weapon
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedObject {
    /// Unique within one tick.
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub confidence: f32,
    pub bbox: Region,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    /// Raw class name reported by a remote model, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_class: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCounts {
    pub persons: usize,
    pub vehicles: usize,
    pub drones: usize,
    pub weapons: usize,
}

impl ObjectCounts {
    pub fn total(&self) -> usize {
        self.persons + self.vehicles + self.drones + self.weapons
    }
}

/// One whole detection snapshot. Replaced wholesale each successful tick,
/// never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Discovery order, not sorted.
    pub objects: Vec<DetectedObject>,
    pub counts: ObjectCounts,
    /// Subset of `objects` with a threat type.
    pub threats: Vec<DetectedObject>,
}

impl DetectionResult {
    pub fn empty() -> Self {
        Self {
            objects: Vec::new(),
            counts: ObjectCounts::default(),
            threats: Vec::new(),
        }
    }
}

/// Session-scoped detection status, published alongside the result.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub is_detecting: bool,
    pub is_model_ready: bool,
    pub last_error: Option<String>,
}

pub fn now_epoch_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_includes_touching_edges() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(10, 0, 10, 10);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn disjoint_regions_do_not_overlap() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(100, 100, 10, 10);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn union_is_bounding_box() {
        let a = Region::new(0, 0, 40, 40);
        let b = Region::new(20, 20, 40, 40);
        assert_eq!(a.union(&b), Region::new(0, 0, 60, 60));
    }

    #[test]
    fn clamp_keeps_region_inside_buffer() {
        let r = Region::new(600, 440, 100, 100).clamped(640, 480);
        assert!(r.x + r.width <= 640);
        assert!(r.y + r.height <= 480);
    }

    #[test]
    fn vehicles_are_not_threats() {
        assert!(!ObjectType::Vehicle.is_threat());
        assert!(ObjectType::Person.is_threat());
        assert!(ObjectType::Drone.is_threat());
        assert!(ObjectType::Weapon.is_threat());
    }
}
