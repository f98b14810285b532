// src/lib.rs

pub mod alerts;
pub mod assembler;
pub mod classifier;
pub mod config;
pub mod detector;
pub mod error;
pub mod merger;
pub mod metrics;
pub mod proposers;
pub mod remote;
pub mod sampler;
pub mod session;
pub mod types;

pub use alerts::{Alert, AlertBridge, AlertKind, Severity};
pub use detector::HeuristicDetector;
pub use error::DetectError;
pub use metrics::{DetectionMetrics, MetricsSummary};
pub use remote::RemoteDetector;
pub use sampler::{FrameSource, SyntheticSource};
pub use session::{DetectionBackend, DetectionSession};
pub use types::{
    BackendKind, Config, DetectedObject, DetectionResult, ObjectCounts, ObjectType, PixelBuffer,
    Region, SessionStatus,
};
