// src/detector.rs
//
// Local heuristic detector: the full propose → merge → classify → assemble
// chain for one sampled buffer. Deterministic for a given buffer apart
// from object ids and timestamps.

use crate::assembler::assemble;
use crate::classifier::classify_region;
use crate::error::DetectError;
use crate::merger::merge_regions;
use crate::proposers::propose_all;
use crate::types::{
    now_epoch_secs, DetectedObject, DetectionResult, PixelBuffer, ProposersConfig,
};
use tracing::debug;
use uuid::Uuid;

pub struct HeuristicDetector {
    proposers: ProposersConfig,
    confidence_threshold: f32,
}

impl HeuristicDetector {
    pub fn new(proposers: ProposersConfig, confidence_threshold: f32) -> Self {
        Self {
            proposers,
            confidence_threshold,
        }
    }

    /// Always ready; there is no model to load.
    pub fn is_ready(&self) -> bool {
        true
    }

    pub fn detect(&self, buf: &PixelBuffer) -> Result<DetectionResult, DetectError> {
        if buf.data.len() < buf.width * buf.height * 4 {
            return Err(DetectError::ClassificationFailure(format!(
                "buffer shorter than {}x{} RGBA",
                buf.width, buf.height
            )));
        }

        let proposals = propose_all(buf, &self.proposers);
        let merged = merge_regions(&proposals);
        debug!(
            "Tick: {} proposals merged into {} regions",
            proposals.len(),
            merged.len()
        );

        let timestamp = now_epoch_secs();
        let mut objects = Vec::new();
        for region in merged {
            let region = region.clamped(buf.width, buf.height);
            if let Some(classified) = classify_region(buf, region, self.confidence_threshold) {
                objects.push(DetectedObject {
                    id: format!("obj_{}", Uuid::new_v4().simple()),
                    object_type: classified.object_type,
                    confidence: classified.confidence,
                    bbox: region,
                    timestamp,
                    original_class: None,
                });
            }
        }

        Ok(assemble(objects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{FrameSource, SyntheticSource};

    fn synthetic_buffer() -> PixelBuffer {
        SyntheticSource::new(640, 480).current_frame().unwrap()
    }

    fn detector() -> HeuristicDetector {
        HeuristicDetector::new(ProposersConfig::default(), 0.4)
    }

    #[test]
    fn synthetic_scene_yields_objects() {
        let result = detector().detect(&synthetic_buffer()).unwrap();
        assert!(!result.objects.is_empty());
    }

    #[test]
    fn synthetic_scene_contains_a_person_and_a_vehicle() {
        // The skin-toned figure and the wide banded slab must both be
        // picked up and classified.
        let result = detector().detect(&synthetic_buffer()).unwrap();
        assert!(result.counts.persons >= 1, "counts: {:?}", result.counts);
        assert!(result.counts.vehicles >= 1, "counts: {:?}", result.counts);
    }

    #[test]
    fn bboxes_stay_inside_buffer() {
        let buf = synthetic_buffer();
        let result = detector().detect(&buf).unwrap();
        for obj in &result.objects {
            assert!(obj.bbox.x + obj.bbox.width <= buf.width);
            assert!(obj.bbox.y + obj.bbox.height <= buf.height);
        }
    }

    #[test]
    fn counts_never_exceed_object_list() {
        let result = detector().detect(&synthetic_buffer()).unwrap();
        assert!(result.counts.total() <= result.objects.len());
    }

    #[test]
    fn confidences_are_in_unit_interval() {
        let result = detector().detect(&synthetic_buffer()).unwrap();
        for obj in &result.objects {
            assert!(obj.confidence > 0.0 && obj.confidence <= 1.0);
        }
    }

    #[test]
    fn identical_buffers_give_identical_results() {
        let buf = synthetic_buffer();
        let a = detector().detect(&buf).unwrap();
        let b = detector().detect(&buf).unwrap();
        assert_eq!(a.objects.len(), b.objects.len());
        assert_eq!(a.counts, b.counts);
        for (x, y) in a.objects.iter().zip(b.objects.iter()) {
            assert_eq!(x.object_type, y.object_type);
            assert_eq!(x.bbox, y.bbox);
            assert!((x.confidence - y.confidence).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn empty_scene_yields_empty_result() {
        let buf = PixelBuffer::filled(640, 480, [10, 10, 10, 255]);
        let result = detector().detect(&buf).unwrap();
        assert!(result.objects.is_empty());
        assert_eq!(result.counts.total(), 0);
        assert!(result.threats.is_empty());
    }

    #[test]
    fn ids_are_unique_within_a_tick() {
        let result = detector().detect(&synthetic_buffer()).unwrap();
        let mut ids: Vec<_> = result.objects.iter().map(|o| o.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), result.objects.len());
    }

    #[test]
    fn threats_are_subset_of_objects() {
        let result = detector().detect(&synthetic_buffer()).unwrap();
        for threat in &result.threats {
            assert!(threat.object_type.is_threat());
            assert!(result.objects.iter().any(|o| o.id == threat.id));
        }
    }
}
