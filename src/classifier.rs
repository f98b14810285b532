// src/classifier.rs
//
// Heuristic region classification. Resamples pixels inside a merged region
// (stride 2) into four independent score accumulators, then combines color
// votes with size/aspect priors. All-zero scores mean the region is noise
// and is dropped rather than emitted as "unknown".

use crate::proposers::is_skin_tone;
use crate::types::{ObjectType, PixelBuffer, Region};
use tracing::trace;

/// Pixel stride when resampling a region. Halves each axis; plenty of
/// samples for blocks this size.
const SAMPLE_STRIDE: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionScores {
    pub person: u32,
    pub vehicle: u32,
    pub drone: u32,
    pub weapon: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Classified {
    pub object_type: ObjectType,
    pub confidence: f32,
}

/// Classify one merged region. Returns `None` when every accumulator is
/// zero (unclassifiable) or the confidence does not clear `min_confidence`.
pub fn classify_region(
    buf: &PixelBuffer,
    region: Region,
    min_confidence: f32,
) -> Option<Classified> {
    let region = region.clamped(buf.width, buf.height);
    if region.width == 0 || region.height == 0 {
        return None;
    }

    let scores = score_region(buf, region);
    let object_type = pick_type(&scores)?;
    let confidence = confidence_for(region, object_type);

    trace!(
        "Region {:?} scores p={} v={} d={} w={} -> {:?} @ {:.2}",
        region,
        scores.person,
        scores.vehicle,
        scores.drone,
        scores.weapon,
        object_type,
        confidence
    );

    if confidence > min_confidence {
        Some(Classified {
            object_type,
            confidence,
        })
    } else {
        None
    }
}

pub fn score_region(buf: &PixelBuffer, region: Region) -> RegionScores {
    let mut scores = RegionScores::default();
    let mut skin_pixels = 0u32;
    let mut total_pixels = 0u32;

    let mut py = region.y;
    while py < region.y + region.height && py < buf.height {
        let mut px = region.x;
        while px < region.x + region.width && px < buf.width {
            let (r, g, b) = buf.rgb_at(px, py);
            total_pixels += 1;

            if is_skin_tone(r, g, b) {
                skin_pixels += 1;
                scores.person += 3;
            }

            // Color-band votes. The bands overlap on purpose; a bright
            // pixel can feed several accumulators.
            if r > 100 && g > 80 && b > 60 {
                scores.person += 1;
            }
            if r > 150 && g > 150 && b > 150 {
                scores.vehicle += 1;
            }
            if r < 100 && g < 100 && b < 100 {
                scores.weapon += 1;
            }
            if r > 200 && g > 200 && b > 200 {
                scores.drone += 1;
            }

            px += SAMPLE_STRIDE;
        }
        py += SAMPLE_STRIDE;
    }

    // Size/aspect priors on the region geometry.
    let area = region.area();
    let aspect = region.aspect_ratio();

    if area > 2000 && area < 50_000 && aspect > 0.4 && aspect < 1.2 {
        scores.person += 5;
    }
    if area > 5000 && area < 80_000 && aspect > 1.2 {
        scores.vehicle += 3;
    }
    if area > 1000 && area < 20_000 && aspect < 0.8 {
        scores.drone += 2;
    }
    if area > 500 && area < 10_000 && aspect > 0.8 && aspect < 1.5 {
        scores.weapon += 2;
    }

    // Dominant skin coverage saturates person classification.
    if total_pixels > 0 && skin_pixels as f32 > total_pixels as f32 * 0.2 {
        scores.person += 10;
    }

    scores
}

/// Strictly highest accumulator wins; exact ties resolve by fixed priority
/// weapon > person > vehicle > drone. All zero means unclassifiable.
pub fn pick_type(scores: &RegionScores) -> Option<ObjectType> {
    let ranked = [
        (scores.weapon, ObjectType::Weapon),
        (scores.person, ObjectType::Person),
        (scores.vehicle, ObjectType::Vehicle),
        (scores.drone, ObjectType::Drone),
    ];
    // Only a strictly greater score displaces the current best, so ties
    // keep the earlier (higher-priority) entry.
    let mut best_score = 0u32;
    let mut best_type = None;
    for (score, ty) in ranked {
        if score > best_score {
            best_score = score;
            best_type = Some(ty);
        }
    }
    best_type
}

/// Confidence model: base 0.3, size bonuses, type bonus, clamped at 0.95.
pub fn confidence_for(region: Region, object_type: ObjectType) -> f32 {
    let mut confidence: f32 = 0.3;
    let area = region.area();

    if area > 1000 && area < 50_000 {
        confidence += 0.3;
    }

    confidence += match object_type {
        ObjectType::Person => 0.4,
        ObjectType::Vehicle => 0.2,
        ObjectType::Drone | ObjectType::Weapon => 0.1,
        ObjectType::Unknown => 0.0,
    };

    if area > 5000 {
        confidence += 0.1;
    }

    confidence.min(0.95)
}
