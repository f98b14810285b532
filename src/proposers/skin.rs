// src/proposers/skin.rs
//
// Skin-tone proposer. Flags blocks with a high fraction of skin-colored
// pixels; doubles as the face/skin signal the classifier reuses.

use super::scan_grid;
use crate::types::{BlockRule, PixelBuffer, Region};

/// RGB skin-tone test: warm, red-dominant pixels with enough channel
/// separation. Shared with the classifier's person scoring.
#[inline]
pub fn is_skin_tone(r: u8, g: u8, b: u8) -> bool {
    r > 95
        && r < 255
        && g > 40
        && g < 200
        && b > 20
        && b < 180
        && r > g
        && g > b
        && (r - g) > 15
        && (g - b) > 15
}

pub fn propose_skin(buf: &PixelBuffer, rule: BlockRule) -> Vec<Region> {
    scan_grid(buf, rule, |buf, x, y, block| {
        let mut score = 0u32;
        for by in 0..block {
            for bx in 0..block {
                let (r, g, b) = buf.rgb_at(x + bx, y + by);
                if is_skin_tone(r, g, b) {
                    score += 1;
                }
            }
        }
        score
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_skin_values() {
        assert!(is_skin_tone(190, 140, 100));
        assert!(is_skin_tone(150, 100, 60));
    }

    #[test]
    fn rejects_grey_and_saturated_colors() {
        assert!(!is_skin_tone(128, 128, 128));
        assert!(!is_skin_tone(255, 0, 0));
        assert!(!is_skin_tone(0, 200, 50));
        // Red channel must stay below 255.
        assert!(!is_skin_tone(255, 150, 100));
    }

    #[test]
    fn skin_patch_produces_candidates() {
        let buf = PixelBuffer::filled(160, 160, [190, 140, 100, 255]);
        let rule = BlockRule {
            block_px: 40,
            min_fraction: 0.3,
        };
        let regions = propose_skin(&buf, rule);
        assert!(!regions.is_empty());
        for r in &regions {
            assert_eq!(r.width, 40);
            assert_eq!(r.height, 40);
        }
    }

    #[test]
    fn grey_scene_produces_none() {
        let buf = PixelBuffer::filled(160, 160, [120, 120, 120, 255]);
        let rule = BlockRule {
            block_px: 40,
            min_fraction: 0.3,
        };
        assert!(propose_skin(&buf, rule).is_empty());
    }
}
