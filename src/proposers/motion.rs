// src/proposers/motion.rs
//
// "Motion" proposer. This is a static luminance-band test (100..200), not
// temporal frame differencing: it flags blocks whose pixels sit in the
// mid-brightness range where moving foreground tends to land. A known
// limitation carried over deliberately — do not upgrade it to real frame
// differencing without retuning the downstream classifier.

use super::scan_grid;
use crate::types::{BlockRule, PixelBuffer, Region};

pub fn propose_motion(buf: &PixelBuffer, rule: BlockRule) -> Vec<Region> {
    scan_grid(buf, rule, |buf, x, y, block| {
        let mut score = 0u32;
        for by in 0..block {
            for bx in 0..block {
                let intensity = buf.intensity_at(x + bx, y + by);
                if intensity > 100.0 && intensity < 200.0 {
                    score += 1;
                }
            }
        }
        score
    })
}
