// src/proposers/edge.rs
//
// Edge proposer. Central-difference gradient magnitude on the red channel
// over each block's interior pixels; a pixel votes when the magnitude
// clears 50. The red channel alone is what the thresholds were tuned
// against.

use super::scan_grid;
use crate::types::{BlockRule, PixelBuffer, Region};

const GRADIENT_THRESHOLD: f32 = 50.0;

pub fn propose_edge(buf: &PixelBuffer, rule: BlockRule) -> Vec<Region> {
    scan_grid(buf, rule, |buf, x, y, block| {
        let mut score = 0u32;
        for by in 1..block - 1 {
            for bx in 1..block - 1 {
                let px = x + bx;
                let py = y + by;
                let gx = red_at(buf, px + 1, py) - red_at(buf, px - 1, py);
                let gy = red_at(buf, px, py + 1) - red_at(buf, px, py - 1);
                let gradient = (gx * gx + gy * gy).sqrt();
                if gradient > GRADIENT_THRESHOLD {
                    score += 1;
                }
            }
        }
        score
    })
}

#[inline]
fn red_at(buf: &PixelBuffer, x: usize, y: usize) -> f32 {
    buf.data[(y * buf.width + x) * 4] as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: BlockRule = BlockRule {
        block_px: 32,
        min_fraction: 0.2,
    };

    #[test]
    fn dense_stripes_are_all_edges() {
        // Width-2 vertical stripes: every interior pixel's central
        // difference straddles a boundary.
        let mut buf = PixelBuffer::filled(128, 128, [0, 0, 0, 255]);
        for y in 0..128 {
            for x in 0..128 {
                if (x / 2) % 2 == 0 {
                    let idx = (y * 128 + x) * 4;
                    buf.data[idx..idx + 4].copy_from_slice(&[255, 255, 255, 255]);
                }
            }
        }
        assert!(!propose_edge(&buf, RULE).is_empty());
    }

    #[test]
    fn flat_scene_has_no_edges() {
        let buf = PixelBuffer::filled(128, 128, [128, 128, 128, 255]);
        assert!(propose_edge(&buf, RULE).is_empty());
    }

    #[test]
    fn single_vertical_boundary_is_below_block_threshold() {
        // One hard edge contributes two columns of votes in one block,
        // far below 20% of the block area.
        let mut buf = PixelBuffer::filled(128, 128, [20, 20, 20, 255]);
        for y in 0..128 {
            for x in 50..128 {
                let idx = (y * 128 + x) * 4;
                buf.data[idx..idx + 4].copy_from_slice(&[220, 220, 220, 255]);
            }
        }
        assert!(propose_edge(&buf, RULE).is_empty());
    }
}
