// src/proposers/contour.rs
//
// Contour/body proposer. Counts mid-luminance pixels whose intensity jumps
// against a vertical neighbor, a cheap stand-in for vertical body
// silhouettes.

use super::scan_grid;
use crate::types::{BlockRule, PixelBuffer, Region};

pub fn propose_contour(buf: &PixelBuffer, rule: BlockRule) -> Vec<Region> {
    scan_grid(buf, rule, |buf, x, y, block| {
        let mut score = 0u32;
        for by in 0..block {
            for bx in 0..block {
                let intensity = buf.intensity_at(x + bx, y + by);
                if intensity <= 50.0 || intensity >= 200.0 {
                    continue;
                }
                // Vertical-edge check needs both neighbors inside the block.
                if by == 0 || by == block - 1 {
                    continue;
                }
                let above = buf.intensity_at(x + bx, y + by - 1);
                let below = buf.intensity_at(x + bx, y + by + 1);
                if (intensity - above).abs() > 30.0 || (intensity - below).abs() > 30.0 {
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

    /// Alternating bright/dim scanline pairs inside the mid band: every
    /// interior pixel sees a >30 intensity jump vertically.
    fn striped_buffer(w: usize, h: usize) -> PixelBuffer {
        let mut buf = PixelBuffer::filled(w, h, [60, 60, 60, 255]);
        for y in 0..h {
            if (y / 2) % 2 == 0 {
                for x in 0..w {
                    let idx = (y * w + x) * 4;
                    buf.data[idx..idx + 4].copy_from_slice(&[150, 150, 150, 255]);
                }
            }
        }
        buf
    }

    #[test]
    fn striped_silhouette_triggers_candidates() {
        let buf = striped_buffer(240, 240);
        let rule = BlockRule {
            block_px: 60,
            min_fraction: 0.2,
        };
        assert!(!propose_contour(&buf, rule).is_empty());
    }

    #[test]
    fn flat_scene_has_no_contours() {
        let buf = PixelBuffer::filled(240, 240, [120, 120, 120, 255]);
        let rule = BlockRule {
            block_px: 60,
            min_fraction: 0.2,
        };
        assert!(propose_contour(&buf, rule).is_empty());
    }

    #[test]
    fn out_of_band_stripes_are_ignored() {
        // Same stripe geometry but everything darker than the 50..200 band
        // on one side: pixels at 40 fail the band test, pixels at 220 too.
        let mut buf = PixelBuffer::filled(240, 240, [40, 40, 40, 255]);
        for y in 0..240 {
            if (y / 2) % 2 == 0 {
                for x in 0..240 {
                    let idx = (y * 240 + x) * 4;
                    buf.data[idx..idx + 4].copy_from_slice(&[220, 220, 220, 255]);
                }
            }
        }
        let rule = BlockRule {
            block_px: 60,
            min_fraction: 0.2,
        };
        assert!(propose_contour(&buf, rule).is_empty());
    }
}
