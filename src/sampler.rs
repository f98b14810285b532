// src/sampler.rs
//
// Pixel sampling: turn whatever the frame source currently holds into a
// fixed-size RGBA buffer the proposers can scan. Capture itself (devices,
// codecs, streaming) lives outside this crate; a source only has to hand
// over raw pixels.

use crate::error::DetectError;
use crate::types::PixelBuffer;
use tracing::trace;

/// A live feed the pipeline can poll. `current_frame` must return quickly;
/// a source that has nothing yet reports `CaptureUnavailable` and the tick
/// is skipped.
pub trait FrameSource: Send {
    fn current_frame(&mut self) -> Result<PixelBuffer, DetectError>;
}

/// Snapshot the source and normalize to the target resolution.
pub fn sample_frame(
    source: &mut dyn FrameSource,
    target_width: usize,
    target_height: usize,
) -> Result<PixelBuffer, DetectError> {
    let frame = source.current_frame()?;

    if frame.width == 0 || frame.height == 0 {
        return Err(DetectError::CaptureUnavailable(
            "frame has zero dimensions".to_string(),
        ));
    }
    if frame.data.len() < frame.width * frame.height * 4 {
        return Err(DetectError::CaptureUnavailable(format!(
            "frame buffer too short: {} bytes for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    if frame.width == target_width && frame.height == target_height {
        return Ok(frame);
    }

    trace!(
        "Resampling frame {}x{} -> {}x{}",
        frame.width,
        frame.height,
        target_width,
        target_height
    );
    Ok(resize_bilinear(&frame, target_width, target_height))
}

/// Bilinear resample of an RGBA buffer.
fn resize_bilinear(src: &PixelBuffer, dst_w: usize, dst_h: usize) -> PixelBuffer {
    let mut dst = vec![0u8; dst_w * dst_h * 4];
    let x_ratio = src.width as f32 / dst_w as f32;
    let y_ratio = src.height as f32 / dst_h as f32;

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx as f32 * x_ratio;
            let sy = dy as f32 * y_ratio;
            let sx0 = sx.floor() as usize;
            let sy0 = sy.floor() as usize;
            let sx1 = (sx0 + 1).min(src.width - 1);
            let sy1 = (sy0 + 1).min(src.height - 1);
            let fx = sx - sx0 as f32;
            let fy = sy - sy0 as f32;

            for c in 0..4 {
                let p00 = src.data[(sy0 * src.width + sx0) * 4 + c] as f32;
                let p10 = src.data[(sy0 * src.width + sx1) * 4 + c] as f32;
                let p01 = src.data[(sy1 * src.width + sx0) * 4 + c] as f32;
                let p11 = src.data[(sy1 * src.width + sx1) * 4 + c] as f32;

                let val = p00 * (1.0 - fx) * (1.0 - fy)
                    + p10 * fx * (1.0 - fy)
                    + p01 * (1.0 - fx) * fy
                    + p11 * fx * fy;

                dst[(dy * dst_w + dx) * 4 + c] = val.round() as u8;
            }
        }
    }

    PixelBuffer::new(dst_w, dst_h, dst)
}

// ============================================================================
// SYNTHETIC SOURCE
// ============================================================================

/// Deterministic generated scene for demos and tests: a dim backdrop with a
/// skin-toned figure, a wide banded slab, and a small dark object.
/// No camera required; identical frames in, identical detections out.
pub struct SyntheticSource {
    width: usize,
    height: usize,
    /// Frames to report as not-ready before producing pixels, to mimic a
    /// camera that is still warming up.
    warmup_remaining: u32,
}

impl SyntheticSource {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            warmup_remaining: 0,
        }
    }

    pub fn with_warmup(width: usize, height: usize, warmup_frames: u32) -> Self {
        Self {
            width,
            height,
            warmup_remaining: warmup_frames,
        }
    }

    fn render(&self) -> PixelBuffer {
        let w = self.width;
        let h = self.height;
        let mut buf = PixelBuffer::filled(w, h, [70, 70, 70, 255]);

        // Skin-toned figure, roughly person-shaped.
        fill_rect(&mut buf, w / 8, h / 4, w / 8, h / 2, [190, 140, 100, 255]);

        // Wide bright slab with faint horizontal banding, vehicle-like.
        // Both band colors sit in the mid-luminance range, and the band
        // contrast gives the contour scan something to latch onto, so the
        // slab merges into one wide region instead of grid-sized squares.
        striped_rect(
            &mut buf,
            w * 15 / 32,
            h / 2,
            w * 3 / 16,
            h / 10,
            [195, 195, 195, 255],
            [160, 160, 160, 255],
        );

        // Small dark object.
        fill_rect(&mut buf, (w * 3) / 4, h / 8, w / 12, h / 12, [25, 25, 25, 255]);

        buf
    }
}

impl FrameSource for SyntheticSource {
    fn current_frame(&mut self) -> Result<PixelBuffer, DetectError> {
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return Err(DetectError::CaptureUnavailable(
                "source warming up".to_string(),
            ));
        }
        Ok(self.render())
    }
}

fn fill_rect(buf: &mut PixelBuffer, x: usize, y: usize, w: usize, h: usize, rgba: [u8; 4]) {
    let x1 = (x + w).min(buf.width);
    let y1 = (y + h).min(buf.height);
    for py in y..y1 {
        for px in x..x1 {
            let idx = (py * buf.width + px) * 4;
            buf.data[idx..idx + 4].copy_from_slice(&rgba);
        }
    }
}

/// Rectangle filled with alternating two-row horizontal bands.
fn striped_rect(
    buf: &mut PixelBuffer,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    a: [u8; 4],
    b: [u8; 4],
) {
    let x1 = (x + w).min(buf.width);
    let y1 = (y + h).min(buf.height);
    for py in y..y1 {
        let rgba = if ((py - y) / 2) % 2 == 0 { a } else { b };
        for px in x..x1 {
            let idx = (py * buf.width + px) * 4;
            buf.data[idx..idx + 4].copy_from_slice(&rgba);
        }
    }
}
