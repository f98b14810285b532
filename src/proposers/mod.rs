// src/proposers/mod.rs
//
// Region proposal stage. Four independent heuristics scan the same
// read-only buffer on a fixed block grid; each block whose score clears
// the proposer's fraction threshold becomes a candidate region. Proposers
// never share mutable state, so they run on scoped threads and their
// outputs are concatenated in a fixed order before merging.

mod contour;
mod edge;
mod motion;
mod skin;

pub use contour::propose_contour;
pub use edge::propose_edge;
pub use motion::propose_motion;
pub use skin::{is_skin_tone, propose_skin};

use crate::types::{BlockRule, PixelBuffer, ProposersConfig, Region};
use tracing::debug;

/// Run all four proposers over one buffer and concatenate their candidate
/// lists: skin, contour, motion, edge. The order is fixed so a given buffer
/// always yields the same merger input.
pub fn propose_all(buf: &PixelBuffer, config: &ProposersConfig) -> Vec<Region> {
    let (skin, contour, motion, edge) = std::thread::scope(|scope| {
        let skin = scope.spawn(|| propose_skin(buf, config.skin));
        let contour = scope.spawn(|| propose_contour(buf, config.contour));
        let motion = scope.spawn(|| propose_motion(buf, config.motion));
        let edge = scope.spawn(|| propose_edge(buf, config.edge));
        (
            skin.join().expect("skin proposer panicked"),
            contour.join().expect("contour proposer panicked"),
            motion.join().expect("motion proposer panicked"),
            edge.join().expect("edge proposer panicked"),
        )
    });

    debug!(
        "Proposals: skin={}, contour={}, motion={}, edge={}",
        skin.len(),
        contour.len(),
        motion.len(),
        edge.len()
    );

    let mut all = skin;
    all.extend(contour);
    all.extend(motion);
    all.extend(edge);
    all
}

/// Block-grid scan shared by every proposer. `score_block` counts the
/// pixels in one block that satisfy the proposer's per-pixel test; the
/// block becomes a candidate when the count strictly exceeds
/// `min_fraction` of the block area. Blocks are anchored at multiples of
/// the block size and the grid stops short of the right/bottom edges,
/// matching the scan the heuristics were tuned on.
pub(crate) fn scan_grid(
    buf: &PixelBuffer,
    rule: BlockRule,
    score_block: impl Fn(&PixelBuffer, usize, usize, usize) -> u32,
) -> Vec<Region> {
    let block = rule.block_px;
    let mut regions = Vec::new();

    if block == 0 || buf.width <= block || buf.height <= block {
        return regions;
    }

    let block_area = (block * block) as f32;
    let mut y = 0;
    while y < buf.height - block {
        let mut x = 0;
        while x < buf.width - block {
            let score = score_block(buf, x, y, block);
            if score as f32 > block_area * rule.min_fraction {
                regions.push(Region::new(x, y, block, block));
            }
            x += block;
        }
        y += block;
    }

    regions
}
