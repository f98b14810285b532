// src/merger.rs
//
// Greedy union of overlapping proposals. Each unvisited region seeds a
// bounding union that absorbs every later unvisited region overlapping the
// SEED itself; absorbed regions grow the output rectangle but never the
// overlap test, so merges stay local instead of coalescing whole chains.
// O(n²) in the proposal count, which the block grid keeps small. Output
// order follows seed order within a tick but is not a stable contract
// across ticks.

use crate::types::Region;

pub fn merge_regions(regions: &[Region]) -> Vec<Region> {
    if regions.is_empty() {
        return Vec::new();
    }

    let mut merged = Vec::new();
    let mut used = vec![false; regions.len()];

    for i in 0..regions.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let seed = regions[i];
        let mut current = seed;

        for j in (i + 1)..regions.len() {
            if used[j] {
                continue;
            }
            if seed.overlaps(&regions[j]) {
                current = current.union(&regions[j]);
                used[j] = true;
            }
        }

        merged.push(current);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_pair_merges_to_bounding_union() {
        let input = [Region::new(0, 0, 40, 40), Region::new(20, 20, 40, 40)];
        let merged = merge_regions(&input);
        assert_eq!(merged, vec![Region::new(0, 0, 60, 60)]);
    }

    #[test]
    fn disjoint_regions_stay_separate() {
        let input = [Region::new(0, 0, 10, 10), Region::new(100, 100, 10, 10)];
        let merged = merge_regions(&input);
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&Region::new(0, 0, 10, 10)));
        assert!(merged.contains(&Region::new(100, 100, 10, 10)));
    }

    #[test]
    fn chain_beyond_seed_is_not_absorbed() {
        // The third region overlaps the union of the first two but not the
        // seed itself, so it stays a separate region.
        let input = [
            Region::new(0, 0, 30, 30),
            Region::new(20, 0, 30, 30),
            Region::new(45, 0, 30, 30),
        ];
        let merged = merge_regions(&input);
        assert_eq!(
            merged,
            vec![Region::new(0, 0, 50, 30), Region::new(45, 0, 30, 30)]
        );
    }

    #[test]
    fn absorbed_region_growing_the_union_does_not_extend_reach() {
        // A tall absorbed region stretches the output rectangle, but a
        // later region inside that stretch still needs seed overlap.
        let input = [
            Region::new(0, 0, 10, 10),
            Region::new(5, 0, 10, 40),
            Region::new(0, 20, 10, 10),
        ];
        let merged = merge_regions(&input);
        assert_eq!(
            merged,
            vec![Region::new(0, 0, 15, 40), Region::new(0, 20, 10, 10)]
        );
    }

    #[test]
    fn touching_edges_merge() {
        let input = [Region::new(0, 0, 10, 10), Region::new(10, 0, 10, 10)];
        assert_eq!(merge_regions(&input), vec![Region::new(0, 0, 20, 10)]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(merge_regions(&[]).is_empty());
    }

    #[test]
    fn duplicate_proposals_collapse_to_one() {
        // Different proposers often nominate the same block.
        let r = Region::new(32, 32, 32, 32);
        assert_eq!(merge_regions(&[r, r, r]), vec![r]);
    }
}
