//! Neighbor mask sampling for one cell

use crate::bitmask::neighbors::*;

/// Calculate the canonical neighbor mask for the cell at `(tx, ty)`.
///
/// Cardinals are always sampled. A diagonal is only sampled when both of its
/// cardinals matched, so `in_group` is never asked about a diagonal cell the
/// mask could not use. Lazily loaded neighbor providers rely on this.
pub fn compute_mask<F>(tx: i32, ty: i32, mut in_group: F) -> u8
where
    F: FnMut(i32, i32) -> bool,
{
    let mut mask = 0u8;

    if in_group(tx, ty - 1) {
        mask |= N;
    }
    if in_group(tx - 1, ty) {
        mask |= W;
    }
    if in_group(tx + 1, ty) {
        mask |= E;
    }
    if in_group(tx, ty + 1) {
        mask |= S;
    }

    if (mask & (N | W)) == (N | W) && in_group(tx - 1, ty - 1) {
        mask |= NW;
    }
    if (mask & (N | E)) == (N | E) && in_group(tx + 1, ty - 1) {
        mask |= NE;
    }
    if (mask & (S | W)) == (S | W) && in_group(tx - 1, ty + 1) {
        mask |= SW;
    }
    if (mask & (S | E)) == (S | E) && in_group(tx + 1, ty + 1) {
        mask |= SE;
    }

    mask
}

/// Sample all 8 neighbors without short-circuiting.
///
/// Returns the raw mask; diagonals may be set without their cardinals. Used
/// where the caller needs to know which diagonals touch, e.g. before
/// complementing a mask.
pub fn sample_raw_mask<F>(tx: i32, ty: i32, mut matches: F) -> u8
where
    F: FnMut(i32, i32) -> bool,
{
    OFFSETS.iter().fold(0u8, |mask, &(bit, dx, dy)| {
        if matches(tx + dx, ty + dy) {
            mask | bit
        } else {
            mask
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmask::{canonicalize, is_canonical, FULL, ISOLATED};
    use std::collections::HashSet;

    #[test]
    fn test_all_neighbors_in_group() {
        assert_eq!(compute_mask(0, 0, |_, _| true), FULL);
        assert_eq!(compute_mask(0, 0, |_, _| false), ISOLATED);
    }

    #[test]
    fn test_cardinal_directions() {
        let north = compute_mask(5, 5, |x, y| (x, y) == (5, 4));
        let west = compute_mask(5, 5, |x, y| (x, y) == (4, 5));
        let east = compute_mask(5, 5, |x, y| (x, y) == (6, 5));
        let south = compute_mask(5, 5, |x, y| (x, y) == (5, 6));
        assert_eq!((north, west, east, south), (N, W, E, S));
    }

    #[test]
    fn test_diagonal_not_queried_without_cardinals() {
        let mut queried = HashSet::new();
        let mask = compute_mask(0, 0, |x, y| {
            queried.insert((x, y));
            y == -1 // whole northern row is in the group
        });

        assert_eq!(mask, N);
        assert_eq!(queried.len(), 4);
        assert!(!queried.contains(&(-1, -1)));
        assert!(!queried.contains(&(1, -1)));
    }

    #[test]
    fn test_diagonal_queried_when_supported() {
        let mut queried = Vec::new();
        let mask = compute_mask(0, 0, |x, y| {
            queried.push((x, y));
            x <= 0 && y <= 0
        });

        assert_eq!(mask, N | W | NW);
        assert_eq!(queried.len(), 5);
        assert_eq!(queried.last(), Some(&(-1, -1)));
    }

    #[test]
    fn test_result_is_canonical() {
        for raw in 0..=u8::MAX {
            let mask = compute_mask(0, 0, |x, y| {
                OFFSETS
                    .iter()
                    .any(|&(bit, dx, dy)| raw & bit != 0 && (dx, dy) == (x, y))
            });
            assert!(is_canonical(mask));
            assert_eq!(mask, canonicalize(raw));
        }
    }

    #[test]
    fn test_raw_mask_keeps_lone_diagonals() {
        let raw = sample_raw_mask(0, 0, |x, y| (x, y) == (1, 1));
        assert_eq!(raw, SE);
        assert_eq!(canonicalize(raw), ISOLATED);
    }
}
