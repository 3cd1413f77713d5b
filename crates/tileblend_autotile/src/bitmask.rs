//! Neighbor bitmask layout and the 47-tile blob table
//!
//! An 8-bit mask records which neighbors belong to the same group:
//!
//! ```text
//! NW(16)  N(1)  NE(32)
//!  W(2)    *     E(4)
//! SW(64)  S(8)  SE(128)
//! ```
//!
//! A diagonal bit only counts when both adjacent cardinals are set, which
//! folds the 256 raw masks down to 47 canonical shapes. Each canonical mask
//! maps to one cell of a 12x4 blob sheet.

use tileblend_core::SpriteCell;

/// Neighbor direction flags
pub mod neighbors {
    pub const N: u8 = 0b0000_0001;
    pub const W: u8 = 0b0000_0010;
    pub const E: u8 = 0b0000_0100;
    pub const S: u8 = 0b0000_1000;
    pub const NW: u8 = 0b0001_0000;
    pub const NE: u8 = 0b0010_0000;
    pub const SW: u8 = 0b0100_0000;
    pub const SE: u8 = 0b1000_0000;

    pub const CARDINALS: u8 = N | W | E | S;
    pub const DIAGONALS: u8 = NW | NE | SW | SE;

    /// Tile offsets `(dx, dy)` for each bit, +Y pointing south
    pub const OFFSETS: [(u8, i32, i32); 8] = [
        (N, 0, -1),
        (W, -1, 0),
        (E, 1, 0),
        (S, 0, 1),
        (NW, -1, -1),
        (NE, 1, -1),
        (SW, -1, 1),
        (SE, 1, 1),
    ];

    /// Each diagonal with the two cardinals it depends on
    pub const DIAGONAL_REQUIREMENTS: [(u8, u8); 4] =
        [(NW, N | W), (NE, N | E), (SW, S | W), (SE, S | E)];
}

/// Mask with no same-group neighbor
pub const ISOLATED: u8 = 0;

/// Mask with every neighbor in the group
pub const FULL: u8 = 0xFF;

/// Number of distinct canonical masks
pub const CANONICAL_COUNT: usize = 47;

/// Drop every diagonal bit whose two adjacent cardinals are not both set
pub const fn canonicalize(mask: u8) -> u8 {
    use neighbors::*;

    let mut result = mask & CARDINALS;
    let mut i = 0;
    while i < DIAGONAL_REQUIREMENTS.len() {
        let (diagonal, required) = DIAGONAL_REQUIREMENTS[i];
        if (mask & required) == required {
            result |= mask & diagonal;
        }
        i += 1;
    }
    result
}

/// Whether `mask` is already in canonical form
pub const fn is_canonical(mask: u8) -> bool {
    canonicalize(mask) == mask
}

/// Sprite cell of every canonical mask on a blob sheet.
///
/// Mask 0 sits at (0,0), the full fill at (1,0), the rest ascending
/// row-major. Cell (11,3) is unused.
pub const BLOB_LAYOUT: [(u8, SpriteCell); CANONICAL_COUNT] = [
    (0, SpriteCell::new(0, 0)),
    (255, SpriteCell::new(1, 0)),
    (1, SpriteCell::new(2, 0)),
    (2, SpriteCell::new(3, 0)),
    (3, SpriteCell::new(4, 0)),
    (4, SpriteCell::new(5, 0)),
    (5, SpriteCell::new(6, 0)),
    (6, SpriteCell::new(7, 0)),
    (7, SpriteCell::new(8, 0)),
    (8, SpriteCell::new(9, 0)),
    (9, SpriteCell::new(10, 0)),
    (10, SpriteCell::new(11, 0)),
    (11, SpriteCell::new(0, 1)),
    (12, SpriteCell::new(1, 1)),
    (13, SpriteCell::new(2, 1)),
    (14, SpriteCell::new(3, 1)),
    (15, SpriteCell::new(4, 1)),
    (19, SpriteCell::new(5, 1)),
    (23, SpriteCell::new(6, 1)),
    (27, SpriteCell::new(7, 1)),
    (31, SpriteCell::new(8, 1)),
    (37, SpriteCell::new(9, 1)),
    (39, SpriteCell::new(10, 1)),
    (45, SpriteCell::new(11, 1)),
    (47, SpriteCell::new(0, 2)),
    (55, SpriteCell::new(1, 2)),
    (63, SpriteCell::new(2, 2)),
    (74, SpriteCell::new(3, 2)),
    (75, SpriteCell::new(4, 2)),
    (78, SpriteCell::new(5, 2)),
    (79, SpriteCell::new(6, 2)),
    (91, SpriteCell::new(7, 2)),
    (95, SpriteCell::new(8, 2)),
    (111, SpriteCell::new(9, 2)),
    (127, SpriteCell::new(10, 2)),
    (140, SpriteCell::new(11, 2)),
    (141, SpriteCell::new(0, 3)),
    (142, SpriteCell::new(1, 3)),
    (143, SpriteCell::new(2, 3)),
    (159, SpriteCell::new(3, 3)),
    (173, SpriteCell::new(4, 3)),
    (175, SpriteCell::new(5, 3)),
    (191, SpriteCell::new(6, 3)),
    (206, SpriteCell::new(7, 3)),
    (207, SpriteCell::new(8, 3)),
    (223, SpriteCell::new(9, 3)),
    (239, SpriteCell::new(10, 3)),
];

/// Sprite used for the isolated mask, and for anything missing from the layout
pub const ISOLATED_CELL: SpriteCell = BLOB_LAYOUT[0].1;

/// The flood-fill cell of a uniform area
pub const FULL_CELL: SpriteCell = BLOB_LAYOUT[1].1;

/// Raw mask -> sprite cell, resolved for all 256 masks at compile time
static MASK_TO_CELL: [SpriteCell; 256] = build_mask_table();

const fn build_mask_table() -> [SpriteCell; 256] {
    let mut table = [ISOLATED_CELL; 256];
    let mut raw = 0;
    while raw < 256 {
        let canonical = canonicalize(raw as u8);
        let mut i = 0;
        while i < BLOB_LAYOUT.len() {
            if BLOB_LAYOUT[i].0 == canonical {
                table[raw] = BLOB_LAYOUT[i].1;
                break;
            }
            i += 1;
        }
        raw += 1;
    }
    table
}

/// Sprite cell for a raw or canonical mask
pub fn lookup(mask: u8) -> SpriteCell {
    MASK_TO_CELL[mask as usize]
}

/// All canonical masks in ascending order
pub fn canonical_masks() -> impl Iterator<Item = u8> {
    (0..=u8::MAX).filter(|&m| is_canonical(m))
}
