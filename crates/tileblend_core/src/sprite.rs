//! Sprite sheet references and the packed per-cell layer value

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU16;

/// Index of a sprite sheet, as referenced by packed values.
///
/// Never zero, so a packed value of 0 always means "no layer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetIndex(NonZeroU16);

impl SheetIndex {
    /// Returns `None` for 0
    pub const fn new(index: u16) -> Option<Self> {
        match NonZeroU16::new(index) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Build a sheet constant. Fails const evaluation on 0.
    pub const fn expect_nonzero(index: u16) -> Self {
        match Self::new(index) {
            Some(sheet) => sheet,
            None => panic!("sheet index must be non-zero"),
        }
    }

    pub const fn get(self) -> u16 {
        self.0.get()
    }
}

impl fmt::Display for SheetIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Column/row of one sprite within a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpriteCell {
    pub col: u8,
    pub row: u8,
}

impl SpriteCell {
    pub const fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }
}

/// Sheet index, sprite column and sprite row packed into one integer.
///
/// Layout: `(sheet << 16) | (col << 8) | row`. Zero is the empty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackedSprite(u32);

impl PackedSprite {
    pub const ROW_BITS: u32 = 8;
    pub const COL_BITS: u32 = 8;
    pub const SHEET_BITS: u32 = 16;

    pub const COL_SHIFT: u32 = Self::ROW_BITS;
    pub const SHEET_SHIFT: u32 = Self::ROW_BITS + Self::COL_BITS;

    const ROW_MASK: u32 = (1 << Self::ROW_BITS) - 1;
    const COL_MASK: u32 = (1 << Self::COL_BITS) - 1;

    pub const EMPTY: Self = Self(0);

    pub const fn pack(sheet: SheetIndex, cell: SpriteCell) -> Self {
        Self(
            ((sheet.get() as u32) << Self::SHEET_SHIFT)
                | ((cell.col as u32) << Self::COL_SHIFT)
                | cell.row as u32,
        )
    }

    /// Rebuild from the raw storage integer
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn sheet(self) -> Option<SheetIndex> {
        SheetIndex::new((self.0 >> Self::SHEET_SHIFT) as u16)
    }

    pub const fn cell(self) -> SpriteCell {
        SpriteCell {
            col: ((self.0 >> Self::COL_SHIFT) & Self::COL_MASK) as u8,
            row: (self.0 & Self::ROW_MASK) as u8,
        }
    }

    /// Split into sheet and cell, `None` for the empty value
    pub fn unpack(self) -> Option<(SheetIndex, SpriteCell)> {
        self.sheet().map(|sheet| (sheet, self.cell()))
    }
}

/// One sprite sheet the renderer has to preload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetDef {
    pub index: SheetIndex,
    /// Stable key used by configuration to refer to this sheet
    pub key: String,
    /// Path to the image file (relative to assets directory)
    pub path: String,
    #[serde(default = "SheetDef::default_columns")]
    pub columns: u8,
    #[serde(default = "SheetDef::default_rows")]
    pub rows: u8,
}

impl SheetDef {
    /// Blob sheets are laid out 12 columns by 4 rows
    pub const BLOB_COLUMNS: u8 = 12;
    pub const BLOB_ROWS: u8 = 4;

    pub fn new(index: SheetIndex, key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            index,
            key: key.into(),
            path: path.into(),
            columns: Self::BLOB_COLUMNS,
            rows: Self::BLOB_ROWS,
        }
    }

    fn default_columns() -> u8 {
        Self::BLOB_COLUMNS
    }

    fn default_rows() -> u8 {
        Self::BLOB_ROWS
    }

    /// Whether `cell` lies inside this sheet's grid
    pub fn contains(&self, cell: SpriteCell) -> bool {
        cell.col < self.columns && cell.row < self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_index_rejects_zero() {
        assert!(SheetIndex::new(0).is_none());
        assert_eq!(SheetIndex::new(7).map(SheetIndex::get), Some(7));
    }

    #[test]
    fn test_pack_layout() {
        let sheet = SheetIndex::new(3).unwrap();
        let packed = PackedSprite::pack(sheet, SpriteCell::new(10, 2));
        assert_eq!(packed.raw(), (3 << 16) | (10 << 8) | 2);
        assert_eq!(packed.unpack(), Some((sheet, SpriteCell::new(10, 2))));
    }

    #[test]
    fn test_origin_cell_is_not_empty() {
        let packed = PackedSprite::pack(SheetIndex::new(1).unwrap(), SpriteCell::new(0, 0));
        assert!(!packed.is_empty());
        assert!(PackedSprite::EMPTY.is_empty());
        assert_eq!(PackedSprite::EMPTY.unpack(), None);
    }

    #[test]
    fn test_sheet_def_defaults() {
        let json = r#"{ "index": 4, "key": "grass_alpha", "path": "tiles/grass_alpha.png" }"#;
        let def: SheetDef = serde_json::from_str(json).unwrap();
        assert_eq!(def.index.get(), 4);
        assert_eq!(def.columns, 12);
        assert!(def.contains(SpriteCell::new(11, 3)));
        assert!(!def.contains(SpriteCell::new(12, 0)));
    }
}
