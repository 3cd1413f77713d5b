//! Blend graph configuration
//!
//! Declares the dedicated transition sheets (one per ordered base -> overlay
//! pair), the per-terrain alpha dissolve sheets, and the base-fill cell.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tileblend_autotile::bitmask::FULL_CELL;
use tileblend_core::{SheetDef, SheetIndex, SpriteCell, TerrainId};

/// Errors that can occur when loading or validating blend configuration
#[derive(Debug, Error)]
pub enum BlendConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Dedicated sheet '{key}' blends {terrain:?} with itself")]
    SelfPair { key: String, terrain: TerrainId },
    #[error("Pair {base:?} -> {overlay:?} has more than one dedicated sheet")]
    DuplicatePair { base: TerrainId, overlay: TerrainId },
    #[error("{0:?} has more than one alpha sheet")]
    DuplicateAlpha(TerrainId),
    #[error("Sheet index {0} is used by more than one sheet")]
    DuplicateSheetIndex(SheetIndex),
    #[error("Sheet key '{0}' is used by more than one sheet")]
    DuplicateSheetKey(String),
    #[error("Base fill cell ({col}, {row}) lies outside sheet '{key}'")]
    BaseFillOutsideSheet { key: String, col: u8, row: u8 },
}

/// A hand-authored transition sheet for one ordered terrain pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedicatedSheet {
    /// Lower terrain the art was drawn over
    pub base: TerrainId,
    /// Terrain whose edge the art depicts
    pub overlay: TerrainId,
    pub sheet: SheetDef,
}

/// A generic dissolve overlay for one terrain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlphaSheet {
    pub terrain: TerrainId,
    pub sheet: SheetDef,
}

/// Static data the blend graph is built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendConfig {
    /// Uniform-fill cell, identical on every sheet
    #[serde(default = "BlendConfig::default_base_fill")]
    pub base_fill: SpriteCell,
    #[serde(default)]
    pub dedicated: Vec<DedicatedSheet>,
    #[serde(default)]
    pub alpha: Vec<AlphaSheet>,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            base_fill: FULL_CELL,
            dedicated: Vec::new(),
            alpha: Vec::new(),
        }
    }
}

impl BlendConfig {
    fn default_base_fill() -> SpriteCell {
        FULL_CELL
    }

    /// The shipped transition sheets.
    ///
    /// Dirt-family pairs have neither dedicated art nor an alpha sheet for
    /// the deeper side, so they never blend.
    pub fn builtin() -> Self {
        fn dedicated(base: TerrainId, overlay: TerrainId, index: SheetIndex, key: &str) -> DedicatedSheet {
            DedicatedSheet {
                base,
                overlay,
                sheet: SheetDef::new(index, key, format!("tilesets/blend/{key}.png")),
            }
        }

        fn alpha(terrain: TerrainId, index: SheetIndex, key: &str) -> AlphaSheet {
            AlphaSheet {
                terrain,
                sheet: SheetDef::new(index, key, format!("tilesets/blend/{key}.png")),
            }
        }

        use TerrainId::*;
        Self {
            base_fill: FULL_CELL,
            dedicated: vec![
                dedicated(DeepWater, ShallowWater, SheetIndex::expect_nonzero(16), "deep_shallow"),
                dedicated(ShallowWater, Sand, SheetIndex::expect_nonzero(17), "shallow_sand"),
                dedicated(ShallowWater, Grass, SheetIndex::expect_nonzero(18), "shallow_grass"),
                dedicated(Sand, SandLight, SheetIndex::expect_nonzero(19), "sand_sandlight"),
                dedicated(Sand, Grass, SheetIndex::expect_nonzero(20), "sand_grass"),
                dedicated(Grass, DirtLight, SheetIndex::expect_nonzero(21), "grass_dirtlight"),
                dedicated(Grass, DirtWarm, SheetIndex::expect_nonzero(22), "grass_dirtwarm"),
            ],
            alpha: vec![
                alpha(Sand, SheetIndex::expect_nonzero(24), "sand_alpha"),
                alpha(SandLight, SheetIndex::expect_nonzero(25), "sandlight_alpha"),
                alpha(Grass, SheetIndex::expect_nonzero(26), "grass_alpha"),
            ],
        }
    }

    /// Load from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self, BlendConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| BlendConfigError::IoError(e.to_string()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, BlendConfigError> {
        toml::from_str(content).map_err(|e| BlendConfigError::ParseError(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, BlendConfigError> {
        serde_json::from_str(content).map_err(|e| BlendConfigError::ParseError(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, BlendConfigError> {
        toml::to_string_pretty(self).map_err(|e| BlendConfigError::ParseError(e.to_string()))
    }

    /// Every sheet, dedicated first, in declaration order
    pub fn sheets(&self) -> impl Iterator<Item = &SheetDef> {
        self.dedicated
            .iter()
            .map(|d| &d.sheet)
            .chain(self.alpha.iter().map(|a| &a.sheet))
    }

    /// Check the configuration is internally consistent
    pub fn validate(&self) -> Result<(), BlendConfigError> {
        let mut indices = HashSet::new();
        let mut keys = HashSet::new();
        for sheet in self.sheets() {
            if !indices.insert(sheet.index) {
                return Err(BlendConfigError::DuplicateSheetIndex(sheet.index));
            }
            if !keys.insert(sheet.key.as_str()) {
                return Err(BlendConfigError::DuplicateSheetKey(sheet.key.clone()));
            }
            if !sheet.contains(self.base_fill) {
                return Err(BlendConfigError::BaseFillOutsideSheet {
                    key: sheet.key.clone(),
                    col: self.base_fill.col,
                    row: self.base_fill.row,
                });
            }
        }

        let mut pairs = HashSet::new();
        for d in &self.dedicated {
            if d.base == d.overlay {
                return Err(BlendConfigError::SelfPair {
                    key: d.sheet.key.clone(),
                    terrain: d.base,
                });
            }
            if !pairs.insert((d.base, d.overlay)) {
                return Err(BlendConfigError::DuplicatePair {
                    base: d.base,
                    overlay: d.overlay,
                });
            }
        }

        let mut alpha_terrains = HashSet::new();
        for a in &self.alpha {
            if !alpha_terrains.insert(a.terrain) {
                return Err(BlendConfigError::DuplicateAlpha(a.terrain));
            }
        }

        Ok(())
    }
}
