//! Layer configuration and startup validation
//!
//! Layers are declared as data (TOML or JSON) and resolved once into a
//! [`LayerSet`]. Every check happens here so the per-cell pass never has to
//! re-validate.

use crate::layer::{LayerRule, LayerSet, TileGroup};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tileblend_core::{SheetDef, SheetIndex, TileId};
use tracing::info;

/// Errors that can occur when loading or resolving layer configuration
#[derive(Debug, Error)]
pub enum LayerConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Layer '{layer}' references unknown sheet '{sheet}'")]
    UnknownSheet { layer: String, sheet: String },
    #[error("Layer '{0}' is declared more than once")]
    DuplicateLayer(String),
    #[error("Layer '{0}' has no tiles in its group")]
    EmptyGroup(String),
    #[error("Sheet index {0} is used by more than one sheet")]
    DuplicateSheetIndex(SheetIndex),
    #[error("Sheet key '{0}' is used by more than one sheet")]
    DuplicateSheetKey(String),
    #[error("No layers configured")]
    NoLayers,
    #[error("{count} layers configured, at most {max} are supported")]
    TooManyLayers { count: usize, max: usize },
}

/// Declaration of one layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDef {
    pub name: String,
    /// Tiles that belong to this layer's group
    pub tiles: TileGroup,
    /// Key of the blob sheet in [`LayerConfig::sheets`]
    pub sheet: String,
}

/// Layer configuration for a project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Blob sheets the layers draw from
    #[serde(default)]
    pub sheets: Vec<SheetDef>,
    /// Layers in output channel order
    #[serde(default)]
    pub layers: Vec<LayerDef>,
}

impl LayerConfig {
    /// The shipped land / grass / dirt-path layers
    pub fn builtin() -> Self {
        const LAND_BLOB: SheetIndex = SheetIndex::expect_nonzero(1);
        const GRASS_BLOB: SheetIndex = SheetIndex::expect_nonzero(2);
        const PATH_BLOB: SheetIndex = SheetIndex::expect_nonzero(3);

        Self {
            sheets: vec![
                SheetDef::new(LAND_BLOB, "land_blob", "tilesets/autotile/land_blob.png"),
                SheetDef::new(GRASS_BLOB, "grass_blob", "tilesets/autotile/grass_blob.png"),
                SheetDef::new(PATH_BLOB, "path_blob", "tilesets/autotile/path_blob.png"),
            ],
            layers: vec![
                LayerDef {
                    name: "non_water".to_string(),
                    tiles: TileGroup::non_water(),
                    sheet: "land_blob".to_string(),
                },
                LayerDef {
                    name: "grass_land".to_string(),
                    tiles: TileGroup::from_tiles(&[
                        TileId::Grass,
                        TileId::Forest,
                        TileId::DenseForest,
                        TileId::DirtPath,
                    ]),
                    sheet: "grass_blob".to_string(),
                },
                LayerDef {
                    name: "dirt_path".to_string(),
                    tiles: TileGroup::from_tiles(&[TileId::DirtPath]),
                    sheet: "path_blob".to_string(),
                },
            ],
        }
    }

    /// Load from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self, LayerConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LayerConfigError::IoError(e.to_string()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LayerConfigError> {
        toml::from_str(content).map_err(|e| LayerConfigError::ParseError(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, LayerConfigError> {
        serde_json::from_str(content).map_err(|e| LayerConfigError::ParseError(e.to_string()))
    }

    /// Get a sheet by key
    pub fn get_sheet(&self, key: &str) -> Option<&SheetDef> {
        self.sheets.iter().find(|s| s.key == key)
    }

    /// Validate and resolve into the runtime layer list
    pub fn build(&self) -> Result<LayerSet, LayerConfigError> {
        if self.layers.is_empty() {
            return Err(LayerConfigError::NoLayers);
        }
        if self.layers.len() > LayerSet::MAX_LAYERS {
            return Err(LayerConfigError::TooManyLayers {
                count: self.layers.len(),
                max: LayerSet::MAX_LAYERS,
            });
        }

        let mut indices = HashSet::new();
        let mut keys = HashSet::new();
        for sheet in &self.sheets {
            if !indices.insert(sheet.index) {
                return Err(LayerConfigError::DuplicateSheetIndex(sheet.index));
            }
            if !keys.insert(sheet.key.as_str()) {
                return Err(LayerConfigError::DuplicateSheetKey(sheet.key.clone()));
            }
        }

        let mut names = HashSet::new();
        let mut rules = Vec::with_capacity(self.layers.len());
        for def in &self.layers {
            if !names.insert(def.name.as_str()) {
                return Err(LayerConfigError::DuplicateLayer(def.name.clone()));
            }
            if def.tiles.is_empty() {
                return Err(LayerConfigError::EmptyGroup(def.name.clone()));
            }
            let sheet = self
                .get_sheet(&def.sheet)
                .ok_or_else(|| LayerConfigError::UnknownSheet {
                    layer: def.name.clone(),
                    sheet: def.sheet.clone(),
                })?;
            rules.push(LayerRule::new(def.name.clone(), def.tiles, sheet.index));
        }

        info!(
            "Resolved {} autotile layers over {} sheets",
            rules.len(),
            self.sheets.len()
        );
        Ok(LayerSet::from_rules(rules))
    }
}
