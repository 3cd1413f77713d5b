//! Terrain-pair blend graph
//!
//! Resolves which transition sheet draws the boundary between two terrains.
//! Lookups are plain table reads; the graph is built once from a
//! [`BlendConfig`] and shared read-only afterwards.

use crate::config::{BlendConfig, BlendConfigError};
use std::sync::OnceLock;
use tileblend_autotile::bitmask::canonicalize;
use tileblend_core::{PackedSprite, SheetDef, SheetIndex, SpriteCell, TerrainId};
use tracing::info;

const TERRAINS: usize = TerrainId::COUNT;

/// One resolved blend between two terrains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendEntry<'g> {
    sheet: &'g SheetDef,
    /// Lower terrain of the pair
    pub base: TerrainId,
    /// Deeper terrain of the pair, drawn on top
    pub overlay: TerrainId,
    /// The sheet was authored for the reverse direction; complement the mask
    pub inverted: bool,
    /// Generic dissolve sheet of `overlay` rather than dedicated pair art
    pub is_alpha: bool,
}

impl<'g> BlendEntry<'g> {
    pub fn sheet_index(&self) -> SheetIndex {
        self.sheet.index
    }

    pub fn sheet_key(&self) -> &'g str {
        &self.sheet.key
    }

    pub fn asset_path(&self) -> &'g str {
        &self.sheet.path
    }

    /// Canonical mask to look up for a raw sampled mask, whose bits mark
    /// where the other terrain touches
    pub fn orient(&self, raw: u8) -> u8 {
        if self.inverted {
            canonicalize(!raw)
        } else {
            canonicalize(raw)
        }
    }

    /// Packed sprite for a raw sampled mask
    pub fn sprite(&self, raw: u8) -> PackedSprite {
        let cell = tileblend_autotile::lookup(self.orient(raw));
        PackedSprite::pack(self.sheet.index, cell)
    }
}

/// Immutable blend lookup tables
#[derive(Debug, Clone)]
pub struct BlendGraph {
    sheets: Vec<SheetDef>,
    /// `[base][overlay]` -> sheet slot
    dedicated: [[Option<usize>; TERRAINS]; TERRAINS],
    alpha: [Option<usize>; TERRAINS],
    fill: [Option<usize>; TERRAINS],
    base_fill: SpriteCell,
}

static GLOBAL: OnceLock<BlendGraph> = OnceLock::new();

impl BlendGraph {
    /// Validate `config` and build the lookup tables
    pub fn from_config(config: &BlendConfig) -> Result<Self, BlendConfigError> {
        config.validate()?;
        Ok(Self::assemble(config))
    }

    /// Graph for the shipped configuration
    pub fn builtin() -> Self {
        // Built-in data is covered by `test_builtin_is_valid`
        Self::assemble(&BlendConfig::builtin())
    }

    /// Process-wide graph built from the shipped configuration on first use
    pub fn global() -> &'static BlendGraph {
        GLOBAL.get_or_init(Self::builtin)
    }

    fn assemble(config: &BlendConfig) -> Self {
        let mut sheets: Vec<SheetDef> = config.sheets().cloned().collect();
        sheets.sort_by_key(|s| s.index);
        let slot_of = |def: &SheetDef| sheets.binary_search_by_key(&def.index, |s| s.index).ok();

        let mut dedicated = [[None; TERRAINS]; TERRAINS];
        for d in &config.dedicated {
            dedicated[d.base.index()][d.overlay.index()] = slot_of(&d.sheet);
        }
        let mut alpha = [None; TERRAINS];
        for a in &config.alpha {
            alpha[a.terrain.index()] = slot_of(&a.sheet);
        }

        // Fill comes from the terrain's alpha sheet, else the first dedicated
        // sheet that draws it as the overlay
        let mut fill = [None; TERRAINS];
        for terrain in TerrainId::ALL {
            let t = terrain.index();
            fill[t] = alpha[t].or_else(|| {
                config
                    .dedicated
                    .iter()
                    .find(|d| d.overlay == terrain)
                    .and_then(|d| slot_of(&d.sheet))
            });
        }

        info!(
            "Built blend graph: {} dedicated sheets, {} alpha sheets",
            config.dedicated.len(),
            config.alpha.len()
        );
        Self {
            sheets,
            dedicated,
            alpha,
            fill,
            base_fill: config.base_fill,
        }
    }

    /// Resolve the blend drawn on a `mine` tile against a `neighbor` tile.
    ///
    /// Dedicated art is preferred in either direction, then the overlay's
    /// alpha sheet. Same-terrain pairs never blend.
    pub fn get_blend(&self, mine: TerrainId, neighbor: TerrainId) -> Option<BlendEntry<'_>> {
        if mine == neighbor {
            return None;
        }

        if let Some(slot) = self.dedicated[mine.index()][neighbor.index()] {
            return Some(self.entry(slot, mine, neighbor, false, false));
        }
        if let Some(slot) = self.dedicated[neighbor.index()][mine.index()] {
            return Some(self.entry(slot, neighbor, mine, true, false));
        }

        let overlay = TerrainId::overlay_of(mine, neighbor);
        let base = if overlay == mine { neighbor } else { mine };
        self.alpha[overlay.index()].map(|slot| self.entry(slot, base, overlay, false, true))
    }

    fn entry(
        &self,
        slot: usize,
        base: TerrainId,
        overlay: TerrainId,
        inverted: bool,
        is_alpha: bool,
    ) -> BlendEntry<'_> {
        BlendEntry {
            sheet: &self.sheets[slot],
            base,
            overlay,
            inverted,
            is_alpha,
        }
    }

    /// Uniform fill sprite of a terrain, if any sheet draws it
    pub fn get_base_fill(&self, terrain: TerrainId) -> Option<PackedSprite> {
        self.fill[terrain.index()]
            .map(|slot| PackedSprite::pack(self.sheets[slot].index, self.base_fill))
    }

    /// Alpha dissolve sheet of a terrain
    pub fn get_alpha(&self, terrain: TerrainId) -> Option<&SheetDef> {
        self.alpha[terrain.index()].map(|slot| &self.sheets[slot])
    }

    pub fn base_fill_cell(&self) -> SpriteCell {
        self.base_fill
    }

    /// Every sheet the renderer must preload, sorted by index
    pub fn sheets(&self) -> &[SheetDef] {
        &self.sheets
    }

    pub fn sheet(&self, index: SheetIndex) -> Option<&SheetDef> {
        self.sheets
            .binary_search_by_key(&index, |s| s.index)
            .ok()
            .map(|slot| &self.sheets[slot])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tileblend_autotile::bitmask::{neighbors::*, FULL, ISOLATED};
    use TerrainId::*;

    #[test]
    fn test_same_terrain_never_blends() {
        let graph = BlendGraph::builtin();
        for t in TerrainId::ALL {
            assert!(graph.get_blend(t, t).is_none());
        }
    }

    #[test]
    fn test_dedicated_both_directions() {
        let graph = BlendGraph::builtin();
        let forward = graph.get_blend(ShallowWater, Grass).unwrap();
        let reverse = graph.get_blend(Grass, ShallowWater).unwrap();

        assert_eq!(forward.sheet_index(), reverse.sheet_index());
        assert_eq!(forward.sheet_key(), "shallow_grass");
        assert!(!forward.inverted);
        assert!(reverse.inverted);
        assert!(!forward.is_alpha && !reverse.is_alpha);
        assert_eq!((reverse.base, reverse.overlay), (ShallowWater, Grass));
    }

    #[test]
    fn test_alpha_fallback_uses_deeper_terrain() {
        let graph = BlendGraph::builtin();
        let entry = graph.get_blend(DeepWater, Grass).unwrap();
        assert!(entry.is_alpha);
        assert!(!entry.inverted);
        assert_eq!(entry.overlay, Grass);
        assert_eq!(entry.sheet_key(), "grass_alpha");

        let back = graph.get_blend(Grass, DeepWater).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_dirt_pair_has_no_blend() {
        let graph = BlendGraph::builtin();
        assert!(graph.get_blend(DirtLight, DirtWarm).is_none());
        assert!(graph.get_blend(DirtWarm, DirtLight).is_none());
    }

    #[test]
    fn test_every_result_is_consistent() {
        let graph = BlendGraph::builtin();
        for a in TerrainId::ALL {
            for b in TerrainId::ALL {
                let Some(entry) = graph.get_blend(a, b) else { continue };
                assert!(entry.base.depth() < entry.overlay.depth() || entry.inverted);
                assert!(!(entry.inverted && entry.is_alpha));
                assert!(graph.sheet(entry.sheet_index()).is_some());
            }
        }
    }

    #[test]
    fn test_orient_complements_inverted_masks() {
        let graph = BlendGraph::builtin();
        let forward = graph.get_blend(ShallowWater, Grass).unwrap();
        let reverse = graph.get_blend(Grass, ShallowWater).unwrap();

        assert_eq!(forward.orient(N | NE), N);
        assert_eq!(reverse.orient(ISOLATED), FULL);
        assert_eq!(reverse.orient(FULL), ISOLATED);
        // Water to the north of a grass tile: grass remains W, E, S side
        assert_eq!(reverse.orient(N | NW | NE), W | E | S | SW | SE);
    }

    #[test]
    fn test_base_fill() {
        let graph = BlendGraph::builtin();
        let grass = graph.get_base_fill(Grass).unwrap();
        assert_eq!(grass.cell(), SpriteCell::new(1, 0));
        assert_eq!(grass.sheet(), graph.get_alpha(Grass).map(|s| s.index));

        // No alpha sheet; drawn as overlay of grass_dirtwarm
        let dirt = graph.get_base_fill(DirtWarm).unwrap();
        assert_eq!(dirt.sheet(), SheetIndex::new(22));

        assert!(graph.get_base_fill(DeepWater).is_none());
    }

    #[test]
    fn test_sheets_listed_for_preload() {
        let graph = BlendGraph::builtin();
        assert_eq!(graph.sheets().len(), 10);
        assert!(graph.sheets().windows(2).all(|w| w[0].index < w[1].index));
        assert!(graph
            .sheets()
            .iter()
            .all(|s| s.path.starts_with("tilesets/blend/")));
    }

    #[test]
    fn test_global_is_shared() {
        let a = BlendGraph::global() as *const BlendGraph;
        let b = BlendGraph::global() as *const BlendGraph;
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = BlendConfig::builtin();
        config.dedicated[0].overlay = config.dedicated[0].base;
        assert!(BlendGraph::from_config(&config).is_err());
    }
}
