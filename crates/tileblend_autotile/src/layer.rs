//! Terrain layers: named tile groups that blob independently

use crate::bitmask;
use crate::mask::compute_mask;
use serde::{Deserialize, Serialize};
use tileblend_core::{PackedSprite, SheetIndex, TerrainSource, TileId};

/// A set of tile identifiers, stored as a bitset over [`TileId::bit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TileId>", into = "Vec<TileId>")]
pub struct TileGroup(u32);

impl TileGroup {
    pub const EMPTY: Self = Self(0);

    pub fn from_tiles(tiles: &[TileId]) -> Self {
        Self(tiles.iter().fold(0, |bits, t| bits | t.bit()))
    }

    /// Every tile that is not water
    pub fn non_water() -> Self {
        Self::matching(|t| !t.is_water())
    }

    /// Every tile satisfying `predicate`, evaluated once per tile id
    pub fn matching(predicate: impl Fn(TileId) -> bool) -> Self {
        Self(
            TileId::ALL
                .iter()
                .filter(|&&t| predicate(t))
                .fold(0, |bits, t| bits | t.bit()),
        )
    }

    #[inline]
    pub fn contains(self, tile: TileId) -> bool {
        self.0 & tile.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn tiles(self) -> impl Iterator<Item = TileId> {
        TileId::ALL.into_iter().filter(move |&t| self.contains(t))
    }
}

impl From<Vec<TileId>> for TileGroup {
    fn from(tiles: Vec<TileId>) -> Self {
        Self::from_tiles(&tiles)
    }
}

impl From<TileGroup> for Vec<TileId> {
    fn from(group: TileGroup) -> Self {
        group.tiles().collect()
    }
}

/// One autotile layer: a tile group and the blob sheet it draws from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRule {
    pub name: String,
    pub group: TileGroup,
    pub sheet: SheetIndex,
}

impl LayerRule {
    pub fn new(name: impl Into<String>, group: TileGroup, sheet: SheetIndex) -> Self {
        Self {
            name: name.into(),
            group,
            sheet,
        }
    }

    /// Whether a tile belongs to this layer
    #[inline]
    pub fn matches(&self, tile: TileId) -> bool {
        self.group.contains(tile)
    }

    /// Canonical neighbor mask of this layer at `(tx, ty)`
    pub fn mask<S>(&self, tx: i32, ty: i32, source: &S) -> u8
    where
        S: TerrainSource + ?Sized,
    {
        compute_mask(tx, ty, |x, y| self.group.contains(source.tile(x, y)))
    }

    /// Packed sprite for a canonical mask on this layer's sheet
    pub fn sprite(&self, mask: u8) -> PackedSprite {
        PackedSprite::pack(self.sheet, bitmask::lookup(mask))
    }
}

/// The ordered list of layers, resolved once at startup.
///
/// A layer's position in this list is its output channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSet {
    layers: Vec<LayerRule>,
}

impl LayerSet {
    /// Upper bound on configured layers
    pub const MAX_LAYERS: usize = 16;

    pub(crate) fn from_rules(layers: Vec<LayerRule>) -> Self {
        Self { layers }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, channel: usize) -> Option<&LayerRule> {
        self.layers.get(channel)
    }

    /// Output channel of the layer with this name
    pub fn channel(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerRule> {
        self.layers.iter()
    }

    /// Channels whose layer contains `tile`
    pub fn channels_for(&self, tile: TileId) -> impl Iterator<Item = usize> + '_ {
        self.layers
            .iter()
            .enumerate()
            .filter(move |(_, l)| l.matches(tile))
            .map(|(i, _)| i)
    }
}
