//! Terrain, tile and biome identifiers
//!
//! Three separate identifier spaces live here. Their numeric values overlap
//! (biome 2 is not terrain 2), so conversions only go through the named
//! mapping functions [`Biome::tile`] and [`TileId::terrain`].

use serde::{Deserialize, Serialize};

/// Terrain used by the blend graph.
///
/// Declaration order is depth order: a lower variant is the base, a higher
/// variant is the overlay drawn blended on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainId {
    DeepWater,
    ShallowWater,
    Sand,
    SandLight,
    Grass,
    DirtLight,
    DirtWarm,
}

impl TerrainId {
    /// Every terrain in depth order
    pub const ALL: [TerrainId; 7] = [
        TerrainId::DeepWater,
        TerrainId::ShallowWater,
        TerrainId::Sand,
        TerrainId::SandLight,
        TerrainId::Grass,
        TerrainId::DirtLight,
        TerrainId::DirtWarm,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Depth of this terrain. Unique per terrain.
    pub const fn depth(self) -> u8 {
        self as u8
    }

    /// Index into per-terrain tables
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The deeper of two terrains, i.e. the overlay side of a blend
    pub fn overlay_of(a: TerrainId, b: TerrainId) -> TerrainId {
        if a.depth() >= b.depth() {
            a
        } else {
            b
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TerrainId::DeepWater => "DeepWater",
            TerrainId::ShallowWater => "ShallowWater",
            TerrainId::Sand => "Sand",
            TerrainId::SandLight => "SandLight",
            TerrainId::Grass => "Grass",
            TerrainId::DirtLight => "DirtLight",
            TerrainId::DirtWarm => "DirtWarm",
        }
    }
}

/// Gameplay-facing tile tag stored in chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum TileId {
    DeepWater,
    Water,
    Sand,
    Beach,
    #[default]
    Grass,
    Forest,
    DenseForest,
    Dirt,
    DirtPath,
}

impl TileId {
    pub const ALL: [TileId; 9] = [
        TileId::DeepWater,
        TileId::Water,
        TileId::Sand,
        TileId::Beach,
        TileId::Grass,
        TileId::Forest,
        TileId::DenseForest,
        TileId::Dirt,
        TileId::DirtPath,
    ];

    /// Bit position of this tile in a tile group bitset
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Collapse to the terrain used for blending.
    ///
    /// Lossy: Forest and DenseForest render as Grass, DirtPath as DirtWarm.
    pub const fn terrain(self) -> TerrainId {
        match self {
            TileId::DeepWater => TerrainId::DeepWater,
            TileId::Water => TerrainId::ShallowWater,
            TileId::Sand => TerrainId::Sand,
            TileId::Beach => TerrainId::SandLight,
            TileId::Grass | TileId::Forest | TileId::DenseForest => TerrainId::Grass,
            TileId::Dirt => TerrainId::DirtLight,
            TileId::DirtPath => TerrainId::DirtWarm,
        }
    }

    pub const fn is_water(self) -> bool {
        matches!(self, TileId::DeepWater | TileId::Water)
    }
}

/// Biome assigned by the world generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Biome {
    Ocean,
    Lake,
    Plains,
    Woodland,
    Jungle,
    Desert,
    Coast,
    Badlands,
}

impl Biome {
    pub const ALL: [Biome; 8] = [
        Biome::Ocean,
        Biome::Lake,
        Biome::Plains,
        Biome::Woodland,
        Biome::Jungle,
        Biome::Desert,
        Biome::Coast,
        Biome::Badlands,
    ];

    /// Ground tile painted for this biome
    pub const fn tile(self) -> TileId {
        match self {
            Biome::Ocean => TileId::DeepWater,
            Biome::Lake => TileId::Water,
            Biome::Plains => TileId::Grass,
            Biome::Woodland => TileId::Forest,
            Biome::Jungle => TileId::DenseForest,
            Biome::Desert => TileId::Sand,
            Biome::Coast => TileId::Beach,
            Biome::Badlands => TileId::Dirt,
        }
    }

    /// Terrain used when blending this biome's ground
    pub const fn terrain(self) -> TerrainId {
        self.tile().terrain()
    }
}
