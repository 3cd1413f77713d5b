//! Chunk storage and the read-only terrain accessor

use crate::TileId;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use thiserror::Error;

/// Default chunk edge length in tiles
pub const CHUNK_SIZE: u32 = 32;

/// Position of a chunk in chunk units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk containing tile `(tx, ty)`
    pub fn of_tile(tx: i32, ty: i32, chunk_size: u32) -> Self {
        let size = chunk_size as i32;
        Self {
            x: tx.div_euclid(size),
            y: ty.div_euclid(size),
        }
    }

    /// World tile coordinate of this chunk's top-left cell
    pub fn origin(self, chunk_size: u32) -> (i32, i32) {
        let size = chunk_size as i32;
        (self.x * size, self.y * size)
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Read-only tile lookup in world tile coordinates.
///
/// Implementations must answer from already-loaded data and return a default
/// tile for unloaded regions. Looking up a tile never creates storage.
pub trait TerrainSource {
    fn tile(&self, tx: i32, ty: i32) -> TileId;
}

impl<F> TerrainSource for F
where
    F: Fn(i32, i32) -> TileId,
{
    fn tile(&self, tx: i32, ty: i32) -> TileId {
        self(tx, ty)
    }
}

/// Errors that can occur when building a chunk from raw tiles
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("Chunk of size {size} needs {expected} tiles, got {actual}")]
    TileCountMismatch {
        size: u32,
        expected: usize,
        actual: usize,
    },
}

/// Serialized form of a [`Chunk`], checked on the way in
#[derive(Serialize, Deserialize)]
struct ChunkData {
    coord: ChunkCoord,
    size: u32,
    tiles: Vec<TileId>,
}

impl TryFrom<ChunkData> for Chunk {
    type Error = ChunkError;

    fn try_from(data: ChunkData) -> Result<Self, Self::Error> {
        Chunk::from_tiles(data.coord, data.size, data.tiles)
    }
}

impl From<Chunk> for ChunkData {
    fn from(chunk: Chunk) -> Self {
        Self {
            coord: chunk.coord,
            size: chunk.size,
            tiles: chunk.tiles,
        }
    }
}

/// A square block of tiles, row-major.
///
/// `tiles` always holds exactly `size * size` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChunkData", into = "ChunkData")]
pub struct Chunk {
    pub coord: ChunkCoord,
    size: u32,
    tiles: Vec<TileId>,
}

impl Chunk {
    /// Create a chunk filled with one tile
    pub fn filled(coord: ChunkCoord, size: u32, tile: TileId) -> Self {
        Self {
            coord,
            size,
            tiles: vec![tile; (size * size) as usize],
        }
    }

    /// Create a chunk from row-major tiles
    pub fn from_tiles(coord: ChunkCoord, size: u32, tiles: Vec<TileId>) -> Result<Self, ChunkError> {
        let expected = (size as usize) * (size as usize);
        if tiles.len() != expected {
            return Err(ChunkError::TileCountMismatch {
                size,
                expected,
                actual: tiles.len(),
            });
        }
        Ok(Self { coord, size, tiles })
    }

    /// Edge length in tiles
    pub fn size(&self) -> u32 {
        self.size
    }

    /// All tiles, row-major
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    /// All tiles, row-major. The slice length is fixed.
    pub fn tiles_mut(&mut self) -> &mut [TileId] {
        &mut self.tiles
    }

    /// Number of cells
    pub fn area(&self) -> usize {
        self.tiles.len()
    }

    /// Row-major index of a local cell
    pub fn index(&self, lx: u32, ly: u32) -> usize {
        (ly * self.size + lx) as usize
    }

    /// Get the tile at a local cell, `None` outside the chunk
    pub fn get(&self, lx: u32, ly: u32) -> Option<TileId> {
        if lx >= self.size || ly >= self.size {
            return None;
        }
        self.tiles.get(self.index(lx, ly)).copied()
    }

    /// Set the tile at a local cell. Returns false outside the chunk.
    pub fn set(&mut self, lx: u32, ly: u32, tile: TileId) -> bool {
        if lx >= self.size || ly >= self.size {
            return false;
        }
        let idx = self.index(lx, ly);
        match self.tiles.get_mut(idx) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    /// World coordinate of the top-left cell
    pub fn origin(&self) -> (i32, i32) {
        self.coord.origin(self.size)
    }
}

/// Loaded chunks keyed by coordinate, with a default tile for everything else
#[derive(Debug, Clone)]
pub struct ChunkedWorld {
    chunk_size: u32,
    default_tile: TileId,
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl ChunkedWorld {
    /// Empty world of `chunk_size`x`chunk_size` chunks.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0.
    pub fn new(chunk_size: u32, default_tile: TileId) -> Self {
        assert!(chunk_size > 0, "chunk size must be at least 1 tile");
        Self {
            chunk_size,
            default_tile,
            chunks: HashMap::new(),
        }
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn default_tile(&self) -> TileId {
        self.default_tile
    }

    /// Load (or replace) a chunk filled with one tile
    pub fn load_filled(&mut self, coord: ChunkCoord, tile: TileId) -> &mut Chunk {
        let chunk = Chunk::filled(coord, self.chunk_size, tile);
        match self.chunks.entry(coord) {
            Entry::Occupied(mut entry) => {
                entry.insert(chunk);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(chunk),
        }
    }

    /// Load (or replace) a chunk. Returns the previous chunk at that position.
    ///
    /// Chunks of a different size than the world's are rejected and handed
    /// back as the error.
    pub fn insert(&mut self, chunk: Chunk) -> Result<Option<Chunk>, Chunk> {
        if chunk.size != self.chunk_size {
            return Err(chunk);
        }
        Ok(self.chunks.insert(chunk.coord, chunk))
    }

    pub fn unload(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(&coord)
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Loaded chunk coordinates in sorted order
    pub fn loaded(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.chunks.keys().copied().collect();
        coords.sort();
        coords
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Paint a tile in a loaded chunk.
    ///
    /// Returns the loaded chunks whose derived layers read this tile and so
    /// must be recomputed. Painting into an unloaded chunk does nothing and
    /// returns an empty list.
    pub fn set_tile(&mut self, tx: i32, ty: i32, tile: TileId) -> Vec<ChunkCoord> {
        let coord = ChunkCoord::of_tile(tx, ty, self.chunk_size);
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return Vec::new();
        };
        let (ox, oy) = chunk.origin();
        chunk.set((tx - ox) as u32, (ty - oy) as u32, tile);

        self.affected_chunks(tx, ty)
            .into_iter()
            .filter(|c| self.chunks.contains_key(c))
            .collect()
    }

    /// Chunks containing a cell within one tile of `(tx, ty)`: the owning
    /// chunk plus the neighbors across an edge or corner the tile touches.
    pub fn affected_chunks(&self, tx: i32, ty: i32) -> Vec<ChunkCoord> {
        let mut out = Vec::with_capacity(4);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let coord = ChunkCoord::of_tile(tx + dx, ty + dy, self.chunk_size);
                if !out.contains(&coord) {
                    out.push(coord);
                }
            }
        }
        out
    }
}

impl TerrainSource for ChunkedWorld {
    fn tile(&self, tx: i32, ty: i32) -> TileId {
        let coord = ChunkCoord::of_tile(tx, ty, self.chunk_size);
        match self.chunks.get(&coord) {
            Some(chunk) => {
                let (ox, oy) = chunk.origin();
                chunk
                    .get((tx - ox) as u32, (ty - oy) as u32)
                    .unwrap_or(self.default_tile)
            }
            None => self.default_tile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_negative_tiles() {
        assert_eq!(ChunkCoord::of_tile(-1, 0, 32), ChunkCoord::new(-1, 0));
        assert_eq!(ChunkCoord::of_tile(31, 32, 32), ChunkCoord::new(0, 1));
        assert_eq!(ChunkCoord::new(-1, 2).origin(32), (-32, 64));
    }

    #[test]
    fn test_chunk_bounds() {
        let mut chunk = Chunk::filled(ChunkCoord::new(0, 0), 4, TileId::Grass);
        assert_eq!(chunk.area(), 16);
        assert!(chunk.set(3, 3, TileId::Water));
        assert!(!chunk.set(4, 0, TileId::Water));
        assert_eq!(chunk.get(3, 3), Some(TileId::Water));
        assert_eq!(chunk.get(0, 4), None);
    }

    #[test]
    fn test_unloaded_reads_default_without_loading() {
        let mut world = ChunkedWorld::new(8, TileId::Water);
        world.load_filled(ChunkCoord::new(0, 0), TileId::Grass);

        assert_eq!(world.tile(3, 3), TileId::Grass);
        assert_eq!(world.tile(-1, 3), TileId::Water);
        assert_eq!(world.tile(100, 100), TileId::Water);
        assert_eq!(world.loaded(), vec![ChunkCoord::new(0, 0)]);
    }

    #[test]
    fn test_closure_source() {
        let source = |tx: i32, _ty: i32| if tx < 0 { TileId::Water } else { TileId::Sand };
        assert_eq!(source.tile(-3, 0), TileId::Water);
        assert_eq!(TerrainSource::tile(&source, 2, 0), TileId::Sand);
    }

    #[test]
    fn test_set_tile_reports_edge_neighbors() {
        let mut world = ChunkedWorld::new(8, TileId::Grass);
        for y in -1..=1 {
            for x in -1..=1 {
                world.load_filled(ChunkCoord::new(x, y), TileId::Grass);
            }
        }

        // Interior edit touches one chunk
        let affected = world.set_tile(4, 4, TileId::Water);
        assert_eq!(affected, vec![ChunkCoord::new(0, 0)]);

        // Corner edit touches the four chunks meeting there
        let mut affected = world.set_tile(0, 0, TileId::Water);
        affected.sort();
        assert_eq!(
            affected,
            vec![
                ChunkCoord::new(-1, -1),
                ChunkCoord::new(-1, 0),
                ChunkCoord::new(0, -1),
                ChunkCoord::new(0, 0),
            ]
        );
        assert_eq!(world.tile(0, 0), TileId::Water);
    }

    #[test]
    fn test_from_tiles_checks_length() {
        let ok = Chunk::from_tiles(ChunkCoord::new(1, 1), 2, vec![TileId::Sand; 4]).unwrap();
        assert_eq!(ok.size(), 2);
        assert_eq!(ok.tiles().len(), 4);

        let err = Chunk::from_tiles(ChunkCoord::new(1, 1), 2, vec![TileId::Sand; 3]).unwrap_err();
        assert_eq!(
            err,
            ChunkError::TileCountMismatch {
                size: 2,
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_deserialize_rejects_short_tile_list() {
        let json = r#"{"coord":{"x":0,"y":0},"size":4,"tiles":["Grass"]}"#;
        assert!(serde_json::from_str::<Chunk>(json).is_err());

        let chunk = Chunk::filled(ChunkCoord::new(-2, 3), 2, TileId::Beach);
        let text = serde_json::to_string(&chunk).unwrap();
        let back: Chunk = serde_json::from_str(&text).unwrap();
        assert_eq!(back, chunk);
    }

    #[test]
    fn test_insert_rejects_other_chunk_size() {
        let mut world = ChunkedWorld::new(8, TileId::Grass);
        let wrong = Chunk::filled(ChunkCoord::new(0, 0), 4, TileId::Sand);
        assert!(world.insert(wrong).is_err());
        assert!(world.loaded().is_empty());

        let right = Chunk::filled(ChunkCoord::new(0, 0), 8, TileId::Sand);
        assert_eq!(world.insert(right), Ok(None));
        assert_eq!(world.tile(7, 7), TileId::Sand);
    }

    #[test]
    #[should_panic(expected = "chunk size")]
    fn test_zero_chunk_size_rejected() {
        ChunkedWorld::new(0, TileId::Grass);
    }

    #[test]
    fn test_set_tile_in_unloaded_chunk_is_ignored() {
        let mut world = ChunkedWorld::new(8, TileId::Grass);
        assert!(world.set_tile(50, 50, TileId::Water).is_empty());
        assert!(world.loaded().is_empty());
    }
}
