//! Subgrid strategy: terrain on a half-tile lattice
//!
//! A chunk of `N`x`N` tiles stores `(2N + 1)` x `(2N + 1)` points. Tile
//! `(tx, ty)` is centered on point `(2tx + 1, 2ty + 1)` and samples the 8
//! points one step away. Edge points are shared with the neighboring chunk,
//! which stores its own copy; [`SubgridWorld`] keeps the copies equal.

use super::neighbor::stack_from_samples;
use super::{BlendLayers, LayerStack};
use crate::graph::BlendGraph;
use rayon::prelude::*;
use std::collections::HashMap;
use tileblend_autotile::bitmask::neighbors::OFFSETS;
use tileblend_core::{ChunkCoord, TerrainId};
use tracing::debug;

/// Point terrain of one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgridChunk {
    pub coord: ChunkCoord,
    size: u32,
    points: Vec<TerrainId>,
}

/// Tile indices along one axis whose sample window contains point `p`
fn tiles_touching(p: u32, size: u32) -> impl Iterator<Item = u32> {
    let hi = p / 2;
    let lo = if p % 2 == 0 { p.checked_sub(2).map(|q| q / 2) } else { None };
    lo.into_iter().chain(std::iter::once(hi)).filter(move |&t| t < size)
}

impl SubgridChunk {
    /// Chunk of `size`x`size` tiles with every point set to `fill`
    pub fn new(coord: ChunkCoord, size: u32, fill: TerrainId) -> Self {
        let side = 2 * size + 1;
        Self {
            coord,
            size,
            points: vec![fill; (side * side) as usize],
        }
    }

    /// Size in tiles
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Points per side, `2 * size + 1`
    pub fn side(&self) -> u32 {
        2 * self.size + 1
    }

    fn index(&self, px: u32, py: u32) -> Option<usize> {
        let side = self.side();
        (px < side && py < side).then(|| (py * side + px) as usize)
    }

    pub fn get(&self, px: u32, py: u32) -> Option<TerrainId> {
        self.index(px, py).map(|i| self.points[i])
    }

    /// Paint one point. Returns the tiles whose samples changed, at most 4.
    pub fn set(&mut self, px: u32, py: u32, terrain: TerrainId) -> Vec<(u32, u32)> {
        let Some(i) = self.index(px, py) else {
            return Vec::new();
        };
        if self.points[i] == terrain {
            return Vec::new();
        }
        self.points[i] = terrain;

        let mut affected = Vec::with_capacity(4);
        for ty in tiles_touching(py, self.size) {
            for tx in tiles_touching(px, self.size) {
                affected.push((tx, ty));
            }
        }
        affected
    }

    /// Terrain at the center point of a tile
    pub fn tile_center(&self, tx: u32, ty: u32) -> Option<TerrainId> {
        self.get(2 * tx + 1, 2 * ty + 1)
    }

    /// Blend layers of one tile, empty outside the chunk
    pub fn compose_tile<'g>(&self, tx: u32, ty: u32, graph: &'g BlendGraph) -> LayerStack<'g> {
        if tx >= self.size || ty >= self.size {
            return LayerStack::new();
        }
        let side = self.side() as i32;
        let (cx, cy) = (2 * tx as i32 + 1, 2 * ty as i32 + 1);
        let own = self.points[(cy * side + cx) as usize];

        let mut around = [own; 8];
        for (slot, &(_, dx, dy)) in around.iter_mut().zip(OFFSETS.iter()) {
            *slot = self.points[((cy + dy) * side + cx + dx) as usize];
        }
        stack_from_samples(own, &around, graph)
    }

    pub fn compose(&self, graph: &BlendGraph) -> BlendLayers {
        let mut out = BlendLayers::new(self.size, self.size);
        self.compose_into(&mut out, graph);
        out
    }

    /// Compose every tile, reusing `out`'s buffer
    pub fn compose_into(&self, out: &mut BlendLayers, graph: &BlendGraph) {
        out.reset(self.size, self.size);
        for ty in 0..self.size {
            for tx in 0..self.size {
                out.write(tx, ty, &self.compose_tile(tx, ty, graph));
            }
        }
        debug!(
            "Blended subgrid chunk ({}, {}): {} tiles with layers",
            self.coord.x,
            self.coord.y,
            out.blended_tiles()
        );
    }

    /// Recompose only the given tiles, e.g. the result of [`Self::set`]
    pub fn recompose_tiles(&self, out: &mut BlendLayers, tiles: &[(u32, u32)], graph: &BlendGraph) {
        for &(tx, ty) in tiles {
            out.write(tx, ty, &self.compose_tile(tx, ty, graph));
        }
    }
}

/// Loaded subgrid chunks addressed in world point coordinates.
///
/// World point `(wx, wy)` belongs to chunk `wx.div_euclid(2N)`; points on a
/// chunk edge are also stored by the chunk before it. A newly loaded chunk
/// takes its edge points from already loaded neighbors.
#[derive(Debug, Clone)]
pub struct SubgridWorld {
    chunk_size: u32,
    default_terrain: TerrainId,
    chunks: HashMap<ChunkCoord, SubgridChunk>,
}

/// Chunk indices along one axis that store world point `w`, ascending
fn owners(w: i32, span: i32) -> Vec<i32> {
    let c = w.div_euclid(span);
    if w.rem_euclid(span) == 0 {
        vec![c - 1, c]
    } else {
        vec![c]
    }
}

impl SubgridWorld {
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0.
    pub fn new(chunk_size: u32, default_terrain: TerrainId) -> Self {
        assert!(chunk_size > 0, "chunk size must be at least 1 tile");
        Self {
            chunk_size,
            default_terrain,
            chunks: HashMap::new(),
        }
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Load a chunk filled with `terrain`, replacing any existing one.
    ///
    /// Edge points already stored by a loaded neighbor keep the neighbor's
    /// terrain.
    pub fn load_filled(&mut self, coord: ChunkCoord, terrain: TerrainId) -> &mut SubgridChunk {
        let mut chunk = SubgridChunk::new(coord, self.chunk_size, terrain);
        let span = self.span();
        let last = chunk.side() - 1;
        let mut shared = 0;
        for py in 0..=last {
            for px in 0..=last {
                if px != 0 && py != 0 && px != last && py != last {
                    continue;
                }
                let (wx, wy) = (coord.x * span + px as i32, coord.y * span + py as i32);
                if let Some(t) = self.stored_point(wx, wy, Some(coord)) {
                    if let Some(i) = chunk.index(px, py) {
                        chunk.points[i] = t;
                        shared += 1;
                    }
                }
            }
        }
        if shared > 0 {
            debug!(
                "Loaded subgrid chunk ({}, {}) with {} edge points from neighbors",
                coord.x, coord.y, shared
            );
        }

        match self.chunks.entry(coord) {
            std::collections::hash_map::Entry::Occupied(mut e) => {
                e.insert(chunk);
                e.into_mut()
            }
            std::collections::hash_map::Entry::Vacant(e) => e.insert(chunk),
        }
    }

    pub fn unload(&mut self, coord: ChunkCoord) -> Option<SubgridChunk> {
        self.chunks.remove(&coord)
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&SubgridChunk> {
        self.chunks.get(&coord)
    }

    /// Loaded chunk coordinates, sorted
    pub fn loaded(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.chunks.keys().copied().collect();
        coords.sort();
        coords
    }

    fn span(&self) -> i32 {
        2 * self.chunk_size as i32
    }

    /// Value of a world point in the first loaded chunk storing it, other
    /// than `skip`
    fn stored_point(&self, wx: i32, wy: i32, skip: Option<ChunkCoord>) -> Option<TerrainId> {
        let span = self.span();
        for cy in owners(wy, span) {
            for cx in owners(wx, span) {
                let coord = ChunkCoord::new(cx, cy);
                if Some(coord) == skip {
                    continue;
                }
                if let Some(chunk) = self.chunks.get(&coord) {
                    return chunk.get((wx - cx * span) as u32, (wy - cy * span) as u32);
                }
            }
        }
        None
    }

    /// Terrain at a world point, the default where no chunk storing it is
    /// loaded
    pub fn get_point(&self, wx: i32, wy: i32) -> TerrainId {
        self.stored_point(wx, wy, None).unwrap_or(self.default_terrain)
    }

    /// Paint a world point in every loaded chunk that stores it.
    ///
    /// Returns the affected tiles grouped by chunk.
    pub fn set_point(&mut self, wx: i32, wy: i32, terrain: TerrainId) -> Vec<(ChunkCoord, Vec<(u32, u32)>)> {
        let span = self.span();
        let mut result = Vec::new();
        for cy in owners(wy, span) {
            for cx in owners(wx, span) {
                let coord = ChunkCoord::new(cx, cy);
                let Some(chunk) = self.chunks.get_mut(&coord) else {
                    continue;
                };
                let (px, py) = ((wx - cx * span) as u32, (wy - cy * span) as u32);
                let tiles = chunk.set(px, py, terrain);
                if !tiles.is_empty() {
                    result.push((coord, tiles));
                }
            }
        }
        result.sort_by_key(|(coord, _)| *coord);
        result
    }

    /// Compose every loaded chunk in parallel, sorted by coordinate
    pub fn par_compose(&self, graph: &BlendGraph) -> Vec<(ChunkCoord, BlendLayers)> {
        let mut chunks: Vec<&SubgridChunk> = self.chunks.values().collect();
        chunks.sort_by_key(|c| c.coord);
        chunks
            .par_iter()
            .map(|chunk| (chunk.coord, chunk.compose(graph)))
            .collect()
    }
}
