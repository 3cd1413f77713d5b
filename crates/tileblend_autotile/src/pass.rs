//! Chunk-level autotile pass
//!
//! For every cell of a chunk and every layer whose group contains the cell's
//! tile, compute the neighbor mask and store the packed sprite in that
//! layer's channel. Cells outside a layer's group store 0.

use crate::layer::LayerSet;
use rayon::prelude::*;
use tileblend_core::{Chunk, ChunkCoord, PackedSprite, TerrainSource, TileId};
use tracing::debug;

/// Packed sprite per cell, one channel per configured layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkLayerOutput {
    pub coord: ChunkCoord,
    size: u32,
    channels: Vec<Vec<PackedSprite>>,
}

impl ChunkLayerOutput {
    /// Zeroed output for `layer_count` layers over a `size`x`size` chunk
    pub fn new(coord: ChunkCoord, size: u32, layer_count: usize) -> Self {
        let area = (size * size) as usize;
        Self {
            coord,
            size,
            channels: vec![vec![PackedSprite::EMPTY; area]; layer_count],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn layer_count(&self) -> usize {
        self.channels.len()
    }

    /// All cells of one layer channel, row-major
    pub fn channel(&self, layer: usize) -> Option<&[PackedSprite]> {
        self.channels.get(layer).map(Vec::as_slice)
    }

    /// Packed value at a local cell, `None` outside the chunk or channel list
    pub fn get(&self, layer: usize, lx: u32, ly: u32) -> Option<PackedSprite> {
        if lx >= self.size || ly >= self.size {
            return None;
        }
        let idx = (ly * self.size + lx) as usize;
        self.channels.get(layer).and_then(|c| c.get(idx)).copied()
    }

    /// Raw integers of one channel, as handed to the renderer
    pub fn raw_channel(&self, layer: usize) -> Vec<u32> {
        self.channel(layer)
            .map(|c| c.iter().map(|p| p.raw()).collect())
            .unwrap_or_default()
    }

    /// Reset for reuse with another chunk of the same shape
    fn reset(&mut self, coord: ChunkCoord, size: u32, layer_count: usize) {
        let area = (size * size) as usize;
        self.coord = coord;
        self.size = size;
        self.channels.resize_with(layer_count, Vec::new);
        for channel in &mut self.channels {
            channel.clear();
            channel.resize(area, PackedSprite::EMPTY);
        }
    }

    fn non_empty(&self) -> usize {
        self.channels
            .iter()
            .map(|c| c.iter().filter(|p| !p.is_empty()).count())
            .sum()
    }
}

/// Tile reads for one chunk: cells inside come from the chunk itself,
/// everything else from the read-only source.
struct ChunkView<'a, S: ?Sized> {
    chunk: &'a Chunk,
    origin: (i32, i32),
    source: &'a S,
}

impl<'a, S> TerrainSource for ChunkView<'a, S>
where
    S: TerrainSource + ?Sized,
{
    fn tile(&self, tx: i32, ty: i32) -> TileId {
        let lx = tx - self.origin.0;
        let ly = ty - self.origin.1;
        if lx < 0 || ly < 0 {
            return self.source.tile(tx, ty);
        }
        self.chunk
            .get(lx as u32, ly as u32)
            .unwrap_or_else(|| self.source.tile(tx, ty))
    }
}

/// Compute every layer channel for one chunk
pub fn compute_chunk_all_layers<S>(chunk: &Chunk, layers: &LayerSet, source: &S) -> ChunkLayerOutput
where
    S: TerrainSource + ?Sized,
{
    let mut out = ChunkLayerOutput::new(chunk.coord, chunk.size(), layers.len());
    compute_chunk_all_layers_into(&mut out, chunk, layers, source);
    out
}

/// Compute every layer channel for one chunk, reusing `out`'s buffers
pub fn compute_chunk_all_layers_into<S>(
    out: &mut ChunkLayerOutput,
    chunk: &Chunk,
    layers: &LayerSet,
    source: &S,
) where
    S: TerrainSource + ?Sized,
{
    out.reset(chunk.coord, chunk.size(), layers.len());

    let view = ChunkView {
        chunk,
        origin: chunk.origin(),
        source,
    };
    let (ox, oy) = view.origin;

    let size = chunk.size();
    for (idx, &tile) in chunk.tiles().iter().enumerate() {
        let lx = (idx as u32 % size) as i32;
        let ly = (idx as u32 / size) as i32;
        let (tx, ty) = (ox + lx, oy + ly);

        for (channel, rule) in layers.iter().enumerate() {
            if rule.matches(tile) {
                let mask = rule.mask(tx, ty, &view);
                out.channels[channel][idx] = rule.sprite(mask);
            }
        }
    }

    debug!(
        "Autotiled chunk ({}, {}): {} layers, {} non-empty cells",
        chunk.coord.x,
        chunk.coord.y,
        layers.len(),
        out.non_empty()
    );
}

/// Autotile many chunks in parallel. Output order follows `chunks`.
pub fn par_compute_autotile<S>(
    chunks: &[&Chunk],
    layers: &LayerSet,
    source: &S,
) -> Vec<ChunkLayerOutput>
where
    S: TerrainSource + Sync + ?Sized,
{
    chunks
        .par_iter()
        .map(|chunk| compute_chunk_all_layers(chunk, layers, source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmask::{self, neighbors::*};
    use crate::config::LayerConfig;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use tileblend_core::{ChunkedWorld, SpriteCell};

    fn builtin_layers() -> LayerSet {
        LayerConfig::builtin().build().unwrap()
    }

    #[test]
    fn test_uniform_matching_chunk_is_full_interior() {
        let layers = builtin_layers();
        let mut world = ChunkedWorld::new(8, TileId::Grass);
        world.load_filled(ChunkCoord::new(0, 0), TileId::Grass);

        let chunk = world.chunk(ChunkCoord::new(0, 0)).unwrap();
        let out = compute_chunk_all_layers(chunk, &layers, &world);

        let grass = layers.channel("grass_land").unwrap();
        let full = layers.get(grass).unwrap().sprite(bitmask::FULL);
        assert!(out.channel(grass).unwrap().iter().all(|&p| p == full));
        assert_eq!(full.cell(), SpriteCell::new(1, 0));

        let path = layers.channel("dirt_path").unwrap();
        assert!(out.channel(path).unwrap().iter().all(|p| p.is_empty()));
    }

    #[test]
    fn test_uniform_non_matching_chunk_is_empty() {
        let layers = builtin_layers();
        let mut world = ChunkedWorld::new(8, TileId::Water);
        world.load_filled(ChunkCoord::new(2, -1), TileId::Water);

        let chunk = world.chunk(ChunkCoord::new(2, -1)).unwrap();
        let out = compute_chunk_all_layers(chunk, &layers, &world);

        for layer in 0..layers.len() {
            assert!(out.raw_channel(layer).iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_chunk_edge_reads_neighbor_source() {
        let layers = builtin_layers();
        // Grass chunk surrounded by unloaded water
        let mut world = ChunkedWorld::new(4, TileId::Water);
        world.load_filled(ChunkCoord::new(0, 0), TileId::Grass);

        let chunk = world.chunk(ChunkCoord::new(0, 0)).unwrap();
        let out = compute_chunk_all_layers(chunk, &layers, &world);
        let land = layers.channel("non_water").unwrap();
        let rule = layers.get(land).unwrap();

        assert_eq!(out.get(land, 0, 0), Some(rule.sprite(E | S | SE)));
        assert_eq!(out.get(land, 1, 0), Some(rule.sprite(W | E | S | SW | SE)));
        assert_eq!(out.get(land, 1, 1), Some(rule.sprite(bitmask::FULL)));
        assert_eq!(out.get(land, 3, 3), Some(rule.sprite(N | W | NW)));
    }

    #[test]
    fn test_dirt_path_fills_three_channels() {
        let layers = builtin_layers();
        let mut world = ChunkedWorld::new(4, TileId::Grass);
        world.load_filled(ChunkCoord::new(0, 0), TileId::Grass);
        world.set_tile(1, 1, TileId::DirtPath);

        let chunk = world.chunk(ChunkCoord::new(0, 0)).unwrap();
        let out = compute_chunk_all_layers(chunk, &layers, &world);

        let path = layers.channel("dirt_path").unwrap();
        let land = layers.channel("non_water").unwrap();
        let grass = layers.channel("grass_land").unwrap();

        let isolated = layers.get(path).unwrap().sprite(bitmask::ISOLATED);
        assert_eq!(out.get(path, 1, 1), Some(isolated));
        assert_eq!(out.get(path, 2, 1), Some(PackedSprite::EMPTY));
        assert!(!out.get(land, 1, 1).unwrap().is_empty());
        assert!(!out.get(grass, 1, 1).unwrap().is_empty());
    }

    #[test]
    fn test_source_not_queried_beyond_one_tile() {
        let layers = builtin_layers();
        let chunk = Chunk::filled(ChunkCoord::new(0, 0), 4, TileId::Grass);
        let source = |tx: i32, ty: i32| {
            assert!((-1..=4).contains(&tx) && (-1..=4).contains(&ty));
            TileId::Grass
        };
        let out = compute_chunk_all_layers(&chunk, &layers, &source);
        assert_eq!(out.layer_count(), 3);
    }

    #[test]
    fn test_reused_buffer_matches_fresh_output() {
        let layers = builtin_layers();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut world = ChunkedWorld::new(8, TileId::Grass);
        for cy in 0..2 {
            for cx in 0..2 {
                let chunk = world.load_filled(ChunkCoord::new(cx, cy), TileId::Grass);
                for tile in chunk.tiles_mut() {
                    *tile = TileId::ALL[rng.gen_range(0..TileId::ALL.len())];
                }
            }
        }

        let mut reused = ChunkLayerOutput::new(ChunkCoord::new(0, 0), 8, 0);
        for coord in world.loaded() {
            let chunk = world.chunk(coord).unwrap();
            compute_chunk_all_layers_into(&mut reused, chunk, &layers, &world);
            assert_eq!(reused, compute_chunk_all_layers(chunk, &layers, &world));
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let layers = builtin_layers();
        let mut world = ChunkedWorld::new(8, TileId::Water);
        world.load_filled(ChunkCoord::new(0, 0), TileId::Grass);
        world.load_filled(ChunkCoord::new(1, 0), TileId::Sand);
        world.set_tile(8, 3, TileId::DirtPath);

        let coords = world.loaded();
        let chunks: Vec<&Chunk> = coords.iter().filter_map(|c| world.chunk(*c)).collect();
        let parallel = par_compute_autotile(&chunks, &layers, &world);

        for (chunk, out) in chunks.iter().zip(&parallel) {
            assert_eq!(out, &compute_chunk_all_layers(chunk, &layers, &world));
        }
    }
}
