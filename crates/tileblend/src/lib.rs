//! Blob autotiling and terrain blend layers for chunked 2D tilemaps
//!
//! Re-exports the member crates:
//!
//! - [`tileblend_core`]: identifiers, packed sprites and chunk storage
//! - [`tileblend_autotile`]: 47-tile blob masks and independent autotile layers
//! - [`tileblend_blend`]: the terrain blend graph and compositing strategies
//!
//! Most users only need the [`prelude`].

pub mod prelude;

pub use tileblend_autotile;
pub use tileblend_blend;
pub use tileblend_core;

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_world_through_both_passes() {
        let layers = LayerConfig::builtin().build().unwrap();
        let graph = BlendGraph::global();

        let mut world = ChunkedWorld::new(8, Biome::Ocean.tile());
        world.load_filled(ChunkCoord::new(0, 0), Biome::Plains.tile());
        world.set_tile(3, 3, Biome::Lake.tile());

        let chunk = world.chunk(ChunkCoord::new(0, 0)).unwrap();
        let autotiled = compute_chunk_all_layers(chunk, &layers, &world);
        let blended = compose_neighbor_chunk(chunk, &world, graph);

        assert_eq!(autotiled.layer_count(), 3);
        assert_eq!(blended.width(), 8);
        // Grassland in open ocean blends along its rim and around the lake
        assert!(blended.layer_count(0, 0) > 0);
        assert!(blended.layer_count(3, 3) > 0);
        assert_eq!(blended.layer_count(5, 5), 0);
    }

    #[test]
    fn test_preload_list_covers_every_sprite() {
        let graph = BlendGraph::global();
        let mut grid = VertexGrid::new(6, 6, TerrainId::DeepWater);
        for (i, &t) in TerrainId::ALL.iter().enumerate() {
            grid.set_corner(i as u32, (i % 3) as u32, t);
        }

        let layers = grid.compose(graph);
        for sprite in layers.slots().iter().filter(|p| !p.is_empty()) {
            let sheet = sprite.sheet().unwrap();
            assert!(graph.sheet(sheet).is_some());
        }
    }
}
