//! Terrain blending between adjacent terrain types
//!
//! A [`BlendGraph`] answers which transition sheet draws the boundary between
//! two terrains. The [`compose`] strategies use it to build a per-tile stack of
//! blend sprites on top of the base terrain.
//!
//! # Example
//!
//! ```rust,ignore
//! use tileblend_blend::{BlendGraph, VertexGrid};
//! use tileblend_core::TerrainId;
//!
//! let graph = BlendGraph::global();
//! let mut grid = VertexGrid::new(16, 16, TerrainId::Grass);
//! let mut layers = grid.compose(graph);
//!
//! let touched = grid.set_corner(5, 5, TerrainId::ShallowWater);
//! grid.recompose_tiles(&mut layers, &touched, graph);
//! ```

pub mod compose;
pub mod config;
pub mod graph;

pub use compose::corner::{compose_corners, corner_mask, TileCorners, VertexGrid};
pub use compose::neighbor::{
    compose_neighbor_chunk, compose_neighbor_chunk_into, compose_neighbor_tile, par_compose_neighbor,
};
pub use compose::subgrid::{SubgridChunk, SubgridWorld};
pub use compose::{BlendLayers, LayerStack, MAX_BLEND_LAYERS};
pub use config::{AlphaSheet, BlendConfig, BlendConfigError, DedicatedSheet};
pub use graph::{BlendEntry, BlendGraph};
