//! 47-tile blob autotiling with independent terrain layers
//!
//! This crate turns a tile neighborhood into packed sprite references, one
//! channel per configured layer.
//!
//! # Features
//! - 8-bit neighbor masks folded to the 47 canonical blob shapes
//! - Compile-time mask -> sprite cell table for a 12x4 blob sheet
//! - Independent layers: a tile can belong to several groups at once
//! - Chunk pass with reusable output buffers and a rayon batch variant
//!
//! # Example
//!
//! ```rust,ignore
//! use tileblend_autotile::{compute_chunk_all_layers, LayerConfig};
//! use tileblend_core::{ChunkCoord, ChunkedWorld, TileId};
//!
//! let layers = LayerConfig::builtin().build()?;
//!
//! let mut world = ChunkedWorld::new(32, TileId::Water);
//! world.load_filled(ChunkCoord::new(0, 0), TileId::Grass);
//!
//! let chunk = world.chunk(ChunkCoord::new(0, 0)).unwrap();
//! let output = compute_chunk_all_layers(chunk, &layers, &world);
//! let land = output.raw_channel(layers.channel("non_water").unwrap());
//! ```

pub mod bitmask;
pub mod config;
pub mod layer;
pub mod mask;
pub mod pass;

pub use bitmask::{canonicalize, is_canonical, lookup, neighbors, CANONICAL_COUNT, FULL, ISOLATED};
pub use config::{LayerConfig, LayerConfigError, LayerDef};
pub use layer::{LayerRule, LayerSet, TileGroup};
pub use mask::{compute_mask, sample_raw_mask};
pub use pass::{
    compute_chunk_all_layers, compute_chunk_all_layers_into, par_compute_autotile,
    ChunkLayerOutput,
};

// Re-export tileblend_core
pub use tileblend_core;
