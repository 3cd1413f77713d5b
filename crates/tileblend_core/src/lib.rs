//! Core data structures for tileblend
//!
//! This crate provides the plain data types shared by the autotile and blend
//! crates:
//! - `TerrainId` - Depth-ordered terrain used for base/overlay resolution
//! - `TileId` - Gameplay-facing tile tag, collapsed onto a `TerrainId`
//! - `Biome` - World generator biome, mapped onto a `TileId`
//! - `PackedSprite` - One integer encoding sheet index, column and row
//! - `Chunk` / `ChunkedWorld` - Tile storage and the read-only `TerrainSource`

mod chunk;
mod sprite;
mod terrain;

pub use chunk::{Chunk, ChunkCoord, ChunkError, ChunkedWorld, TerrainSource, CHUNK_SIZE};
pub use sprite::{PackedSprite, SheetDef, SheetIndex, SpriteCell};
pub use terrain::{Biome, TerrainId, TileId};
