pub use tileblend_autotile::{
    compute_chunk_all_layers, compute_chunk_all_layers_into, par_compute_autotile, ChunkLayerOutput,
    LayerConfig, LayerSet, TileGroup,
};
pub use tileblend_blend::{
    compose_neighbor_chunk, compose_neighbor_chunk_into, par_compose_neighbor, BlendConfig, BlendGraph,
    BlendLayers, SubgridChunk, SubgridWorld, VertexGrid, MAX_BLEND_LAYERS,
};
pub use tileblend_core::{
    Biome, Chunk, ChunkCoord, ChunkedWorld, PackedSprite, SheetIndex, TerrainId, TerrainSource, TileId,
    CHUNK_SIZE,
};
