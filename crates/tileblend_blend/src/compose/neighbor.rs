//! Neighbor strategy: one terrain per tile, blends from the 8 surrounding tiles

use super::{BlendLayers, LayerStack};
use crate::graph::BlendGraph;
use rayon::prelude::*;
use tileblend_autotile::bitmask::neighbors::OFFSETS;
use tileblend_core::{Chunk, TerrainId, TerrainSource};
use tracing::debug;

/// Blend layers of the tile at `(tx, ty)`.
///
/// Each distinct neighbor terrain contributes one layer, ordered by that
/// terrain's depth. Alpha layers are only drawn on tiles of the overlay
/// terrain.
pub fn compose_neighbor_tile<'g, S>(tx: i32, ty: i32, source: &S, graph: &'g BlendGraph) -> LayerStack<'g>
where
    S: TerrainSource + ?Sized,
{
    let own = source.tile(tx, ty).terrain();
    let mut around = [own; 8];
    for (slot, &(_, dx, dy)) in around.iter_mut().zip(OFFSETS.iter()) {
        *slot = source.tile(tx + dx, ty + dy).terrain();
    }
    stack_from_samples(own, &around, graph)
}

/// Shared by the neighbor and subgrid strategies: `around` holds the terrain
/// in each [`OFFSETS`] direction.
pub(crate) fn stack_from_samples<'g>(
    own: TerrainId,
    around: &[TerrainId; 8],
    graph: &'g BlendGraph,
) -> LayerStack<'g> {
    let mut stack = LayerStack::new();
    for other in TerrainId::ALL {
        if other == own {
            continue;
        }
        let raw = OFFSETS
            .iter()
            .zip(around.iter())
            .filter(|(_, &t)| t == other)
            .fold(0u8, |mask, (&(bit, _, _), _)| mask | bit);
        if raw == 0 {
            continue;
        }

        let Some(entry) = graph.get_blend(own, other) else {
            continue;
        };
        if entry.is_alpha && entry.overlay != own {
            continue;
        }
        stack.push(entry, raw);
    }
    stack
}

/// Compose every tile of a chunk. Tiles outside the chunk are read from
/// `source`.
pub fn compose_neighbor_chunk<S>(chunk: &Chunk, source: &S, graph: &BlendGraph) -> BlendLayers
where
    S: TerrainSource + ?Sized,
{
    let mut out = BlendLayers::new(chunk.size(), chunk.size());
    compose_neighbor_chunk_into(&mut out, chunk, source, graph);
    out
}

/// Compose every tile of a chunk, reusing `out`'s buffer
pub fn compose_neighbor_chunk_into<S>(out: &mut BlendLayers, chunk: &Chunk, source: &S, graph: &BlendGraph)
where
    S: TerrainSource + ?Sized,
{
    let size = chunk.size();
    out.reset(size, size);
    let (ox, oy) = chunk.origin();
    let view = |tx: i32, ty: i32| {
        let (lx, ly) = (tx - ox, ty - oy);
        if lx < 0 || ly < 0 {
            return source.tile(tx, ty);
        }
        chunk
            .get(lx as u32, ly as u32)
            .unwrap_or_else(|| source.tile(tx, ty))
    };

    for ly in 0..size {
        for lx in 0..size {
            let stack = compose_neighbor_tile(ox + lx as i32, oy + ly as i32, &view, graph);
            out.write(lx, ly, &stack);
        }
    }

    debug!(
        "Blended chunk ({}, {}): {} tiles with layers",
        chunk.coord.x,
        chunk.coord.y,
        out.blended_tiles()
    );
}

/// Compose many chunks in parallel. Output order follows `chunks`.
pub fn par_compose_neighbor<S>(chunks: &[&Chunk], source: &S, graph: &BlendGraph) -> Vec<BlendLayers>
where
    S: TerrainSource + Sync + ?Sized,
{
    chunks
        .par_iter()
        .map(|chunk| compose_neighbor_chunk(chunk, source, graph))
        .collect()
}
