//! Corner strategy: terrain on tile vertices
//!
//! A `width`x`height` tile area stores `(width + 1) * (height + 1)` vertex
//! terrains. Tile `(tx, ty)` reads the corners NW `(tx, ty)`, NE `(tx + 1, ty)`,
//! SW `(tx, ty + 1)` and SE `(tx + 1, ty + 1)`, so painting one vertex changes
//! at most the 4 tiles sharing it.

use super::{modal_terrain, BlendLayers, LayerStack};
use crate::graph::BlendGraph;
use tileblend_autotile::bitmask::neighbors::*;
use tileblend_core::TerrainId;
use tracing::debug;

/// Corners of one tile in NW, NE, SW, SE order
pub type TileCorners = [TerrainId; 4];

/// Vertex terrain for a rectangle of tiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexGrid {
    width: u32,
    height: u32,
    corners: Vec<TerrainId>,
}

impl VertexGrid {
    /// Grid over `width`x`height` tiles with every vertex set to `fill`
    pub fn new(width: u32, height: u32, fill: TerrainId) -> Self {
        Self {
            width,
            height,
            corners: vec![fill; ((width + 1) * (height + 1)) as usize],
        }
    }

    /// Width in tiles
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles
    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, vx: u32, vy: u32) -> Option<usize> {
        (vx <= self.width && vy <= self.height).then(|| (vy * (self.width + 1) + vx) as usize)
    }

    pub fn get(&self, vx: u32, vy: u32) -> Option<TerrainId> {
        self.index(vx, vy).map(|i| self.corners[i])
    }

    /// Paint one vertex.
    ///
    /// Returns the tiles whose corners changed. Empty when the vertex is
    /// outside the grid or already holds `terrain`.
    pub fn set_corner(&mut self, vx: u32, vy: u32, terrain: TerrainId) -> Vec<(u32, u32)> {
        let Some(i) = self.index(vx, vy) else {
            return Vec::new();
        };
        if self.corners[i] == terrain {
            return Vec::new();
        }
        self.corners[i] = terrain;

        let mut affected = Vec::with_capacity(4);
        for (dx, dy) in [(1, 1), (0, 1), (1, 0), (0, 0)] {
            if vx >= dx && vy >= dy {
                let (tx, ty) = (vx - dx, vy - dy);
                if tx < self.width && ty < self.height {
                    affected.push((tx, ty));
                }
            }
        }
        affected
    }

    /// The four corners of a tile
    pub fn tile_corners(&self, tx: u32, ty: u32) -> Option<TileCorners> {
        if tx >= self.width || ty >= self.height {
            return None;
        }
        let at = |vx, vy| self.corners[(vy * (self.width + 1) + vx) as usize];
        Some([at(tx, ty), at(tx + 1, ty), at(tx, ty + 1), at(tx + 1, ty + 1)])
    }

    /// Blend layers of one tile, empty outside the grid
    pub fn compose_tile<'g>(&self, tx: u32, ty: u32, graph: &'g BlendGraph) -> LayerStack<'g> {
        self.tile_corners(tx, ty)
            .map(|corners| compose_corners(corners, graph))
            .unwrap_or_default()
    }

    /// Blend layers of every tile
    pub fn compose(&self, graph: &BlendGraph) -> BlendLayers {
        let mut out = BlendLayers::new(self.width, self.height);
        self.compose_into(&mut out, graph);
        out
    }

    /// Blend layers of every tile, reusing `out`'s buffer
    pub fn compose_into(&self, out: &mut BlendLayers, graph: &BlendGraph) {
        out.reset(self.width, self.height);
        for ty in 0..self.height {
            for tx in 0..self.width {
                out.write(tx, ty, &self.compose_tile(tx, ty, graph));
            }
        }
        debug!(
            "Blended {}x{} vertex grid: {} tiles with layers",
            self.width,
            self.height,
            out.blended_tiles()
        );
    }

    /// Recompose only the given tiles, e.g. the result of [`Self::set_corner`]
    pub fn recompose_tiles(&self, out: &mut BlendLayers, tiles: &[(u32, u32)], graph: &BlendGraph) {
        for &(tx, ty) in tiles {
            out.write(tx, ty, &self.compose_tile(tx, ty, graph));
        }
    }
}

/// Neighbor-style mask for the corners holding one terrain.
///
/// An edge is set when either of its corners is, a diagonal when its own
/// corner is. The result is always canonical.
pub fn corner_mask(nw: bool, ne: bool, sw: bool, se: bool) -> u8 {
    let mut mask = 0;
    if nw || ne {
        mask |= N;
    }
    if nw || sw {
        mask |= W;
    }
    if ne || se {
        mask |= E;
    }
    if sw || se {
        mask |= S;
    }
    if nw {
        mask |= NW;
    }
    if ne {
        mask |= NE;
    }
    if sw {
        mask |= SW;
    }
    if se {
        mask |= SE;
    }
    mask
}

/// Blend layers for one set of tile corners.
///
/// The shallowest corner is the base. The most common remaining terrain is
/// drawn first, then any others by depth. Alpha layers only appear when
/// their overlay is the tile's dominant corner terrain.
pub fn compose_corners(corners: TileCorners, graph: &BlendGraph) -> LayerStack<'_> {
    let mut stack = LayerStack::new();
    let [nw, ne, sw, se] = corners;
    if nw == ne && nw == sw && nw == se {
        return stack;
    }

    let base = corners
        .iter()
        .copied()
        .min_by_key(|t| t.depth())
        .unwrap_or(nw);
    let own = modal_terrain(&corners).unwrap_or(base);

    let mut above = [base; 4];
    let mut n = 0;
    for t in corners {
        if t != base {
            above[n] = t;
            n += 1;
        }
    }
    let first = modal_terrain(&above[..n]);

    let mut order = [base; 3];
    let mut len = 0;
    if let Some(first) = first {
        order[len] = first;
        len += 1;
    }
    for t in TerrainId::ALL {
        if t != base && Some(t) != first && corners.contains(&t) {
            order[len] = t;
            len += 1;
        }
    }

    for &overlay in &order[..len] {
        let Some(entry) = graph.get_blend(base, overlay) else {
            continue;
        };
        if entry.is_alpha && entry.overlay != own {
            continue;
        }
        let raw = corner_mask(nw == overlay, ne == overlay, sw == overlay, se == overlay);
        stack.push(entry, raw);
    }
    stack
}
