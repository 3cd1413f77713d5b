//! Blend layer compositing
//!
//! Three strategies turn terrain data into per-tile stacks of blend sprites:
//!
//! - [`neighbor`]: each tile looks at its 8 neighbors
//! - [`corner`]: terrain lives on tile vertices, each tile reads 4 corners
//! - [`subgrid`]: terrain lives on a half-tile lattice, each tile reads 9 points
//!
//! All of them feed a [`LayerStack`] per tile and write the result into a
//! [`BlendLayers`] buffer with [`MAX_BLEND_LAYERS`] slots per tile.

pub mod corner;
pub mod neighbor;
pub mod subgrid;

use crate::graph::BlendEntry;
use tileblend_core::{PackedSprite, SheetIndex, TerrainId};
use tracing::trace;

/// Blend sprites kept per tile. Further layers are dropped.
pub const MAX_BLEND_LAYERS: usize = 6;

/// Blend sprites for a rectangle of tiles, `MAX_BLEND_LAYERS` slots each.
///
/// Slots are filled from the front in draw order; unused slots are
/// [`PackedSprite::EMPTY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlendLayers {
    width: u32,
    height: u32,
    slots: Vec<PackedSprite>,
}

impl BlendLayers {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            slots: vec![PackedSprite::EMPTY; (width * height) as usize * MAX_BLEND_LAYERS],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y * self.width + x) as usize * MAX_BLEND_LAYERS)
    }

    /// The slots of one tile, `None` outside the buffer
    pub fn get(&self, x: u32, y: u32) -> Option<&[PackedSprite]> {
        self.offset(x, y)
            .map(|o| &self.slots[o..o + MAX_BLEND_LAYERS])
    }

    /// Number of occupied slots of one tile
    pub fn layer_count(&self, x: u32, y: u32) -> usize {
        self.get(x, y)
            .map(|s| s.iter().take_while(|p| !p.is_empty()).count())
            .unwrap_or(0)
    }

    /// Every slot, tile-major then slot order
    pub fn slots(&self) -> &[PackedSprite] {
        &self.slots
    }

    /// Raw integers as handed to the renderer
    pub fn raw(&self) -> Vec<u32> {
        self.slots.iter().map(|p| p.raw()).collect()
    }

    /// Tiles with at least one blend layer
    pub fn blended_tiles(&self) -> usize {
        self.slots
            .chunks_exact(MAX_BLEND_LAYERS)
            .filter(|s| !s[0].is_empty())
            .count()
    }

    /// Reshape for reuse, clearing every slot
    pub(crate) fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.slots.clear();
        self.slots
            .resize((width * height) as usize * MAX_BLEND_LAYERS, PackedSprite::EMPTY);
    }

    pub(crate) fn write(&mut self, x: u32, y: u32, stack: &LayerStack<'_>) {
        if let Some(o) = self.offset(x, y) {
            stack.write_to(&mut self.slots[o..o + MAX_BLEND_LAYERS]);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending<'g> {
    entry: BlendEntry<'g>,
    raw: u8,
}

/// Ordered blend layers of one tile.
///
/// Layers that resolve to the same sheet in the same orientation are merged
/// by OR-ing their raw masks.
#[derive(Debug, Clone, Default)]
pub struct LayerStack<'g> {
    layers: [Option<Pending<'g>>; MAX_BLEND_LAYERS],
    len: usize,
}

impl<'g> LayerStack<'g> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a layer. `raw` marks the directions where the other terrain
    /// touches. Returns false when the stack was full and the layer dropped.
    pub fn push(&mut self, entry: BlendEntry<'g>, raw: u8) -> bool {
        let existing = self.layers[..self.len].iter_mut().flatten().find(|p| {
            p.entry.sheet_index() == entry.sheet_index() && p.entry.inverted == entry.inverted
        });
        if let Some(pending) = existing {
            pending.raw |= raw;
            return true;
        }

        if self.len == MAX_BLEND_LAYERS {
            trace!(
                "Blend layer {} -> {:?} dropped, tile already has {} layers",
                entry.sheet_key(),
                entry.overlay,
                MAX_BLEND_LAYERS
            );
            return false;
        }

        self.layers[self.len] = Some(Pending { entry, raw });
        self.len += 1;
        true
    }

    /// Resolved sprites in draw order
    pub fn sprites(&self) -> impl Iterator<Item = PackedSprite> + '_ {
        self.layers[..self.len]
            .iter()
            .flatten()
            .map(|p| p.entry.sprite(p.raw))
    }

    /// Sheets referenced, in draw order
    pub fn sheets(&self) -> impl Iterator<Item = SheetIndex> + '_ {
        self.layers[..self.len]
            .iter()
            .flatten()
            .map(|p| p.entry.sheet_index())
    }

    fn write_to(&self, slots: &mut [PackedSprite]) {
        slots.fill(PackedSprite::EMPTY);
        for (slot, sprite) in slots.iter_mut().zip(self.sprites()) {
            *slot = sprite;
        }
    }
}

/// Most common terrain among `terrains`; ties go to the deeper terrain
pub(crate) fn modal_terrain(terrains: &[TerrainId]) -> Option<TerrainId> {
    let mut counts = [0u8; TerrainId::COUNT];
    for t in terrains {
        counts[t.index()] += 1;
    }
    TerrainId::ALL
        .iter()
        .copied()
        .filter(|t| counts[t.index()] > 0)
        .max_by_key(|t| (counts[t.index()], t.depth()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BlendGraph;
    use tileblend_autotile::bitmask::{neighbors::*, FULL};
    use TerrainId::*;

    #[test]
    fn test_stack_merges_same_sheet() {
        let graph = BlendGraph::builtin();
        // Both resolve to the grass alpha sheet
        let a = graph.get_blend(Grass, DeepWater).unwrap();
        let b = graph.get_blend(Grass, SandLight).unwrap();
        assert_eq!(a.sheet_index(), b.sheet_index());

        let mut stack = LayerStack::new();
        assert!(stack.push(a, N));
        assert!(stack.push(b, S));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.sprites().next(), Some(a.sprite(N | S)));
    }

    #[test]
    fn test_stack_caps_layers() {
        let graph = BlendGraph::builtin();
        // Forward and inverted entries of every dedicated sheet are distinct layers
        let entries: Vec<_> = TerrainId::ALL
            .iter()
            .flat_map(|&a| TerrainId::ALL.iter().map(move |&b| (a, b)))
            .filter_map(|(a, b)| graph.get_blend(a, b))
            .filter(|e| !e.is_alpha)
            .collect();
        assert!(entries.len() > MAX_BLEND_LAYERS);

        let mut stack = LayerStack::new();
        let accepted = entries.iter().filter(|&&e| stack.push(e, FULL)).count();
        assert_eq!(accepted, MAX_BLEND_LAYERS);
        assert_eq!(stack.len(), MAX_BLEND_LAYERS);
        assert_eq!(stack.sheets().next(), Some(entries[0].sheet_index()));
    }

    #[test]
    fn test_buffer_write_and_count() {
        let graph = BlendGraph::builtin();
        let mut stack = LayerStack::new();
        stack.push(graph.get_blend(ShallowWater, Grass).unwrap(), FULL);
        stack.push(graph.get_blend(ShallowWater, Sand).unwrap(), N);

        let mut layers = BlendLayers::new(3, 2);
        layers.write(2, 1, &stack);
        assert_eq!(layers.layer_count(2, 1), 2);
        assert_eq!(layers.layer_count(0, 0), 0);
        assert_eq!(layers.blended_tiles(), 1);
        assert!(layers.get(3, 0).is_none());

        let slots = layers.get(2, 1).unwrap();
        assert_eq!(slots[0].sheet(), SheetIndex::new(18));
        assert_eq!(slots[1].sheet(), SheetIndex::new(17));
        assert!(slots[2..].iter().all(|p| p.is_empty()));
        assert_eq!(layers.raw().len(), 3 * 2 * MAX_BLEND_LAYERS);
    }

    #[test]
    fn test_modal_terrain_prefers_deeper_on_tie() {
        assert_eq!(modal_terrain(&[Sand, Grass, Sand, Grass]), Some(Grass));
        assert_eq!(modal_terrain(&[Sand, Sand, Sand, Grass]), Some(Sand));
        assert_eq!(modal_terrain(&[]), None);
    }
}
