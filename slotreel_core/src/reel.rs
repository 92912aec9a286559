//! A single reel: a ring of `visible_rows + 1` sprites scrolled by one scalar
//! `position`.
//!
//! The integer part of `position` selects the ring rotation, the fractional part
//! gives the sub-slot scroll. Exactly one sprite sits in the hidden slot above the
//! window; when a sprite scrolls off the bottom it reappears there with a fresh
//! texture, so a handful of sprites read as an endless strip.

use std::sync::Arc;

use rand::RngCore;
use tracing::trace;

use crate::config::ReelGeometry;
use crate::error::ReelError;
use crate::symbols::{SymbolUnit, TextureAtlas, TextureId};

/// Positions past this many full ring turns are folded back between spins.
const WRAP_TURNS: f64 = (1u64 << 32) as f64;

#[derive(Debug, Clone)]
pub struct ReelEngine {
    id: usize,
    position: f64,
    previous_position: f64,
    blur: f64,
    symbols: Vec<SymbolUnit>,
    geometry: ReelGeometry,
    atlas: Arc<TextureAtlas>,
}

impl ReelEngine {
    /// Builds the ring with independently random textures and lays it out for
    /// `position = 0`.
    pub fn new(
        id: usize,
        geometry: ReelGeometry,
        atlas: Arc<TextureAtlas>,
        rng: &mut dyn RngCore,
    ) -> Self {
        let symbols = (0..geometry.ring_len())
            .map(|_| SymbolUnit::new(atlas.random(rng)))
            .collect();
        let mut reel = Self {
            id,
            position: 0.0,
            previous_position: 0.0,
            blur: 0.0,
            symbols,
            geometry,
            atlas,
        };
        for j in 0..reel.symbols.len() {
            reel.symbols[j].y = reel.offset_for(j);
        }
        reel
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn previous_position(&self) -> f64 {
        self.previous_position
    }

    /// Written by the spin tween on every tick.
    pub fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    pub fn blur(&self) -> f64 {
        self.blur
    }

    pub fn symbols(&self) -> &[SymbolUnit] {
        &self.symbols
    }

    pub fn geometry(&self) -> &ReelGeometry {
        &self.geometry
    }

    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    pub fn ring_len(&self) -> usize {
        self.symbols.len()
    }

    pub fn visible_rows(&self) -> usize {
        self.symbols.len() - 1
    }

    /// Ring rotation selected by the integer part of the position.
    fn step(&self) -> usize {
        self.position.floor().rem_euclid(self.ring_len() as f64) as usize
    }

    /// Slot of symbol `j`: `0..visible_rows` top to bottom, `visible_rows` is the
    /// hidden slot.
    pub fn cycle_position(&self, j: usize) -> usize {
        (self.step() + j) % self.ring_len()
    }

    fn offset_for(&self, j: usize) -> f64 {
        let size = self.geometry.symbol_size;
        let cycle = self.cycle_position(j);
        let slot = if cycle == self.ring_len() - 1 {
            -size
        } else {
            cycle as f64 * size
        };
        slot + (self.position - self.position.floor()) * size
    }

    fn index_at_slot(&self, slot: usize) -> usize {
        let ring = self.ring_len();
        (slot + ring - self.step()) % ring
    }

    /// Symbol currently in visible row `row` (0 = top).
    pub fn symbol_at_row(&self, row: usize) -> Option<&SymbolUnit> {
        (row < self.visible_rows()).then(|| &self.symbols[self.index_at_slot(row)])
    }

    pub fn hidden_symbol(&self) -> &SymbolUnit {
        &self.symbols[self.index_at_slot(self.ring_len() - 1)]
    }

    /// Textures of the visible window, top to bottom.
    pub fn visible_textures(&self) -> Vec<TextureId> {
        (0..self.visible_rows())
            .map(|row| self.symbols[self.index_at_slot(row)].texture)
            .collect()
    }

    /// Lays every symbol out for the current position. A symbol that just left
    /// the bottom of the window for the hidden slot gets a new random texture.
    /// Returns how many symbols were recycled.
    pub fn recompute_placement(&mut self, rng: &mut dyn RngCore) -> usize {
        let bottom = (self.ring_len() as f64 - 2.0) * self.geometry.symbol_size;
        let mut recycled = 0;
        for j in 0..self.symbols.len() {
            let prev_y = self.symbols[j].y;
            let y = self.offset_for(j);
            self.symbols[j].y = y;
            if prev_y > bottom && y < 0.0 {
                let texture = self.atlas.random(rng);
                self.symbols[j].swap_texture(texture);
                recycled += 1;
            }
        }
        recycled
    }

    /// Blur follows the distance travelled since the previous frame, so it
    /// falls to zero one frame after motion stops.
    pub fn update_blur(&mut self) -> f64 {
        self.blur = (self.position - self.previous_position).abs() * self.geometry.blur_gain;
        self.previous_position = self.position;
        self.blur
    }

    /// Overwrites the visible window, top to bottom, with atlas indices from a
    /// backend result. A result of the wrong length is rejected whole; an
    /// unknown index only skips its own row.
    pub fn apply_final_symbols(&mut self, indices: &[usize]) -> Vec<ReelError> {
        if indices.len() != self.visible_rows() {
            return vec![ReelError::InvalidResultShape {
                reel: self.id,
                expected: self.visible_rows(),
                actual: indices.len(),
            }];
        }
        let mut errors = Vec::new();
        for (row, &index) in indices.iter().enumerate() {
            match self.atlas.get(index) {
                Some(texture) => {
                    let j = self.index_at_slot(row);
                    self.symbols[j].swap_texture(texture);
                }
                None => errors.push(ReelError::InvalidSymbolIndex {
                    reel: self.id,
                    row,
                    index,
                    available: self.atlas.len(),
                }),
            }
        }
        errors
    }

    /// Folds a very large position back by whole ring turns. Placement and blur
    /// are unchanged; only call this between spins.
    pub fn wrap_position(&mut self) {
        let ring = self.ring_len() as f64;
        if self.position < ring * WRAP_TURNS {
            return;
        }
        let shift = (self.position / ring).floor() * ring;
        self.position -= shift;
        self.previous_position -= shift;
        trace!(reel = self.id, shift, "wrapped reel position");
    }
}
