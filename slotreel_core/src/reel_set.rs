use std::sync::Arc;

use rand::RngCore;
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::error::{ConfigError, ReelError};
use crate::reel::ReelEngine;
use crate::result::SpinResult;
use crate::symbols::{TextureAtlas, TextureId};

/// What a finished spin left on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinSummary {
    /// Visible textures per reel, top to bottom.
    pub grid: Vec<Vec<TextureId>>,
    pub win_amount: f64,
    pub win_lines: Vec<u32>,
    /// Parts of the result that could not be applied.
    pub errors: Vec<ReelError>,
}

/// All reels of a game plus the randomness used to re-texture them.
///
/// This is the context the spin tweens operate on: the orchestrator's
/// callbacks receive `&mut ReelSet` from the scheduler.
pub struct ReelSet {
    reels: Vec<ReelEngine>,
    atlas: Arc<TextureAtlas>,
    rng: Box<dyn RngCore>,
    running: bool,
    completed: Option<SpinSummary>,
}

impl ReelSet {
    pub fn new(
        config: &GameConfig,
        atlas: TextureAtlas,
        mut rng: Box<dyn RngCore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let atlas = Arc::new(atlas);
        let geometry = config.geometry();
        let reels = (0..config.reel_count)
            .map(|id| ReelEngine::new(id, geometry, Arc::clone(&atlas), rng.as_mut()))
            .collect();
        Ok(Self {
            reels,
            atlas,
            rng,
            running: false,
            completed: None,
        })
    }

    pub fn reels(&self) -> &[ReelEngine] {
        &self.reels
    }

    pub fn reel(&self, index: usize) -> Option<&ReelEngine> {
        self.reels.get(index)
    }

    pub fn reel_mut(&mut self, index: usize) -> Option<&mut ReelEngine> {
        self.reels.get_mut(index)
    }

    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    pub(crate) fn reels_and_rng(&mut self) -> (&mut [ReelEngine], &mut dyn RngCore) {
        (self.reels.as_mut_slice(), self.rng.as_mut())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Claims the single spin slot. Returns `false` if a spin is already in
    /// progress.
    pub fn begin_spin(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Releases the spin slot without touching the reels.
    pub fn abort_spin(&mut self) {
        self.running = false;
    }

    /// Re-lays out one reel after its position changed mid-frame.
    pub fn refresh_reel(&mut self, index: usize) -> usize {
        match self.reels.get_mut(index) {
            Some(reel) => reel.recompute_placement(self.rng.as_mut()),
            None => 0,
        }
    }

    /// Once per rendered frame, spinning or not: placement first, then blur.
    pub fn per_frame_tick(&mut self) {
        for reel in self.reels.iter_mut() {
            reel.recompute_placement(self.rng.as_mut());
            reel.update_blur();
        }
    }

    /// Writes the backend's final symbols onto the reels. Problems are logged
    /// and returned; whatever could not be applied keeps its random texture.
    pub fn apply_spin_result(&mut self, result: &SpinResult) -> Vec<ReelError> {
        let mut errors = Vec::new();
        if result.reels.len() != self.reels.len() {
            let err = ReelError::ReelCountMismatch {
                expected: self.reels.len(),
                actual: result.reels.len(),
            };
            warn!(error = %err, "spin result does not match reel count");
            errors.push(err);
        }
        for (reel, indices) in self.reels.iter_mut().zip(&result.reels) {
            for err in reel.apply_final_symbols(indices) {
                warn!(error = %err, "skipping result symbols");
                errors.push(err);
            }
        }
        errors
    }

    /// Completion of the last reel tween: apply the result and go idle.
    pub fn finish_spin(&mut self, result: &SpinResult) {
        let errors = self.apply_spin_result(result);
        info!(
            win_amount = result.win_amount,
            win_lines = ?result.win_lines,
            "reels complete"
        );
        self.completed = Some(SpinSummary {
            grid: self.visible_grid(),
            win_amount: result.win_amount,
            win_lines: result.win_lines.clone(),
            errors,
        });
        self.running = false;
    }

    pub fn take_completed(&mut self) -> Option<SpinSummary> {
        self.completed.take()
    }

    pub fn visible_grid(&self) -> Vec<Vec<TextureId>> {
        self.reels.iter().map(ReelEngine::visible_textures).collect()
    }
}
