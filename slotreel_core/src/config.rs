use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Game-wide tunables. Every field has a default so a partial JSON file is
/// enough to override a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub reel_count: usize,
    /// Symbols shown per reel. The ring holds one more for the hidden slot.
    pub visible_rows: usize,
    /// Height of one slot in pixels.
    pub symbol_size: f64,
    /// Blur per unit of position change between frames.
    pub blur_gain: f64,
    pub fetch_timeout_ms: u64,
    pub spin: SpinTiming,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            reel_count: 5,
            visible_rows: 3,
            symbol_size: 150.0,
            blur_gain: 20.0,
            fetch_timeout_ms: 5_000,
            spin: SpinTiming::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reel_count == 0 {
            return Err(ConfigError::Invalid("reel_count must be at least 1".into()));
        }
        if self.visible_rows == 0 {
            return Err(ConfigError::Invalid("visible_rows must be at least 1".into()));
        }
        if !(self.symbol_size.is_finite() && self.symbol_size > 0.0) {
            return Err(ConfigError::Invalid("symbol_size must be positive".into()));
        }
        if !(self.blur_gain.is_finite() && self.blur_gain >= 0.0) {
            return Err(ConfigError::Invalid("blur_gain must be non-negative".into()));
        }
        self.spin.validate()
    }

    pub fn geometry(&self) -> ReelGeometry {
        ReelGeometry {
            visible_rows: self.visible_rows,
            symbol_size: self.symbol_size,
            blur_gain: self.blur_gain,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Per-reel layout shared by every reel of a game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReelGeometry {
    pub visible_rows: usize,
    pub symbol_size: f64,
    pub blur_gain: f64,
}

impl ReelGeometry {
    /// Visible rows plus the hidden slot above the window.
    pub fn ring_len(&self) -> usize {
        self.visible_rows + 1
    }

    /// Sprites are drawn at 90% of the slot and centred, leaving this margin
    /// on each side.
    pub fn inset(&self) -> f64 {
        self.symbol_size * 0.05
    }

    pub fn window_height(&self) -> f64 {
        self.symbol_size * self.visible_rows as f64
    }
}

/// Target and duration formula for a spin:
/// `target = position + base_rotations + i * per_reel_rotations + extra` and
/// `duration = base_duration + i * per_reel_duration + extra * per_extra_duration`
/// where `extra` is drawn uniformly from `0..extra_choices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinTiming {
    pub base_rotations: u32,
    pub per_reel_rotations: u32,
    pub extra_choices: u32,
    pub base_duration_ms: u64,
    pub per_reel_duration_ms: u64,
    pub per_extra_duration_ms: u64,
    /// Overshoot of the back-out easing curve.
    pub backout_amount: f64,
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self {
            base_rotations: 10,
            per_reel_rotations: 5,
            extra_choices: 3,
            base_duration_ms: 2_500,
            per_reel_duration_ms: 600,
            per_extra_duration_ms: 600,
            backout_amount: 0.5,
        }
    }
}

impl SpinTiming {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extra_choices == 0 {
            return Err(ConfigError::Invalid("spin.extra_choices must be at least 1".into()));
        }
        if !(self.backout_amount.is_finite() && self.backout_amount >= 0.0) {
            return Err(ConfigError::Invalid("spin.backout_amount must be non-negative".into()));
        }
        Ok(())
    }

    pub fn travel(&self, reel: usize, extra: u32) -> f64 {
        f64::from(self.base_rotations)
            + reel as f64 * f64::from(self.per_reel_rotations)
            + f64::from(extra)
    }

    pub fn duration(&self, reel: usize, extra: u32) -> Duration {
        let ms = self.base_duration_ms
            + reel as u64 * self.per_reel_duration_ms
            + u64::from(extra) * self.per_extra_duration_ms;
        Duration::from_millis(ms)
    }
}
