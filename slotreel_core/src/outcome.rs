//! Result determination for the stub backends. Not a fair or
//! certified game engine.

use rand::{Rng, RngCore};

use crate::config::GameConfig;
use crate::symbols::TextureAtlas;
use crate::{paytable::Paytable, result::SpinResult, rng::outcome_rng};

#[derive(Debug, Clone)]
pub struct EngineParams {
    pub reel_count: usize,
    pub rows: usize,
    pub texture_count: usize,
    pub paytable: Paytable,
}

impl EngineParams {
    /// Grid shape of the game and the default paytable.
    pub fn from_config(config: &GameConfig, atlas: &TextureAtlas) -> Self {
        Self {
            reel_count: config.reel_count,
            rows: config.visible_rows,
            texture_count: atlas.len(),
            paytable: Paytable::simple_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinOutcome {
    pub reel_window: Vec<Vec<usize>>, // one column per reel, top to bottom
    pub payout: f64,
    pub win_lines: Vec<u32>,
}

impl SpinOutcome {
    pub fn into_result(self) -> SpinResult {
        SpinResult {
            reels: self.reel_window,
            win_amount: self.payout,
            win_lines: self.win_lines,
        }
    }
}

pub fn compute_reel_window(rng: &mut dyn RngCore, params: &EngineParams) -> Vec<Vec<usize>> {
    let textures = params.texture_count.max(1);
    (0..params.reel_count)
        .map(|_| (0..params.rows).map(|_| rng.gen_range(0..textures)).collect())
        .collect()
}

/// Every row is a payline. A run of identical textures starting at the first
/// reel pays `bet * multiplier`; winning rows are reported 1-based.
pub fn evaluate_lines(window: &[Vec<usize>], paytable: &Paytable, bet: f64) -> (f64, Vec<u32>) {
    let rows = window.first().map_or(0, Vec::len);
    let mut total = 0.0;
    let mut lines = Vec::new();
    for r in 0..rows {
        let Some(&first) = window[0].get(r) else {
            continue;
        };
        let run = window
            .iter()
            .take_while(|column| column.get(r) == Some(&first))
            .count();
        if let Some(multiplier) = paytable.multiplier(first, run) {
            total += bet * multiplier;
            lines.push(r as u32 + 1);
        }
    }
    (total, lines)
}

pub fn spin_once(rng: &mut dyn RngCore, params: &EngineParams, bet: f64) -> SpinOutcome {
    let window = compute_reel_window(rng, params);
    let (payout, win_lines) = evaluate_lines(&window, &params.paytable, bet);
    SpinOutcome {
        reel_window: window,
        payout,
        win_lines,
    }
}

/// Convenience: perform a spin with the generator for these seeds and nonce.
pub fn spin_with_seeds(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    params: &EngineParams,
    bet: f64,
) -> SpinOutcome {
    let mut rng = outcome_rng(server_seed, client_seed, nonce);
    spin_once(&mut rng, params, bet)
}
