use rand::rngs::StdRng;
use rand::SeedableRng;
use slotreel_core::{spin_once, spin_with_seeds, EngineParams, GameConfig, TextureAtlas};

fn main() {
    let params = EngineParams::from_config(&GameConfig::default(), &TextureAtlas::default_set());

    // Stub backend outcome, reproducible from its seeds and nonce
    let outcome = spin_with_seeds("example-backend-seed", "example-client-seed", 1, &params, 1.0);
    println!(
        "seeded: payout={} lines={:?} window={:?}",
        outcome.payout, outcome.win_lines, outcome.reel_window
    );

    let mut rng = StdRng::from_entropy();
    let outcome = spin_once(&mut rng, &params, 1.0);
    println!(
        "random: payout={} lines={:?} window={:?}",
        outcome.payout, outcome.win_lines, outcome.reel_window
    );
}
