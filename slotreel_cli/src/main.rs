mod http_provider;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use slotreel_core::{
    GameConfig, MockResultProvider, ReelSet, ResultProvider, SeededResultProvider, SessionEvent,
    SessionState, SlotSession, TextureAtlas,
};

use crate::http_provider::HttpResultProvider;

#[derive(Parser)]
#[command(name = "slotreel", about = "Headless slotreel game loop")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Game config JSON; defaults apply to missing fields
    #[arg(long, global = true, env = "SLOTREEL_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the frame loop and trigger spins back to back
    Play {
        #[arg(long, default_value_t = 3)]
        spins: u32,
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Backend base URL
        #[arg(long, env = "SLOTREEL_BACKEND", conflicts_with = "offline_seed")]
        backend: Option<String>,
        /// Draw results in-process from this seed instead of the fixed mock grid
        #[arg(long)]
        offline_seed: Option<String>,
        #[arg(long, default_value = "player")]
        client_seed: String,
        #[arg(long, default_value_t = 1.0)]
        bet: f64,
        /// Seed for reel textures and spin lengths; random when omitted
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn render_grid(reels: &ReelSet) -> String {
    let grid = reels.visible_grid();
    let rows = grid.first().map_or(0, Vec::len);
    let mut out = String::new();
    for row in 0..rows {
        let cells: Vec<String> = grid
            .iter()
            .map(|column| {
                let key = reels.atlas().key(column[row]).unwrap_or("?");
                let name = key.rsplit('/').next().unwrap_or(key);
                format!("{:<14}", name.trim_end_matches(".png"))
            })
            .collect();
        out.push_str(cells.join("|").trim_end());
        out.push('\n');
    }
    out
}

async fn play(
    config: GameConfig,
    spins: u32,
    fps: u32,
    provider: Arc<dyn ResultProvider>,
    rng: Box<dyn RngCore>,
) -> anyhow::Result<()> {
    let mut session = SlotSession::new(&config, TextureAtlas::default_set(), rng, provider)?;
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(fps.max(1))));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut remaining = spins;
    let mut failures = 0u32;
    let mut frames = 0u64;
    loop {
        ticker.tick().await;
        if session.state() == SessionState::Idle {
            if remaining == 0 {
                break;
            }
            if session.request_spin() {
                remaining -= 1;
            }
        }
        frames += 1;
        for event in session.frame(Instant::now()) {
            match event {
                SessionEvent::SpinStarted(plans) => {
                    let longest = plans.iter().map(|p| p.duration).max().unwrap_or_default();
                    info!(reels = plans.len(), longest_ms = longest.as_millis() as u64, "reels spinning");
                }
                SessionEvent::FetchFailed(err) => {
                    failures += 1;
                    warn!(error = %err, "spin failed");
                }
                SessionEvent::SpinCompleted(summary) => {
                    for err in &summary.errors {
                        warn!(error = %err, "result partially applied");
                    }
                    println!("{}", render_grid(session.reels()));
                    println!("win={} lines={:?}", summary.win_amount, summary.win_lines);
                }
            }
        }
    }
    info!(frames, spins, failures, "session finished");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    match cli.command {
        Commands::Play {
            spins,
            fps,
            backend,
            offline_seed,
            client_seed,
            bet,
            seed,
        } => {
            let provider: Arc<dyn ResultProvider> = match (backend, offline_seed) {
                (Some(url), _) => {
                    info!(%url, "using remote backend");
                    Arc::new(HttpResultProvider::new(&url, client_seed, bet))
                }
                (None, Some(offline)) => Arc::new(
                    SeededResultProvider::new(
                        offline,
                        client_seed,
                        config.reel_count,
                        config.visible_rows,
                        TextureAtlas::default_set().len(),
                    )
                    .with_bet(bet),
                ),
                (None, None) => Arc::new(MockResultProvider::new()),
            };
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            play(config, spins, fps, provider, Box::new(rng)).await?;
        }
    }

    Ok(())
}
