use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::{extract::State, routing::post, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use slotreel_core::{spin_with_seeds, EngineParams, GameConfig, TextureAtlas};
use slotreel_shared::{ApiError, SpinRequest, SpinResponse};

/// Stub backend: outcomes are seeded draws, replayable from seed and nonce.
struct AppState {
    seed: String,
    nonce: AtomicU64,
    params: EngineParams,
    delay: Duration,
}

impl AppState {
    fn new(seed: String, config: &GameConfig, delay: Duration) -> Self {
        Self {
            seed,
            nonce: AtomicU64::new(0),
            params: EngineParams::from_config(config, &TextureAtlas::default_set()),
            delay,
        }
    }
}

fn status(err: &ApiError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn route_spin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpinRequest>,
) -> Result<Json<SpinResponse>, StatusCode> {
    if let Err(err) = req.validate() {
        warn!(error = %err, "rejected spin request");
        return Err(status(&err));
    }
    let nonce = state.nonce.fetch_add(1, Ordering::SeqCst) + 1;
    let outcome = spin_with_seeds(&state.seed, &req.client_seed, nonce, &state.params, req.bet);
    info!(nonce, payout = outcome.payout, lines = ?outcome.win_lines, "spin");

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    Ok(Json(SpinResponse {
        nonce,
        reels: outcome.reel_window,
        win_amount: outcome.payout,
        win_lines: outcome.win_lines,
        ts: chrono::Utc::now(),
    }))
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/spin", post(route_spin))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("SLOTREEL_CONFIG") {
        Ok(path) => GameConfig::load(&path)?,
        Err(_) => GameConfig::default(),
    };
    let delay_ms: u64 = std::env::var("SPIN_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let seed = std::env::var("SPIN_SEED").unwrap_or_else(|_| "dev-spin-seed".into());
    let state = Arc::new(AppState::new(seed, &config, Duration::from_millis(delay_ms)));

    let addr = std::env::var("BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
