use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FetchError;
use crate::outcome::{spin_with_seeds, EngineParams};
use crate::paytable::Paytable;

/// Final outcome of one spin as decided by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// Atlas indices per reel, top to bottom.
    pub reels: Vec<Vec<usize>>,
    pub win_amount: f64,
    pub win_lines: Vec<u32>,
}

/// Source of spin outcomes. Implementations may take arbitrarily long; the
/// session bounds every call with a timeout.
#[async_trait]
pub trait ResultProvider: Send + Sync {
    async fn fetch(&self) -> Result<SpinResult, FetchError>;
}

/// Stand-in backend: always answers with the same grid after a short delay.
#[derive(Debug, Clone)]
pub struct MockResultProvider {
    result: SpinResult,
    delay: Duration,
}

impl MockResultProvider {
    pub fn new() -> Self {
        Self {
            result: Self::fixed_result(),
            delay: Duration::from_millis(500),
        }
    }

    pub fn with_result(result: SpinResult) -> Self {
        Self {
            result,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fixed_result() -> SpinResult {
        SpinResult {
            reels: vec![
                vec![1, 2, 0],
                vec![3, 0, 2],
                vec![2, 1, 3],
                vec![0, 3, 1],
                vec![1, 0, 2],
            ],
            win_amount: 100.0,
            win_lines: vec![1, 3],
        }
    }
}

impl Default for MockResultProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultProvider for MockResultProvider {
    async fn fetch(&self) -> Result<SpinResult, FetchError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.result.clone())
    }
}

/// In-process stub backend: each result is drawn from a generator seeded by
/// the backend seed, the client seed and a per-call nonce, the same way the
/// HTTP server does.
#[derive(Debug)]
pub struct SeededResultProvider {
    server_seed: String,
    client_seed: String,
    nonce: AtomicU64,
    params: EngineParams,
    bet: f64,
    delay: Duration,
}

impl SeededResultProvider {
    pub fn new(
        server_seed: impl Into<String>,
        client_seed: impl Into<String>,
        reel_count: usize,
        rows: usize,
        texture_count: usize,
    ) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce: AtomicU64::new(0),
            params: EngineParams {
                reel_count,
                rows,
                texture_count,
                paytable: Paytable::simple_default(),
            },
            bet: 1.0,
            delay: Duration::ZERO,
        }
    }

    pub fn with_bet(mut self, bet: f64) -> Self {
        self.bet = bet;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn nonce(&self) -> u64 {
        self.nonce.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResultProvider for SeededResultProvider {
    async fn fetch(&self) -> Result<SpinResult, FetchError> {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = spin_with_seeds(
            &self.server_seed,
            &self.client_seed,
            nonce,
            &self.params,
            self.bet,
        );
        debug!(nonce, payout = outcome.payout, "seeded spin result");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(outcome.into_result())
    }
}
