use async_trait::async_trait;
use tracing::debug;

use slotreel_core::{FetchError, ResultProvider, SpinResult};
use slotreel_shared::{SpinRequest, SpinResponse};

/// Fetches spin results from a running `slotreel_server`.
pub struct HttpResultProvider {
    client: reqwest::Client,
    spin_url: String,
    client_seed: String,
    bet: f64,
}

impl HttpResultProvider {
    pub fn new(base_url: &str, client_seed: impl Into<String>, bet: f64) -> Self {
        Self {
            client: reqwest::Client::new(),
            spin_url: format!("{}/spin", base_url.trim_end_matches('/')),
            client_seed: client_seed.into(),
            bet,
        }
    }
}

fn network(err: reqwest::Error) -> FetchError {
    FetchError::Network(err.to_string())
}

#[async_trait]
impl ResultProvider for HttpResultProvider {
    async fn fetch(&self) -> Result<SpinResult, FetchError> {
        let req = SpinRequest {
            client_seed: self.client_seed.clone(),
            bet: self.bet,
        };
        let spin: SpinResponse = self
            .client
            .post(&self.spin_url)
            .json(&req)
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?
            .json()
            .await
            .map_err(network)?;
        debug!(nonce = spin.nonce, ts = %spin.ts, "backend result");
        Ok(SpinResult {
            reels: spin.reels,
            win_amount: spin.win_amount,
            win_lines: spin.win_lines,
        })
    }
}
