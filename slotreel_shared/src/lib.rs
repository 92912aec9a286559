use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinRequest {
    pub client_seed: String,
    pub bet: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinResponse {
    pub nonce: u64,
    pub reels: Vec<Vec<usize>>, // atlas indices, one column per reel, top to bottom
    pub win_amount: f64,
    pub win_lines: Vec<u32>,
    pub ts: DateTime<Utc>,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Invalid(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Invalid(_) => 400,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl SpinRequest {
    pub fn validate(&self) -> ApiResult<()> {
        if !(self.bet.is_finite() && self.bet > 0.0) {
            return Err(ApiError::Invalid(format!("bet must be positive, got {}", self.bet)));
        }
        if self.client_seed.is_empty() {
            return Err(ApiError::Invalid("client_seed must not be empty".into()));
        }
        Ok(())
    }
}
