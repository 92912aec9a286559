use std::time::Duration;

/// Problems applying a backend result to the reels. None of these are fatal:
/// the affected reel keeps its randomized textures.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ReelError {
    #[error("reel {reel}: expected {expected} symbols in result, got {actual}")]
    InvalidResultShape {
        reel: usize,
        expected: usize,
        actual: usize,
    },
    #[error("reel {reel}, row {row}: symbol index {index} out of range for {available} textures")]
    InvalidSymbolIndex {
        reel: usize,
        row: usize,
        index: usize,
        available: usize,
    },
    #[error("result carries {actual} reels but the game has {expected}")]
    ReelCountMismatch { expected: usize, actual: usize },
}

/// Failure to obtain a spin result. The spin attempt is aborted before any
/// animation starts.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("result request timed out after {0:?}")]
    Timeout(Duration),
    #[error("result provider unavailable: {0}")]
    Network(String),
    #[error("result request was dropped before completing")]
    Dropped,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("texture atlas must contain at least one texture")]
    EmptyAtlas,
    #[error("texture atlas holds {0} textures, more than a TextureId can address")]
    AtlasTooLarge(usize),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
