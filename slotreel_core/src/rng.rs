use hmac::{Hmac, Mac};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::Sha256;

// Seeded outcomes for the stub backend:
// backend seed + client_seed + nonce -> HMAC-SHA256 -> 32-byte StdRng seed

pub type HmacSha256 = Hmac<Sha256>;

pub fn outcome_seed(server_seed: &str, client_seed: &str, nonce: u64) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(server_seed.as_bytes())
        .expect("HMAC accepts keys of any length");
    let msg = format!("{}:{}", client_seed, nonce);
    mac.update(msg.as_bytes());
    let res = mac.finalize().into_bytes();
    let mut out = [0u8; 32];
    out.copy_from_slice(&res);
    out
}

/// Generator that replays the same draws for the same seeds and nonce.
pub fn outcome_rng(server_seed: &str, client_seed: &str, nonce: u64) -> StdRng {
    StdRng::from_seed(outcome_seed(server_seed, client_seed, nonce))
}
