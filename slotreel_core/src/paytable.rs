use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaytableEntry {
    pub texture: usize, // atlas index
    pub count: u8,
    pub payout_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paytable(pub Vec<PaytableEntry>);

impl Paytable {
    /// Pays three, four and five of a kind for each of the four default
    /// textures; skully pays the most.
    pub fn simple_default() -> Self {
        let rows: [(usize, [f64; 3]); 4] = [
            (0, [5.0, 10.0, 20.0]),
            (1, [4.0, 8.0, 16.0]),
            (2, [3.0, 6.0, 12.0]),
            (3, [10.0, 20.0, 50.0]),
        ];
        Self(
            rows.iter()
                .flat_map(|(texture, multipliers)| {
                    multipliers
                        .iter()
                        .enumerate()
                        .map(move |(i, m)| PaytableEntry {
                            texture: *texture,
                            count: 3 + i as u8,
                            payout_multiplier: *m,
                        })
                })
                .collect(),
        )
    }

    /// Best multiplier for a run of `run` matching `texture`s.
    pub fn multiplier(&self, texture: usize, run: usize) -> Option<f64> {
        self.0
            .iter()
            .filter(|e| e.texture == texture && usize::from(e.count) <= run)
            .max_by_key(|e| e.count)
            .map(|e| e.payout_multiplier)
    }
}
