pub mod config;
pub mod error;
pub mod outcome;
pub mod paytable;
pub mod reel;
pub mod reel_set;
pub mod result;
pub mod rng;
pub mod session;
pub mod spin;
pub mod symbols;
pub mod tween;

pub use crate::config::{GameConfig, ReelGeometry, SpinTiming};
pub use crate::error::{ConfigError, FetchError, ReelError};
pub use crate::outcome::{compute_reel_window, evaluate_lines, spin_once, spin_with_seeds, EngineParams, SpinOutcome};
pub use crate::paytable::{Paytable, PaytableEntry};
pub use crate::reel::ReelEngine;
pub use crate::reel_set::{ReelSet, SpinSummary};
pub use crate::result::{MockResultProvider, ResultProvider, SeededResultProvider, SpinResult};
pub use crate::rng::{outcome_rng, outcome_seed};
pub use crate::session::{SessionEvent, SessionState, SlotSession};
pub use crate::spin::{ReelSpinPlan, SpinOrchestrator};
pub use crate::symbols::{SymbolUnit, TextureAtlas, TextureId};
pub use crate::tween::{lerp, Channel, Easing, Tween, TweenId, TweenScheduler};
