//! The render-loop side of a game: owns the reels, the tween scheduler and the
//! pending backend request.
//!
//! Everything here runs on the caller's thread. The only asynchronous step is
//! the result fetch, which runs on a tokio task and hands its answer back
//! through a oneshot channel that [`SlotSession::frame`] polls, so frames keep
//! ticking while the request is outstanding.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::RngCore;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::error::{ConfigError, FetchError};
use crate::reel_set::{ReelSet, SpinSummary};
use crate::result::{ResultProvider, SpinResult};
use crate::spin::{ReelSpinPlan, SpinOrchestrator};
use crate::symbols::TextureAtlas;
use crate::tween::TweenScheduler;

type PendingResult = oneshot::Receiver<Result<SpinResult, FetchError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Waiting for the result provider; reels are idle.
    Fetching,
    /// Reel tweens are running.
    Animating,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SpinStarted(Vec<ReelSpinPlan>),
    FetchFailed(FetchError),
    SpinCompleted(SpinSummary),
}

pub struct SlotSession {
    reel_set: ReelSet,
    scheduler: TweenScheduler<ReelSet>,
    orchestrator: SpinOrchestrator,
    provider: Arc<dyn ResultProvider>,
    fetch_timeout: Duration,
    pending: Option<PendingResult>,
}

impl SlotSession {
    pub fn new(
        config: &GameConfig,
        atlas: TextureAtlas,
        rng: Box<dyn RngCore>,
        provider: Arc<dyn ResultProvider>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            reel_set: ReelSet::new(config, atlas, rng)?,
            scheduler: TweenScheduler::new(),
            orchestrator: SpinOrchestrator::new(config.spin.clone()),
            provider,
            fetch_timeout: config.fetch_timeout(),
            pending: None,
        })
    }

    pub fn reels(&self) -> &ReelSet {
        &self.reel_set
    }

    pub fn is_running(&self) -> bool {
        self.reel_set.is_running()
    }

    pub fn state(&self) -> SessionState {
        if !self.reel_set.is_running() {
            SessionState::Idle
        } else if self.pending.is_some() {
            SessionState::Fetching
        } else {
            SessionState::Animating
        }
    }

    pub fn active_tweens(&self) -> usize {
        self.scheduler.len()
    }

    /// The "press" trigger. Ignored while a spin is in progress; otherwise asks
    /// the provider for a result in the background. Must be called from within
    /// a tokio runtime.
    pub fn request_spin(&mut self) -> bool {
        if !self.reel_set.begin_spin() {
            debug!("spin already running, ignoring trigger");
            return false;
        }

        let (tx, rx) = oneshot::channel();
        self.pending = Some(rx);

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                warn!(error = %err, "no async runtime to fetch a spin result");
                let _ = tx.send(Err(FetchError::Dropped));
                return true;
            }
        };

        let provider = Arc::clone(&self.provider);
        let timeout = self.fetch_timeout;
        handle.spawn(async move {
            let outcome = match tokio::time::timeout(timeout, provider.fetch()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::Timeout(timeout)),
            };
            // the receiver is gone only if the session was dropped
            let _ = tx.send(outcome);
        });
        debug!("spin result requested");
        true
    }

    /// One render frame: start the spin if its result arrived, advance the
    /// tweens, then lay out every reel and update its blur.
    pub fn frame(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.poll_result(now, &mut events);
        self.scheduler.update(now, &mut self.reel_set);
        self.reel_set.per_frame_tick();
        if let Some(summary) = self.reel_set.take_completed() {
            events.push(SessionEvent::SpinCompleted(summary));
        }
        events
    }

    fn poll_result(&mut self, now: Instant, events: &mut Vec<SessionEvent>) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => Err(FetchError::Dropped),
        };
        self.pending = None;

        match outcome {
            Ok(result) => {
                let plans = self.orchestrator.spin(
                    &mut self.reel_set,
                    &mut self.scheduler,
                    now,
                    move |set: &mut ReelSet| set.finish_spin(&result),
                );
                info!(reels = plans.len(), "spin started");
                events.push(SessionEvent::SpinStarted(plans));
            }
            Err(err) => {
                warn!(error = %err, "spin aborted, no result");
                self.reel_set.abort_spin();
                events.push(SessionEvent::FetchFailed(err));
            }
        }
    }
}
