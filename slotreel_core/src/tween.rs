//! Minimal typed tweening.
//!
//! A [`Tween`] drives one numeric [`Channel`] of a context value `C` from its
//! current value to a target over a fixed duration. The [`TweenScheduler`] is
//! owned by the render loop and receives the context by reference on every
//! update, so tweens never hold references into the objects they animate.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Overshoots the end value by an amount-dependent margin, then settles.
    BackOut { amount: f64 },
    OutCubic,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::BackOut { amount } => {
                let u = t - 1.0;
                u * u * ((amount + 1.0) * u + amount) + 1.0
            }
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

type Getter<C> = Box<dyn Fn(&C) -> f64>;
type Setter<C> = Box<dyn FnMut(&mut C, f64)>;
type Hook<C> = Box<dyn FnMut(&mut C)>;
type Done<C> = Box<dyn FnOnce(&mut C)>;

/// Typed accessor for one numeric field inside `C`.
pub struct Channel<C> {
    get: Getter<C>,
    set: Setter<C>,
}

impl<C> Channel<C> {
    pub fn new(get: impl Fn(&C) -> f64 + 'static, set: impl FnMut(&mut C, f64) + 'static) -> Self {
        Self {
            get: Box::new(get),
            set: Box::new(set),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

pub struct Tween<C> {
    channel: Channel<C>,
    target: f64,
    duration: Duration,
    easing: Easing,
    on_change: Option<Hook<C>>,
    on_complete: Option<Done<C>>,
}

impl<C> Tween<C> {
    pub fn to(channel: Channel<C>, target: f64) -> Self {
        Self {
            channel,
            target,
            duration: Duration::ZERO,
            easing: Easing::Linear,
            on_change: None,
            on_complete: None,
        }
    }

    pub fn over(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Runs after every value write, including the final one.
    pub fn on_change(mut self, hook: impl FnMut(&mut C) + 'static) -> Self {
        self.on_change = Some(Box::new(hook));
        self
    }

    /// Runs once, on the update that reaches phase 1.
    pub fn on_complete(mut self, done: impl FnOnce(&mut C) + 'static) -> Self {
        self.on_complete = Some(Box::new(done));
        self
    }
}

struct ActiveTween<C> {
    id: TweenId,
    from: f64,
    start: Instant,
    tween: Tween<C>,
}

impl<C> ActiveTween<C> {
    fn phase(&self, now: Instant) -> f64 {
        if self.tween.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f64() / self.tween.duration.as_secs_f64()).min(1.0)
    }
}

/// The set of running tweens for one context type.
pub struct TweenScheduler<C> {
    active: Vec<ActiveTween<C>>,
    next_id: u64,
}

impl<C> Default for TweenScheduler<C> {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            next_id: 0,
        }
    }
}

impl<C> TweenScheduler<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tween`, reading its start value from `ctx`.
    pub fn start(&mut self, tween: Tween<C>, ctx: &C, now: Instant) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        let from = (tween.channel.get)(ctx);
        self.active.push(ActiveTween {
            id,
            from,
            start: now,
            tween,
        });
        id
    }

    /// Advances every tween to `now`. Finished tweens are collected during the
    /// pass and dropped afterwards, in registration order. Returns how many
    /// finished.
    pub fn update(&mut self, now: Instant, ctx: &mut C) -> usize {
        let mut finished = Vec::new();
        for active in self.active.iter_mut() {
            let phase = active.phase(now);
            let tween = &mut active.tween;
            let value = if phase >= 1.0 {
                tween.target
            } else {
                lerp(active.from, tween.target, tween.easing.apply(phase))
            };
            (tween.channel.set)(ctx, value);
            if let Some(hook) = tween.on_change.as_mut() {
                hook(ctx);
            }
            if phase >= 1.0 {
                if let Some(done) = tween.on_complete.take() {
                    done(ctx);
                }
                finished.push(active.id);
            }
        }
        if !finished.is_empty() {
            self.active.retain(|t| !finished.contains(&t.id));
        }
        finished.len()
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.active.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
