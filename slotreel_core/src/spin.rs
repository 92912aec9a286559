use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use rand::{Rng, RngCore};
use tracing::debug;

use crate::config::SpinTiming;
use crate::reel::ReelEngine;
use crate::reel_set::ReelSet;
use crate::tween::{Channel, Easing, Tween, TweenScheduler};

/// Where one reel is headed and how long it takes to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct ReelSpinPlan {
    pub reel: usize,
    pub extra: u32,
    pub from: f64,
    pub target: f64,
    pub duration: Duration,
}

type AllComplete = Box<dyn FnOnce(&mut ReelSet)>;

/// Turns a spin request into one eased position tween per reel.
///
/// Later reels travel further and for longer, so they come to rest one after
/// another. The orchestrator does not guard against overlapping spins; the
/// caller owns that.
#[derive(Debug, Clone)]
pub struct SpinOrchestrator {
    timing: SpinTiming,
}

impl SpinOrchestrator {
    pub fn new(timing: SpinTiming) -> Self {
        Self { timing }
    }

    pub fn easing(&self) -> Easing {
        Easing::BackOut {
            amount: self.timing.backout_amount,
        }
    }

    /// Draws the random extra turns and derives target and duration per reel.
    pub fn plan(&self, reels: &[ReelEngine], rng: &mut dyn RngCore) -> Vec<ReelSpinPlan> {
        let choices = self.timing.extra_choices.max(1);
        reels
            .iter()
            .enumerate()
            .map(|(i, reel)| {
                let extra = rng.gen_range(0..choices);
                ReelSpinPlan {
                    reel: i,
                    extra,
                    from: reel.position(),
                    target: reel.position() + self.timing.travel(i, extra),
                    duration: self.timing.duration(i, extra),
                }
            })
            .collect()
    }

    /// Starts every reel's tween at `now`. Each tick re-lays out the reel it
    /// moved. `on_all_complete` runs once, on the update where the final
    /// outstanding reel reaches its target.
    pub fn spin(
        &self,
        set: &mut ReelSet,
        scheduler: &mut TweenScheduler<ReelSet>,
        now: Instant,
        on_all_complete: impl FnOnce(&mut ReelSet) + 'static,
    ) -> Vec<ReelSpinPlan> {
        let plans = {
            let (reels, rng) = set.reels_and_rng();
            for reel in reels.iter_mut() {
                reel.wrap_position();
            }
            self.plan(reels, rng)
        };

        if plans.is_empty() {
            on_all_complete(set);
            return plans;
        }

        let remaining = Rc::new(Cell::new(plans.len()));
        let finish: Rc<RefCell<Option<AllComplete>>> =
            Rc::new(RefCell::new(Some(Box::new(on_all_complete))));

        for plan in &plans {
            let i = plan.reel;
            let channel = Channel::new(
                move |set: &ReelSet| set.reel(i).map_or(0.0, ReelEngine::position),
                move |set: &mut ReelSet, value| {
                    if let Some(reel) = set.reel_mut(i) {
                        reel.set_position(value);
                    }
                },
            );
            let remaining = Rc::clone(&remaining);
            let finish = Rc::clone(&finish);
            let tween = Tween::to(channel, plan.target)
                .over(plan.duration)
                .ease(self.easing())
                .on_change(move |set: &mut ReelSet| {
                    set.refresh_reel(i);
                })
                .on_complete(move |set: &mut ReelSet| {
                    remaining.set(remaining.get() - 1);
                    debug!(reel = i, remaining = remaining.get(), "reel settled");
                    if remaining.get() == 0 {
                        if let Some(done) = finish.borrow_mut().take() {
                            done(set);
                        }
                    }
                });
            scheduler.start(tween, set, now);
            debug!(
                reel = i,
                extra = plan.extra,
                target = plan.target,
                duration_ms = plan.duration.as_millis() as u64,
                "reel spin scheduled"
            );
        }
        plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::symbols::TextureAtlas;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn reel_set(reel_count: usize) -> ReelSet {
        let config = GameConfig {
            reel_count,
            ..GameConfig::default()
        };
        ReelSet::new(
            &config,
            TextureAtlas::default_set(),
            Box::new(StdRng::seed_from_u64(1)),
        )
        .unwrap()
    }

    #[test]
    fn zero_extras_give_base_stagger() {
        let set = reel_set(3);
        let orchestrator = SpinOrchestrator::new(SpinTiming::default());
        let plans = orchestrator.plan(set.reels(), &mut StepRng::new(0, 0));
        let summary: Vec<(u32, f64, u64)> = plans
            .iter()
            .map(|p| (p.extra, p.target, p.duration.as_millis() as u64))
            .collect();
        assert_eq!(
            summary,
            vec![(0, 10.0, 2_500), (0, 15.0, 3_100), (0, 20.0, 3_700)]
        );
    }

    #[test]
    fn plan_follows_stagger_formula() {
        let set = reel_set(5);
        let timing = SpinTiming::default();
        let orchestrator = SpinOrchestrator::new(timing.clone());
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            for plan in orchestrator.plan(set.reels(), &mut rng) {
                assert!(plan.extra < timing.extra_choices);
                assert_eq!(plan.target, plan.from + timing.travel(plan.reel, plan.extra));
                assert_eq!(plan.duration, timing.duration(plan.reel, plan.extra));
            }
        }
    }

    #[test]
    fn every_reel_lands_on_its_target() {
        let mut set = reel_set(4);
        let mut scheduler = TweenScheduler::new();
        let orchestrator = SpinOrchestrator::new(SpinTiming::default());
        let t0 = Instant::now();
        let plans = orchestrator.spin(&mut set, &mut scheduler, t0, |set: &mut ReelSet| {
            set.abort_spin();
        });
        assert_eq!(scheduler.len(), 4);

        let mut now = t0;
        while !scheduler.is_empty() {
            now += Duration::from_millis(16);
            scheduler.update(now, &mut set);
        }
        for plan in &plans {
            let reel = set.reel(plan.reel).unwrap();
            assert_eq!(reel.position(), plan.target);
            assert!(reel.position() >= plan.from + 10.0 + 5.0 * plan.reel as f64);
        }
    }
}
