//! Gauge pointer animation.
//!
//! The stepper is pure; frames are requested through a [`FrameScheduler`]
//! so the browser host can plug in `requestAnimationFrame` and tests can
//! drive frames by hand.

use crate::pipeline::render;
use crate::registry::ChartRegistry;
use std::collections::VecDeque;
use viz_core::{ChartId, GaugeAnimationConfig};

/// Pointer value moving from the range minimum toward the dataset value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeAnimation {
    pub rating: f64,
    pub target: f64,
    /// Rating units per frame
    pub speed: f64,
    /// Speed gained per frame
    pub acceleration: f64,
    pub done: bool,
    /// Load revision this animation belongs to
    pub revision: u64,
}

impl GaugeAnimation {
    pub fn start(from: f64, target: f64, config: &GaugeAnimationConfig, revision: u64) -> Self {
        let movable = config.speed.is_finite() && config.speed > 0.0;
        let done = from == target || !movable || !from.is_finite() || !target.is_finite();
        Self {
            rating: if done { target } else { from },
            target,
            speed: config.speed,
            acceleration: config.acceleration.max(0.0),
            done,
            revision,
        }
    }
}

/// Advance by `dt` frames. Never overshoots: the last step lands on the target.
pub fn step(animation: GaugeAnimation, dt: f64) -> GaugeAnimation {
    if animation.done {
        return animation;
    }

    let distance = animation.target - animation.rating;
    let travel = animation.speed * dt.max(0.0);
    if travel >= distance.abs() {
        return GaugeAnimation {
            rating: animation.target,
            done: true,
            ..animation
        };
    }

    GaugeAnimation {
        rating: animation.rating + travel * distance.signum(),
        speed: animation.speed + animation.acceleration * dt.max(0.0),
        ..animation
    }
}

// ============================================================================
// STRATEGY PATTERN: FrameScheduler Trait
// ============================================================================

/// Source of animation frames
pub trait FrameScheduler {
    /// Ask for one more frame for `id` at load `revision`
    fn request_frame(&mut self, id: ChartId, revision: u64);
}

/// Queue of requested frames, drained by the caller
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: VecDeque<(ChartId, u64)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> Option<(ChartId, u64)> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self, id: ChartId, revision: u64) {
        self.pending.push_back((id, revision));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Frame drawn, another one requested
    Applied,
    /// Pointer reached its target
    Finished,
    /// A newer load replaced the animation
    Stale,
    /// Instance no longer registered
    Disposed,
}

/// Request the first frame if the instance has a running animation
pub fn schedule_animation(registry: &ChartRegistry, id: ChartId, scheduler: &mut dyn FrameScheduler) -> bool {
    match registry.get(id) {
        Some(state) if state.is_animating() => {
            scheduler.request_frame(id, state.revision);
            true
        }
        _ => false,
    }
}

/// Apply one frame: step the pointer, redraw, and request the next frame
pub fn run_frame(
    registry: &mut ChartRegistry,
    id: ChartId,
    revision: u64,
    dt: f64,
    scheduler: &mut dyn FrameScheduler,
) -> FrameOutcome {
    let Some((state, interaction)) = registry.split_mut(id) else {
        tracing::debug!(chart = %id, "frame for disposed chart dropped");
        return FrameOutcome::Disposed;
    };

    if state.revision != revision {
        tracing::trace!(chart = %id, revision, current = state.revision, "stale frame dropped");
        return FrameOutcome::Stale;
    }

    let Some(animation) = state.animation else {
        return FrameOutcome::Stale;
    };
    if animation.done {
        return FrameOutcome::Finished;
    }

    let next = step(animation, dt);
    state.animation = Some(next);
    render(state, interaction);

    if next.done {
        tracing::debug!(chart = %id, rating = next.rating, "gauge animation finished");
        FrameOutcome::Finished
    } else {
        scheduler.request_frame(id, revision);
        FrameOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactor::apply_dataset;
    use proptest::prelude::*;
    use serde_json::json;
    use viz_core::{ChartKind, RawDataset};

    fn config(speed: f64, acceleration: f64) -> GaugeAnimationConfig {
        GaugeAnimationConfig {
            enabled: true,
            speed,
            acceleration,
        }
    }

    #[test]
    fn test_step_accelerates_and_lands_on_target() {
        let mut animation = GaugeAnimation::start(0.0, 5.0, &config(1.0, 0.5), 0);
        animation = step(animation, 1.0);
        assert_eq!(animation.rating, 1.0);
        assert_eq!(animation.speed, 1.5);
        animation = step(animation, 1.0);
        assert_eq!(animation.rating, 2.5);
        animation = step(animation, 1.0);
        assert_eq!(animation.rating, 4.5);
        animation = step(animation, 1.0);
        assert_eq!(animation.rating, 5.0);
        assert!(animation.done);
        assert_eq!(step(animation, 1.0), animation);
    }

    #[test]
    fn test_step_moves_downward() {
        let animation = step(GaugeAnimation::start(10.0, 4.0, &config(2.0, 0.0), 0), 1.0);
        assert_eq!(animation.rating, 8.0);
    }

    #[test]
    fn test_start_without_speed_is_done() {
        let animation = GaugeAnimation::start(0.0, 3.0, &config(0.0, 1.0), 0);
        assert!(animation.done);
        assert_eq!(animation.rating, 3.0);
    }

    #[test]
    fn test_run_frame_until_finished() {
        let mut registry = ChartRegistry::new();
        let config = json!({ "animation": { "speed": 1.0, "acceleration": 0.0 } });
        let dataset = json!({ "value": 3, "series": [{ "from": 0, "to": 5 }] });
        let id = registry.create(ChartKind::Gauge, &config, dataset, None, None).unwrap();

        let mut scheduler = ManualScheduler::new();
        assert!(schedule_animation(&registry, id, &mut scheduler));

        let mut outcomes = Vec::new();
        while let Some((id, revision)) = scheduler.next() {
            outcomes.push(run_frame(&mut registry, id, revision, 1.0, &mut scheduler));
        }
        assert_eq!(
            outcomes,
            vec![FrameOutcome::Applied, FrameOutcome::Applied, FrameOutcome::Finished]
        );
        assert_eq!(registry.get(id).unwrap().rating(), Some(3.0));
    }

    #[test]
    fn test_reload_supersedes_frames() {
        let mut registry = ChartRegistry::new();
        let dataset = json!({ "value": 3, "series": [{ "from": 0, "to": 5 }] });
        let id = registry.create(ChartKind::Gauge, &json!({}), dataset, None, None).unwrap();
        let old_revision = registry.get(id).unwrap().revision;

        let reload = json!({ "value": 4, "series": [{ "from": 0, "to": 5 }] });
        apply_dataset(&mut registry, id, RawDataset::Json(reload)).unwrap();

        let mut scheduler = ManualScheduler::new();
        let outcome = run_frame(&mut registry, id, old_revision, 1.0, &mut scheduler);
        assert_eq!(outcome, FrameOutcome::Stale);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_frame_after_dispose() {
        let mut registry = ChartRegistry::new();
        let dataset = json!({ "value": 3, "series": [{ "from": 0, "to": 5 }] });
        let id = registry.create(ChartKind::Gauge, &json!({}), dataset, None, None).unwrap();
        registry.dispose(id);

        let mut scheduler = ManualScheduler::new();
        assert_eq!(run_frame(&mut registry, id, 0, 1.0, &mut scheduler), FrameOutcome::Disposed);
    }

    proptest! {
        #[test]
        fn prop_stepper_never_overshoots(
            from in -100.0f64..100.0,
            target in -100.0f64..100.0,
            speed in 0.01f64..10.0,
            acceleration in 0.0f64..2.0,
        ) {
            let mut animation = GaugeAnimation::start(from, target, &config(speed, acceleration), 0);
            let (low, high) = (from.min(target), from.max(target));
            for _ in 0..100_000 {
                if animation.done {
                    break;
                }
                animation = step(animation, 1.0);
                prop_assert!(animation.rating >= low && animation.rating <= high);
            }
            prop_assert!(animation.done);
            prop_assert_eq!(animation.rating, target);
        }
    }
}
