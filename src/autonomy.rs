//! Decision policy for entities nobody is steering.
//!
//! Two independent state machines run side by side: one for locomotion
//! ([`Motion`]) and one for the connecting latch ([`Latch`]). Each phase holds a
//! randomized dwell countdown, so entities drift out of sync with each other.

use crate::behavior::{Bounds, Intent};
use crate::config::{AutonomyConfig, DwellRange};
use crate::vec2::Vec2;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Idle,
    /// Per-axis direction in {-1, 0, 1}.
    Moving { direction: Vec2 },
}

impl Motion {
    pub fn direction(&self) -> Vec2 {
        match self {
            Motion::Idle => Vec2::ZERO,
            Motion::Moving { direction } => *direction,
        }
    }

    /// Draw a fresh locomotion decision.
    pub fn decide<R: Rng + ?Sized>(rng: &mut R, config: &AutonomyConfig) -> Motion {
        if roll(rng, config.idle_probability) {
            return Motion::Idle;
        }
        let direction = Vec2::new(
            rng.gen_range(-1i8..=1) as f32,
            rng.gen_range(-1i8..=1) as f32,
        );
        Motion::Moving { direction }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Latch {
    Connecting,
    Disconnected,
}

impl Latch {
    pub fn is_connecting(self) -> bool {
        matches!(self, Latch::Connecting)
    }

    /// Transition taken when the current latch phase runs out.
    pub fn next<R: Rng + ?Sized>(self, rng: &mut R, config: &AutonomyConfig) -> Latch {
        match self {
            Latch::Connecting => Latch::Disconnected,
            Latch::Disconnected => {
                if roll(rng, config.connect_probability) {
                    Latch::Connecting
                } else {
                    Latch::Disconnected
                }
            }
        }
    }

    pub fn dwell(self, config: &AutonomyConfig) -> DwellRange {
        match self {
            Latch::Connecting => config.connect_dwell,
            Latch::Disconnected => config.disconnect_dwell,
        }
    }
}

/// A state together with the frames left before it is reconsidered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase<S> {
    pub state: S,
    pub remaining: u32,
}

impl<S> Phase<S> {
    /// Count one frame down; true once the phase has expired.
    fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}

/// Bernoulli draw; probabilities outside [0, 1] (or NaN) saturate instead of panicking.
fn roll<R: Rng + ?Sized>(rng: &mut R, probability: f32) -> bool {
    if !(probability > 0.0) {
        false
    } else if probability >= 1.0 {
        true
    } else {
        rng.gen_bool(f64::from(probability))
    }
}

/// Dwell in frames, never zero even for an empty or inverted range.
fn draw_dwell<R: Rng + ?Sized>(rng: &mut R, range: DwellRange) -> u32 {
    let min = range.min.max(1);
    rng.gen_range(min..=range.max.max(min))
}

/// Force the direction inward on any axis within `margin` of a boundary.
pub fn avoid_edges(direction: Vec2, position: Vec2, bounds: Bounds, margin: f32) -> Vec2 {
    let mut steered = direction;
    if position.x <= margin {
        steered.x = 1.0;
    } else if position.x >= bounds.width - margin {
        steered.x = -1.0;
    }
    if position.y <= margin {
        steered.y = 1.0;
    } else if position.y >= bounds.height - margin {
        steered.y = -1.0;
    }
    steered
}

#[derive(Debug, Clone, PartialEq)]
pub struct Autonomous {
    motion: Phase<Motion>,
    latch: Phase<Latch>,
}

impl Autonomous {
    /// Start with a random decision and partially elapsed timers.
    pub(crate) fn new<R: Rng + ?Sized>(rng: &mut R, config: &AutonomyConfig) -> Self {
        let motion = Phase {
            state: Motion::decide(rng, config),
            remaining: draw_dwell(rng, DwellRange::new(1, config.move_dwell.max)),
        };
        let latch = Phase {
            state: Latch::Disconnected,
            remaining: draw_dwell(rng, DwellRange::new(1, config.disconnect_dwell.max)),
        };
        Self { motion, latch }
    }

    /// Construct with explicit phases; used to pin the machine in tests and demos.
    pub fn with_phases(motion: Phase<Motion>, latch: Phase<Latch>) -> Self {
        Self { motion, latch }
    }

    pub fn motion(&self) -> Phase<Motion> {
        self.motion
    }

    pub fn latch(&self) -> Phase<Latch> {
        self.latch
    }

    /// Advance both machines one frame and produce this frame's intent.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        position: Vec2,
        bounds: Bounds,
        rng: &mut R,
        config: &AutonomyConfig,
    ) -> Intent {
        if self.motion.tick() {
            self.motion.state = Motion::decide(rng, config);
            self.motion.remaining = draw_dwell(rng, config.move_dwell);
        }
        if self.latch.tick() {
            let next = self.latch.state.next(rng, config);
            self.latch.state = next;
            self.latch.remaining = draw_dwell(rng, next.dwell(config));
        }

        let accel = avoid_edges(
            self.motion.state.direction(),
            position,
            bounds,
            config.edge_margin,
        );
        Intent {
            accel,
            connecting: self.latch.state.is_connecting(),
            identify: roll(rng, config.signal_chance),
        }
    }
}
