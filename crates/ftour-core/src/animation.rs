#![forbid(unsafe_code)]

//! Animation primitives for tour overlays.
//!
//! Everything here is tick-driven: the host advances time explicitly with a
//! [`Duration`], so tests run on a virtual clock and never sleep.
//!
//! - [`Pulse`] oscillates forever; the ripple rings use it while the avatar moves.
//! - [`Spring`] / [`Spring2`] ease the avatar towards its target with damped
//!   harmonic motion.
//! - [`stagger`] computes per-item start offsets for trail points.

pub mod stagger;

use std::time::Duration;

use crate::geometry::PercentPoint;

// ---------------------------------------------------------------------------
// Animation trait
// ---------------------------------------------------------------------------

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current output value, clamped to [0.0, 1.0].
    fn value(&self) -> f32;

    /// Reset the animation to its initial state.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// Pulse
// ---------------------------------------------------------------------------

/// Continuous sine-wave oscillation. Never completes.
#[derive(Debug, Clone, Copy)]
pub struct Pulse {
    frequency: f32,
    phase: f32,
}

impl Pulse {
    /// Create a pulse at `frequency` Hz.
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency: frequency.abs().max(f32::MIN_POSITIVE),
            phase: 0.0,
        }
    }

    /// Current phase in radians, always in `[0, TAU)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Fraction of the current cycle in `[0, 1)`. Ripple rings expand with it.
    pub fn cycle(&self) -> f32 {
        self.phase / std::f32::consts::TAU
    }
}

impl Animation for Pulse {
    fn tick(&mut self, dt: Duration) {
        self.phase += std::f32::consts::TAU * self.frequency * dt.as_secs_f32();
        self.phase %= std::f32::consts::TAU;
    }

    fn is_complete(&self) -> bool {
        false
    }

    fn value(&self) -> f32 {
        (self.phase.sin() + 1.0) / 2.0
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Spring
// ---------------------------------------------------------------------------

/// Largest integration step; longer ticks are split so stiff springs stay stable.
const SPRING_MAX_STEP: f32 = 1.0 / 240.0;

/// Damped-spring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// Distance and speed below which the spring is considered settled.
    pub rest_threshold: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 170.0,
            damping: 26.0,
            mass: 1.0,
            rest_threshold: 0.01,
        }
    }
}

impl SpringConfig {
    /// Builder: stiffness (clamped positive).
    #[must_use]
    pub fn stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness.max(f32::MIN_POSITIVE);
        self
    }

    /// Builder: damping (clamped non-negative).
    #[must_use]
    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping.max(0.0);
        self
    }
}

/// One-dimensional damped spring.
#[derive(Debug, Clone, Copy)]
pub struct Spring {
    value: f32,
    velocity: f32,
    target: f32,
    config: SpringConfig,
}

impl Spring {
    /// A spring resting at `initial`.
    pub fn new(initial: f32, config: SpringConfig) -> Self {
        Self {
            value: initial,
            velocity: 0.0,
            target: initial,
            config,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Retarget; current velocity is preserved so the motion stays continuous.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump to `value` and stop.
    pub fn snap_to(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn is_at_rest(&self) -> bool {
        (self.target - self.value).abs() <= self.config.rest_threshold
            && self.velocity.abs() <= self.config.rest_threshold
    }

    /// Integrate by `dt` (semi-implicit Euler, sub-stepped).
    pub fn tick(&mut self, dt: Duration) {
        if self.is_at_rest() {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }
        let mut remaining = dt.as_secs_f32();
        let mass = self.config.mass.max(f32::MIN_POSITIVE);
        while remaining > 0.0 {
            let h = remaining.min(SPRING_MAX_STEP);
            let displacement = self.value - self.target;
            let force = -self.config.stiffness * displacement - self.config.damping * self.velocity;
            self.velocity += force / mass * h;
            self.value += self.velocity * h;
            remaining -= h;
        }
        if self.is_at_rest() {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }
}

/// Two springs driving a [`PercentPoint`]; the avatar rides on one of these.
#[derive(Debug, Clone, Copy)]
pub struct Spring2 {
    x: Spring,
    y: Spring,
}

impl Spring2 {
    pub fn new(initial: PercentPoint, config: SpringConfig) -> Self {
        Self {
            x: Spring::new(initial.x, config),
            y: Spring::new(initial.y, config),
        }
    }

    /// Current (possibly overshooting) position, clamped into percentage space.
    pub fn position(&self) -> PercentPoint {
        PercentPoint::new(self.x.value(), self.y.value())
    }

    pub fn target(&self) -> PercentPoint {
        PercentPoint::new(self.x.target(), self.y.target())
    }

    pub fn set_target(&mut self, target: PercentPoint) {
        self.x.set_target(target.x);
        self.y.set_target(target.y);
    }

    pub fn snap_to(&mut self, point: PercentPoint) {
        self.x.snap_to(point.x);
        self.y.snap_to(point.y);
    }

    pub fn is_at_rest(&self) -> bool {
        self.x.is_at_rest() && self.y.is_at_rest()
    }

    pub fn tick(&mut self, dt: Duration) {
        self.x.tick(dt);
        self.y.tick(dt);
    }
}
