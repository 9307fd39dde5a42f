//! Spring physics
//!
//! Damped-spring integration for smooth, natural animations. The solver is a
//! pure function over `SpringState`; the `Spring` wrapper bundles state with
//! its configuration for the common single-value case.
//!
//! Integration is semi-implicit Euler: velocity is updated from the current
//! forces first, then position is updated from the *new* velocity. With the
//! clamped frame deltas the scheduler feeds in, this is stable across the
//! whole preset table without the cost of higher-order schemes.

use serde::{Deserialize, Serialize};

/// Mass is floored here to keep the acceleration division defined
pub const MASS_FLOOR: f32 = 1e-3;

/// Friction is floored here so every accepted config converges in finite
/// time; an exactly-undamped spring is not representable
pub const MIN_FRICTION: f32 = 0.05;

/// Configuration for a spring animation
///
/// Values are framework-agnostic and expressed per second - nothing here
/// assumes a 60fps tick. Tension and friction may be replaced mid-flight
/// without resetting position or velocity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    /// Restoring force coefficient toward the target
    pub tension: f32,
    /// Velocity damping coefficient
    pub friction: f32,
    pub mass: f32,
    /// Rest window: settled when |position - target| and |velocity| are both
    /// below this
    pub precision: f32,
}

impl SpringConfig {
    pub fn new(tension: f32, friction: f32, mass: f32, precision: f32) -> Self {
        Self {
            tension,
            friction,
            mass,
            precision,
        }
    }

    /// A gentle, slow spring (page transitions)
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0, 0.01)
    }

    /// The standard spring (most UI feedback)
    pub fn standard() -> Self {
        Self::new(170.0, 26.0, 1.0, 0.01)
    }

    /// A stiff, fast spring (buttons, hover feedback)
    pub fn snappy() -> Self {
        Self::new(210.0, 20.0, 1.0, 0.01)
    }

    /// An underdamped spring with visible overshoot (playful UI)
    pub fn bouncy() -> Self {
        Self::new(180.0, 12.0, 1.0, 0.01)
    }

    /// Look up a preset by its published name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "gentle" => Some(Self::gentle()),
            "default" | "standard" => Some(Self::standard()),
            "snappy" => Some(Self::snappy()),
            "bouncy" => Some(Self::bouncy()),
            _ => None,
        }
    }

    /// Calculate critical damping for this spring's tension and mass
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.tension * self.mass).sqrt()
    }

    /// Check if the spring will oscillate
    pub fn is_underdamped(&self) -> bool {
        self.friction < self.critical_damping()
    }

    /// Clamp out-of-range parameters instead of rejecting them
    ///
    /// Negative tension/friction clamp to zero, then friction and mass are
    /// floored so the integration stays defined and terminating. Applied on
    /// every step; configs are stored as the caller supplied them.
    pub fn sanitized(&self) -> Self {
        Self {
            tension: self.tension.max(0.0),
            friction: self.friction.max(0.0).max(MIN_FRICTION),
            mass: self.mass.max(MASS_FLOOR),
            precision: self.precision.max(f32::EPSILON),
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// The integrated quantities of one spring: where it is, how fast it is
/// moving, and where it is headed
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpringState {
    pub position: f32,
    pub velocity: f32,
    pub target: f32,
}

impl SpringState {
    /// A spring resting at `value`
    pub fn at(value: f32) -> Self {
        Self {
            position: value,
            velocity: 0.0,
            target: value,
        }
    }

    /// Check the rest window for this state under `precision`
    pub fn is_at_rest(&self, precision: f32) -> bool {
        (self.position - self.target).abs() < precision && self.velocity.abs() < precision
    }

    /// Advance one timestep; `dt` is in seconds
    ///
    /// Returns the new state and whether it has settled. A settled state is
    /// snapped exactly onto the target with zero velocity, which eliminates
    /// the long tail of sub-precision jitter.
    pub fn step(self, config: SpringConfig, dt: f32) -> (SpringState, bool) {
        let config = config.sanitized();

        let displacement = self.position - self.target;
        let spring_force = -config.tension * displacement;
        let damping_force = -config.friction * self.velocity;
        let acceleration = (spring_force + damping_force) / config.mass;

        let velocity = self.velocity + acceleration * dt;
        let position = self.position + velocity * dt;

        let next = SpringState {
            position,
            velocity,
            target: self.target,
        };

        if next.is_at_rest(config.precision) {
            (
                SpringState {
                    position: self.target,
                    velocity: 0.0,
                    target: self.target,
                },
                true,
            )
        } else {
            (next, false)
        }
    }
}

/// A spring-based animator: one scalar value, its config, and its target
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    state: SpringState,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            state: SpringState::at(initial),
        }
    }

    pub fn value(&self) -> f32 {
        self.state.position
    }

    pub fn velocity(&self) -> f32 {
        self.state.velocity
    }

    pub fn target(&self) -> f32 {
        self.state.target
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    /// Retarget without resetting position or velocity
    pub fn set_target(&mut self, target: f32) {
        self.state.target = target;
    }

    /// Replace tension/friction/mass mid-flight; position and velocity carry
    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }

    /// Teleport to `value` with zero velocity
    pub fn set_immediate(&mut self, value: f32) {
        self.state = SpringState::at(value);
    }

    pub fn is_settled(&self) -> bool {
        self.state.is_at_rest(self.config.sanitized().precision)
    }

    /// Step the simulation; returns true once settled
    pub fn step(&mut self, dt: f32) -> bool {
        if self.is_settled() {
            self.state = SpringState::at(self.state.target);
            return true;
        }
        let (next, settled) = self.state.step(self.config, dt);
        self.state = next;
        settled
    }
}
