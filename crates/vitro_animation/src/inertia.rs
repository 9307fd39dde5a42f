//! Inertial gesture physics
//!
//! Velocity-decay integration for drag/flick gestures: a 1-D
//! `InertialIntegrator` with optional rubber-band limits, and a
//! `GesturePositionTracker` composing two of them into a 2-D point.
//!
//! Deceleration is exponential in `dt` (`v *= exp(-friction * dt)`), so the
//! perceived slowdown is identical at 30, 60, or 120 ticks per second.

use vitro_core::Vec2;

/// Velocity below which an integrator counts as at rest (units/s)
const REST_VELOCITY: f32 = 0.5;

/// Default friction (decay rate per second) for gesture momentum
pub const DEFAULT_GESTURE_FRICTION: f32 = 4.0;

/// One scalar under decelerating friction with optional boundary reflection
#[derive(Clone, Copy, Debug)]
pub struct InertialIntegrator {
    position: f32,
    velocity: f32,
    /// Exponential decay rate per second; 0 disables deceleration
    friction: f32,
    bounds: Option<(f32, f32)>,
    /// Velocity retained on boundary contact: 0 = hard stop, 1 = full bounce
    boundary_damping: f32,
}

impl InertialIntegrator {
    pub fn new(position: f32) -> Self {
        Self {
            position,
            velocity: 0.0,
            friction: DEFAULT_GESTURE_FRICTION,
            bounds: None,
            boundary_damping: 0.5,
        }
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.max(0.0);
        self
    }

    pub fn with_bounds(mut self, min: f32, max: f32) -> Self {
        self.bounds = Some(if min <= max { (min, max) } else { (max, min) });
        self
    }

    pub fn with_boundary_damping(mut self, damping: f32) -> Self {
        self.boundary_damping = damping.clamp(0.0, 1.0);
        self
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction.max(0.0);
    }

    /// Seed the post-release flick velocity
    pub fn apply_impulse(&mut self, velocity: f32) {
        self.velocity = velocity;
    }

    /// Move to `value`: snap when `animate` is false, otherwise seed the
    /// impulse whose decay carries the position to `value`
    ///
    /// Under `v(t) = v0 * exp(-k t)` total travel is `v0 / k`, so the landing
    /// impulse is `(value - position) * k`. The discrete decay-then-advance
    /// tick undershoots the continuous integral by a few percent at UI frame
    /// rates. An undamped integrator has no finite landing point and snaps
    /// instead.
    pub fn set_position(&mut self, value: f32, animate: bool) {
        if animate && self.friction > 0.0 {
            self.velocity = (value - self.position) * self.friction;
        } else {
            self.position = value;
            self.velocity = 0.0;
        }
    }

    pub fn is_at_rest(&self) -> bool {
        self.velocity.abs() < REST_VELOCITY
    }

    /// Advance one timestep; returns true while still moving
    pub fn step(&mut self, dt: f32) -> bool {
        if self.friction > 0.0 {
            self.velocity *= (-self.friction * dt).exp();
        }
        self.position += self.velocity * dt;

        if let Some((min, max)) = self.bounds {
            if self.position < min {
                self.position = min;
                self.velocity = -self.velocity * self.boundary_damping;
            } else if self.position > max {
                self.position = max;
                self.velocity = -self.velocity * self.boundary_damping;
            }
        }

        if self.is_at_rest() {
            self.velocity = 0.0;
            return false;
        }
        true
    }
}

/// Tracks a 2-D point through drag/flick gestures
///
/// Two independent 1-D integrators; diagonal gestures are the vector sum of
/// two independently-damped axes. There is no cross-axis coupling.
pub struct GesturePositionTracker {
    x: InertialIntegrator,
    y: InertialIntegrator,
    on_complete: Option<Box<dyn FnMut() + Send>>,
    moving: bool,
}

impl GesturePositionTracker {
    pub fn new(position: Vec2) -> Self {
        Self {
            x: InertialIntegrator::new(position.x),
            y: InertialIntegrator::new(position.y),
            on_complete: None,
            moving: false,
        }
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.x.set_friction(friction);
        self.y.set_friction(friction);
        self
    }

    /// Constrain the tracked point to a rectangle; both axes rubber-band
    pub fn with_bounds(mut self, min: Vec2, max: Vec2) -> Self {
        self.x = self.x.with_bounds(min.x, max.x);
        self.y = self.y.with_bounds(min.y, max.y);
        self
    }

    pub fn with_boundary_damping(mut self, damping: f32) -> Self {
        self.x = self.x.with_boundary_damping(damping);
        self.y = self.y.with_boundary_damping(damping);
        self
    }

    /// Callback fired once when both axes come to rest after motion
    pub fn on_complete<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x.position(), self.y.position())
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.x.velocity(), self.y.velocity())
    }

    /// Seed the post-release flick velocity
    pub fn apply_impulse(&mut self, velocity: Vec2) {
        self.x.apply_impulse(velocity.x);
        self.y.apply_impulse(velocity.y);
        self.moving = true;
    }

    /// Snap or glide to `value` per axis (see `InertialIntegrator`)
    pub fn set_position(&mut self, value: Vec2, animate: bool) {
        self.x.set_position(value.x, animate);
        self.y.set_position(value.y, animate);
        self.moving = animate;
    }

    pub fn is_at_rest(&self) -> bool {
        self.x.is_at_rest() && self.y.is_at_rest()
    }

    /// Advance one timestep; returns true while either axis is moving
    ///
    /// The completion callback fires on the moving -> rest edge, not on every
    /// resting tick.
    pub fn step(&mut self, dt: f32) -> bool {
        let x_active = self.x.step(dt);
        let y_active = self.y.step(dt);
        let active = x_active || y_active;

        if self.moving && !active {
            self.moving = false;
            if let Some(callback) = self.on_complete.as_mut() {
                callback();
            }
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_decay_is_frame_rate_independent() {
        // The same wall-clock time at different tick rates must decay the
        // velocity identically (modulo float noise).
        let mut coarse = InertialIntegrator::new(0.0).with_friction(4.0);
        let mut fine = InertialIntegrator::new(0.0).with_friction(4.0);
        coarse.apply_impulse(1000.0);
        fine.apply_impulse(1000.0);

        coarse.step(0.1);
        for _ in 0..10 {
            fine.step(0.01);
        }

        assert!((coarse.velocity() - fine.velocity()).abs() < 1.0);
    }

    #[test]
    fn test_boundary_reflection() {
        let mut integrator = InertialIntegrator::new(95.0)
            .with_friction(0.0)
            .with_bounds(0.0, 100.0)
            .with_boundary_damping(0.5);
        integrator.apply_impulse(100.0);

        // One 0.1s step carries the position to 105, past the bound.
        integrator.step(0.1);

        assert!((integrator.position() - 100.0).abs() < 1e-4);
        assert!((integrator.velocity() - (-50.0)).abs() < 1e-4);
    }

    #[test]
    fn test_hard_stop_boundary() {
        let mut integrator = InertialIntegrator::new(95.0)
            .with_friction(0.0)
            .with_bounds(0.0, 100.0)
            .with_boundary_damping(0.0);
        integrator.apply_impulse(100.0);
        integrator.step(0.1);

        assert!((integrator.position() - 100.0).abs() < 1e-4);
        assert_eq!(integrator.velocity(), 0.0);
    }

    #[test]
    fn test_flick_comes_to_rest() {
        let mut integrator = InertialIntegrator::new(0.0).with_friction(4.0);
        integrator.apply_impulse(2000.0);

        let mut steps = 0;
        while integrator.step(DT) {
            steps += 1;
            assert!(steps < 10_000, "integrator must come to rest");
        }
        assert_eq!(integrator.velocity(), 0.0);
        assert!(integrator.position() > 0.0);
    }

    #[test]
    fn test_set_position_animated_lands_on_target() {
        let mut integrator = InertialIntegrator::new(0.0).with_friction(4.0);
        integrator.set_position(200.0, true);

        for _ in 0..2_000 {
            if !integrator.step(DT) {
                break;
            }
        }

        // Travel of an exponentially decayed impulse is v0/k in continuous
        // time; the discrete tick undershoots by a few percent.
        assert!((integrator.position() - 200.0).abs() < 10.0);
    }

    #[test]
    fn test_set_position_snap() {
        let mut integrator = InertialIntegrator::new(0.0);
        integrator.apply_impulse(500.0);
        integrator.set_position(50.0, false);

        assert_eq!(integrator.position(), 50.0);
        assert_eq!(integrator.velocity(), 0.0);
    }

    #[test]
    fn test_tracker_axes_are_independent() {
        let mut tracker = GesturePositionTracker::new(Vec2::ZERO);
        tracker.apply_impulse(Vec2::new(1000.0, 0.0));

        for _ in 0..100 {
            tracker.step(DT);
        }

        assert!(tracker.position().x > 0.0);
        assert_eq!(tracker.position().y, 0.0);
    }

    #[test]
    fn test_tracker_completion_fires_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let fired = Arc::new(AtomicUsize::new(0));
        let mut tracker = GesturePositionTracker::new(Vec2::ZERO);
        tracker.on_complete({
            let fired = Arc::clone(&fired);
            move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }
        });

        tracker.apply_impulse(Vec2::new(300.0, 150.0));
        for _ in 0..5_000 {
            tracker.step(DT);
        }

        assert!(tracker.is_at_rest());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
