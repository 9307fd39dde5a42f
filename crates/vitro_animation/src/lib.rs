//! Vitro animation core
//!
//! Physics-based animation for the Vitro widget library.
//!
//! # Features
//!
//! - **Spring Physics**: damped springs with tension, friction, mass, and a
//!   precision-based rest rule; mid-flight retargeting inherits velocity
//! - **Multi-Target Channels**: named spring sets advanced together, with a
//!   single settled edge and an `on_rest` callback
//! - **Inertial Gestures**: exponential velocity decay with rubber-band
//!   boundary reflection, composed into a 2-D gesture tracker
//! - **Frame Scheduling**: a per-context frame loop with clamped deltas,
//!   per-animation throttling, pause/resume, and panic isolation
//! - **Config Cascades**: override > ambient > preset > fallback, resolved
//!   by one pure merge
//! - **Motion Gating**: reduced-motion and quality-tier policy applied
//!   uniformly across the engine

pub mod channels;
pub mod config;
pub mod gate;
pub mod inertia;
pub mod scheduler;
pub mod spring;

pub use channels::{ChannelSet, RestEvent};
pub use config::{resolve_config, PartialSpringConfig};
pub use gate::{resolve_motion, AnimationClass, MotionPolicy};
pub use inertia::{GesturePositionTracker, InertialIntegrator, DEFAULT_GESTURE_FRICTION};
pub use scheduler::{
    AnimationId, AnimationScheduler, AnimationSpec, AnimationState, SchedulerHandle, TickOutcome,
    MAX_FRAME_DT,
};
pub use spring::{Spring, SpringConfig, SpringState, MASS_FLOOR, MIN_FRICTION};
