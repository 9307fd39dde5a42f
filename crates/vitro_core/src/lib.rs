//! Vitro core runtime
//!
//! Shared primitives for the Vitro widget library: 2D geometry exchanged with
//! the renderer, the pointer event model, the platform signals consumed by
//! the animation gate, and the library error type.
//!
//! Everything here is plain data - the interesting machinery lives in
//! `vitro_animation` (the physics core) and `vitro_charts` (the per-element
//! animation registry).

pub mod error;
pub mod events;
pub mod geometry;
pub mod signals;

pub use error::Error;
pub use events::{event_types, EventType, PointerButton, PointerEvent};
pub use geometry::{Rect, Vec2};
pub use signals::{MotionPreference, QualityTier};
