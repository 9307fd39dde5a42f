//! Chart-side effect types
//!
//! The data-driven vocabulary between a chart and the element animation
//! registry: which chart a data point belongs to, and what hover/click
//! physics it wants. Everything here is plain data so hosts can ship effect
//! tables in their own config files.

use serde::{Deserialize, Serialize};
use vitro_animation::PartialSpringConfig;
use vitro_core::Vec2;

/// The chart family an element belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Area,
    Scatter,
    Timeline,
}

/// Identifies one data point for effect resolution
///
/// Passed to the registered effect resolver lazily - only for elements
/// actually under the pointer, never for the full data set per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectQuery {
    pub series_index: usize,
    pub item_index: usize,
    pub chart_kind: ChartKind,
}

/// One visual effect: target deltas plus optional spring overrides
///
/// `None` fields leave the corresponding quantity at rest / on the base
/// config.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    pub scale: Option<f32>,
    pub opacity: Option<f32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub tension: Option<f32>,
    pub friction: Option<f32>,
    pub mass: Option<f32>,
}

impl EffectSpec {
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_tension(mut self, tension: f32) -> Self {
        self.tension = Some(tension);
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction);
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    /// The spring-parameter part of this effect, as a cascade layer
    pub fn spring_overrides(&self) -> PartialSpringConfig {
        PartialSpringConfig {
            tension: self.tension,
            friction: self.friction,
            mass: self.mass,
            precision: None,
        }
    }

    /// Target values with rest defaults filled in
    pub(crate) fn targets(&self) -> EffectTargets {
        EffectTargets {
            scale: self.scale.unwrap_or(1.0),
            opacity: self.opacity.unwrap_or(1.0),
            offset: Vec2::new(self.x.unwrap_or(0.0), self.y.unwrap_or(0.0)),
        }
    }
}

/// Fully-resolved effect targets (rest state when no effect applies)
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct EffectTargets {
    pub scale: f32,
    pub opacity: f32,
    pub offset: Vec2,
}

impl EffectTargets {
    pub const REST: EffectTargets = EffectTargets {
        scale: 1.0,
        opacity: 1.0,
        offset: Vec2::ZERO,
    };
}

/// Hover and click effects for one data point
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementEffects {
    pub hover: Option<EffectSpec>,
    pub click: Option<EffectSpec>,
}

/// Renderer-implemented save/restore seam the draw hooks push through
///
/// `before_element_draw` pushes translate, then scale anchored at the
/// post-translation center, then an opacity multiply - in that order -
/// between one `save`/`restore` pair.
pub trait TransformSink {
    fn save(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    /// Scale uniformly about `anchor`
    fn scale_around(&mut self, scale: f32, anchor: Vec2);
    fn multiply_opacity(&mut self, opacity: f32);
    fn restore(&mut self);
}
