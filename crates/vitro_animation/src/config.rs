//! Spring configuration cascade
//!
//! Spring parameters can arrive from several places at once: an explicit
//! per-call override, an ambient default installed on the orchestrator or
//! registry, a named preset, and the hardcoded fallback. Resolution is a
//! shallow field-wise merge - last supplied value wins per field - done in
//! one pure function rather than per-component conditionals.

use serde::{Deserialize, Serialize};

use crate::spring::SpringConfig;

/// A partially-specified spring configuration
///
/// `None` fields defer to the next layer down in the cascade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialSpringConfig {
    pub tension: Option<f32>,
    pub friction: Option<f32>,
    pub mass: Option<f32>,
    pub precision: Option<f32>,
}

impl PartialSpringConfig {
    pub const EMPTY: PartialSpringConfig = PartialSpringConfig {
        tension: None,
        friction: None,
        mass: None,
        precision: None,
    };

    /// A partial that pins every field of `config`
    pub fn from_full(config: SpringConfig) -> Self {
        Self {
            tension: Some(config.tension),
            friction: Some(config.friction),
            mass: Some(config.mass),
            precision: Some(config.precision),
        }
    }

    /// A partial that pins every field of the named preset, if it exists
    pub fn preset(name: &str) -> Option<Self> {
        SpringConfig::preset(name).map(Self::from_full)
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

    pub fn with_precision(mut self, precision: f32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tension.is_none()
            && self.friction.is_none()
            && self.mass.is_none()
            && self.precision.is_none()
    }

    /// Overlay `self` on top of a full config
    fn over(&self, base: SpringConfig) -> SpringConfig {
        SpringConfig {
            tension: self.tension.unwrap_or(base.tension),
            friction: self.friction.unwrap_or(base.friction),
            mass: self.mass.unwrap_or(base.mass),
            precision: self.precision.unwrap_or(base.precision),
        }
    }
}

/// Resolve a config cascade
///
/// `layers` are ordered lowest priority first; a later layer's `Some` field
/// overrides an earlier one's. `fallback` supplies any field no layer pins.
pub fn resolve_config(
    fallback: SpringConfig,
    layers: &[Option<&PartialSpringConfig>],
) -> SpringConfig {
    layers
        .iter()
        .flatten()
        .fold(fallback, |acc, layer| layer.over(acc))
}
