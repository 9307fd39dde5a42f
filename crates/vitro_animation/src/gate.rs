//! Motion gating
//!
//! Folds the platform's reduced-motion preference and quality tier into a
//! single policy the rest of the engine consumes. Reduced motion suppresses
//! decorative and entrance animation but keeps high-visibility affordances
//! (focus indicators) moving - accessibility feedback must stay visible even
//! when decoration is off. Lower quality tiers never disable animation; they
//! soften it (less tension, more friction) so it settles cheaper and sooner.

use serde::{Deserialize, Serialize};
use vitro_core::{MotionPreference, QualityTier};

use crate::spring::SpringConfig;

/// What an animation is for; decides how the gate treats it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationClass {
    /// Hover scale, pulse, chart flourishes
    #[default]
    Decorative,
    /// Mount/appear transitions, staggered reveals
    Entrance,
    /// Focus rings and other affordances that must stay animated under
    /// reduced motion
    HighVisibility,
}

/// The resolved gate output consumed by every engine component
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionPolicy {
    pub disable_animation: bool,
    /// Multiplier applied to friction (and divided out of tension); 1.0 on
    /// the high tier
    pub damping_multiplier: f32,
}

impl MotionPolicy {
    /// Full motion, no scaling
    pub const FULL: MotionPolicy = MotionPolicy {
        disable_animation: false,
        damping_multiplier: 1.0,
    };

    /// Map a spring config through this policy
    ///
    /// Disabled animation is the caller's branch (snap instead of animate);
    /// `apply` only performs the tier softening.
    pub fn apply(&self, config: SpringConfig) -> SpringConfig {
        SpringConfig {
            tension: config.tension / self.damping_multiplier,
            friction: config.friction * self.damping_multiplier,
            ..config
        }
    }

    /// Scale an inertial friction coefficient
    pub fn apply_friction(&self, friction: f32) -> f32 {
        friction * self.damping_multiplier
    }
}

fn tier_damping(tier: QualityTier) -> f32 {
    match tier {
        QualityTier::High => 1.0,
        QualityTier::Medium => 1.3,
        QualityTier::Low => 1.7,
    }
}

/// Resolve the motion policy for one animation
pub fn resolve_motion(
    preference: MotionPreference,
    tier: QualityTier,
    class: AnimationClass,
) -> MotionPolicy {
    let disable_animation = preference.is_reduced()
        && matches!(class, AnimationClass::Decorative | AnimationClass::Entrance);

    MotionPolicy {
        disable_animation,
        damping_multiplier: tier_damping(tier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_suppresses_decorative() {
        let policy = resolve_motion(
            MotionPreference::Reduce,
            QualityTier::High,
            AnimationClass::Decorative,
        );
        assert!(policy.disable_animation);

        let policy = resolve_motion(
            MotionPreference::Reduce,
            QualityTier::High,
            AnimationClass::Entrance,
        );
        assert!(policy.disable_animation);
    }

    #[test]
    fn test_high_visibility_overrides_reduced_motion() {
        let policy = resolve_motion(
            MotionPreference::Reduce,
            QualityTier::High,
            AnimationClass::HighVisibility,
        );
        assert!(!policy.disable_animation);
    }

    #[test]
    fn test_no_preference_never_disables() {
        for class in [
            AnimationClass::Decorative,
            AnimationClass::Entrance,
            AnimationClass::HighVisibility,
        ] {
            let policy = resolve_motion(MotionPreference::NoPreference, QualityTier::Low, class);
            assert!(!policy.disable_animation);
        }
    }

    #[test]
    fn test_lower_tiers_soften_instead_of_disable() {
        let high = resolve_motion(
            MotionPreference::NoPreference,
            QualityTier::High,
            AnimationClass::Decorative,
        );
        let low = resolve_motion(
            MotionPreference::NoPreference,
            QualityTier::Low,
            AnimationClass::Decorative,
        );

        assert!(!low.disable_animation);
        assert!(low.damping_multiplier > high.damping_multiplier);

        let config = low.apply(SpringConfig::bouncy());
        assert!(config.tension < SpringConfig::bouncy().tension);
        assert!(config.friction > SpringConfig::bouncy().friction);
    }
}
