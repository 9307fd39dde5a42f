//! Platform signals
//!
//! The two inbound signals the animation gate consumes: the user's reduced
//! motion preference and the device's coarse performance tier. Detection
//! lives in the embedding platform layer; this crate only defines the
//! values that cross into the animation core.

use serde::{Deserialize, Serialize};

/// User motion preference, as reported by the platform
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionPreference {
    /// No stated preference - full motion
    #[default]
    NoPreference,
    /// The user asked for reduced motion
    Reduce,
}

impl MotionPreference {
    pub fn is_reduced(&self) -> bool {
        matches!(self, MotionPreference::Reduce)
    }
}

/// Coarse device performance classification
///
/// Lower tiers trade visual richness (bounce, overshoot) for cheaper,
/// faster-settling animation rather than disabling motion outright.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    Medium,
    #[default]
    High,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(QualityTier::Low < QualityTier::Medium);
        assert!(QualityTier::Medium < QualityTier::High);
    }

    #[test]
    fn test_motion_preference_default() {
        assert!(!MotionPreference::default().is_reduced());
        assert!(MotionPreference::Reduce.is_reduced());
    }
}
