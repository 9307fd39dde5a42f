//! Multi-target spring orchestration
//!
//! A `ChannelSet` owns one named spring per animated quantity and advances
//! them together. Consumers hand it a target map each time their desired
//! state changes; the set reconciles channels against the map's keys and
//! reports per-key current values plus an aggregate settled state.
//!
//! Key lifecycle is deliberately blunt: a key first seen in a target map
//! starts *at* its target (no entrance animation) unless an explicit initial
//! value is supplied, and a key absent from the map is discarded on the spot
//! (no exit decay). Callers that want an exit animation keep the key present
//! with its "exited" target until `on_rest` reports `finished: true`, then
//! drop it.

use indexmap::IndexMap;

use crate::config::{resolve_config, PartialSpringConfig};
use crate::spring::{Spring, SpringConfig};

/// Payload for the `on_rest` callback
///
/// `finished` is true when the set settled naturally, false when it was
/// forced to rest by `snap_all`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestEvent {
    pub finished: bool,
}

type RestFn = Box<dyn FnMut(RestEvent) + Send>;

/// A named set of springs advanced together
pub struct ChannelSet {
    channels: IndexMap<String, Spring>,
    /// Ambient partial config, below per-call overrides in the cascade
    ambient: Option<PartialSpringConfig>,
    fallback: SpringConfig,
    on_rest: Option<RestFn>,
    /// Edge detector for on_rest; an empty set counts as settled
    settled: bool,
}

impl ChannelSet {
    pub fn new() -> Self {
        Self::with_fallback(SpringConfig::default())
    }

    /// Use `fallback` as the bottom layer of the config cascade
    pub fn with_fallback(fallback: SpringConfig) -> Self {
        Self {
            channels: IndexMap::new(),
            ambient: None,
            fallback,
            on_rest: None,
            settled: true,
        }
    }

    /// Install/clear the ambient config layer (context defaults)
    pub fn set_ambient(&mut self, ambient: Option<PartialSpringConfig>) {
        self.ambient = ambient;
    }

    /// Callback invoked exactly once per transition into fully-settled
    pub fn on_rest<F>(&mut self, callback: F)
    where
        F: FnMut(RestEvent) + Send + 'static,
    {
        self.on_rest = Some(Box::new(callback));
    }

    /// Reconcile channels against a full target map
    ///
    /// Present keys are created or retargeted; absent keys are discarded.
    /// Retargeting replaces the channel's config (cascade-resolved) without
    /// resetting position or velocity.
    pub fn set_targets<K, I>(&mut self, targets: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f32)>,
    {
        self.set_targets_with(targets, None)
    }

    /// `set_targets` with an explicit per-call config override on top of the
    /// ambient layer and the fallback
    pub fn set_targets_with<K, I>(&mut self, targets: I, override_config: Option<&PartialSpringConfig>)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f32)>,
    {
        let config = resolve_config(self.fallback, &[self.ambient.as_ref(), override_config]);

        let incoming: IndexMap<String, f32> =
            targets.into_iter().map(|(k, v)| (k.into(), v)).collect();

        self.channels.retain(|key, _| incoming.contains_key(key));

        for (key, target) in incoming {
            match self.channels.get_mut(&key) {
                Some(spring) => {
                    spring.set_config(config);
                    spring.set_target(target);
                }
                None => {
                    // First sight: start at the target, already at rest.
                    self.channels.insert(key, Spring::new(config, target));
                }
            }
        }

        if !self.all_settled() {
            self.settled = false;
        }
    }

    /// Create or retarget a single channel without reconciling the others
    pub fn set_target(&mut self, key: impl Into<String>, target: f32) {
        let key = key.into();
        let config = resolve_config(self.fallback, &[self.ambient.as_ref()]);
        match self.channels.get_mut(&key) {
            Some(spring) => spring.set_target(target),
            None => {
                self.channels.insert(key, Spring::new(config, target));
            }
        }
        if !self.all_settled() {
            self.settled = false;
        }
    }

    /// Create a channel at an explicit initial value, animating to `target`
    ///
    /// If the key already exists the initial value is ignored and this is a
    /// plain retarget.
    pub fn set_target_from(&mut self, key: impl Into<String>, initial: f32, target: f32) {
        let key = key.into();
        let config = resolve_config(self.fallback, &[self.ambient.as_ref()]);
        match self.channels.get_mut(&key) {
            Some(spring) => spring.set_target(target),
            None => {
                let mut spring = Spring::new(config, initial);
                spring.set_target(target);
                self.channels.insert(key, spring);
            }
        }
        if !self.all_settled() {
            self.settled = false;
        }
    }

    /// Discard a channel immediately
    pub fn remove(&mut self, key: &str) {
        self.channels.shift_remove(key);
    }

    /// Step every channel; returns true while any channel is still moving
    ///
    /// The precision window is the channel's own - every key settles by the
    /// same rule, so a set is never "partially settled" yet reported
    /// finished. Fires `on_rest` on the moving -> settled edge.
    pub fn advance(&mut self, dt: f32) -> bool {
        let mut all_settled = true;
        for spring in self.channels.values_mut() {
            if !spring.step(dt) {
                all_settled = false;
            }
        }

        if all_settled {
            if !self.settled {
                self.settled = true;
                if let Some(callback) = self.on_rest.as_mut() {
                    callback(RestEvent { finished: true });
                }
            }
            false
        } else {
            self.settled = false;
            true
        }
    }

    /// Teleport every channel onto its target with zero velocity
    ///
    /// Reports `finished: false`: the set reached rest by force, not by
    /// settling.
    pub fn snap_all(&mut self) {
        for spring in self.channels.values_mut() {
            spring.set_immediate(spring.target());
        }
        if !self.settled {
            self.settled = true;
            if let Some(callback) = self.on_rest.as_mut() {
                callback(RestEvent { finished: false });
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<f32> {
        self.channels.get(key).map(|s| s.value())
    }

    pub fn velocity(&self, key: &str) -> Option<f32> {
        self.channels.get(key).map(|s| s.velocity())
    }

    pub fn target(&self, key: &str) -> Option<f32> {
        self.channels.get(key).map(|s| s.target())
    }

    /// Current values in registration order
    pub fn values(&self) -> impl Iterator<Item = (&str, f32)> {
        self.channels.iter().map(|(k, s)| (k.as_str(), s.value()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.channels.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// True only when every channel is at rest
    pub fn is_finished(&self) -> bool {
        self.all_settled()
    }

    fn all_settled(&self) -> bool {
        self.channels.values().all(|s| s.is_settled())
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_first_sight_starts_at_target() {
        let mut set = ChannelSet::new();
        set.set_targets([("opacity", 1.0f32), ("scale", 0.5)]);

        assert_eq!(set.get("opacity"), Some(1.0));
        assert_eq!(set.get("scale"), Some(0.5));
        assert!(set.is_finished());
        assert!(!set.advance(DT));
    }

    #[test]
    fn test_explicit_initial_animates() {
        let mut set = ChannelSet::new();
        set.set_target_from("x", 0.0, 100.0);

        assert_eq!(set.get("x"), Some(0.0));
        assert!(!set.is_finished());

        while set.advance(DT) {}
        assert_eq!(set.get("x"), Some(100.0));
    }

    #[test]
    fn test_removed_key_discarded_survivor_keeps_velocity() {
        let mut set = ChannelSet::new();
        set.set_target_from("a", 0.0, 50.0);
        set.set_target_from("b", 0.0, 10.0);
        for _ in 0..10 {
            set.advance(DT);
        }
        let b_velocity = set.velocity("b").unwrap();
        assert!(b_velocity > 0.0);

        // Drop `a`, retarget `b`: `b` keeps its in-flight velocity.
        set.set_targets([("b", 20.0f32)]);
        assert_eq!(set.get("a"), None);
        assert_eq!(set.velocity("b"), Some(b_velocity));

        while set.advance(DT) {}
        assert_eq!(set.get("b"), Some(20.0));
        assert_eq!(set.get("a"), None);
    }

    #[test]
    fn test_channel_independence() {
        let mut set = ChannelSet::new();
        set.set_target_from("a", 0.0, 100.0);
        set.set_target_from("b", 0.0, 100.0);
        for _ in 0..5 {
            set.advance(DT);
        }

        let b_position = set.get("b").unwrap();
        let b_velocity = set.velocity("b").unwrap();

        // Removing `a` must not perturb `b`.
        set.remove("a");
        assert_eq!(set.get("b"), Some(b_position));
        assert_eq!(set.velocity("b"), Some(b_velocity));

        // Adding `c` must not perturb `b` either.
        set.set_target("c", 5.0);
        assert_eq!(set.get("b"), Some(b_position));
        assert_eq!(set.velocity("b"), Some(b_velocity));
    }

    #[test]
    fn test_on_rest_fires_exactly_once_per_transition() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut set = ChannelSet::new();
        set.on_rest({
            let fired = Arc::clone(&fired);
            move |event| {
                assert!(event.finished);
                fired.fetch_add(1, Ordering::SeqCst);
            }
        });

        set.set_target_from("x", 0.0, 10.0);
        while set.advance(DT) {}
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Resting ticks must not refire.
        set.advance(DT);
        set.advance(DT);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // A new transition fires again.
        set.set_target("x", 30.0);
        while set.advance(DT) {}
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_snap_all_reports_unfinished() {
        let events = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut set = ChannelSet::new();
        set.on_rest({
            let events = Arc::clone(&events);
            move |event| events.lock().unwrap().push(event)
        });

        set.set_target_from("x", 0.0, 10.0);
        set.advance(DT);
        set.snap_all();

        assert_eq!(set.get("x"), Some(10.0));
        assert_eq!(set.velocity("x"), Some(0.0));
        assert_eq!(
            *events.lock().unwrap(),
            vec![RestEvent { finished: false }]
        );
    }

    #[test]
    fn test_config_cascade_applies() {
        let mut set = ChannelSet::new();
        set.set_ambient(Some(PartialSpringConfig::default().with_tension(999.0)));

        let override_config = PartialSpringConfig::default().with_friction(7.0);
        set.set_targets_with([("x", 1.0f32)], Some(&override_config));

        // Retarget mid-flight with a new override: state carries over, the
        // spring still converges under the replaced parameters.
        set.set_target_from("y", 0.0, 50.0);
        for _ in 0..3 {
            set.advance(DT);
        }
        let y_mid = set.get("y").unwrap();
        assert!(y_mid > 0.0 && y_mid < 50.0);

        while set.advance(DT) {}
        assert_eq!(set.get("y"), Some(50.0));
    }
}
