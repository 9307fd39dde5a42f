//! Per-element animation registry
//!
//! A side table of spring state for externally-owned render elements (chart
//! bars, scatter points, timeline segments). The registry never holds the
//! elements themselves - only their stable identities - and the elements
//! never reference the registry, so a consumer that rebuilds its data set
//! just removes or `retain`s the stale ids.
//!
//! Three hook points mirror the draw pipeline:
//!
//! - [`ElementAnimationRegistry::before_draw`] advances every element's
//!   springs on the shared frame clock;
//! - [`ElementAnimationRegistry::before_element_draw`] /
//!   [`ElementAnimationRegistry::after_element_draw`] bracket one element's
//!   paint, pushing translate, then scale anchored at the post-translation
//!   center, then an opacity multiply through the renderer's
//!   [`TransformSink`];
//! - [`ElementAnimationRegistry::on_event`] turns pointer traffic into
//!   hover/pulse targets.
//!
//! Effect resolution is lazy: the registered resolver runs only for the
//! element actually under the pointer, never across the data set per frame.
//! A missing or panicking resolver degrades to the rest state.

use rustc_hash::FxHashMap;
use std::panic::{self, AssertUnwindSafe};

use vitro_animation::{
    resolve_config, MotionPolicy, Spring, SpringConfig,
};
use vitro_core::{event_types, Error, PointerEvent, Rect, Vec2};

use crate::chart::{EffectQuery, EffectSpec, EffectTargets, ElementEffects, TransformSink};

/// Stable identity of a render element, assigned by the consumer
pub type ElementId = u64;

/// Visual quantities differ from rest by less than this: skip the push
const VISUAL_REST_EPSILON: f32 = 1e-3;

type EffectResolver = Box<dyn Fn(&EffectQuery) -> Option<ElementEffects> + Send>;

/// Entrance effect applied when elements register
///
/// `effect` describes the *starting* state (e.g. transparent and slightly
/// scaled down); every element springs from there to rest, delayed by
/// `stagger` seconds times its item index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntranceConfig {
    pub effect: EffectSpec,
    pub stagger: f32,
}

/// Current (or target) visual state of one element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementVisual {
    pub scale: f32,
    pub opacity: f32,
    pub offset: Vec2,
}

impl ElementVisual {
    pub const REST: ElementVisual = ElementVisual {
        scale: 1.0,
        opacity: 1.0,
        offset: Vec2::ZERO,
    };

    fn is_rest(&self) -> bool {
        (self.scale - 1.0).abs() < VISUAL_REST_EPSILON
            && (self.opacity - 1.0).abs() < VISUAL_REST_EPSILON
            && self.offset.x.abs() < VISUAL_REST_EPSILON
            && self.offset.y.abs() < VISUAL_REST_EPSILON
    }
}

struct ElementState {
    query: EffectQuery,
    scale: Spring,
    opacity: Spring,
    offset_x: Spring,
    offset_y: Spring,
    /// Hover spec cached at hover-enter so the pulse return path doesn't
    /// re-run the resolver
    hover_spec: Option<EffectSpec>,
    pulsing: bool,
    /// Remaining entrance stagger; springs hold still while positive
    entrance_delay: f32,
}

impl ElementState {
    fn at_rest_config(query: EffectQuery, config: SpringConfig) -> Self {
        Self {
            query,
            scale: Spring::new(config, 1.0),
            opacity: Spring::new(config, 1.0),
            offset_x: Spring::new(config, 0.0),
            offset_y: Spring::new(config, 0.0),
            hover_spec: None,
            pulsing: false,
            entrance_delay: 0.0,
        }
    }

    fn visual(&self) -> ElementVisual {
        ElementVisual {
            scale: self.scale.value(),
            opacity: self.opacity.value(),
            offset: Vec2::new(self.offset_x.value(), self.offset_y.value()),
        }
    }

    fn target_visual(&self) -> ElementVisual {
        ElementVisual {
            scale: self.scale.target(),
            opacity: self.opacity.target(),
            offset: Vec2::new(self.offset_x.target(), self.offset_y.target()),
        }
    }

    /// Retarget all four springs; returns true if any target changed
    fn retarget(&mut self, targets: EffectTargets, config: SpringConfig, snap: bool) -> bool {
        let mut changed = false;
        for (spring, target) in [
            (&mut self.scale, targets.scale),
            (&mut self.opacity, targets.opacity),
            (&mut self.offset_x, targets.offset.x),
            (&mut self.offset_y, targets.offset.y),
        ] {
            if spring.target() != target {
                changed = true;
                spring.set_config(config);
                if snap {
                    spring.set_immediate(target);
                } else {
                    spring.set_target(target);
                }
            }
        }
        changed
    }

    fn step(&mut self, dt: f32) -> bool {
        let mut active = false;
        for spring in [
            &mut self.scale,
            &mut self.opacity,
            &mut self.offset_x,
            &mut self.offset_y,
        ] {
            if !spring.step(dt) {
                active = true;
            }
        }
        active
    }

    fn is_settled(&self) -> bool {
        self.scale.is_settled()
            && self.opacity.is_settled()
            && self.offset_x.is_settled()
            && self.offset_y.is_settled()
    }
}

/// The identity-keyed side table of per-element animation state
pub struct ElementAnimationRegistry {
    elements: FxHashMap<ElementId, ElementState>,
    resolver: Option<EffectResolver>,
    /// At most one element holds hover targets at a time
    hovered: Option<ElementId>,
    base_config: SpringConfig,
    policy: MotionPolicy,
    entrance: Option<EntranceConfig>,
    /// Set by target changes in `on_event`/`register`; consumed by the host
    needs_redraw: bool,
}

impl ElementAnimationRegistry {
    pub fn new() -> Self {
        Self::with_config(SpringConfig::snappy())
    }

    pub fn with_config(base_config: SpringConfig) -> Self {
        Self {
            elements: FxHashMap::default(),
            resolver: None,
            hovered: None,
            base_config,
            policy: MotionPolicy::FULL,
            entrance: None,
            needs_redraw: false,
        }
    }

    /// Install the lazy per-data-point effect resolver
    pub fn set_effect_resolver<F>(&mut self, resolver: F)
    where
        F: Fn(&EffectQuery) -> Option<ElementEffects> + Send + 'static,
    {
        self.resolver = Some(Box::new(resolver));
    }

    /// Apply the accessibility/quality policy to everything this registry
    /// animates (hover, click, entrance are all decorative)
    pub fn set_motion_policy(&mut self, policy: MotionPolicy) {
        self.policy = policy;
    }

    /// Entrance effect for subsequently registered elements
    pub fn set_entrance(&mut self, entrance: Option<EntranceConfig>) {
        self.entrance = entrance;
    }

    /// Register an element at its rest state
    ///
    /// With an entrance configured, the element starts at the entrance
    /// visual and springs to rest after its stagger delay.
    pub fn register(&mut self, id: ElementId, query: EffectQuery) -> Result<(), Error> {
        if self.elements.contains_key(&id) {
            return Err(Error::DuplicateElement(id));
        }

        let config = self.policy.apply(self.base_config);
        let mut state = ElementState::at_rest_config(query, config);

        if let Some(entrance) = self.entrance {
            if !self.policy.disable_animation {
                let start = entrance.effect.targets();
                state.scale.set_immediate(start.scale);
                state.opacity.set_immediate(start.opacity);
                state.offset_x.set_immediate(start.offset.x);
                state.offset_y.set_immediate(start.offset.y);
                state.retarget(EffectTargets::REST, config, false);
                state.entrance_delay = entrance.stagger * query.item_index as f32;
                self.needs_redraw = true;
            }
        }

        self.elements.insert(id, state);
        Ok(())
    }

    /// Remove an element's entry; call when the render element is discarded
    pub fn remove(&mut self, id: ElementId) {
        self.elements.remove(&id);
        if self.hovered == Some(id) {
            self.hovered = None;
        }
    }

    /// Bulk sweep after a data rebuild: keep only ids the predicate accepts
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(ElementId) -> bool,
    {
        self.elements.retain(|id, _| keep(*id));
        if let Some(hovered) = self.hovered {
            if !self.elements.contains_key(&hovered) {
                self.hovered = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.hovered = None;
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    pub fn visual(&self, id: ElementId) -> Option<ElementVisual> {
        self.elements.get(&id).map(|s| s.visual())
    }

    pub fn target_visual(&self, id: ElementId) -> Option<ElementVisual> {
        self.elements.get(&id).map(|s| s.target_visual())
    }

    pub fn is_animating(&self, id: ElementId) -> bool {
        self.elements
            .get(&id)
            .map(|s| !s.is_settled() || s.entrance_delay > 0.0)
            .unwrap_or(false)
    }

    /// Host-side dirty flag: true when an event changed some target since
    /// the last call. Ongoing animation is reported by `before_draw`.
    pub fn take_needs_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Route a pointer event into hover/pulse targets
    ///
    /// Target changes are debounced by identity: an event that produces the
    /// targets an element already has mutates nothing and requests no
    /// redraw. Hover hand-off retires the old element's targets in the same
    /// event that sets the new element's, so no frame ever sees two
    /// elements mid-hover.
    pub fn on_event(&mut self, event: &PointerEvent) {
        match event.event_type {
            event_types::POINTER_MOVE | event_types::POINTER_ENTER => {
                self.hover_to(event.element);
            }
            event_types::POINTER_LEAVE => {
                self.hover_to(None);
            }
            event_types::CLICK => {
                if let Some(id) = event.element {
                    self.pulse(id);
                }
            }
            _ => {}
        }
    }

    fn hover_to(&mut self, element: Option<ElementId>) {
        // Unregistered elements behave like background.
        let element = element.filter(|id| self.elements.contains_key(id));
        if element == self.hovered {
            return;
        }

        let snap = self.policy.disable_animation;
        let config = self.policy.apply(self.base_config);

        if let Some(old) = self.hovered.take() {
            if let Some(state) = self.elements.get_mut(&old) {
                state.hover_spec = None;
                state.pulsing = false;
                if state.retarget(EffectTargets::REST, config, snap) {
                    self.needs_redraw = true;
                }
            }
        }

        if let Some(id) = element {
            let effects = self.resolve_effects(id);
            if let Some(state) = self.elements.get_mut(&id) {
                state.hover_spec = effects.hover;
                if let Some(spec) = effects.hover {
                    let spec_config =
                        resolve_config(config, &[Some(&spec.spring_overrides())]);
                    if state.retarget(spec.targets(), spec_config, snap) {
                        self.needs_redraw = true;
                    }
                }
            }
        }

        self.hovered = element;
    }

    fn pulse(&mut self, id: ElementId) {
        if !self.elements.contains_key(&id) {
            return;
        }
        let effects = self.resolve_effects(id);
        let Some(spec) = effects.click else {
            return;
        };

        let snap = self.policy.disable_animation;
        let config = self.policy.apply(self.base_config);
        let spec_config = resolve_config(config, &[Some(&spec.spring_overrides())]);

        if let Some(state) = self.elements.get_mut(&id) {
            if state.retarget(spec.targets(), spec_config, snap) {
                self.needs_redraw = true;
            }
            // Snapped pulses spring straight back; there is no motion to
            // wait out.
            state.pulsing = true;
            if snap {
                self.release_pulse(id);
            }
        }
    }

    /// Send a completed pulse back to its hover targets or rest
    fn release_pulse(&mut self, id: ElementId) {
        let snap = self.policy.disable_animation;
        let config = self.policy.apply(self.base_config);
        let hovered = self.hovered == Some(id);

        if let Some(state) = self.elements.get_mut(&id) {
            state.pulsing = false;
            let (targets, config) = match state.hover_spec {
                Some(spec) if hovered => (
                    spec.targets(),
                    resolve_config(config, &[Some(&spec.spring_overrides())]),
                ),
                _ => (EffectTargets::REST, config),
            };
            if state.retarget(targets, config, snap) {
                self.needs_redraw = true;
            }
        }
    }

    fn resolve_effects(&self, id: ElementId) -> ElementEffects {
        let Some(state) = self.elements.get(&id) else {
            return ElementEffects::default();
        };
        let Some(resolver) = self.resolver.as_ref() else {
            return ElementEffects::default();
        };
        let query = state.query;
        match panic::catch_unwind(AssertUnwindSafe(|| resolver(&query))) {
            Ok(effects) => effects.unwrap_or_default(),
            Err(_) => {
                tracing::warn!(
                    element = id,
                    "effect resolver panicked; treating as no effect"
                );
                ElementEffects::default()
            }
        }
    }

    /// Advance every element's springs; call once per frame before painting
    ///
    /// Returns true while anything is still animating (the host should keep
    /// scheduling frames).
    pub fn before_draw(&mut self, dt: f32) -> bool {
        let mut any_active = false;
        let mut completed_pulses: Vec<ElementId> = Vec::new();

        for (id, state) in self.elements.iter_mut() {
            if state.entrance_delay > 0.0 {
                state.entrance_delay -= dt;
                any_active = true;
                continue;
            }

            let active = state.step(dt);
            if active {
                any_active = true;
            } else if state.pulsing {
                completed_pulses.push(*id);
            }
        }

        for id in completed_pulses {
            self.release_pulse(id);
            any_active = true;
        }

        any_active
    }

    /// Push this element's transform if it is visually away from rest
    ///
    /// Order is fixed: translate, then scale anchored at the
    /// post-translation center of `bounds`, then opacity. Returns whether a
    /// state was pushed; pass the result to `after_element_draw`.
    pub fn before_element_draw(
        &self,
        id: ElementId,
        bounds: Rect,
        sink: &mut dyn TransformSink,
    ) -> bool {
        let Some(state) = self.elements.get(&id) else {
            return false;
        };
        let visual = state.visual();
        if visual.is_rest() {
            return false;
        }

        sink.save();
        sink.translate(visual.offset.x, visual.offset.y);
        // Scale about the element's center after translation; anchoring at
        // the pre-translation center makes the element drift while scaling.
        let anchor = bounds.center() + visual.offset;
        sink.scale_around(visual.scale, anchor);
        sink.multiply_opacity(visual.opacity);
        true
    }

    /// Restore the sink if `before_element_draw` pushed
    pub fn after_element_draw(&self, pushed: bool, sink: &mut dyn TransformSink) {
        if pushed {
            sink.restore();
        }
    }
}

impl Default for ElementAnimationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
