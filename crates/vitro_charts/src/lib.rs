//! Vitro chart animation surface
//!
//! The consumer side of the animation core: a per-element spring registry
//! for chart render elements (bars, points, segments), driven once per frame
//! and consulted from the draw loop.
//!
//! # Wiring
//!
//! ```ignore
//! use vitro_charts::{ChartKind, EffectQuery, EffectSpec, ElementAnimationRegistry, ElementEffects};
//! use vitro_core::PointerEvent;
//!
//! let mut registry = ElementAnimationRegistry::new();
//! registry.set_effect_resolver(|query| {
//!     Some(ElementEffects {
//!         hover: Some(EffectSpec::default().with_scale(1.08)),
//!         click: Some(EffectSpec::default().with_scale(0.96)),
//!     })
//! });
//!
//! // Per frame:
//! registry.before_draw(dt);
//! for element in &chart_elements {
//!     let pushed = registry.before_element_draw(element.id, element.bounds, &mut sink);
//!     element.paint(&mut sink);
//!     registry.after_element_draw(pushed, &mut sink);
//! }
//!
//! // On input:
//! registry.on_event(&PointerEvent::moved(hit_test(cursor), cursor));
//! ```

pub mod chart;
pub mod element_anim;

pub use chart::{ChartKind, EffectQuery, EffectSpec, ElementEffects, TransformSink};
pub use element_anim::{
    ElementAnimationRegistry, ElementId, ElementVisual, EntranceConfig,
};
