//! Chart hover flow, end to end
//!
//! Simulates what a chart widget does across frames: route pointer events,
//! advance the registry on the frame clock, and bracket each element's paint
//! with the draw hooks.

use vitro_charts::{
    ChartKind, EffectQuery, EffectSpec, ElementAnimationRegistry, ElementEffects, TransformSink,
};
use vitro_core::{PointerEvent, Rect, Vec2};

const DT: f32 = 1.0 / 60.0;

#[derive(Default)]
struct CountingSink {
    saves: usize,
    restores: usize,
    last_scale: Option<f32>,
}

impl TransformSink for CountingSink {
    fn save(&mut self) {
        self.saves += 1;
    }
    fn translate(&mut self, _dx: f32, _dy: f32) {}
    fn scale_around(&mut self, scale: f32, _anchor: Vec2) {
        self.last_scale = Some(scale);
    }
    fn multiply_opacity(&mut self, _opacity: f32) {}
    fn restore(&mut self) {
        self.restores += 1;
    }
}

fn bar_chart_registry() -> ElementAnimationRegistry {
    let mut registry = ElementAnimationRegistry::new();
    registry.set_effect_resolver(|query| {
        // Only the bar series gets hover feedback.
        (query.chart_kind == ChartKind::Bar).then(|| ElementEffects {
            hover: Some(EffectSpec::default().with_scale(1.12).with_tension(320.0)),
            click: Some(EffectSpec::default().with_scale(0.94)),
        })
    });
    for item in 0..4 {
        registry
            .register(
                item as u64,
                EffectQuery {
                    series_index: 0,
                    item_index: item,
                    chart_kind: ChartKind::Bar,
                },
            )
            .unwrap();
    }
    registry
}

#[test]
fn hover_animates_only_the_hit_element() {
    let mut registry = bar_chart_registry();
    let bounds = Rect::new(0.0, 0.0, 24.0, 80.0);

    registry.on_event(&PointerEvent::moved(Some(2), Vec2::new(12.0, 40.0)));

    // Run a few frames mid-animation and paint all four bars.
    let mut sink = CountingSink::default();
    for _ in 0..5 {
        registry.before_draw(DT);
    }
    for id in 0..4u64 {
        let pushed = registry.before_element_draw(id, bounds, &mut sink);
        // Only the hovered bar is away from rest.
        assert_eq!(pushed, id == 2);
        registry.after_element_draw(pushed, &mut sink);
    }
    assert_eq!(sink.saves, 1);
    assert_eq!(sink.restores, 1);
    let mid_scale = sink.last_scale.unwrap();
    assert!(mid_scale > 1.0 && mid_scale <= 1.12 + 0.05);

    // Settled: the hovered bar sits exactly on its hover scale.
    while registry.before_draw(DT) {}
    assert_eq!(registry.visual(2).unwrap().scale, 1.12);
}

#[test]
fn data_rebuild_sweeps_stale_elements() {
    let mut registry = bar_chart_registry();
    registry.on_event(&PointerEvent::moved(Some(3), Vec2::ZERO));

    // The chart rebuilt with only the first two bars surviving.
    registry.retain(|id| id < 2);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.hovered(), None);

    // Re-registering a swept id is not a duplicate.
    registry
        .register(
            3,
            EffectQuery {
                series_index: 0,
                item_index: 3,
                chart_kind: ChartKind::Bar,
            },
        )
        .unwrap();
    assert_eq!(registry.len(), 3);
}
