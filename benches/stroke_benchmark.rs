//! Stroke pipeline benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use inkforge::brushes::{
    AirbrushConfig, BrushSpec, InkPenConfig, ScatterConfig, WatercolorConfig,
};
use inkforge::{create_session, BrushParams, GestureEvent, Raster, TextureStore};

fn generate_stroke(count: usize) -> Vec<GestureEvent> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            GestureEvent::new(
                t * 1000.0,
                (t * std::f32::consts::PI * 4.0).sin() * 100.0 + 500.0,
                0.3 + t * 0.4,
                (i * 8) as u64,
            )
        })
        .collect()
}

fn run_stroke(spec: &BrushSpec, store: &TextureStore, events: &[GestureEvent]) {
    let params = BrushParams {
        size: 24.0,
        seed_nonce: 7,
        ..Default::default()
    };
    let mut raster = Raster::new(1024, 1024);
    let mut session = create_session(spec, params, Some(store), None).expect("construction");

    let (first, rest) = events.split_first().expect("non-empty stroke");
    session.start(&mut raster, first);
    for event in &rest[..rest.len() - 1] {
        session.update(&mut raster, event);
    }
    session.finish(&mut raster, rest.last().expect("final event"));
}

fn texture_store() -> TextureStore {
    let store = TextureStore::new();
    store.insert("dab", inkforge::texgen::soft_circle(64, 0.8).expect("texture"));
    store.insert("star", inkforge::texgen::star(64, 5).expect("texture"));
    store
}

fn benchmark_event_rate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Event Rate");
    let store = texture_store();
    let spec = BrushSpec::InkPen(InkPenConfig::default());

    for count in [10, 50, 100, 500, 1000].iter() {
        let events = generate_stroke(*count);
        group.bench_with_input(BenchmarkId::new("ink_pen", count), &events, |b, events| {
            b.iter(|| run_stroke(&spec, &store, events))
        });
    }

    group.finish();
}

fn benchmark_brush_families(c: &mut Criterion) {
    let mut group = c.benchmark_group("Brush Families");
    let store = texture_store();
    let events = generate_stroke(200);

    let specs = [
        ("ink_pen", BrushSpec::InkPen(InkPenConfig::default())),
        ("airbrush", BrushSpec::Airbrush(AirbrushConfig::default())),
        (
            "scatter",
            BrushSpec::Scatter {
                config: ScatterConfig::default(),
                textures: vec!["dab".to_string(), "star".to_string()],
            },
        ),
        (
            "watercolor",
            BrushSpec::Watercolor(WatercolorConfig::default()),
        ),
    ];
    for (name, spec) in &specs {
        group.bench_function(*name, |b| b.iter(|| run_stroke(spec, &store, &events)));
    }

    group.finish();
}

fn benchmark_spacing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Spacing Impact");
    let store = texture_store();
    let events = generate_stroke(200);

    for spacing in [0.1f32, 0.25, 0.5] {
        let spec = BrushSpec::InkPen(InkPenConfig {
            spacing,
            ..Default::default()
        });
        group.bench_with_input(
            BenchmarkId::new("ink_pen", format!("{spacing}")),
            &events,
            |b, events| b.iter(|| run_stroke(&spec, &store, events)),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_event_rate,
    benchmark_brush_families,
    benchmark_spacing
);
criterion_main!(benches);
