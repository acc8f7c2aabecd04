use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glyphcast::camera::{OrbitAnchor, PerspectiveCamera};
use glyphcast::font::FontFace;
use glyphcast::geometry::{ExtrudedTextEngine, TextEngine};
use glyphcast::scene::{Material, TextMesh};
use glyphcast::viewfit::{fit_view, fitting_distance};
use glyphcast::{MaterialParams, TextParams, ViewerSession};
use std::sync::Arc;

const BENCH_FONT: &str = r#"{
    "familyName": "Bench",
    "resolution": 1000,
    "glyphs": {
        "a": { "ha": 600, "o": "m 0 0 l 500 0 l 500 700 l 0 700" },
        "o": { "ha": 600, "o": "m 250 0 q 500 350 500 0 q 250 700 500 700 q 0 350 0 700 q 250 0 0 0 m 250 150 l 150 350 l 250 550 l 350 350" },
        "?": { "ha": 500, "o": "m 100 0 l 400 0 l 400 300 l 100 300" },
        " ": { "ha": 300 }
    }
}"#;

fn bench_face() -> FontFace {
    FontFace::from_slice(BENCH_FONT.as_bytes()).unwrap()
}

fn extruded_mesh(face: &FontFace, content: &str) -> TextMesh {
    let params = TextParams {
        content: content.to_string(),
        ..TextParams::default()
    };
    let geometry = ExtrudedTextEngine::default().extrude(face, &params).unwrap();
    TextMesh::new(
        Arc::new(geometry),
        Material::from_params(&MaterialParams::default()),
    )
}

/// Benchmark: the bare framing formula
fn bench_fitting_distance(c: &mut Criterion) {
    c.bench_function("fitting_distance", |b| {
        b.iter(|| black_box(fitting_distance(black_box(2.4), black_box(45.0))))
    });
}

/// Benchmark: full view fit against an extruded mesh
fn bench_fit_view(c: &mut Criterion) {
    let face = bench_face();
    let mut mesh = extruded_mesh(&face, "ao ao");
    let mut camera = PerspectiveCamera::new();
    let mut orbit = OrbitAnchor::default();

    c.bench_function("fit_view", |b| {
        b.iter(|| {
            fit_view(&mut mesh, &mut camera, &mut orbit);
            black_box(camera.position)
        })
    });
}

/// Benchmark: extrusion cost against curve resolution
fn bench_extrude(c: &mut Criterion) {
    let face = bench_face();
    let mut group = c.benchmark_group("extrude");

    for segments in [4u32, 12, 24].iter() {
        let params = TextParams {
            content: "ao oa".to_string(),
            curve_segments: *segments,
            ..TextParams::default()
        };
        let engine = ExtrudedTextEngine::default();

        group.bench_with_input(
            BenchmarkId::new("curve_segments", segments),
            segments,
            |b, _| b.iter(|| black_box(engine.extrude(&face, &params).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark: GLB serialization of a committed session
fn bench_export(c: &mut Criterion) {
    let face = bench_face();
    let mut session = ViewerSession::new();
    let ticket = session.begin_regenerate(
        TextParams {
            content: "ao oa".to_string(),
            ..TextParams::default()
        },
        MaterialParams::default(),
    );
    let geometry = ExtrudedTextEngine::default()
        .extrude(&face, &ticket.text)
        .unwrap();
    session.commit_mesh(ticket, geometry);
    let options = glyphcast::export::ExportOptions::default();

    c.bench_function("encode_glb", |b| {
        b.iter(|| black_box(session.export_glb(&options).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_fitting_distance,
    bench_fit_view,
    bench_extrude,
    bench_export,
);

criterion_main!(benches);
