use std::hint::black_box;
use std::time::Instant;

use sketch_common::EulerRotation;
use sketch_scene::{Mesh, PlaneGeometry, Scene, ShaderMaterial};

fn bench_build(segments: u32, iterations: usize) {
    let geometry = PlaneGeometry::new(300.0, 200.0, segments, segments);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(black_box(&geometry).build());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  build ({segments}x{segments} segments, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_model_matrix(iterations: usize) {
    let mut scene = Scene::new();
    let id = scene.add(Mesh::new(
        PlaneGeometry::new(300.0, 200.0, 10, 10),
        ShaderMaterial::new("", ""),
    ));

    let start = Instant::now();
    for frame in 0..iterations as u64 {
        let rotation = EulerRotation {
            x: frame as f64 / 2000.0,
            y: frame as f64 / 1000.0,
            z: 0.0,
        };
        scene.set_rotation(id, rotation);
        let _ = black_box(scene.get(id).map(|m| m.transform.matrix()));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  rotate + model matrix ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("=== Plane Geometry Benchmarks ===\n");

    println!("Geometry build:");
    bench_build(10, 10000);
    bench_build(100, 100);
    bench_build(500, 10);

    println!("\nPer-frame transform:");
    bench_model_matrix(100_000);

    println!("\n=== Done ===");
}
