//! Table building and resolution benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fs;
use tempfile::TempDir;
use tokendoc::*;

/// A palette block plus a block of `count` references into it
fn generate_stylesheet(count: usize) -> String {
    let mut content = String::from("/* @start colorPalette */\n:root {\n");
    for i in 0..count {
        content.push_str(&format!("  --color-{}: #{:06x};\n", i, i * 37 % 0xffffff));
    }
    content.push_str("}\n/* @end */\n\n/* @start aliases */\n:root {\n");
    for i in 0..count {
        content.push_str(&format!("  --alias-{}: var(--color-{});\n", i, i));
    }
    content.push_str("}\n/* @end */\n");
    content
}

fn bench_extract_blocks(c: &mut Criterion) {
    let source = generate_stylesheet(1000);

    c.bench_function("extract_blocks_1000", |b| {
        b.iter(|| extract_blocks(black_box(&source), "bench.css").unwrap())
    });
}

fn bench_resolution_modes(c: &mut Criterion) {
    let source = generate_stylesheet(1000);
    let table = build_table_from_source(&source, "bench.css", PropertyTable::new()).unwrap();

    let mut group = c.benchmark_group("resolution_modes");

    for mode in [ResolutionMode::SinglePass, ResolutionMode::FixedPoint] {
        group.bench_with_input(format!("{:?}", mode), &mode, |b, &mode| {
            b.iter(|| {
                let mut copy = table.clone();
                VariableResolver::new(mode)
                    .resolve(black_box(&mut copy), "bench.css")
                    .unwrap();
                copy
            })
        });
    }

    group.finish();
}

fn bench_theme_set(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let defaults = temp_dir.path().join("_variables.css");
    let dark = temp_dir.path().join("_theme-dark.css");

    fs::write(&defaults, generate_stylesheet(500)).unwrap();

    let mut overlay = String::from("/* @start themeDark */\n:root {\n");
    for i in (0..500).step_by(5) {
        overlay.push_str(&format!("  --alias-{}: var(--color-{});\n", i, 499 - i));
    }
    overlay.push_str("}\n/* @end */\n");
    fs::write(&dark, overlay).unwrap();

    let themes = vec![ThemeSource::new("themeDark", dark)];

    c.bench_function("theme_set_500", |b| {
        b.iter(|| {
            build_theme_set(
                black_box(&defaults),
                black_box(&themes),
                ResolutionMode::SinglePass,
            )
            .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_extract_blocks,
    bench_resolution_modes,
    bench_theme_set
);
criterion_main!(benches);
