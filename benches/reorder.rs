//! Benchmarks for the board reorder functions.
//!
//! These benchmarks measure moves on boards of typical and large sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use syncho_tui::board::resolver::{move_column, move_task_across_columns};

fn ids(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}{}", prefix, i)).collect()
}

fn bench_move_column(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_column");
    for size in [8usize, 64, 512] {
        let order = ids("column-", size);
        let moved = order[size - 1].clone();
        group.bench_with_input(BenchmarkId::from_parameter(size), &order, |b, order| {
            b.iter(|| move_column(black_box(order), black_box(&moved), black_box(0)))
        });
    }
    group.finish();
}

fn bench_move_task_across_columns(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_task_across_columns");
    for size in [10usize, 100, 1000] {
        let source = ids("task-", size);
        let dest = ids("other-", size);
        let moved = source[size / 2].clone();
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(source, dest),
            |b, (source, dest)| {
                b.iter(|| {
                    move_task_across_columns(
                        black_box(source),
                        black_box(dest),
                        black_box(&moved),
                        black_box((size / 3) as i64),
                    )
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_move_column, bench_move_task_across_columns);
criterion_main!(benches);
