//! Criterion benchmarks for frame decoration and correlation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use stoc_core::domain::{Bar, PriceFrame};
use stoc_core::metrics::{correlation_matrix, decorate, rolling_std, MetricsConfig};

fn make_bars(n: usize) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                adj_close: close * 0.99,
                volume: 1_000_000 + (i as u64 % 500_000),
            }
        })
        .collect()
}

fn bench_decorate(c: &mut Criterion) {
    let mut group = c.benchmark_group("decorate");
    let extended = MetricsConfig {
        extended: true,
        ..MetricsConfig::default()
    };

    for &bar_count in &[252, 1260, 2520] {
        let frame = PriceFrame::new("BENCH", make_bars(bar_count));
        group.bench_with_input(BenchmarkId::new("standard", bar_count), &frame, |b, f| {
            b.iter(|| {
                let mut f = f.clone();
                decorate(&mut f, &MetricsConfig::default());
                black_box(f)
            })
        });
        group.bench_with_input(BenchmarkId::new("extended", bar_count), &frame, |b, f| {
            b.iter(|| {
                let mut f = f.clone();
                decorate(&mut f, &extended);
                black_box(f)
            })
        });
    }
    group.finish();
}

fn bench_kernels(c: &mut Criterion) {
    let closes: Vec<f64> = make_bars(2520).iter().map(|b| b.close).collect();
    c.bench_function("rolling_std_252_over_2520", |b| {
        b.iter(|| rolling_std(black_box(&closes), 252))
    });

    let mut frame = PriceFrame::new("BENCH", make_bars(1260));
    decorate(
        &mut frame,
        &MetricsConfig {
            extended: true,
            ..MetricsConfig::default()
        },
    );
    c.bench_function("correlation_matrix_21_cols", |b| {
        b.iter(|| correlation_matrix(black_box(&frame)))
    });
}

criterion_group!(benches, bench_decorate, bench_kernels);
criterion_main!(benches);
