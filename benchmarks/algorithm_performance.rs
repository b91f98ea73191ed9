use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::num::NonZeroUsize;
use std::time::Instant;
use tokio::runtime::Runtime;

use complexity_analyzer::analysis::{BenchmarkRunner, SamplePlan};
use complexity_analyzer::config::ChartConfig;
use complexity_analyzer::{
    Algorithm, AnalysisCache, AnalysisRequest, Analyzer, ChartRenderer, GraphPublisher,
};

/// Benchmark a single execution of each registered algorithm
fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("algorithms");
    group.significance_level(0.1).sample_size(20);

    for size in [16usize, 256, 4_096] {
        for algorithm in [
            Algorithm::BubbleSort,
            Algorithm::LinearSearch,
            Algorithm::BinarySearch,
        ] {
            // bubble sort at 4096 dominates the run without telling us anything new
            if algorithm == Algorithm::BubbleSort && size > 256 {
                continue;
            }
            group.bench_with_input(BenchmarkId::new(algorithm.name(), size), &size, |b, &size| {
                b.iter(|| black_box(algorithm.time(size)));
            });
        }
    }

    for depth in [8usize, 12, 16] {
        group.bench_with_input(
            BenchmarkId::new("nested/exponential", depth),
            &depth,
            |b, &depth| {
                b.iter(|| black_box(Algorithm::NestedExponential.time(depth)));
            },
        );
    }

    group.finish();
}

/// Benchmark the sampling loop across plan shapes
fn bench_sampling_loop(c: &mut Criterion) {
    let runner = BenchmarkRunner::new();
    let mut group = c.benchmark_group("sampling_loop");
    group.sample_size(10);

    for (n, steps) in [(1_000usize, 10usize), (1_000, 100), (10_000, 50)] {
        let Some(plan) = SamplePlan::new(n, steps) else {
            continue;
        };
        group.bench_with_input(
            BenchmarkId::new("linear", format!("{}x{}", n, steps)),
            &plan,
            |b, plan| {
                b.iter(|| black_box(runner.run(Algorithm::LinearSearch, plan)));
            },
        );
    }

    group.finish();
}

/// Benchmark chart rendering for series of growing length
fn bench_chart_rendering(c: &mut Criterion) {
    let renderer = ChartRenderer::new(&ChartConfig::default()).unwrap();
    let runner = BenchmarkRunner::new();
    let mut group = c.benchmark_group("chart_rendering");
    group.sample_size(10);

    for steps in [10usize, 100, 500] {
        let plan = SamplePlan::new(steps * 10, steps).unwrap();
        let run = runner.run(Algorithm::BinarySearch, &plan).unwrap();
        group.bench_with_input(BenchmarkId::new("points", steps), &run, |b, run| {
            b.iter(|| black_box(renderer.render("binary", &run.samples).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark the complete analyze pipeline with local chart storage
fn bench_full_analysis(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let analyzer = Analyzer::new(
        ChartRenderer::new(&ChartConfig::default()).unwrap(),
        GraphPublisher::local_only(None),
        AnalysisCache::new(NonZeroUsize::new(64).unwrap(), None),
    );

    let mut group = c.benchmark_group("full_analysis");
    group.sample_size(10);

    for algo in ["bubble", "linear", "binary"] {
        group.bench_function(algo, |b| {
            b.iter(|| {
                let start = Instant::now();
                let result = rt
                    .block_on(analyzer.analyze(AnalysisRequest::new(algo, 200, 20)))
                    .unwrap();
                black_box((result, start.elapsed()))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_algorithms,
    bench_sampling_loop,
    bench_chart_rendering,
    bench_full_analysis
);

criterion_main!(benches);
