use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::algorithms::{Algorithm, InputTooLarge};
use super::sampler::SamplePlan;

/// One timed execution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub input_size: usize,
    pub elapsed_ms: f64,
}

/// Samples in increasing input-size order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleSeries(Vec<Sample>);

impl SampleSeries {
    pub fn push(&mut self, sample: Sample) {
        self.0.push(sample);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.0.iter().map(|s| s.input_size).collect()
    }

    pub fn max_elapsed_ms(&self) -> f64 {
        self.0.iter().map(|s| s.elapsed_ms).fold(0.0, f64::max)
    }
}

/// Outcome of running a sample plan.
///
/// `total_time_ms` spans the whole loop, including the overhead between
/// samples, so it is generally larger than the sum of the sample times.
#[derive(Debug, Clone)]
pub struct BenchmarkRun {
    pub algorithm: Algorithm,
    pub samples: SampleSeries,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BenchmarkRun {
    pub fn start_time_micros(&self) -> i64 {
        self.started_at.timestamp_micros()
    }

    pub fn end_time_micros(&self) -> i64 {
        self.finished_at.timestamp_micros()
    }

    /// Wall-clock duration of the sampling loop, rounded to 0.01 ms.
    pub fn total_time_ms(&self) -> f64 {
        let micros = (self.end_time_micros() - self.start_time_micros()).max(0);
        (micros as f64 / 10.0).round() / 100.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    pub fn new() -> Self {
        Self
    }

    /// Time `algorithm` once per planned size. Blocks for the whole run.
    ///
    /// Stops at the first size whose input cannot be allocated.
    pub fn run(&self, algorithm: Algorithm, plan: &SamplePlan) -> Result<BenchmarkRun, InputTooLarge> {
        let started_at = Utc::now();
        let mut samples = SampleSeries::default();

        for size in plan.sizes() {
            let elapsed = algorithm.time(size)?;
            let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
            debug!("{} n={} took {:.4} ms", algorithm, size, elapsed_ms);
            samples.push(Sample { input_size: size, elapsed_ms });
        }

        let finished_at = Utc::now();

        Ok(BenchmarkRun {
            algorithm,
            samples,
            started_at,
            finished_at,
        })
    }
}
