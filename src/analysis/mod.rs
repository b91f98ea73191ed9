//! Empirical running-time analysis of the reference algorithms.
//!
//! A request flows sampler -> runner -> classifier -> chart -> publisher ->
//! cache, all driven by [`Analyzer::analyze`].

pub mod algorithms;
pub mod chart;
pub mod complexity;
pub mod engine;
pub mod identifier;
pub mod runner;
pub mod sampler;

pub use algorithms::{Algorithm, InputTooLarge};
pub use chart::{ChartError, ChartRenderer};
pub use engine::{AnalysisError, AnalysisRequest, Analyzer};
pub use runner::{BenchmarkRun, BenchmarkRunner, Sample, SampleSeries};
pub use sampler::SamplePlan;

use serde::{Deserialize, Serialize};

/// What `/analyze` returns and `/retrieve_analysis` replays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: String,
    /// Algorithm name as requested, original casing kept.
    pub algo: String,
    pub items: usize,
    pub steps: usize,
    /// Wall-clock start of the sampling loop, microseconds since the epoch.
    pub start_time: i64,
    pub end_time: i64,
    pub total_time_ms: f64,
    pub time_complexity: String,
    /// External URL of the chart, or the local download path.
    pub path_to_graph: String,
}
