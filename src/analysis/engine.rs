use anyhow::Result;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use super::algorithms::{Algorithm, InputTooLarge};
use super::chart::{ChartError, ChartRenderer};
use super::identifier::analysis_id;
use super::runner::BenchmarkRunner;
use super::sampler::SamplePlan;
use super::AnalysisResult;
use crate::cache::AnalysisCache;
use crate::config::ServerConfig;
use crate::publish::GraphPublisher;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Parameters n and steps must be positive integers")]
    InvalidPlan,

    #[error(transparent)]
    InputTooLarge(#[from] InputTooLarge),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error("Benchmark worker failed: {0}")]
    Worker(String),
}

/// A validated `/analyze` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Requested name exactly as the caller spelled it.
    pub algo: String,
    pub n: usize,
    pub steps: usize,
}

impl AnalysisRequest {
    pub fn new(algo: impl Into<String>, n: usize, steps: usize) -> Self {
        Self {
            algo: algo.into(),
            n,
            steps,
        }
    }
}

/// Runs analyses and owns the stores they are cached in.
pub struct Analyzer {
    runner: BenchmarkRunner,
    renderer: ChartRenderer,
    publisher: GraphPublisher,
    cache: AnalysisCache,
}

impl Analyzer {
    pub fn new(
        renderer: ChartRenderer,
        publisher: GraphPublisher,
        cache: AnalysisCache,
    ) -> Self {
        Self {
            runner: BenchmarkRunner::new(),
            renderer,
            publisher,
            cache,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let renderer = ChartRenderer::new(&config.chart)?;
        let publisher = GraphPublisher::from_config(config);
        let cache = AnalysisCache::from_config(&config.cache);
        Ok(Self::new(renderer, publisher, cache))
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn publisher(&self) -> &GraphPublisher {
        &self.publisher
    }

    /// Benchmark, chart, publish and cache one request.
    ///
    /// Unknown algorithms and empty plans are rejected before anything is
    /// stored. The chart is cached in the same entry as the result, so the
    /// fallback path stays valid for as long as the result can be retrieved.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let algorithm = Algorithm::from_name(&request.algo)
            .ok_or_else(|| AnalysisError::UnknownAlgorithm(request.algo.clone()))?;
        let plan = SamplePlan::new(request.n, request.steps).ok_or(AnalysisError::InvalidPlan)?;

        info!(
            "Analyzing {} with n={} steps={} ({} samples)",
            algorithm,
            plan.n(),
            plan.steps(),
            plan.len()
        );

        let runner = self.runner;
        let renderer = self.renderer.clone();
        let title = request.algo.clone();
        let (run, png) = tokio::task::spawn_blocking(move || {
            let run = runner.run(algorithm, &plan)?;
            let png = renderer.render(&title, &run.samples)?;
            Ok::<_, AnalysisError>((run, png))
        })
        .await
        .map_err(|e| AnalysisError::Worker(e.to_string()))??;

        let id = analysis_id(&request.algo, request.n, request.steps, run.start_time_micros());
        debug!("Analysis {} sampled sizes {:?}", id, run.samples.sizes());

        let png = Bytes::from(png);
        let outcome = self.publisher.publish(&id, &png).await;

        let result = AnalysisResult {
            id,
            algo: request.algo,
            items: request.n,
            steps: request.steps,
            start_time: run.start_time_micros(),
            end_time: run.end_time_micros(),
            total_time_ms: run.total_time_ms(),
            time_complexity: algorithm.complexity().to_string(),
            path_to_graph: outcome.into_graph_reference(),
        };
        self.cache.insert(result.clone(), png);

        info!(
            "Analysis {} finished in {:.2} ms, graph at {}",
            result.id, result.total_time_ms, result.path_to_graph
        );
        Ok(result)
    }

    pub fn get_result(&self, id: &str) -> Option<AnalysisResult> {
        self.cache.get_result(id)
    }

    pub fn get_image(&self, id: &str) -> Option<Bytes> {
        self.cache.get_image(id)
    }
}
