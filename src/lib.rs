pub mod analysis;
pub mod cache;
pub mod config;
pub mod publish;
pub mod server;
pub mod stability;
pub mod validation;

// Re-export commonly used types
pub use analysis::{Algorithm, AnalysisError, AnalysisRequest, AnalysisResult, Analyzer, ChartRenderer, SamplePlan};
pub use cache::AnalysisCache;
pub use config::ServerConfig;
pub use publish::{GraphPublisher, ImagePublisher, PublishError, PublishOutcome};
pub use server::{build_router, AnalyzerServer};
pub use stability::{CircuitBreaker, CircuitState};
pub use validation::{InputValidator, ValidationError};
