pub mod store;

pub use store::{AnalysisCache, CacheStats};
