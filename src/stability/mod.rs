pub mod circuit_breaker;

pub use circuit_breaker::{
    BreakerError,
    CircuitBreaker,
    CircuitBreakerConfig,
    CircuitState,
};
