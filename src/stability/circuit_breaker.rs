use serde::Serialize;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failing, reject calls
    HalfOpen, // Letting a trial call through
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub recovery_timeout: Duration,
    pub timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(60),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Error)]
pub enum BreakerError<E> {
    #[error("circuit '{0}' is open")]
    Open(String),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Inner(E),
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
}

/// Stops calling a failing dependency for `recovery_timeout` after
/// `failure_threshold` consecutive failures. One successful trial call in
/// the half-open state closes the circuit again.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                opened_at: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `operation` under the breaker with the configured timeout.
    pub async fn call<F, T, E>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        if !self.can_execute() {
            return Err(BreakerError::Open(self.name.clone()));
        }

        let start = Instant::now();
        match tokio::time::timeout(self.config.timeout, operation).await {
            Ok(Ok(value)) => {
                self.on_success();
                debug!("Circuit '{}' call succeeded in {:?}", self.name, start.elapsed());
                Ok(value)
            }
            Ok(Err(e)) => {
                self.on_failure();
                Err(BreakerError::Inner(e))
            }
            Err(_) => {
                self.on_failure();
                Err(BreakerError::Timeout(self.config.timeout))
            }
        }
    }

    /// Whether a call would be let through right now.
    pub fn can_execute(&self) -> bool {
        let mut inner = self.lock();
        if inner.state != CircuitState::Open {
            return true;
        }

        let recovered = inner
            .opened_at
            .is_some_and(|opened| opened.elapsed() >= self.config.recovery_timeout);
        if recovered {
            inner.state = CircuitState::HalfOpen;
            debug!("Circuit '{}' transitioned to HALF-OPEN", self.name);
        }
        recovered
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.opened_at = None;
        debug!("Circuit '{}' has been reset", self.name);
    }

    fn on_success(&self) {
        let mut inner = self.lock();
        if inner.state == CircuitState::HalfOpen {
            debug!("Circuit '{}' transitioned to CLOSED", self.name);
        }
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.opened_at = None;
    }

    fn on_failure(&self) {
        let mut inner = self.lock();
        inner.failure_count += 1;

        let trip = match inner.state {
            CircuitState::HalfOpen => true,
            CircuitState::Closed => inner.failure_count >= self.config.failure_threshold,
            CircuitState::Open => false,
        };

        if trip {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            warn!(
                "Circuit '{}' transitioned to OPEN after {} failures",
                self.name, inner.failure_count
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
