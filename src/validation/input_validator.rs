use std::collections::HashMap;

use crate::analysis::AnalysisRequest;

/// Query-string parameters of a request.
pub type QueryParams = HashMap<String, String>;

/// Input validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required parameter: {field}")]
    MissingParameter { field: String },

    #[error("Parameters n and steps must be positive integers")]
    NonPositive,
}

/// Input validator for HTTP query parameters
pub struct InputValidator;

impl InputValidator {
    /// Validate and extract a required, non-empty string parameter
    pub fn require_string(params: &QueryParams, field: &str) -> Result<String, ValidationError> {
        params
            .get(field)
            .filter(|value| !value.is_empty())
            .cloned()
            .ok_or_else(|| ValidationError::MissingParameter {
                field: field.to_string(),
            })
    }

    /// Validate and extract a required integer parameter.
    ///
    /// A value that is not an integer is reported as missing.
    pub fn require_int(params: &QueryParams, field: &str) -> Result<i64, ValidationError> {
        params
            .get(field)
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or_else(|| ValidationError::MissingParameter {
                field: field.to_string(),
            })
    }

    /// Build an analysis request from `algo`, `n` and `steps`.
    ///
    /// Parameters are checked in that order, presence before sign.
    pub fn analysis_request(params: &QueryParams) -> Result<AnalysisRequest, ValidationError> {
        let algo = Self::require_string(params, "algo")?;
        let n = Self::require_int(params, "n")?;
        let steps = Self::require_int(params, "steps")?;

        let positive = |value: i64| {
            usize::try_from(value)
                .ok()
                .filter(|v| *v > 0)
                .ok_or(ValidationError::NonPositive)
        };

        Ok(AnalysisRequest::new(algo, positive(n)?, positive(steps)?))
    }
}
