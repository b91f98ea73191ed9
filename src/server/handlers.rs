use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::debug;

use super::errors::ApiError;
use super::AppState;
use crate::analysis::identifier::is_well_formed;
use crate::analysis::{Algorithm, AnalysisResult};
use crate::validation::{InputValidator, QueryParams};

pub async fn analyze(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let request = InputValidator::analysis_request(&params)?;
    let result = state.analyzer.analyze(request).await?;
    Ok(Json(result))
}

pub async fn retrieve_analysis(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let id = InputValidator::require_string(&params, "analysis_id")?;

    state
        .analyzer
        .get_result(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Analysis not found: {}", id)))
}

pub async fn download_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Response, ApiError> {
    let not_found = || ApiError::NotFound(format!("Image not found: {}", image_id));

    if !is_well_formed(&image_id) {
        debug!("Rejecting malformed image id {:?}", image_id);
        return Err(not_found());
    }

    let png = state.analyzer.get_image(&image_id).ok_or_else(not_found)?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}.png\"", image_id))
            .map_err(|e| ApiError::Internal(e.to_string()))?,
    );

    Ok((headers, Body::from(png)).into_response())
}

pub async fn list_algorithms() -> Json<Value> {
    let algorithms: Vec<Value> = Algorithm::all()
        .iter()
        .map(|algo| json!({ "name": algo.name(), "complexity": algo.complexity() }))
        .collect();
    Json(Value::Array(algorithms))
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let cache = state.analyzer.cache();

    Json(json!({
        "status": "ok",
        "server": "complexity-analyzer",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "cache": {
            "entries": cache.len(),
            "capacity": cache.capacity(),
            "stats": cache.stats(),
        },
        "publisher": state.analyzer.publisher().status(),
    }))
}
