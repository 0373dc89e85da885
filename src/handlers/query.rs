//! Query handler — similarity search through the engine.

use axum::{extract::State, response::Json};
use std::time::Instant;
use tracing::{error, info};

use super::state::AppState;
use super::types::{QueryRequest, ResultsResponse};
use super::validate_scope_ids;
use crate::errors::{AppError, ValidationErrorExt};
use crate::metrics;
use crate::scope::Scope;
use crate::validation;

pub async fn query_memory(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<ResultsResponse>, AppError> {
    validation::validate_query(&req.query).map_validation_err("query")?;

    let scope = Scope::compose(req.agent_id, req.user_id, req.run_id);
    validate_scope_ids(&scope)?;

    info!(
        endpoint = "/query",
        query = %req.query,
        agent_id = scope.agent_id.as_deref(),
        user_id = scope.user_id.as_deref(),
        run_id = scope.run_id.as_deref(),
        limit = req.limit,
        "Incoming POST request to /query"
    );

    let start = Instant::now();
    let result = state.engine().search(&req.query, &scope, req.limit).await;
    let execution_time = start.elapsed().as_secs_f64();
    metrics::ENGINE_CALL_DURATION
        .with_label_values(&["search"])
        .observe(execution_time);

    match result {
        Ok(results) => {
            metrics::ENGINE_CALLS_TOTAL
                .with_label_values(&["search", "success"])
                .inc();
            metrics::ENGINE_RESULTS
                .with_label_values(&["search"])
                .observe(results.len() as f64);
            info!(
                execution_time_seconds = execution_time,
                results_count = results.len(),
                results = %serde_json::Value::Array(results.clone()),
                "Response from /query"
            );
            Ok(Json(ResultsResponse {
                status: "success",
                results,
            }))
        }
        Err(e) => {
            metrics::ENGINE_CALLS_TOTAL
                .with_label_values(&["search", "error"])
                .inc();
            metrics::ERRORS_TOTAL
                .with_label_values(&["engine", "/query"])
                .inc();
            error!(error = %e, "Error querying memory");
            Err(AppError::Engine(e))
        }
    }
}
