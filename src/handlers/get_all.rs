//! GetAll handler — full-scan retrieval through the engine.

use axum::{extract::State, response::Json};
use std::time::Instant;
use tracing::{error, info};

use super::state::AppState;
use super::types::{GetAllRequest, ResultsResponse};
use super::validate_scope_ids;
use crate::errors::AppError;
use crate::metrics;
use crate::scope::Scope;

pub async fn get_all_memories(
    State(state): State<AppState>,
    Json(req): Json<GetAllRequest>,
) -> Result<Json<ResultsResponse>, AppError> {
    // An empty scope is valid here: the engine applies its own default.
    let scope = Scope::compose(req.agent_id, req.user_id, req.run_id);
    validate_scope_ids(&scope)?;

    info!(
        endpoint = "/get_all",
        agent_id = scope.agent_id.as_deref(),
        user_id = scope.user_id.as_deref(),
        run_id = scope.run_id.as_deref(),
        "Incoming POST request to /get_all"
    );

    let start = Instant::now();
    let result = state.engine().get_all(&scope).await;
    let execution_time = start.elapsed().as_secs_f64();
    metrics::ENGINE_CALL_DURATION
        .with_label_values(&["get_all"])
        .observe(execution_time);

    match result {
        Ok(results) => {
            metrics::ENGINE_CALLS_TOTAL
                .with_label_values(&["get_all", "success"])
                .inc();
            metrics::ENGINE_RESULTS
                .with_label_values(&["get_all"])
                .observe(results.len() as f64);
            info!(
                execution_time_seconds = execution_time,
                memories_count = results.len(),
                "Response from /get_all"
            );
            Ok(Json(ResultsResponse {
                status: "success",
                results,
            }))
        }
        Err(e) => {
            metrics::ENGINE_CALLS_TOTAL
                .with_label_values(&["get_all", "error"])
                .inc();
            metrics::ERRORS_TOTAL
                .with_label_values(&["engine", "/get_all"])
                .inc();
            error!(error = %e, "Error getting all memories");
            Err(AppError::Engine(e))
        }
    }
}
