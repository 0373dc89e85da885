//! Admin handlers — destructive maintenance operations.
//!
//! These wrap the engine's reset and delete_all operations; they are
//! protected routes and share the gateway's error translation.

use axum::{extract::State, response::Json};
use std::time::Instant;
use tracing::{error, info, warn};

use super::state::AppState;
use super::types::{DeleteAllRequest, StatusResponse};
use crate::errors::{AppError, ValidationErrorExt};
use crate::metrics;
use crate::validation;

pub async fn delete_all_memories(
    State(state): State<AppState>,
    Json(req): Json<DeleteAllRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    if let Some(user_id) = &req.user_id {
        validation::validate_identifier("user_id", user_id).map_validation_err("user_id")?;
    }
    if let Some(agent_id) = &req.agent_id {
        validation::validate_identifier("agent_id", agent_id).map_validation_err("agent_id")?;
    }

    info!(
        endpoint = "/delete_all",
        user_id = req.user_id.as_deref(),
        agent_id = req.agent_id.as_deref(),
        "Incoming POST request to /delete_all"
    );

    let start = Instant::now();
    let result = state
        .engine()
        .delete_all(req.user_id.as_deref(), req.agent_id.as_deref())
        .await;
    let execution_time = start.elapsed().as_secs_f64();
    metrics::ENGINE_CALL_DURATION
        .with_label_values(&["delete_all"])
        .observe(execution_time);

    match result {
        Ok(()) => {
            metrics::ENGINE_CALLS_TOTAL
                .with_label_values(&["delete_all", "success"])
                .inc();
            info!(
                execution_time_seconds = execution_time,
                "Response from /delete_all"
            );
            Ok(Json(StatusResponse { status: "success" }))
        }
        Err(e) => {
            metrics::ENGINE_CALLS_TOTAL
                .with_label_values(&["delete_all", "error"])
                .inc();
            error!(error = %e, "Error deleting memories");
            Err(AppError::Engine(e))
        }
    }
}

pub async fn reset_memory(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, AppError> {
    warn!(endpoint = "/reset", "Incoming POST request to /reset - wiping vector store");

    let start = Instant::now();
    let result = state.engine().reset().await;
    let execution_time = start.elapsed().as_secs_f64();
    metrics::ENGINE_CALL_DURATION
        .with_label_values(&["reset"])
        .observe(execution_time);

    match result {
        Ok(()) => {
            metrics::ENGINE_CALLS_TOTAL
                .with_label_values(&["reset", "success"])
                .inc();
            info!(execution_time_seconds = execution_time, "Response from /reset");
            Ok(Json(StatusResponse { status: "success" }))
        }
        Err(e) => {
            metrics::ENGINE_CALLS_TOTAL
                .with_label_values(&["reset", "error"])
                .inc();
            error!(error = %e, "Error resetting memory");
            Err(AppError::Engine(e))
        }
    }
}
