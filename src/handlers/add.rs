//! Add handler — persist memories through the engine.

use axum::{extract::State, response::Json};
use std::time::Instant;
use tracing::{error, info};

use super::state::AppState;
use super::types::{AddRequest, AddResponse};
use super::validate_scope_ids;
use crate::engine::AddContent;
use crate::errors::{AppError, ValidationErrorExt};
use crate::metrics;
use crate::scope::Scope;
use crate::validation;

/// Raw memory items are previewed at a fixed length in logs; full bodies
/// never reach the log stream.
const PREVIEW_CHARS: usize = 40;

pub async fn add_memory(
    State(state): State<AppState>,
    Json(req): Json<AddRequest>,
) -> Result<Json<AddResponse>, AppError> {
    let (content, scope, metadata) = match req {
        AddRequest::Conversation(req) => {
            let scope = Scope::compose(req.agent_id, req.user_id, req.run_id);
            scope.require_user_write()?;
            validate_scope_ids(&scope)?;
            validation::validate_item_count(req.messages.len()).map_validation_err("messages")?;
            for message in &req.messages {
                validation::validate_content(&message.content).map_validation_err("messages")?;
            }
            let metadata = req.metadata.unwrap_or_default();
            validation::validate_metadata(&metadata).map_validation_err("metadata")?;

            // Receipt log: counts and per-item lengths, never content bodies.
            let content_lengths: Vec<usize> =
                req.messages.iter().map(|m| m.content.len()).collect();
            info!(
                endpoint = "/add",
                variant = "conversation",
                agent_id = scope.agent_id.as_deref(),
                user_id = scope.user_id.as_deref(),
                run_id = scope.run_id.as_deref(),
                message_count = req.messages.len(),
                content_lengths = ?content_lengths,
                "Incoming POST request to /add"
            );

            (AddContent::Messages(req.messages), scope, metadata)
        }
        AddRequest::RawMemories(req) => {
            let scope = Scope::compose(req.agent_id, req.user_id, req.run_id);
            scope.require_run_write()?;
            validate_scope_ids(&scope)?;
            validation::validate_item_count(req.memories.len()).map_validation_err("memories")?;
            for memory in &req.memories {
                validation::validate_content(memory).map_validation_err("memories")?;
            }
            let metadata = req.metadata.unwrap_or_default();
            validation::validate_metadata(&metadata).map_validation_err("metadata")?;

            // Receipt log: fixed-length previews, never full text.
            let previews: Vec<String> = req
                .memories
                .iter()
                .map(|m| m.chars().take(PREVIEW_CHARS).collect())
                .collect();
            info!(
                endpoint = "/add",
                variant = "raw",
                agent_id = scope.agent_id.as_deref(),
                user_id = scope.user_id.as_deref(),
                run_id = scope.run_id.as_deref(),
                memories_count = req.memories.len(),
                memories_preview = ?previews,
                "Incoming POST request to /add"
            );

            (AddContent::Memories(req.memories), scope, metadata)
        }
    };

    let start = Instant::now();
    let result = state.engine().add(&content, &scope, &metadata).await;
    let execution_time = start.elapsed().as_secs_f64();
    metrics::ENGINE_CALL_DURATION
        .with_label_values(&["add"])
        .observe(execution_time);

    match result {
        Ok(result) => {
            metrics::ENGINE_CALLS_TOTAL
                .with_label_values(&["add", "success"])
                .inc();
            info!(
                execution_time_seconds = execution_time,
                status = "success",
                "Response from /add"
            );
            Ok(Json(AddResponse {
                status: "success",
                result,
            }))
        }
        Err(e) => {
            metrics::ENGINE_CALLS_TOTAL
                .with_label_values(&["add", "error"])
                .inc();
            metrics::ERRORS_TOTAL
                .with_label_values(&["engine", "/add"])
                .inc();
            error!(error = %e, "Error adding memory");
            Err(AppError::Engine(e))
        }
    }
}
