//! Router Configuration - Centralized route definitions
//!
//! This module builds the Axum router using handlers from the submodules.
//! Routes are split into public (no auth) and protected (auth required).

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;
use super::{add, admin, get_all, health, query};

/// Build the public routes (no authentication required)
///
/// These routes must always be accessible for:
/// - Availability checks (/ping, matched by existing clients)
/// - Health checks (Kubernetes probes)
/// - Metrics (Prometheus scraping)
pub fn build_public_routes(state: AppState) -> Router {
    Router::new()
        // =================================================================
        // AVAILABILITY & KUBERNETES PROBES
        // =================================================================
        .route("/ping", get(health::ping))
        .route("/health/live", get(health::health_live))
        .route("/health/ready", get(health::health_ready))
        // =================================================================
        // METRICS (PROMETHEUS)
        // =================================================================
        .route("/metrics", get(health::metrics_endpoint))
        // =================================================================
        // STATE
        // =================================================================
        .with_state(state)
}

/// Build the protected API routes (authentication required)
///
/// These routes require API key authentication and are rate-limited.
/// The auth middleware and rate limiter should be applied by the caller.
pub fn build_protected_routes(state: AppState) -> Router {
    Router::new()
        // =================================================================
        // MEMORY GATEWAY
        // =================================================================
        .route("/add", post(add::add_memory))
        .route("/query", post(query::query_memory))
        .route("/get_all", post(get_all::get_all_memories))
        // =================================================================
        // ADMIN (DESTRUCTIVE)
        // =================================================================
        .route("/delete_all", post(admin::delete_all_memories))
        .route("/reset", post(admin::reset_memory))
        // =================================================================
        // STATE
        // =================================================================
        .with_state(state)
}
