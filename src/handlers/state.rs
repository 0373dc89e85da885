//! Gateway state shared across request handlers.
//!
//! The engine client and configuration are constructed once at startup and
//! injected here; both are treated as immutable for the worker's lifetime.
//! No other shared mutable state exists at this layer.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::Engine;

/// Immutable per-process gateway context.
pub struct GatewayState {
    engine: Arc<dyn Engine>,
    config: ServerConfig,
}

impl GatewayState {
    /// Build the state with an injected engine so tests can substitute one.
    pub fn new(engine: Arc<dyn Engine>, config: ServerConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Application state type alias
pub type AppState = Arc<GatewayState>;
