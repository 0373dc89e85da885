//! Engram Gateway - HTTP front door for an agent memory engine.
//!
//! The gateway does two jobs: it bootstraps the Neo4j graph schema once at
//! startup (idempotent, safe under concurrent deploys), and it exposes a
//! small authenticated API (/add, /query, /get_all plus admin endpoints)
//! that validates and scopes requests before forwarding them to the engine.
//! Scope forwarding is sparse throughout: absent identifiers are omitted
//! from downstream calls, never sent as null.

pub mod auth;
pub mod config;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod schema;
pub mod scope;
pub mod validation;
