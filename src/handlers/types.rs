//! Request and response types for the gateway API.
//!
//! Add accepts two deliberately distinct payload shapes — conversation
//! messages and raw memory strings — modeled as a tagged union discriminated
//! by the payload field, each with its own required-identifier rule, rather
//! than one lenient schema that would silently accept partially-invalid
//! combinations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::engine::Message;

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Add request: one of two payload variants.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AddRequest {
    /// Structured role/content messages; requires agent_id and user_id.
    Conversation(ConversationAdd),
    /// Raw memory strings; requires agent_id and run_id.
    RawMemories(RawMemoriesAdd),
}

#[derive(Debug, Deserialize)]
pub struct ConversationAdd {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct RawMemoriesAdd {
    pub memories: Vec<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Query request
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
    /// Defaults to 10 when omitted; an explicit null is forwarded as
    /// "no limit" (the key is omitted downstream). Zero and negative values
    /// pass through unclamped.
    #[serde(default = "default_limit")]
    pub limit: Option<i64>,
}

fn default_limit() -> Option<i64> {
    Some(10)
}

/// GetAll request: scoping identifiers only
#[derive(Debug, Deserialize)]
pub struct GetAllRequest {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
}

/// DeleteAll request
#[derive(Debug, Deserialize)]
pub struct DeleteAllRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

/// Ping response
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Add response envelope
#[derive(Debug, Serialize)]
pub struct AddResponse {
    pub status: &'static str,
    pub result: Value,
}

/// Query/GetAll response envelope
#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub status: &'static str,
    pub results: Vec<Value>,
}

/// Bare success envelope for admin operations
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}
