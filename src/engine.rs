//! Engine collaborator interface.
//!
//! The memory engine performs fact extraction, embedding, graph upsert,
//! vector upsert, similarity search and full-scan retrieval. The gateway
//! treats it as a black box: opaque strings and JSON maps go in, opaque
//! payloads come out. The engine is injected as a trait object so handlers
//! can be exercised against a substitute in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::scope::Scope;

/// A single role/content pair from a conversation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Content handed to the engine's add operation. Two real call sites exist
/// with different payload shapes; both are first-class.
#[derive(Debug, Clone)]
pub enum AddContent {
    /// Structured role/content messages
    Messages(Vec<Message>),
    /// Raw memory strings
    Memories(Vec<String>),
}

impl AddContent {
    pub fn len(&self) -> usize {
        match self {
            Self::Messages(items) => items.len(),
            Self::Memories(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Error raised by the engine during any operation. Carried verbatim into
/// the HTTP error envelope; never retried at this layer.
#[derive(Debug)]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EngineError {}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// The memory engine's operation surface, as consumed by the gateway.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Extract facts from `content` and persist them under `scope`.
    async fn add(
        &self,
        content: &AddContent,
        scope: &Scope,
        metadata: &Map<String, Value>,
    ) -> Result<Value, EngineError>;

    /// Similarity search within `scope`; `limit` is forwarded as supplied.
    async fn search(
        &self,
        query: &str,
        scope: &Scope,
        limit: Option<i64>,
    ) -> Result<Vec<Value>, EngineError>;

    /// Full-scan retrieval within `scope`; an empty scope means no filter.
    async fn get_all(&self, scope: &Scope) -> Result<Vec<Value>, EngineError>;

    /// Wipe the vector store.
    async fn reset(&self) -> Result<(), EngineError>;

    /// Delete every record matching the given owner identifiers.
    async fn delete_all(
        &self,
        user_id: Option<&str>,
        agent_id: Option<&str>,
    ) -> Result<(), EngineError>;
}

// =============================================================================
// REQUEST BODY BUILDERS (sparse forwarding)
// =============================================================================

/// Body for the engine's add endpoint. Scope fields are merged in sparsely;
/// metadata is always present (empty map when the caller supplied none).
pub fn add_body(content: &AddContent, scope: &Scope, metadata: &Map<String, Value>) -> Value {
    let mut body = scope.params();
    match content {
        AddContent::Messages(items) => {
            body.insert(
                "messages".to_string(),
                serde_json::to_value(items).unwrap_or(Value::Null),
            );
        }
        AddContent::Memories(items) => {
            body.insert(
                "memories".to_string(),
                serde_json::to_value(items).unwrap_or(Value::Null),
            );
        }
    }
    body.insert("metadata".to_string(), Value::Object(metadata.clone()));
    Value::Object(body)
}

/// Body for the engine's search endpoint. Absent optional fields are
/// omitted, never sent as null — the engine distinguishes the two.
pub fn search_body(query: &str, scope: &Scope, limit: Option<i64>) -> Value {
    let mut body = scope.params();
    body.insert("query".to_string(), Value::String(query.to_string()));
    if let Some(limit) = limit {
        body.insert("limit".to_string(), Value::Number(limit.into()));
    }
    Value::Object(body)
}

/// Body for the engine's get_all endpoint: just the sparse scope.
pub fn get_all_body(scope: &Scope) -> Value {
    Value::Object(scope.params())
}

/// Body for the engine's delete_all endpoint.
pub fn delete_all_body(user_id: Option<&str>, agent_id: Option<&str>) -> Value {
    let mut body = Map::new();
    if let Some(user_id) = user_id {
        body.insert("user_id".to_string(), Value::String(user_id.to_string()));
    }
    if let Some(agent_id) = agent_id {
        body.insert("agent_id".to_string(), Value::String(agent_id.to_string()));
    }
    Value::Object(body)
}

// =============================================================================
// REMOTE ENGINE CLIENT
// =============================================================================

/// HTTP client for a remotely hosted engine service.
pub struct RemoteEngine {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteEngine {
    const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:8765";

    pub fn new() -> Self {
        let base_url =
            std::env::var("ENGINE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, EngineError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EngineError::new(format!(
                "engine returned {status} for {path}: {text}"
            )));
        }

        response.json::<Value>().await.map_err(EngineError::from)
    }
}

impl Default for RemoteEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn expect_array(value: Value, path: &str) -> Result<Vec<Value>, EngineError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(EngineError::new(format!(
            "engine returned non-array payload for {path}: {other}"
        ))),
    }
}

#[async_trait]
impl Engine for RemoteEngine {
    async fn add(
        &self,
        content: &AddContent,
        scope: &Scope,
        metadata: &Map<String, Value>,
    ) -> Result<Value, EngineError> {
        self.post("/v1/add", &add_body(content, scope, metadata))
            .await
    }

    async fn search(
        &self,
        query: &str,
        scope: &Scope,
        limit: Option<i64>,
    ) -> Result<Vec<Value>, EngineError> {
        let value = self
            .post("/v1/search", &search_body(query, scope, limit))
            .await?;
        expect_array(value, "/v1/search")
    }

    async fn get_all(&self, scope: &Scope) -> Result<Vec<Value>, EngineError> {
        let value = self.post("/v1/get_all", &get_all_body(scope)).await?;
        expect_array(value, "/v1/get_all")
    }

    async fn reset(&self) -> Result<(), EngineError> {
        self.post("/v1/reset", &Value::Object(Map::new())).await?;
        Ok(())
    }

    async fn delete_all(
        &self,
        user_id: Option<&str>,
        agent_id: Option<&str>,
    ) -> Result<(), EngineError> {
        self.post("/v1/delete_all", &delete_all_body(user_id, agent_id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(agent: Option<&str>, user: Option<&str>, run: Option<&str>) -> Scope {
        Scope::compose(
            agent.map(String::from),
            user.map(String::from),
            run.map(String::from),
        )
    }

    #[test]
    fn add_body_includes_only_present_scope_fields() {
        let content = AddContent::Messages(vec![Message {
            role: "user".to_string(),
            content: "Alice likes hiking".to_string(),
        }]);
        let body = add_body(&content, &scope(Some("a1"), Some("u1"), None), &Map::new());

        let obj = body.as_object().expect("object body");
        assert_eq!(obj["agent_id"], "a1");
        assert_eq!(obj["user_id"], "u1");
        assert!(!obj.contains_key("run_id"));
        assert_eq!(obj["messages"][0]["content"], "Alice likes hiking");
        assert_eq!(obj["metadata"], serde_json::json!({}));
    }

    #[test]
    fn add_body_raw_memories_keyed_separately() {
        let content = AddContent::Memories(vec!["fact one".to_string(), "fact two".to_string()]);
        let body = add_body(&content, &scope(Some("a1"), None, Some("r1")), &Map::new());

        let obj = body.as_object().expect("object body");
        assert_eq!(obj["memories"].as_array().map(Vec::len), Some(2));
        assert!(!obj.contains_key("messages"));
        assert!(!obj.contains_key("user_id"));
    }

    #[test]
    fn search_body_omits_absent_limit_and_ids() {
        let body = search_body("hiking", &scope(Some("a1"), None, None), None);
        let obj = body.as_object().expect("object body");

        assert_eq!(obj["query"], "hiking");
        assert_eq!(obj["agent_id"], "a1");
        assert!(!obj.contains_key("limit"));
        assert!(!obj.contains_key("user_id"));
        assert!(!obj.contains_key("run_id"));
    }

    #[test]
    fn search_body_forwards_nonpositive_limit_unclamped() {
        let body = search_body("q", &Scope::default(), Some(0));
        assert_eq!(body["limit"], 0);

        let body = search_body("q", &Scope::default(), Some(-5));
        assert_eq!(body["limit"], -5);
    }

    #[test]
    fn get_all_body_empty_scope_is_empty_object() {
        let body = get_all_body(&Scope::default());
        assert_eq!(body, serde_json::json!({}));
    }

    #[test]
    fn delete_all_body_sparse() {
        let body = delete_all_body(None, Some("a1"));
        assert_eq!(body, serde_json::json!({"agent_id": "a1"}));
    }

    #[test]
    fn remote_engine_trims_trailing_slash() {
        let engine = RemoteEngine::with_base_url("http://engine:8765///");
        assert_eq!(engine.base_url(), "http://engine:8765");
    }
}
