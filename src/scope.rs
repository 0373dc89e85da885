//! Scope composition — the (agent, user, run) identifier tuple that
//! partitions memory records.
//!
//! Composition copies only the fields present on the inbound request and
//! never invents defaults. Absence is valid here; which combinations are
//! required is decided by the operation-specific checks below. Downstream
//! forwarding is sparse: absent fields are omitted entirely, never sent as
//! null, because the engine assigns different default behavior to "field
//! omitted" versus "field present but empty".

use serde_json::{Map, Value};

use crate::errors::AppError;

/// Partial identifier tuple scoping a memory operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub agent_id: Option<String>,
    pub user_id: Option<String>,
    pub run_id: Option<String>,
}

impl Scope {
    /// Compose a scope from optional request fields. Pure, no validation.
    pub fn compose(
        agent_id: Option<String>,
        user_id: Option<String>,
        run_id: Option<String>,
    ) -> Self {
        Self {
            agent_id,
            user_id,
            run_id,
        }
    }

    /// True when no identifier is present ("no scoping filter").
    pub fn is_empty(&self) -> bool {
        self.agent_id.is_none() && self.user_id.is_none() && self.run_id.is_none()
    }

    /// Sparse parameter map for downstream calls: present fields only.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(agent_id) = &self.agent_id {
            params.insert("agent_id".to_string(), Value::String(agent_id.clone()));
        }
        if let Some(user_id) = &self.user_id {
            params.insert("user_id".to_string(), Value::String(user_id.clone()));
        }
        if let Some(run_id) = &self.run_id {
            params.insert("run_id".to_string(), Value::String(run_id.clone()));
        }
        params
    }

    /// Write check for conversation payloads: agent_id and user_id required.
    pub fn require_user_write(&self) -> Result<(), AppError> {
        match (&self.agent_id, &self.user_id) {
            (Some(_), Some(_)) => Ok(()),
            (None, _) => Err(missing("agent_id is required for add")),
            (_, None) => Err(missing("user_id is required for conversation add")),
        }
    }

    /// Write check for raw-memory payloads: agent_id and run_id required.
    pub fn require_run_write(&self) -> Result<(), AppError> {
        match (&self.agent_id, &self.run_id) {
            (Some(_), Some(_)) => Ok(()),
            (None, _) => Err(missing("agent_id is required for add")),
            (_, None) => Err(missing("run_id is required for raw memory add")),
        }
    }
}

fn missing(reason: &str) -> AppError {
    AppError::MissingScope {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Scope {
        Scope::compose(
            Some("a1".to_string()),
            Some("u1".to_string()),
            Some("r1".to_string()),
        )
    }

    #[test]
    fn compose_copies_only_present_fields() {
        let scope = Scope::compose(Some("a1".to_string()), None, None);
        assert_eq!(scope.agent_id.as_deref(), Some("a1"));
        assert!(scope.user_id.is_none());
        assert!(scope.run_id.is_none());
    }

    #[test]
    fn params_omit_absent_fields() {
        let scope = Scope::compose(Some("a1".to_string()), None, Some("r1".to_string()));
        let params = scope.params();

        assert_eq!(params.len(), 2);
        assert_eq!(params["agent_id"], "a1");
        assert_eq!(params["run_id"], "r1");
        // Omission, not null-passing: the key must not exist at all.
        assert!(!params.contains_key("user_id"));
    }

    #[test]
    fn empty_scope_yields_empty_params() {
        let scope = Scope::default();
        assert!(scope.is_empty());
        assert!(scope.params().is_empty());
    }

    #[test]
    fn user_write_requires_agent_and_user() {
        assert!(full().require_user_write().is_ok());

        let no_user = Scope::compose(Some("a1".to_string()), None, Some("r1".to_string()));
        assert!(no_user.require_user_write().is_err());

        let no_agent = Scope::compose(None, Some("u1".to_string()), None);
        assert!(no_agent.require_user_write().is_err());
    }

    #[test]
    fn run_write_requires_agent_and_run() {
        assert!(full().require_run_write().is_ok());

        let no_run = Scope::compose(Some("a1".to_string()), Some("u1".to_string()), None);
        assert!(no_run.require_run_write().is_err());
    }
}
