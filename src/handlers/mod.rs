//! HTTP Handlers - organized by domain
//!
//! Each submodule owns one slice of the API surface. The router module
//! wires them together; state holds the shared gateway state.

pub mod add;
pub mod admin;
pub mod get_all;
pub mod health;
pub mod query;
pub mod router;
pub mod state;
pub mod types;

pub use router::{build_protected_routes, build_public_routes};
pub use state::{AppState, GatewayState};

use crate::errors::{AppError, ValidationErrorExt};
use crate::scope::Scope;
use crate::validation;

/// Validate every identifier present on a scope. Absent fields are fine;
/// present ones must pass the identifier rules.
pub(crate) fn validate_scope_ids(scope: &Scope) -> Result<(), AppError> {
    if let Some(agent_id) = &scope.agent_id {
        validation::validate_identifier("agent_id", agent_id).map_validation_err("agent_id")?;
    }
    if let Some(user_id) = &scope.user_id {
        validation::validate_identifier("user_id", user_id).map_validation_err("user_id")?;
    }
    if let Some(run_id) = &scope.run_id {
        validation::validate_identifier("run_id", run_id).map_validation_err("run_id")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_with_no_ids_passes() {
        let scope = Scope::compose(None, None, None);
        assert!(validate_scope_ids(&scope).is_ok());
    }

    #[test]
    fn oversized_id_is_rejected() {
        let long = "x".repeat(validation::MAX_IDENTIFIER_LENGTH + 1);
        let scope = Scope::compose(Some(long), None, None);
        assert!(validate_scope_ids(&scope).is_err());
    }
}
