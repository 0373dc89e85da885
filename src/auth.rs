use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::env;

/// Rejection reasons for the X-API-Key check.
#[derive(Debug)]
pub enum AuthError {
    MissingApiKey,
    InvalidApiKey,
    NotConfigured,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingApiKey => (StatusCode::UNAUTHORIZED, "Missing X-API-Key header"),
            AuthError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Invalid API key"),
            AuthError::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "API keys not configured. Set ENGRAM_API_KEYS environment variable.",
            ),
        };

        (status, message).into_response()
    }
}

/// Compare two keys without short-circuiting on the first mismatched byte.
/// Length still leaks through the xor fold; key lengths are not secret here.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let mut result = (a.len() ^ b.len()) as u8;

    let min_len = std::cmp::min(a.len(), b.len());
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    for i in 0..min_len {
        result |= a_bytes[i] ^ b_bytes[i];
    }

    result == 0
}

/// Check a presented key against ENGRAM_API_KEYS (comma-separated).
pub fn validate_api_key(provided_key: &str) -> Result<(), AuthError> {
    let valid_keys = match env::var("ENGRAM_API_KEYS") {
        Ok(keys) if !keys.trim().is_empty() => keys,
        _ => {
            // No keys configured: fatal in production, dev fallback otherwise.
            let is_production = env::var("ENGRAM_ENV")
                .map(|v| v.to_lowercase() == "production" || v.to_lowercase() == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!("ENGRAM_API_KEYS not set in production mode");
                return Err(AuthError::NotConfigured);
            }

            tracing::warn!("ENGRAM_API_KEYS not set - using development key (not for production!)");
            "engram-dev-key-change-in-production".to_string()
        }
    };

    let keys: Vec<&str> = valid_keys.split(',').map(|k| k.trim()).collect();

    // Every configured key is checked; no early exit on a match.
    let mut found = false;
    for key in &keys {
        if constant_time_compare(key, provided_key) {
            found = true;
        }
    }

    if found {
        Ok(())
    } else {
        Err(AuthError::InvalidApiKey)
    }
}

/// X-API-Key middleware. Applied to the protected route group only;
/// probes and metrics never pass through here.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let api_key_value = match request
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
    {
        Some(key) => key,
        None => return AuthError::MissingApiKey.into_response(),
    };

    if let Err(e) = validate_api_key(&api_key_value) {
        return e.into_response();
    }

    next.run(request).await
}
