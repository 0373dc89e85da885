//! Configuration management for the memory gateway.
//!
//! All configurable parameters in one place with environment variable
//! overrides. Server tuning knobs have sensible defaults; store credentials
//! are required and their absence is fatal at startup — the service must not
//! boot partially configured.

use std::env;
use std::fmt;
use tracing::info;

/// Error raised when a required credential or URI is missing from the
/// environment. Fatal at startup.
#[derive(Debug)]
pub struct ConfigError {
    pub missing: Vec<&'static str>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "missing required environment variables: {}",
            self.missing.join(", ")
        )
    }
}

impl std::error::Error for ConfigError {}

fn required(name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match env::var(name) {
        Ok(val) if !val.trim().is_empty() => val,
        _ => {
            missing.push(name);
            String::new()
        }
    }
}

/// Graph database (Neo4j) connection settings
#[derive(Debug, Clone)]
pub struct GraphStoreConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
}

impl GraphStoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let uri = required("NEO4J_URI", &mut missing);
        let username = required("NEO4J_USERNAME", &mut missing);
        let password = required("NEO4J_PASSWORD", &mut missing);

        if !missing.is_empty() {
            return Err(ConfigError { missing });
        }

        Ok(Self {
            uri,
            username,
            password,
        })
    }
}

/// Vector store (Qdrant) settings, passed through to the engine
#[derive(Debug, Clone)]
pub struct VectorStoreConfig {
    pub url: String,
    pub api_key: String,
    pub collection: String,
}

impl VectorStoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let url = required("QDRANT_URL", &mut missing);
        let api_key = required("QDRANT_API_KEY", &mut missing);

        if !missing.is_empty() {
            return Err(ConfigError { missing });
        }

        Ok(Self {
            url,
            api_key,
            collection: env::var("QDRANT_COLLECTION")
                .unwrap_or_else(|_| "cloud_memory".to_string()),
        })
    }
}

/// LLM settings, opaque to the gateway and forwarded to the engine
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let mut config = Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_tokens: 2000,
        };

        if let Ok(val) = env::var("LLM_PROVIDER") {
            config.provider = val;
        }
        if let Ok(val) = env::var("LLM_MODEL") {
            config.model = val;
        }
        if let Ok(val) = env::var("LLM_TEMPERATURE") {
            if let Ok(n) = val.parse() {
                config.temperature = n;
            }
        }
        if let Ok(val) = env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = val.parse() {
                config.max_tokens = n;
            }
        }

        config
    }
}

/// Server configuration loaded from environment with defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address (default: 127.0.0.1)
    /// Set to 0.0.0.0 for Docker or network-accessible deployments
    pub host: String,

    /// Server port (default: 8090)
    pub port: u16,

    /// Rate limit: requests per second (default: 500)
    pub rate_limit_per_second: u64,

    /// Rate limit: burst size (default: 1000)
    pub rate_limit_burst: u32,

    /// Maximum concurrent requests (default: 200)
    pub max_concurrent_requests: usize,

    /// Whether running in production mode
    pub is_production: bool,

    /// Allowed CORS origins (empty = allow all)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
            rate_limit_per_second: 500,
            rate_limit_burst: 1000,
            max_concurrent_requests: 200,
            is_production: false,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults
    #[allow(clippy::field_reassign_with_default)] // Environment overrides require mutable config
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.is_production = env::var("ENGRAM_ENV")
            .map(|v| {
                let v = v.to_lowercase();
                v == "production" || v == "prod"
            })
            .unwrap_or(false);

        if let Ok(val) = env::var("ENGRAM_HOST") {
            config.host = val;
        }

        if let Ok(val) = env::var("ENGRAM_PORT") {
            if let Ok(port) = val.parse() {
                config.port = port;
            }
        }

        if let Ok(val) = env::var("ENGRAM_RATE_LIMIT") {
            if let Ok(n) = val.parse() {
                config.rate_limit_per_second = n;
            }
        }

        if let Ok(val) = env::var("ENGRAM_RATE_BURST") {
            if let Ok(n) = val.parse() {
                config.rate_limit_burst = n;
            }
        }

        if let Ok(val) = env::var("ENGRAM_MAX_CONCURRENT") {
            if let Ok(n) = val.parse() {
                config.max_concurrent_requests = n;
            }
        }

        if let Ok(origins) = env::var("ENGRAM_CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if config.is_production && config.cors_origins.is_empty() {
            tracing::warn!(
                "PRODUCTION WARNING: CORS allows all origins. Set ENGRAM_CORS_ORIGINS for security."
            );
        }

        config
    }

    /// Convert to a tower-http CorsLayer
    pub fn cors_layer(&self) -> tower_http::cors::CorsLayer {
        use tower_http::cors::{AllowOrigin, Any, CorsLayer};

        if self.cors_origins.is_empty() {
            return CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
        }

        let mut valid_origins = Vec::new();
        for origin_str in &self.cors_origins {
            match origin_str.parse::<axum::http::HeaderValue>() {
                Ok(origin) => valid_origins.push(origin),
                Err(_) => tracing::warn!("CORS: Invalid origin '{}' - skipping", origin_str),
            }
        }

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(valid_origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }

    /// Log the current configuration
    pub fn log(&self) {
        info!("Configuration:");
        info!(
            "   Mode: {}",
            if self.is_production {
                "PRODUCTION"
            } else {
                "Development"
            }
        );
        info!("   Listen: {}:{}", self.host, self.port);
        info!(
            "   Rate limit: {} req/sec (burst: {})",
            self.rate_limit_per_second, self.rate_limit_burst
        );
        info!("   Max concurrent: {}", self.max_concurrent_requests);
        if self.cors_origins.is_empty() {
            info!("   CORS: Permissive (all origins allowed)");
        } else {
            info!("   CORS origins: {:?}", self.cors_origins);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8090);
        assert_eq!(config.max_concurrent_requests, 200);
        assert!(!config.is_production);
    }

    #[test]
    fn test_env_override() {
        env::set_var("ENGRAM_PORT", "9099");
        env::set_var("ENGRAM_MAX_CONCURRENT", "50");

        let config = ServerConfig::from_env();
        assert_eq!(config.port, 9099);
        assert_eq!(config.max_concurrent_requests, 50);

        env::remove_var("ENGRAM_PORT");
        env::remove_var("ENGRAM_MAX_CONCURRENT");
    }

    #[test]
    fn test_graph_config_reports_every_missing_var() {
        env::remove_var("NEO4J_URI");
        env::remove_var("NEO4J_USERNAME");
        env::remove_var("NEO4J_PASSWORD");

        let err = GraphStoreConfig::from_env().expect_err("must fail without credentials");
        assert_eq!(err.missing.len(), 3);
        assert!(err.to_string().contains("NEO4J_URI"));
    }

    #[test]
    fn test_llm_defaults() {
        let llm = LlmConfig::from_env();
        assert_eq!(llm.provider, "openai");
        assert!(llm.temperature > 0.0);
    }
}
