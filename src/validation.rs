//! Input validation for request payloads.
//! Keeps malformed identifiers and oversized bodies away from the engine.

use anyhow::{anyhow, Result};

/// Maximum lengths for security
pub const MAX_IDENTIFIER_LENGTH: usize = 128;
pub const MAX_CONTENT_LENGTH: usize = 50_000; // 50KB
pub const MAX_QUERY_LENGTH: usize = 10_000;
pub const MAX_METADATA_SIZE: usize = 10_000; // Max metadata JSON size (10KB)
pub const MAX_ITEMS_PER_ADD: usize = 1000;

/// Validate an agent/user/run identifier
pub fn validate_identifier(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }

    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(anyhow!(
            "{name} too long: {} chars (max: {})",
            value.len(),
            MAX_IDENTIFIER_LENGTH
        ));
    }

    // Only allow alphanumeric, dash, underscore, @, .
    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '@' || c == '.')
    {
        return Err(anyhow!(
            "{name} contains invalid characters (allowed: alphanumeric, -, _, @, .)"
        ));
    }

    Ok(())
}

/// Validate a single content item
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(anyhow!("content cannot be empty"));
    }

    if content.len() > MAX_CONTENT_LENGTH {
        return Err(anyhow!(
            "content too long: {} chars (max: {})",
            content.len(),
            MAX_CONTENT_LENGTH
        ));
    }

    Ok(())
}

/// Validate a search query string
pub fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(anyhow!("query cannot be empty"));
    }

    if query.len() > MAX_QUERY_LENGTH {
        return Err(anyhow!(
            "query too long: {} chars (max: {})",
            query.len(),
            MAX_QUERY_LENGTH
        ));
    }

    Ok(())
}

/// Validate metadata JSON size
pub fn validate_metadata(metadata: &serde_json::Map<String, serde_json::Value>) -> Result<()> {
    let size = serde_json::Value::Object(metadata.clone()).to_string().len();
    if size > MAX_METADATA_SIZE {
        return Err(anyhow!(
            "metadata too large: {} bytes (max: {})",
            size,
            MAX_METADATA_SIZE
        ));
    }
    Ok(())
}

/// Validate item count for an add payload
pub fn validate_item_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(anyhow!("at least one item is required"));
    }

    if count > MAX_ITEMS_PER_ADD {
        return Err(anyhow!(
            "too many items: {count} (max: {MAX_ITEMS_PER_ADD})"
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifier() {
        assert!(validate_identifier("agent_id", "quest_boo").is_ok());
        assert!(validate_identifier("user_id", "user-123").is_ok());
        assert!(validate_identifier("user_id", "user@example.com").is_ok());
    }

    #[test]
    fn test_invalid_identifier() {
        assert!(validate_identifier("agent_id", "").is_err()); // empty
        assert!(validate_identifier("agent_id", "agent/123").is_err()); // invalid char
        assert!(validate_identifier("agent_id", &"a".repeat(200)).is_err()); // too long
    }

    #[test]
    fn test_content() {
        assert!(validate_content("Alice likes hiking").is_ok());
        assert!(validate_content("   ").is_err());
        assert!(validate_content(&"x".repeat(100_000)).is_err());
    }

    #[test]
    fn test_query() {
        assert!(validate_query("hiking").is_ok());
        assert!(validate_query("").is_err());
        assert!(validate_query(&"q".repeat(20_000)).is_err());
    }

    #[test]
    fn test_metadata_size() {
        let mut small = serde_json::Map::new();
        small.insert("source".to_string(), serde_json::json!("discord"));
        assert!(validate_metadata(&small).is_ok());

        let mut big = serde_json::Map::new();
        big.insert("blob".to_string(), serde_json::json!("x".repeat(20_000)));
        assert!(validate_metadata(&big).is_err());
    }

    #[test]
    fn test_item_count() {
        assert!(validate_item_count(1).is_ok());
        assert!(validate_item_count(1000).is_ok());
        assert!(validate_item_count(0).is_err());
        assert!(validate_item_count(1001).is_err());
    }
}
