use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockParseError {
    #[error("Invalid lock block syntax: {0}")]
    Syntax(String),

    #[error("Lock block is not a mapping")]
    NotAMapping,
}

/// Parse a captured `locks:{ ... }` body into a nested mapping.
///
/// The body uses YAML flow-mapping syntax with bare keys, e.g.
/// `{ Global: { acquireCount: { r: 2 } }, Database: { acquireCount: { r: 1 } } }`.
pub fn parse_lock_block(span: &str) -> Result<Map<String, Value>, LockParseError> {
    let value: Value = serde_yaml::from_str(span)
        .map_err(|e| LockParseError::Syntax(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(LockParseError::NotAMapping),
    }
}
