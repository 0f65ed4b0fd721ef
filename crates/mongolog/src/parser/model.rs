use thiserror::Error;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use super::serde_utils::serialize_fields_as_map;

/// Record keys owned by the parser itself. Generic `key:value` tokens may
/// never claim one of these names.
pub const RESERVED_KEYS: [&str; 15] = [
    "time", "level", "type", "session", "duration",
    "text", "namespace", "command", "query_str", "query_plan",
    "query_index", "query_index_more", "locks", "exception", "errors",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed line: expected at least 4 tokens, found {0}")]
    MalformedLine(usize),

    #[error("Unterminated brace: stream ended at depth {depth} after {consumed} tokens")]
    UnterminatedBrace { depth: usize, consumed: usize },

    #[error("Line too large: {0} bytes (max: {1} bytes)")]
    LineTooLarge(usize, usize),

    #[error("Non-UTF8 content")]
    NonUtf8,
}

/// Non-fatal irregularities seen while building a record.
///
/// The record is still produced; these only describe what was degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// A token matched no known shape and went into `errors`.
    UnrecognizedFragment(String),
    /// The `locks:{...}` body was not a structured mapping; `locks` is unset.
    LockBlockParseFailure(String),
    /// `query_str` was kept as captured.
    NormalizationSkipped(String),
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::UnrecognizedFragment(_) => "unrecognized_fragment",
            Condition::LockBlockParseFailure(_) => "lock_block_parse_failure",
            Condition::NormalizationSkipped(_) => "normalization_skipped",
        }
    }
}

/// Scalar discovered by the generic `key:value` fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Str(String),
}

/// Generic fields in discovery order, serialized as a map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(String, FieldValue)>);

impl Fields {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or replace (last write wins)
    pub fn set(&mut self, key: &str, value: FieldValue) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_fields_as_map(&self.0, serializer)
    }
}

/// One parsed log line.
///
/// Serializes sparsely: optional fields that were never seen produce no key,
/// and generic fields are emitted inline next to the built-in ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogRecord {
    pub time: String,
    pub level: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub session: String,

    /// Trailing `<N>ms` token, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    /// Joined message of non-COMMAND lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_str: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_plan: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_index: Option<String>,

    /// Further distinct index spans from repeated `IXSCAN` tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_index_more: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub locks: Option<Map<String, Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,

    /// Escape hatch for fragments the dispatcher does not understand yet.
    /// Each fragment is appended with a leading space.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,

    #[serde(flatten)]
    pub fields: Fields,
}

impl LogRecord {
    /// Look up a generic field by key
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub(crate) fn push_error(&mut self, token: &str) {
        let errors = self.errors.get_or_insert_with(String::new);
        errors.push(' ');
        errors.push_str(token);
    }
}

/// A finished record plus the non-fatal conditions met while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub record: LogRecord,
    pub conditions: Vec<Condition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_only() -> LogRecord {
        LogRecord {
            time: "2024-01-01T00:00:00".to_string(),
            level: "I".to_string(),
            kind: "NETWORK".to_string(),
            session: "conn1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sparse_serialization_omits_unset_fields() {
        let json = serde_json::to_value(header_only()).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), 4);
        assert_eq!(obj["type"], "NETWORK");
        assert!(!obj.contains_key("command"));
        assert!(!obj.contains_key("namespace"));
        assert!(!obj.contains_key("kind"));
    }

    #[test]
    fn test_generic_fields_serialize_inline() {
        let mut record = header_only();
        record.fields.set("nreturned", FieldValue::Int(3));
        record.fields.set("protocol", FieldValue::Str("op_query".to_string()));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["nreturned"], 3);
        assert_eq!(json["protocol"], "op_query");
        assert!(json.get("fields").is_none());
    }

    #[test]
    fn test_set_field_last_write_wins() {
        let mut record = header_only();
        record.fields.set("reslen", FieldValue::Int(1));
        record.fields.set("reslen", FieldValue::Int(2));

        assert_eq!(record.fields.len(), 1);
        assert_eq!(record.field("reslen"), Some(&FieldValue::Int(2)));
    }

    #[test]
    fn test_push_error_space_prefixes_each_fragment() {
        let mut record = header_only();
        record.push_error("$in:");
        record.push_error("}");
        assert_eq!(record.errors.as_deref(), Some(" $in: }"));
    }

    #[test]
    fn test_condition_labels() {
        assert_eq!(Condition::UnrecognizedFragment("x".into()).as_str(), "unrecognized_fragment");
        assert_eq!(Condition::LockBlockParseFailure("x".into()).as_str(), "lock_block_parse_failure");
        assert_eq!(Condition::NormalizationSkipped("x".into()).as_str(), "normalization_skipped");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParseError::MalformedLine(2).to_string(),
            "Malformed line: expected at least 4 tokens, found 2"
        );
        let err = ParseError::UnterminatedBrace { depth: 1, consumed: 3 };
        assert!(err.to_string().contains("depth 1"));
    }
}
