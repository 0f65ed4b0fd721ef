/// MongoDB diagnostic log parsing module
///
/// Turns one raw log line into a sparse, normalized `LogRecord`.
///
/// # Architecture
///
/// - `header.rs`: fixed-position header fields and trailing duration
/// - `cursor.rs`: consumable token view (index offset, no copying)
/// - `brace.rs`: brace-balanced span extraction
/// - `dispatch.rs`: keyword state machine for COMMAND lines
/// - `fallback.rs`: generic `key:value` field matcher
/// - `locks.rs`: structured parse of `locks:{...}` bodies
/// - `normalize.rs`: placeholder substitution for query strings
/// - `engine.rs`: `MongoLogParser`, the entry point tying them together
/// - `metrics.rs`: parsing counters
///
/// # Failure model
///
/// Only a short header, an unterminated brace span, an oversized line or
/// non-UTF8 input fail a line. Everything else degrades into a partial
/// record plus a list of `Condition`s.

pub mod traits;
pub mod model;
pub mod header;
pub mod cursor;
pub mod brace;
pub mod dispatch;
pub mod fallback;
pub mod locks;
pub mod normalize;
pub mod engine;
pub mod metrics;
mod serde_utils;

// Re-export commonly used types
pub use traits::LogParser;
pub use model::{Condition, FieldValue, LogRecord, ParseError, ParsedLine};
pub use engine::MongoLogParser;
pub use metrics::{MetricsSnapshot, ParsingMetrics};

// Constants
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB
