pub use super::model::{Condition, FieldValue, LogRecord, ParseError, ParsedLine};

pub trait LogParser: Send + Sync {
    /// parse one raw log line into a record
    fn parse(&self, raw: &[u8]) -> Result<ParsedLine, ParseError>;
}
