//! Keyword-driven state machine for COMMAND lines.
//!
//! Each message token is classified into a [`Keyword`]; the keyword decides
//! how many of the following tokens belong to it and which record fields
//! they populate. Anything that is not a keyword goes through the generic
//! `key:value` matcher and, failing that, into `errors`.

use super::brace::extract_span;
use super::cursor::TokenCursor;
use super::fallback::match_field;
use super::locks::parse_lock_block;
use super::model::{Condition, LogRecord, ParseError};

/// Marker that ends a truncated-document warning.
const WARNING_END: &str = "...";

/// Plan summary value that carries an index key pattern.
const INDEX_SCAN: &str = "IXSCAN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `warning:` - skip through the `...` marker
    Warning,
    KillCursors,
    /// `command <ns> command: <name> { ... }`
    Command,
    /// `query <ns> query: { ... }`
    Query,
    GetMore,
    /// Terminal: remaining tokens are left unconsumed
    ServerStatus,
    PlanSummary,
    /// A further index in a multi-index plan summary
    IndexScan,
    /// `locks:{` - opening brace is glued to the keyword
    Locks,
    Exception,
    Other,
}

impl Keyword {
    pub fn classify(token: &str) -> Self {
        match token {
            "warning:" => Keyword::Warning,
            "killcursors" => Keyword::KillCursors,
            "command" => Keyword::Command,
            "query" => Keyword::Query,
            "getmore" => Keyword::GetMore,
            "serverStatus" => Keyword::ServerStatus,
            "planSummary:" => Keyword::PlanSummary,
            INDEX_SCAN => Keyword::IndexScan,
            "locks:{" => Keyword::Locks,
            "exception:" => Keyword::Exception,
            _ => Keyword::Other,
        }
    }
}

enum Flow {
    Continue,
    Stop,
}

/// Drive the state machine over the message of a COMMAND line.
pub fn dispatch(
    cursor: &mut TokenCursor<'_>,
    record: &mut LogRecord,
    conditions: &mut Vec<Condition>,
) -> Result<(), ParseError> {
    while let Some(token) = cursor.pop() {
        match step(token, cursor, record, conditions)? {
            Flow::Continue => {}
            Flow::Stop => break,
        }
    }
    Ok(())
}

fn step(
    token: &str,
    cursor: &mut TokenCursor<'_>,
    record: &mut LogRecord,
    conditions: &mut Vec<Condition>,
) -> Result<Flow, ParseError> {
    match Keyword::classify(token) {
        Keyword::Warning => {
            while let Some(skipped) = cursor.pop() {
                if skipped == WARNING_END {
                    break;
                }
            }
        }

        Keyword::KillCursors => {
            record.namespace = next_owned(cursor);
            record.command = Some(token.to_string());
        }

        Keyword::Command => {
            record.namespace = next_owned(cursor);
            // `command:` separator
            cursor.pop();
            record.command = next_owned(cursor);
            record.query_str = extract_span(cursor)?;
        }

        Keyword::Query => {
            record.namespace = next_owned(cursor);
            record.command = next_owned(cursor);
            record.query_str = extract_span(cursor)?;
        }

        Keyword::GetMore => {
            record.namespace = next_owned(cursor);
            record.command = Some(token.to_string());
            if cursor.peek().is_some_and(|next| next != "planSummary:") {
                cursor.pop();
                record.query_str = extract_span(cursor)?;
            }
        }

        Keyword::ServerStatus => {
            record.command = Some(token.to_string());
            return Ok(Flow::Stop);
        }

        Keyword::PlanSummary => {
            record.query_plan = next_owned(cursor);
            if record.query_plan.as_deref() == Some(INDEX_SCAN) {
                record.query_index = extract_span(cursor)?;
            }
        }

        Keyword::IndexScan => {
            if let Some(span) = extract_span(cursor)? {
                push_index(record, span);
            }
        }

        Keyword::Locks => {
            cursor.push_front("{");
            if let Some(span) = extract_span(cursor)? {
                match parse_lock_block(&span) {
                    Ok(locks) => record.locks = Some(locks),
                    Err(e) => {
                        tracing::warn!(error = %e, span = %span, "Failed to parse lock block");
                        conditions.push(Condition::LockBlockParseFailure(e.to_string()));
                    }
                }
            }
        }

        Keyword::Exception => {
            let mut exception = String::from(token);
            while let Some(part) = cursor.pop() {
                exception.push(' ');
                exception.push_str(part);
                if is_error_code(part) {
                    break;
                }
            }
            record.exception = Some(exception);
        }

        Keyword::Other => match match_field(token) {
            Some((key, value)) => record.fields.set(key, value),
            None => {
                tracing::trace!(token, "Unrecognized fragment");
                record.push_error(token);
                conditions.push(Condition::UnrecognizedFragment(token.to_string()));
            }
        },
    }

    Ok(Flow::Continue)
}

fn next_owned(cursor: &mut TokenCursor<'_>) -> Option<String> {
    cursor.pop().map(str::to_string)
}

/// Record a repeated index span unless it repeats the primary index or the
/// most recently appended one.
///
/// Only `planSummary:` sets `query_index`; a bare `IXSCAN` never promotes
/// itself to it, so without a plan summary only `query_index_more` fills.
fn push_index(record: &mut LogRecord, span: String) {
    if record.query_index.as_deref() == Some(span.as_str()) {
        return;
    }
    let more = record.query_index_more.get_or_insert_with(Vec::new);
    if more.last() != Some(&span) {
        more.push(span);
    }
}

/// `code:<digits>`
fn is_error_code(token: &str) -> bool {
    token
        .strip_prefix("code:")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::model::FieldValue;

    fn run(message: &str) -> Result<(LogRecord, Vec<Condition>), ParseError> {
        let tokens: Vec<&str> = message.split_whitespace().collect();
        let mut cursor = TokenCursor::new(&tokens);
        let mut record = LogRecord::default();
        let mut conditions = Vec::new();
        dispatch(&mut cursor, &mut record, &mut conditions)?;
        Ok((record, conditions))
    }

    #[test]
    fn test_classify() {
        assert_eq!(Keyword::classify("warning:"), Keyword::Warning);
        assert_eq!(Keyword::classify("IXSCAN"), Keyword::IndexScan);
        assert_eq!(Keyword::classify("locks:{"), Keyword::Locks);
        assert_eq!(Keyword::classify("locks:"), Keyword::Other);
        assert_eq!(Keyword::classify("Command"), Keyword::Other);
    }

    #[test]
    fn test_command_find() {
        let (record, conditions) = run(
            "command test.users command: find { find: \"users\", filter: { a: 1 } } \
             planSummary: COLLSCAN keysExamined:0 docsExamined:12 protocol:op_command",
        )
        .unwrap();

        assert_eq!(record.namespace.as_deref(), Some("test.users"));
        assert_eq!(record.command.as_deref(), Some("find"));
        assert_eq!(
            record.query_str.as_deref(),
            Some("{ find: \"users\", filter: { a: 1 } }")
        );
        assert_eq!(record.query_plan.as_deref(), Some("COLLSCAN"));
        assert_eq!(record.query_index, None);
        assert_eq!(record.field("docsExamined"), Some(&FieldValue::Int(12)));
        assert_eq!(
            record.field("protocol"),
            Some(&FieldValue::Str("op_command".to_string()))
        );
        assert!(conditions.is_empty());
    }

    #[test]
    fn test_command_without_body() {
        let (record, _) = run("command admin.$cmd command: isMaster keysExamined:0").unwrap();
        assert_eq!(record.command.as_deref(), Some("isMaster"));
        assert_eq!(record.query_str, None);
        assert_eq!(record.field("keysExamined"), Some(&FieldValue::Int(0)));
    }

    #[test]
    fn test_query() {
        let (record, _) = run("query keepdb.users query: { name: \"x\" } planSummary: COLLSCAN").unwrap();
        assert_eq!(record.namespace.as_deref(), Some("keepdb.users"));
        assert_eq!(record.command.as_deref(), Some("query:"));
        assert_eq!(record.query_str.as_deref(), Some("{ name: \"x\" }"));
    }

    #[test]
    fn test_killcursors() {
        let (record, _) = run("killcursors test.users numYields:0").unwrap();
        assert_eq!(record.namespace.as_deref(), Some("test.users"));
        assert_eq!(record.command.as_deref(), Some("killcursors"));
        assert_eq!(record.field("numYields"), Some(&FieldValue::Int(0)));
    }

    #[test]
    fn test_getmore_with_body() {
        let (record, _) = run(
            "getmore test.users query: { a: 1 } planSummary: IXSCAN { a: 1 } cursorid:123",
        )
        .unwrap();

        assert_eq!(record.command.as_deref(), Some("getmore"));
        assert_eq!(record.query_str.as_deref(), Some("{ a: 1 }"));
        assert_eq!(record.query_plan.as_deref(), Some("IXSCAN"));
        assert_eq!(record.query_index.as_deref(), Some("{ a: 1 }"));
        assert_eq!(record.field("cursorid"), Some(&FieldValue::Int(123)));
    }

    #[test]
    fn test_getmore_straight_to_plan_summary() {
        let (record, _) = run("getmore test.users planSummary: COLLSCAN").unwrap();
        assert_eq!(record.query_str, None);
        assert_eq!(record.query_plan.as_deref(), Some("COLLSCAN"));
    }

    #[test]
    fn test_server_status_stops_dispatch() {
        let (record, conditions) = run("serverStatus was very slow: { after: 1 }").unwrap();
        assert_eq!(record.command.as_deref(), Some("serverStatus"));
        assert_eq!(record.errors, None);
        assert!(record.fields.is_empty());
        assert!(conditions.is_empty());
    }

    #[test]
    fn test_warning_is_skipped() {
        let (record, _) = run(
            "warning: log line attempted (16kB) over max size (10kB), printing beginning ... \
             command test.big command: insert { a: 1 }",
        )
        .unwrap();

        assert_eq!(record.errors, None);
        assert_eq!(record.command.as_deref(), Some("insert"));
    }

    #[test]
    fn test_warning_without_marker_consumes_rest() {
        let (record, _) = run("warning: truncated forever").unwrap();
        assert_eq!(record, LogRecord::default());
    }

    #[test]
    fn test_repeated_index_scans() {
        let (record, _) = run(
            "planSummary: IXSCAN { a: 1 }, IXSCAN { b: 1 }, IXSCAN { b: 1 }, IXSCAN { a: 1 }, IXSCAN { c: 1 }",
        )
        .unwrap();

        assert_eq!(record.query_index.as_deref(), Some("{ a: 1 }"));
        assert_eq!(
            record.query_index_more,
            Some(vec!["{ b: 1 }".to_string(), "{ c: 1 }".to_string()])
        );
    }

    #[test]
    fn test_single_index_scan_has_no_more() {
        let (record, _) = run("planSummary: IXSCAN { a: 1 }, IXSCAN { a: 1 }").unwrap();
        assert_eq!(record.query_index.as_deref(), Some("{ a: 1 }"));
        assert_eq!(record.query_index_more, None);
    }

    #[test]
    fn test_index_scan_without_plan_summary_only_fills_more() {
        let (record, _) = run("IXSCAN { a: 1 }, IXSCAN { b: 1 }").unwrap();

        assert_eq!(record.query_plan, None);
        assert_eq!(record.query_index, None);
        assert_eq!(
            record.query_index_more,
            Some(vec!["{ a: 1 }".to_string(), "{ b: 1 }".to_string()])
        );
    }

    #[test]
    fn test_locks_block() {
        let (record, conditions) = run(
            "numYields:0 locks:{ Global: { acquireCount: { r: 2 } }, Database: { acquireCount: { r: 1 } } } protocol:op_query",
        )
        .unwrap();

        let locks = record.locks.expect("locks parsed");
        assert_eq!(locks["Global"]["acquireCount"]["r"], 2);
        assert_eq!(locks["Database"]["acquireCount"]["r"], 1);
        assert_eq!(
            record.fields.get("protocol"),
            Some(&FieldValue::Str("op_query".to_string()))
        );
        assert!(conditions.is_empty());
    }

    #[test]
    fn test_unparseable_locks_block_is_non_fatal() {
        let (record, conditions) = run("locks:{ Global: [ } reslen:10").unwrap();

        assert_eq!(record.locks, None);
        assert_eq!(record.field("reslen"), Some(&FieldValue::Int(10)));
        assert!(matches!(conditions.as_slice(), [Condition::LockBlockParseFailure(_)]));
    }

    #[test]
    fn test_exception_runs_through_code() {
        let (record, _) = run(
            "exception: E11000 duplicate key error index: test.users.$_id_ dup key: { : 1 } code:11000 numYields:0",
        )
        .unwrap();

        assert_eq!(
            record.exception.as_deref(),
            Some("exception: E11000 duplicate key error index: test.users.$_id_ dup key: { : 1 } code:11000")
        );
        assert_eq!(record.field("numYields"), Some(&FieldValue::Int(0)));
        assert_eq!(record.field("code"), None);
    }

    #[test]
    fn test_exception_without_code_consumes_rest() {
        let (record, _) = run("exception: something broke").unwrap();
        assert_eq!(record.exception.as_deref(), Some("exception: something broke"));
    }

    #[test]
    fn test_unrecognized_fragments_accumulate() {
        let (record, conditions) = run("hello $weird: nreturned:1").unwrap();

        assert_eq!(record.errors.as_deref(), Some(" hello $weird:"));
        assert_eq!(record.field("nreturned"), Some(&FieldValue::Int(1)));
        assert_eq!(
            conditions,
            vec![
                Condition::UnrecognizedFragment("hello".to_string()),
                Condition::UnrecognizedFragment("$weird:".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_body_is_fatal() {
        let err = run("command test.users command: find { filter: { a: 1 }").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedBrace { .. }));
    }

    #[test]
    fn test_keyword_at_end_of_stream() {
        let (record, _) = run("command").unwrap();
        assert_eq!(record.namespace, None);
        assert_eq!(record.command, None);

        let (record, _) = run("planSummary:").unwrap();
        assert_eq!(record.query_plan, None);
    }
}
