//! Run — the line loop: source → parser → sink.

use std::io::BufRead;

use serde::Serialize;
use tracing::{debug, warn};

use crate::conf::ErrorPolicy;
use crate::parser::{LogParser, MongoLogParser};
use super::sink::RecordSink;
use super::RunError;

/// Per-run line accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub lines_read: usize,
    pub blank_lines: usize,
    pub records_emitted: usize,
    pub lines_failed: usize,
}

/// Parse every line of `source` and hand each record to `sink`.
///
/// Blank lines are skipped. A line that fails to parse is reported and
/// either skipped or ends the run, depending on `policy`.
pub fn run<R, S>(
    parser: &MongoLogParser,
    source: R,
    sink: &mut S,
    policy: ErrorPolicy,
) -> Result<RunSummary, RunError>
where
    R: BufRead,
    S: RecordSink,
{
    let mut summary = RunSummary::default();

    for (idx, line) in source.split(b'\n').enumerate() {
        let mut line = line?;
        let line_no = idx + 1;
        summary.lines_read += 1;

        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.iter().all(|b| b.is_ascii_whitespace()) {
            summary.blank_lines += 1;
            continue;
        }

        match parser.parse(&line) {
            Ok(parsed) => {
                for condition in &parsed.conditions {
                    debug!(line = line_no, condition = condition.as_str(), "Partial record");
                }
                sink.emit(&parsed.record)?;
                summary.records_emitted += 1;
            }
            Err(e) => {
                summary.lines_failed += 1;
                warn!(line = line_no, error = %e, "Failed to parse line");
                if policy == ErrorPolicy::Abort {
                    sink.flush()?;
                    return Err(RunError::Aborted { line: line_no, source: e });
                }
            }
        }
    }

    sink.flush()?;
    Ok(summary)
}
