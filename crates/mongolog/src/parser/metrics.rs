use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

use super::model::{Condition, ParseError};

/// Fatal per-line failure categories for metrics recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricErrorType {
    /// Fewer than four header tokens
    Malformed,
    /// Brace span never closed
    Unterminated,
    /// Line exceeded the configured size limit
    TooLarge,
    /// Non-UTF8 content encountered
    NonUtf8,
}

impl From<&ParseError> for MetricErrorType {
    fn from(err: &ParseError) -> Self {
        match err {
            ParseError::MalformedLine(_) => MetricErrorType::Malformed,
            ParseError::UnterminatedBrace { .. } => MetricErrorType::Unterminated,
            ParseError::LineTooLarge(_, _) => MetricErrorType::TooLarge,
            ParseError::NonUtf8 => MetricErrorType::NonUtf8,
        }
    }
}

/// Which path a successfully parsed line took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `COMMAND` line run through the dispatcher
    Command,
    /// Any other type, collapsed into `text`
    Text,
}

/// A wrapper that forces the wrapped data onto its own cache line(s).
///
/// Each counter group is written from whichever thread parsed the line;
/// keeping groups 64-byte aligned prevents false sharing between them.
#[repr(align(64))]
#[derive(Debug, Default)]
pub struct CacheAligned<T>(pub T);

/// Per-path line counters (hottest path - updated per log line)
#[derive(Debug, Default)]
pub struct KindMetrics {
    pub command: AtomicU64,
    pub text: AtomicU64,
}

/// Performance totals (aggregate timing and counts)
#[derive(Debug, Default)]
pub struct TotalMetrics {
    pub time_nanos: AtomicU64,
    pub count: AtomicU64,
}

/// Fatal error counters by type
#[derive(Debug, Default)]
pub struct ErrorMetrics {
    pub malformed: AtomicU64,
    pub unterminated: AtomicU64,
    pub too_large: AtomicU64,
    pub non_utf8: AtomicU64,
}

/// Non-fatal condition counters
#[derive(Debug, Default)]
pub struct ConditionMetrics {
    pub unrecognized_fragments: AtomicU64,
    pub lock_parse_failures: AtomicU64,
    pub normalization_skipped: AtomicU64,
}

/// Metrics for parsing operations.
///
/// All operations use `Ordering::Relaxed`; `snapshot()` reads are not atomic
/// across fields, so totals may be momentarily out of step with each other.
#[derive(Debug, Default)]
pub struct ParsingMetrics {
    pub kinds: CacheAligned<KindMetrics>,
    pub totals: CacheAligned<TotalMetrics>,
    pub errors: CacheAligned<ErrorMetrics>,
    pub conditions: CacheAligned<ConditionMetrics>,
}

impl ParsingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful parse
    #[inline]
    pub fn record_parse(&self, kind: LineKind, time_nanos: u64) {
        self.totals.0.count.fetch_add(1, Ordering::Relaxed);
        self.totals.0.time_nanos.fetch_add(time_nanos, Ordering::Relaxed);

        match kind {
            LineKind::Command => self.kinds.0.command.fetch_add(1, Ordering::Relaxed),
            LineKind::Text => self.kinds.0.text.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Record a fatal parse error
    #[inline]
    pub fn record_error(&self, error_type: MetricErrorType) {
        match error_type {
            MetricErrorType::Malformed => self.errors.0.malformed.fetch_add(1, Ordering::Relaxed),
            MetricErrorType::Unterminated => self.errors.0.unterminated.fetch_add(1, Ordering::Relaxed),
            MetricErrorType::TooLarge => self.errors.0.too_large.fetch_add(1, Ordering::Relaxed),
            MetricErrorType::NonUtf8 => self.errors.0.non_utf8.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Record a non-fatal condition
    #[inline]
    pub fn record_condition(&self, condition: &Condition) {
        let counter = match condition {
            Condition::UnrecognizedFragment(_) => &self.conditions.0.unrecognized_fragments,
            Condition::LockBlockParseFailure(_) => &self.conditions.0.lock_parse_failures,
            Condition::NormalizationSkipped(_) => &self.conditions.0.normalization_skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Create a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_parsed = self.totals.0.count.load(Ordering::Relaxed);
        let total_time_ns = self.totals.0.time_nanos.load(Ordering::Relaxed);

        let malformed_lines = self.errors.0.malformed.load(Ordering::Relaxed);
        let unterminated_braces = self.errors.0.unterminated.load(Ordering::Relaxed);
        let lines_too_large = self.errors.0.too_large.load(Ordering::Relaxed);
        let non_utf8_content = self.errors.0.non_utf8.load(Ordering::Relaxed);

        let total_attempts = total_parsed
            + malformed_lines
            + unterminated_braces
            + lines_too_large
            + non_utf8_content;

        MetricsSnapshot {
            command_lines: self.kinds.0.command.load(Ordering::Relaxed),
            text_lines: self.kinds.0.text.load(Ordering::Relaxed),

            total_parsed,
            avg_parse_time_us: if total_parsed > 0 {
                (total_time_ns as f64 / total_parsed as f64) / 1000.0
            } else {
                0.0
            },

            malformed_lines,
            unterminated_braces,
            lines_too_large,
            non_utf8_content,
            success_rate: if total_attempts > 0 {
                total_parsed as f64 / total_attempts as f64
            } else {
                1.0
            },

            unrecognized_fragments: self.conditions.0.unrecognized_fragments.load(Ordering::Relaxed),
            lock_parse_failures: self.conditions.0.lock_parse_failures.load(Ordering::Relaxed),
            normalization_skipped: self.conditions.0.normalization_skipped.load(Ordering::Relaxed),
        }
    }
}

/// A read-only snapshot of parsing metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    // Lines by path
    pub command_lines: u64,
    pub text_lines: u64,

    // Performance
    pub total_parsed: u64,
    pub avg_parse_time_us: f64,

    // Fatal errors
    pub malformed_lines: u64,
    pub unterminated_braces: u64,
    pub lines_too_large: u64,
    pub non_utf8_content: u64,
    pub success_rate: f64,

    // Non-fatal conditions
    pub unrecognized_fragments: u64,
    pub lock_parse_failures: u64,
    pub normalization_skipped: u64,
}

impl MetricsSnapshot {
    pub fn total_errors(&self) -> u64 {
        self.malformed_lines + self.unterminated_braces + self.lines_too_large + self.non_utf8_content
    }
}
