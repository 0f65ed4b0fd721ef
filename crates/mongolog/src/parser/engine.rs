use std::sync::Arc;
use std::time::Instant;

use super::cursor::TokenCursor;
use super::dispatch::dispatch;
use super::header;
use super::metrics::{LineKind, MetricErrorType, ParsingMetrics};
use super::normalize::Normalizer;
use super::traits::*;
use crate::conf::ParserConfig;

/// Message type that is run through the command dispatcher.
pub const COMMAND_TYPE: &str = "COMMAND";

/// Parser for MongoDB-style diagnostic log lines.
///
/// Stateless per line: one instance can be shared across threads, each call
/// owns its own token stream and record. Only the metrics are shared.
pub struct MongoLogParser {
    config: ParserConfig,
    normalizer: Option<Normalizer>,
    metrics: Arc<ParsingMetrics>,
}

impl MongoLogParser {
    pub fn new(config: ParserConfig) -> Self {
        Self::with_metrics(config, Arc::new(ParsingMetrics::new()))
    }

    pub fn with_metrics(config: ParserConfig, metrics: Arc<ParsingMetrics>) -> Self {
        let normalizer = if config.normalize_queries {
            match Normalizer::new() {
                Ok(normalizer) => Some(normalizer),
                Err(e) => {
                    tracing::warn!("Query normalization disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            config,
            normalizer,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<ParsingMetrics> {
        &self.metrics
    }

    /// Parse one line of text.
    pub fn parse_line(&self, line: &str) -> Result<ParsedLine, ParseError> {
        let start = Instant::now();

        let result = if line.len() > self.config.max_line_size {
            Err(ParseError::LineTooLarge(line.len(), self.config.max_line_size))
        } else {
            self.build(line)
        };

        match &result {
            Ok(parsed) => {
                let kind = if parsed.record.kind == COMMAND_TYPE {
                    LineKind::Command
                } else {
                    LineKind::Text
                };
                self.metrics.record_parse(kind, start.elapsed().as_nanos() as u64);
                for condition in &parsed.conditions {
                    self.metrics.record_condition(condition);
                }
            }
            Err(e) => self.metrics.record_error(MetricErrorType::from(e)),
        }

        result
    }

    fn build(&self, line: &str) -> Result<ParsedLine, ParseError> {
        let header = header::extract(line)?;

        let mut record = LogRecord {
            time: header.time.to_string(),
            level: header.level.to_string(),
            kind: header.kind.to_string(),
            session: header.session.to_string(),
            duration: header.duration,
            ..Default::default()
        };
        let mut conditions = Vec::new();
        let mut cursor = TokenCursor::new(&header.message);

        if header.kind != COMMAND_TYPE {
            record.text = Some(cursor.rest_joined().trim().to_string());
            return Ok(ParsedLine { record, conditions });
        }

        dispatch(&mut cursor, &mut record, &mut conditions)?;

        if self.config.normalize_queries {
            if let Some(outcome) = record.query_str.as_deref().map(|q| self.normalize(q)) {
                match outcome {
                    Ok(normalized) => record.query_str = Some(normalized),
                    Err(reason) => {
                        tracing::debug!("Keeping raw query_str: {}", reason);
                        conditions.push(Condition::NormalizationSkipped(reason));
                    }
                }
            }
        }

        Ok(ParsedLine { record, conditions })
    }

    fn normalize(&self, query: &str) -> Result<String, String> {
        let normalizer = self
            .normalizer
            .as_ref()
            .ok_or_else(|| "normalizer unavailable".to_string())?;
        normalizer.normalize(query).map_err(|e| e.to_string())
    }
}

impl Default for MongoLogParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl LogParser for MongoLogParser {
    fn parse(&self, raw: &[u8]) -> Result<ParsedLine, ParseError> {
        match std::str::from_utf8(raw) {
            Ok(line) => self.parse_line(line),
            Err(_) => {
                let err = ParseError::NonUtf8;
                self.metrics.record_error(MetricErrorType::from(&err));
                Err(err)
            }
        }
    }
}
