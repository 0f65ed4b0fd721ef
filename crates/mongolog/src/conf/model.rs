//! Model — Config and related structs.

use serde::{Deserialize, Serialize};

use crate::parser::MAX_LINE_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub on_error: ErrorPolicy,
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Lines longer than this many bytes are rejected
    pub max_line_size: usize,
    /// Collapse `$in` lists and ObjectId literals in `query_str`
    pub normalize_queries: bool,
}

/// What the runner does when a line fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Report the line and continue with the next one
    Skip,
    /// Stop the run at the first failed line
    Abort,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::Skip,
            parser: ParserConfig::default(),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_line_size: MAX_LINE_SIZE,
            normalize_queries: true,
        }
    }
}

impl ParserConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_line_size == 0 {
            return Err("parser.max_line_size must be > 0".to_string());
        }
        Ok(())
    }
}

impl std::str::FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(ErrorPolicy::Skip),
            "abort" => Ok(ErrorPolicy::Abort),
            other => Err(format!("unknown error policy: {}", other)),
        }
    }
}
