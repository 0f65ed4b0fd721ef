//! Runtime module — process lifecycle: logging, config, the line loop and
//! the record sink.

pub mod boot;
pub mod run;
pub mod sink;

use thiserror::Error;

use crate::conf::ConfigError;
use crate::parser::ParseError;

pub use run::{run, RunSummary};
pub use sink::{JsonLinesSink, RecordSink};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Aborted at line {line}: {source}")]
    Aborted {
        line: usize,
        #[source]
        source: ParseError,
    },
}
