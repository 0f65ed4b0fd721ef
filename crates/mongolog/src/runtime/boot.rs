//! Boot — logging init, config load, parser and I/O construction.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{info, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::{Config, ErrorPolicy};
use crate::parser::MongoLogParser;
use super::RunError;

/// Initialise the tracing / logging subsystem.
///
/// Logs go to stderr; stdout carries the records.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mongolog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Command-line settings that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub on_error: Option<ErrorPolicy>,
    pub no_normalize: bool,
}

/// Load config and apply command-line overrides.
pub fn load_config(path: Option<&str>, overrides: &Overrides) -> Result<Config, RunError> {
    let mut config = Config::load(path)?;

    if let Some(policy) = overrides.on_error {
        config.on_error = policy;
    }
    if overrides.no_normalize {
        config.parser.normalize_queries = false;
    }

    info!(
        "Parser settings: max_line_size={}, normalize_queries={}, on_error={:?}",
        config.parser.max_line_size, config.parser.normalize_queries, config.on_error
    );
    Ok(config)
}

pub fn build_parser(config: &Config) -> MongoLogParser {
    MongoLogParser::new(config.parser.clone())
}

/// Open the line source: a file path, or stdin for `None` / `-`.
pub fn open_source(path: Option<&Path>) -> Result<Box<dyn BufRead>, RunError> {
    match path {
        Some(p) if p != Path::new("-") => {
            info!("Reading log lines from: {}", p.display());
            let file = File::open(p).map_err(|e| {
                error!("Failed to open {}: {}", p.display(), e);
                e
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => {
            info!("Reading log lines from stdin");
            Ok(Box::new(BufReader::new(io::stdin())))
        }
    }
}
