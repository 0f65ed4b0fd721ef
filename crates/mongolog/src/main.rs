//! mongolog: parse MongoDB diagnostic logs into JSON lines.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use mongolog::conf::ErrorPolicy;
use mongolog::runtime::{self, boot, JsonLinesSink};

#[derive(Parser)]
#[command(name = "mongolog")]
#[command(about = "Parse MongoDB diagnostic log lines into JSON records")]
#[command(version)]
struct Cli {
    /// Log file to read (reads stdin if not provided or `-`)
    path: Option<PathBuf>,

    /// TOML config file (default: $MONGOLOG_CONFIG_FILE or /etc/mongolog/mongolog.toml)
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// What to do with a line that fails to parse (overrides config)
    #[arg(short = 'e', long = "on-error", value_enum)]
    on_error: Option<ErrorPolicy>,

    /// Keep query strings exactly as captured
    #[arg(long = "no-normalize")]
    no_normalize: bool,

    /// Print the run summary and parsing metrics as JSON to stderr when done
    #[arg(long = "stats")]
    stats: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    let cli = Cli::parse();

    let overrides = boot::Overrides {
        on_error: cli.on_error,
        no_normalize: cli.no_normalize,
    };
    let config = boot::load_config(cli.config.as_deref(), &overrides)?;
    let parser = boot::build_parser(&config);
    let source = boot::open_source(cli.path.as_deref())?;

    let stdout = io::stdout();
    let mut sink = JsonLinesSink::new(io::BufWriter::new(stdout.lock()));

    let result = runtime::run(&parser, source, &mut sink, config.on_error);

    if cli.stats {
        let report = serde_json::json!({
            "run": result.as_ref().ok(),
            "metrics": parser.metrics().snapshot(),
        });
        eprintln!("{}", report);
    }

    let summary = result?;
    tracing::info!(
        "Done: {} records, {} failed, {} blank of {} lines",
        summary.records_emitted, summary.lines_failed, summary.blank_lines, summary.lines_read
    );
    Ok(())
}
