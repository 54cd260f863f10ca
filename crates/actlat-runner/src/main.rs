//! # actlat
//!
//! Reports, per time slice of a storage exerciser run, the percentage of
//! reads slower than each power-of-two millisecond threshold, for end-to-end
//! reads and device-level ("SSD-only") raw reads.
//!
//! # Usage
//!
//! ```bash
//! actlat -l actout.txt -t 3600 -b 7 -s 3
//! ```
//!
//! Exit codes: `0` success, `1` unreadable or malformed log, `2` bad options
//! or an interval that does not fit the log, `3` log too short for one window.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use actlat_core::config::{self, AnalyzerConfig, OutputFormat};
use actlat_core::report::{ColumnLayout, make_sink};
use actlat_core::{Analyzer, AnalyzerError};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Table,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Table => OutputFormat::Table,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Latency distribution report for storage exerciser logs.
#[derive(Parser)]
#[command(name = "actlat", about = "Latency distribution report for storage exerciser logs")]
struct Cli {
    /// Exerciser output file (e.g. actout.txt).
    #[arg(short = 'l', long = "log")]
    log: PathBuf,

    /// Number of thresholds to track, 1-16 [default: 7].
    #[arg(short = 'b', long = "buckets")]
    buckets: Option<usize>,

    /// Print every n-th threshold [default: 3].
    #[arg(short = 's', long = "skip_buckets")]
    skip_buckets: Option<usize>,

    /// Report interval in seconds [default: 3600].
    #[arg(short = 't', long = "time")]
    time: Option<u64>,

    /// Output format [default: table].
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// JSON file with default values for the options above.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter for diagnostics on stderr (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Optional log directory for file output.
    #[arg(long)]
    log_dir: Option<String>,
}

impl Cli {
    /// Defaults, then the config file, then explicit flags.
    fn analyzer_config(&self) -> Result<AnalyzerConfig> {
        let mut cfg = AnalyzerConfig::default();
        if let Some(path) = &self.config {
            cfg = cfg.merge_file(&config::load_config(path)?);
            debug!("config file {} applied", path.display());
        }
        if let Some(b) = self.buckets {
            cfg.buckets = b;
        }
        if let Some(s) = self.skip_buckets {
            cfg.skip_buckets = s;
        }
        if let Some(t) = self.time {
            cfg.interval_secs = t;
        }
        if let Some(f) = self.format {
            cfg.format = f.into();
        }
        Ok(cfg)
    }
}

fn run(cli: &Cli) -> Result<()> {
    let cfg = cli.analyzer_config()?;
    let analyzer = Analyzer::new(cfg)?;
    let cfg = analyzer.config();
    info!(
        "analyzing {}: buckets={}, skip_buckets={}, time={}s",
        cli.log.display(),
        cfg.buckets,
        cfg.skip_buckets,
        cfg.interval_secs
    );

    let file = File::open(&cli.log).with_context(|| format!("log file {} not found", cli.log.display()))?;

    // Render into memory first so a failed run never leaves a partial table.
    let mut rendered = Vec::new();
    {
        let mut sink = make_sink(cfg.format, ColumnLayout::from_config(cfg), &mut rendered);
        analyzer.run(BufReader::new(file), sink.as_mut())?;
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&rendered)?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    actlat_core::logging::init_logging(&cli.log_level, cli.log_dir.as_deref(), "actlat");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.downcast_ref::<AnalyzerError>().map_or(1, AnalyzerError::exit_code);
            eprintln!("actlat: {e:#}");
            ExitCode::from(code)
        }
    }
}
