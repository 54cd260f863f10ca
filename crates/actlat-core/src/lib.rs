//! # actlat-core
//!
//! Latency-distribution analysis of storage exerciser logs. The exerciser
//! prints cumulative power-of-two latency histograms every few seconds; this
//! crate differences them over report windows and reports, per window, the
//! percentage of operations slower than each `2^k` ms threshold.
//!
//! - **Histogram** (`histogram`): fixed 17-bucket cumulative counts
//! - **Snapshot** (`snapshot`): one timestamped reading of both op classes
//! - **Scanner** (`scanner`): forward-only log parser producing snapshots
//! - **Stepper** (`stepper`): interval alignment and multi-section stepping
//! - **Window** (`window`): snapshot differencing and monotonicity checks
//! - **Tail** (`tail`): bucket percentages and tail sums
//! - **Aggregator** (`aggregator`): running smoothed average and maximum
//! - **Report** (`report`): text table and JSON-lines sinks
//! - **Pipeline** (`pipeline`): the end-to-end [`Analyzer`]
//! - **Configuration** (`config`): settings, validation, JSON config file
//! - **Error types** (`error`): domain-specific `AnalyzerError` via thiserror
//! - **Logging** (`logging`): tracing-based structured logging

pub mod aggregator;
pub mod config;
pub mod error;
pub mod histogram;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod scanner;
pub mod snapshot;
pub mod stepper;
pub mod tail;
pub mod window;

pub use config::{AnalyzerConfig, OutputFormat};
pub use error::AnalyzerError;
pub use pipeline::Analyzer;
