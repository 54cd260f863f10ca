//! Typed error definitions for the latency analyzer.
//!
//! Provides [`AnalyzerError`] for the failure classes a run can hit. All
//! variants implement `std::error::Error` via `thiserror`, so they integrate
//! with `anyhow::Result` in the runner, which downcasts them back to pick an
//! exit code.

use thiserror::Error;

use crate::snapshot::OpClass;

/// Domain-specific errors for the latency analyzer.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Bad option values or an interval that cannot be aligned to the log.
    #[error("config error: {0}")]
    Config(String),

    /// The log could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A header or class line that cannot be parsed.
    #[error("malformed log at line {line}: {reason}")]
    Malformed { line: u64, reason: String },

    /// A section carried neither a `RAW READS` nor a `READS` reading.
    #[error("snapshot at {time_sec} sec has no RAW READS or READS data")]
    MissingClasses { time_sec: u64 },

    /// A cumulative count went backwards between two snapshots.
    #[error(
        "{class} count decreased between {start_sec} sec and {end_sec} sec ({what} delta {delta}); \
         log is corrupted or the run restarted"
    )]
    NegativeDelta {
        class: OpClass,
        start_sec: u64,
        end_sec: u64,
        what: String,
        delta: i128,
    },

    /// The log ends before the first reporting window is complete.
    #[error("not enough data to report a {interval_secs} sec window")]
    InsufficientData { interval_secs: u64 },
}

impl AnalyzerError {
    /// Process exit code for this error class.
    ///
    /// `2` matches clap's usage-error code so every configuration problem
    /// exits the same way.
    pub fn exit_code(&self) -> u8 {
        match self {
            AnalyzerError::Config(_) => 2,
            AnalyzerError::InsufficientData { .. } => 3,
            AnalyzerError::Io(_)
            | AnalyzerError::Malformed { .. }
            | AnalyzerError::MissingClasses { .. }
            | AnalyzerError::NegativeDelta { .. } => 1,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_class() {
        assert_eq!(AnalyzerError::Config("x".into()).exit_code(), 2);
        assert_eq!(AnalyzerError::InsufficientData { interval_secs: 60 }.exit_code(), 3);
        assert_eq!(AnalyzerError::MissingClasses { time_sec: 10 }.exit_code(), 1);
    }

    #[test]
    fn negative_delta_message_names_class() {
        let e = AnalyzerError::NegativeDelta {
            class: OpClass::RawReads,
            start_sec: 60,
            end_sec: 120,
            what: "bucket 03".into(),
            delta: -4,
        };
        let msg = e.to_string();
        assert!(msg.starts_with("RAW READS count decreased"));
        assert!(msg.contains("bucket 03 delta -4"));
    }
}
