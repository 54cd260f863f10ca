//! Aligns the log's native sampling period with the requested report interval.
//!
//! The exerciser writes a section every `p` seconds. A report window of `t`
//! seconds therefore spans `t / p` sections, and [`IntervalStepper::step`]
//! hops that many headers at a time, parsing only the section it lands on.

use std::io::BufRead;

use tracing::debug;

use crate::error::{AnalyzerError, Result};
use crate::scanner::SnapshotScanner;
use crate::snapshot::Snapshot;

/// Windows shorter than this many native periods are rejected.
pub const MIN_PERIODS_PER_WINDOW: u64 = 3;

/// How the requested interval maps onto log sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    /// Seconds between two consecutive sections in the log.
    pub native_period: u64,
    /// Requested report interval in seconds.
    pub interval_secs: u64,
    /// Sections per report window.
    pub skip: u64,
}

impl Alignment {
    /// Validate `interval_secs` against the log's `native_period`.
    pub fn resolve(native_period: u64, interval_secs: u64) -> Result<Self> {
        if native_period == 0 {
            return Err(AnalyzerError::Config("log sampling period is zero".into()));
        }
        if interval_secs == 0 || interval_secs % native_period != 0 {
            return Err(AnalyzerError::Config(format!(
                "time {interval_secs} is not a multiple of the log's {native_period} sec sampling period"
            )));
        }
        let skip = interval_secs / native_period;
        if skip < MIN_PERIODS_PER_WINDOW {
            return Err(AnalyzerError::Config(format!(
                "time {interval_secs} must span at least {MIN_PERIODS_PER_WINDOW} sampling periods of \
                 {native_period} sec"
            )));
        }
        Ok(Self { native_period, interval_secs, skip })
    }
}

/// Steps a [`SnapshotScanner`] over whole groups of sections.
pub struct IntervalStepper<R> {
    scanner: SnapshotScanner<R>,
}

impl<R: BufRead> IntervalStepper<R> {
    pub fn new(scanner: SnapshotScanner<R>) -> Self {
        Self { scanner }
    }

    /// Return the snapshot at the `skip`-th header from the current position
    /// (1-indexed), skipping the sections before it unparsed.
    ///
    /// `Ok(None)` means the stream ran out first. `skip == 0` is treated as 1.
    pub fn step(&mut self, skip: u64) -> Result<Option<Snapshot>> {
        for _ in 1..skip {
            let Some(time_sec) = self.scanner.skip_section()? else {
                debug!(skip, "stream exhausted while stepping");
                return Ok(None);
            };
            debug!(time_sec, "skipped section");
        }
        self.scanner.next_snapshot()
    }

    pub fn line_no(&self) -> u64 {
        self.scanner.line_no()
    }
}
