//! End-to-end analysis run.
//!
//! # Flow
//!
//! ```text
//! header 1 ─┐
//! header 2 ─┴─► native period ─► Alignment (skip = time / period)
//! header 2 ───────────────► header 1+skip          window 1
//! header 1+skip ──────────► header 1+2·skip        window 2
//! ...                                              until the log runs out
//! ```
//!
//! Header 1 only serves to measure the sampling period, so the first window
//! covers `skip - 1` periods and every later one covers `skip`.
//!
//! Each window is differenced, checked for counts going backwards, turned into
//! tail percentages, folded into the rolling aggregator and handed to the
//! report sink. The summary is emitted once the stream is exhausted.

use std::io::BufRead;

use tracing::{debug, info, warn};

use crate::aggregator::{RollingAggregator, Summary};
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, Result};
use crate::report::ReportSink;
use crate::scanner::SnapshotScanner;
use crate::snapshot::{OpClass, Snapshot};
use crate::stepper::{Alignment, IntervalStepper};
use crate::tail::ClassTails;
use crate::window::Window;

pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Fails with [`AnalyzerError::Config`] if `config` is out of range.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze the whole log, streaming rows into `sink`.
    ///
    /// Nothing reaches the sink until the first window is complete, so a
    /// configuration or insufficient-data failure produces no output at all.
    pub fn run<R: BufRead, S: ReportSink + ?Sized>(&self, reader: R, sink: &mut S) -> Result<Summary> {
        let mut stepper = IntervalStepper::new(SnapshotScanner::new(reader));

        let first = require_snapshot(stepper.step(1)?, "no 'After <N> sec:' section found")?;
        let second = require_snapshot(stepper.step(1)?, "log holds a single section")?;
        let alignment = Alignment::resolve(second.time_sec - first.time_sec, self.config.interval_secs)?;
        info!(
            native_period = alignment.native_period,
            interval_secs = alignment.interval_secs,
            skip = alignment.skip,
            "interval aligned"
        );

        // Two sections are already consumed, so the first window's end lies
        // skip - 1 headers past the second one.
        let Some(end) = stepper.step(alignment.skip - 1)? else {
            return Err(AnalyzerError::InsufficientData { interval_secs: alignment.interval_secs });
        };

        let mut agg = RollingAggregator::new();
        let mut start = second;
        let mut end = end;
        let mut slice = 1;
        sink.begin()?;

        loop {
            let (window, tails) = self.process(&start, &end)?;
            sink.window(slice, &window, &tails)?;
            agg.fold(&tails, window.end_sec);

            let Some(next) = stepper.step(alignment.skip)? else {
                debug!(line = stepper.line_no(), "end of log");
                break;
            };
            start = end;
            end = next;
            slice += 1;
        }

        // At least one window was folded above.
        let summary = agg.summary().ok_or(AnalyzerError::InsufficientData { interval_secs: alignment.interval_secs })?;
        info!(windows = summary.windows, duration_sec = summary.duration_sec, "analysis complete");
        sink.finish(&summary)?;
        Ok(summary)
    }

    fn process(&self, start: &Snapshot, end: &Snapshot) -> Result<(Window, ClassTails)> {
        ensure_classes(end)?;
        let window = Window::between(start, end);
        window.ensure_non_negative()?;

        for class in OpClass::ALL {
            if window.class(class).total == 0 {
                warn!(%class, start_sec = window.start_sec, end_sec = window.end_sec, "idle window");
            }
        }

        let tails = ClassTails::from_window(&window, self.config.buckets);
        debug!(
            start_sec = window.start_sec,
            end_sec = window.end_sec,
            reads = window.reads.total,
            raw_reads = window.raw_reads.total,
            "window"
        );
        Ok((window, tails))
    }
}

fn require_snapshot(snap: Option<Snapshot>, reason: &str) -> Result<Snapshot> {
    let snap = snap.ok_or_else(|| AnalyzerError::Malformed { line: 0, reason: reason.to_string() })?;
    ensure_classes(&snap)?;
    Ok(snap)
}

fn ensure_classes(snap: &Snapshot) -> Result<()> {
    if snap.is_empty() {
        return Err(AnalyzerError::MissingClasses { time_sec: snap.time_sec });
    }
    Ok(())
}
