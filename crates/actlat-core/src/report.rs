//! Report rendering.
//!
//! The pipeline talks to a [`ReportSink`]; [`TableReport`] renders the
//! aligned text table the analyzer has always printed and [`JsonReport`]
//! writes one JSON object per line for scripting.
//!
//! # Table layout
//!
//! ```text
//! slice whole %>1ms %>8ms %>64ms  SSD-only %>1ms %>8ms %>64ms
//! -------------------------------------------------------------
//!   1         1.95  0.31  0.00             0.88  0.02  0.00
//! ...
//! -------------------------------------------------------------
//! avg         1.97  0.31  0.00             0.90  0.02  0.00
//! max         2.11  0.36  0.00             1.02  0.03  0.00
//!
//! Analyzed Test Duration: 86400 seconds
//! ```

use std::io::{self, Write};

use serde::Serialize;

use crate::aggregator::Summary;
use crate::config::{AnalyzerConfig, OutputFormat};
use crate::tail::{ClassTails, TailVector};
use crate::window::Window;

/// Which tail entries become printed columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub buckets: usize,
    pub skip_buckets: usize,
}

impl ColumnLayout {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self { buckets: config.buckets, skip_buckets: config.skip_buckets.max(1) }
    }

    pub fn num_columns(&self) -> usize {
        (self.buckets.saturating_sub(1)) / self.skip_buckets + 1
    }

    /// Tail indices shown, left to right.
    pub fn indices(&self) -> impl Iterator<Item = usize> + use<> {
        let stride = self.skip_buckets;
        (0..self.num_columns()).map(move |c| c * stride)
    }

    /// Threshold in ms for every printed column.
    pub fn thresholds_ms(&self) -> Vec<u64> {
        self.indices().map(|k| 1u64 << k).collect()
    }
}

/// Receives the report stream from the pipeline.
pub trait ReportSink {
    fn begin(&mut self) -> io::Result<()>;
    fn window(&mut self, slice: u64, window: &Window, tails: &ClassTails) -> io::Result<()>;
    fn finish(&mut self, summary: &Summary) -> io::Result<()>;
}

/// Build the sink for `format` writing to `out`.
pub fn make_sink<'a, W: Write + 'a>(format: OutputFormat, layout: ColumnLayout, out: W) -> Box<dyn ReportSink + 'a> {
    match format {
        OutputFormat::Table => Box::new(TableReport::new(layout, out)),
        OutputFormat::Json => Box::new(JsonReport::new(layout, out)),
    }
}

// ---------------------------------------------------------------------------
// Text table
// ---------------------------------------------------------------------------

pub struct TableReport<W> {
    layout: ColumnLayout,
    out: W,
}

impl<W: Write> TableReport<W> {
    pub fn new(layout: ColumnLayout, out: W) -> Self {
        Self { layout, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn separator(&self) -> String {
        let mut line = "-".repeat(19);
        line.push_str(&"-".repeat(14 * self.layout.num_columns()));
        line
    }

    /// Leading pad before column `c`; wider from the 6th and 9th columns on.
    fn column_pad(c: usize) -> &'static str {
        match c {
            0..=4 => "  ",
            5..=7 => "   ",
            _ => "    ",
        }
    }

    fn push_block(&self, line: &mut String, tail: &TailVector) {
        for (c, k) in self.layout.indices().enumerate() {
            line.push_str(Self::column_pad(c));
            line.push_str(&format!("{:.2}", tail.values().get(k).copied().unwrap_or(0.0)));
        }
    }

    fn write_row(&mut self, label: &str, tails: &ClassTails) -> io::Result<()> {
        let mut line = format!("{label:>3}       ");
        self.push_block(&mut line, &tails.reads);
        line.push_str("          ");
        if self.layout.buckets > 4 {
            line.push(' ');
        }
        if self.layout.buckets > 7 {
            line.push(' ');
        }
        self.push_block(&mut line, &tails.raw_reads);
        writeln!(self.out, "{line}")
    }
}

impl<W: Write> ReportSink for TableReport<W> {
    fn begin(&mut self) -> io::Result<()> {
        let thresholds = self.layout.thresholds_ms();
        let block: String = thresholds.iter().map(|t| format!(" %>{t}ms")).collect();
        writeln!(self.out, "slice whole{block}  SSD-only{block}")?;
        let sep = self.separator();
        writeln!(self.out, "{sep}")
    }

    fn window(&mut self, slice: u64, _window: &Window, tails: &ClassTails) -> io::Result<()> {
        self.write_row(&slice.to_string(), tails)
    }

    fn finish(&mut self, summary: &Summary) -> io::Result<()> {
        let sep = self.separator();
        writeln!(self.out, "{sep}")?;
        self.write_row("avg", &summary.avg)?;
        self.write_row("max", &summary.max)?;
        writeln!(self.out)?;
        writeln!(self.out, "Analyzed Test Duration: {} seconds", summary.duration_sec)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

// ---------------------------------------------------------------------------
// JSON lines
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JsonLine<'a> {
    Header { thresholds_ms: Vec<u64> },
    Window { slice: u64, start_sec: u64, end_sec: u64, reads: &'a TailVector, raw_reads: &'a TailVector },
    Summary(&'a Summary),
}

pub struct JsonReport<W> {
    layout: ColumnLayout,
    out: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(layout: ColumnLayout, out: W) -> Self {
        Self { layout, out }
    }

    fn emit(&mut self, line: &JsonLine<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, line)?;
        writeln!(self.out)
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn begin(&mut self) -> io::Result<()> {
        // Every tail entry is emitted, not just the strided table columns.
        let thresholds_ms = (0..self.layout.buckets).map(|k| 1u64 << k).collect();
        self.emit(&JsonLine::Header { thresholds_ms })
    }

    fn window(&mut self, slice: u64, window: &Window, tails: &ClassTails) -> io::Result<()> {
        self.emit(&JsonLine::Window {
            slice,
            start_sec: window.start_sec,
            end_sec: window.end_sec,
            reads: &tails.reads,
            raw_reads: &tails.raw_reads,
        })
    }

    fn finish(&mut self, summary: &Summary) -> io::Result<()> {
        self.emit(&JsonLine::Summary(summary))?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::BucketHistogram;
    use crate::window::ClassDelta;

    fn tails(reads: &[f64], raw: &[f64]) -> ClassTails {
        ClassTails { reads: TailVector::from_values(reads.to_vec()), raw_reads: TailVector::from_values(raw.to_vec()) }
    }

    fn window() -> Window {
        let zero = BucketHistogram::new().diff(&BucketHistogram::new());
        let d = ClassDelta { total: 0, buckets: zero };
        Window { start_sec: 0, end_sec: 180, raw_reads: d, reads: d }
    }

    #[test]
    fn column_layout_strides() {
        let l = ColumnLayout { buckets: 7, skip_buckets: 3 };
        assert_eq!(l.num_columns(), 3);
        assert_eq!(l.indices().collect::<Vec<_>>(), vec![0, 3, 6]);
        assert_eq!(l.thresholds_ms(), vec![1, 8, 64]);

        let l = ColumnLayout { buckets: 4, skip_buckets: 1 };
        assert_eq!(l.thresholds_ms(), vec![1, 2, 4, 8]);
    }

    #[test]
    fn table_matches_historical_layout() {
        let layout = ColumnLayout { buckets: 7, skip_buckets: 3 };
        let mut report = TableReport::new(layout, Vec::new());
        report.begin().unwrap();
        let t = tails(&[1.95, 1.0, 0.5, 0.31, 0.2, 0.1, 0.0], &[0.88, 0.5, 0.2, 0.02, 0.0, 0.0, 0.0]);
        report.window(1, &window(), &t).unwrap();
        let summary = Summary { windows: 1, avg: t.clone(), max: t.clone(), duration_sec: 180 };
        report.finish(&summary).unwrap();

        let text = String::from_utf8(report.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "slice whole %>1ms %>8ms %>64ms  SSD-only %>1ms %>8ms %>64ms");
        assert_eq!(lines[1], "-".repeat(19 + 14 * 3));
        assert_eq!(lines[2], "  1         1.95  0.31  0.00             0.88  0.02  0.00");
        assert_eq!(lines[3], lines[1]);
        assert_eq!(lines[4], "avg         1.95  0.31  0.00             0.88  0.02  0.00");
        assert!(lines[5].starts_with("max "));
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "Analyzed Test Duration: 180 seconds");
        assert!(text.ends_with("seconds\n\n"));
    }

    #[test]
    fn wide_tables_pad_later_columns() {
        let layout = ColumnLayout { buckets: 9, skip_buckets: 1 };
        let mut report = TableReport::new(layout, Vec::new());
        let t = tails(&[0.0; 9], &[0.0; 9]);
        report.window(12, &window(), &t).unwrap();
        let text = String::from_utf8(report.into_inner()).unwrap();
        let expected_block = "  0.00  0.00  0.00  0.00  0.00   0.00   0.00   0.00    0.00";
        assert_eq!(text, format!(" 12       {expected_block}            {expected_block}\n"));
    }

    #[test]
    fn json_lines_are_tagged() {
        let layout = ColumnLayout { buckets: 2, skip_buckets: 1 };
        let mut out = Vec::new();
        {
            let mut sink = make_sink(OutputFormat::Json, layout, &mut out);
            sink.begin().unwrap();
            let t = tails(&[3.5, 1.25], &[0.5, 0.0]);
            sink.window(1, &window(), &t).unwrap();
            sink.finish(&Summary { windows: 1, avg: t.clone(), max: t, duration_sec: 180 }).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["kind"], "header");
        assert_eq!(lines[0]["thresholds_ms"], serde_json::json!([1, 2]));
        assert_eq!(lines[1]["kind"], "window");
        assert_eq!(lines[1]["end_sec"], 180);
        assert_eq!(lines[1]["reads"], serde_json::json!([3.5, 1.25]));
        assert_eq!(lines[2]["kind"], "summary");
        assert_eq!(lines[2]["duration_sec"], 180);
        assert_eq!(lines[2]["avg"]["raw_reads"], serde_json::json!([0.5, 0.0]));
    }
}
