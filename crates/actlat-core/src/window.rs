//! Differencing two cumulative snapshots into one reporting window.

use crate::error::{AnalyzerError, Result};
use crate::histogram::BucketDelta;
use crate::snapshot::{OpClass, Snapshot};

/// Per-window counts for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDelta {
    pub total: i128,
    pub buckets: BucketDelta,
}

/// Counts accumulated between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start_sec: u64,
    pub end_sec: u64,
    pub raw_reads: ClassDelta,
    pub reads: ClassDelta,
}

impl Window {
    /// Difference `end - start` for both classes. Total function: deltas are
    /// returned as-is, negative or not. A class absent from a snapshot counts
    /// as all zeros.
    pub fn between(start: &Snapshot, end: &Snapshot) -> Self {
        let delta = |class| {
            let a = start.reading_or_zero(class);
            let b = end.reading_or_zero(class);
            ClassDelta { total: i128::from(b.total) - i128::from(a.total), buckets: b.buckets.diff(&a.buckets) }
        };
        Self {
            start_sec: start.time_sec,
            end_sec: end.time_sec,
            raw_reads: delta(OpClass::RawReads),
            reads: delta(OpClass::Reads),
        }
    }

    pub fn class(&self, class: OpClass) -> &ClassDelta {
        match class {
            OpClass::RawReads => &self.raw_reads,
            OpClass::Reads => &self.reads,
        }
    }

    /// Reject windows where any cumulative count went backwards.
    pub fn ensure_non_negative(&self) -> Result<()> {
        for class in OpClass::ALL {
            let d = self.class(class);
            let bad = if d.total < 0 {
                Some(("total".to_string(), d.total))
            } else {
                d.buckets.first_negative().map(|(idx, delta)| (format!("bucket {idx:02}"), delta))
            };
            if let Some((what, delta)) = bad {
                return Err(AnalyzerError::NegativeDelta {
                    class,
                    start_sec: self.start_sec,
                    end_sec: self.end_sec,
                    what,
                    delta,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::BucketHistogram;
    use crate::snapshot::ClassReading;

    fn snap(time_sec: u64, total: u64, buckets: &[(usize, u64)]) -> Snapshot {
        let mut h = BucketHistogram::new();
        for &(i, c) in buckets {
            h.set(i, c);
        }
        let reading = ClassReading { total, buckets: h };
        Snapshot { time_sec, raw_reads: Some(reading), reads: Some(reading) }
    }

    #[test]
    fn deltas_for_both_classes() {
        let a = snap(60, 100, &[(0, 90), (1, 10)]);
        let b = snap(120, 400, &[(0, 350), (1, 40), (5, 10)]);
        let w = Window::between(&a, &b);
        assert_eq!((w.start_sec, w.end_sec), (60, 120));
        for class in OpClass::ALL {
            let d = w.class(class);
            assert_eq!(d.total, 300);
            assert_eq!(d.buckets.get(0), 260);
            assert_eq!(d.buckets.get(1), 30);
            assert_eq!(d.buckets.get(5), 10);
        }
        assert!(w.ensure_non_negative().is_ok());
    }

    #[test]
    fn differencer_keeps_negative_deltas() {
        let a = snap(60, 100, &[(0, 90), (2, 10)]);
        let b = snap(120, 150, &[(0, 145), (2, 5)]);
        let w = Window::between(&a, &b);
        assert_eq!(w.reads.buckets.get(2), -5);

        let err = w.ensure_non_negative().unwrap_err();
        match err {
            AnalyzerError::NegativeDelta { class, what, delta, .. } => {
                assert_eq!(class, OpClass::RawReads);
                assert_eq!(what, "bucket 02");
                assert_eq!(delta, -5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decreasing_total_is_reported() {
        let a = snap(60, 100, &[]);
        let b = snap(120, 90, &[]);
        let err = Window::between(&a, &b).ensure_non_negative().unwrap_err();
        assert!(matches!(err, AnalyzerError::NegativeDelta { delta: -10, .. }));
    }

    #[test]
    fn totals_beyond_i64_range_difference_exactly() {
        let a = snap(60, 10, &[(0, 10)]);
        let b = snap(120, 1 << 63, &[(0, 1 << 63)]);
        let w = Window::between(&a, &b);
        assert_eq!(w.reads.total, (1i128 << 63) - 10);
        assert_eq!(w.raw_reads.buckets.get(0), (1i128 << 63) - 10);
        assert!(w.ensure_non_negative().is_ok());
    }

    #[test]
    fn absent_class_counts_as_zero() {
        let mut a = snap(60, 10, &[(0, 10)]);
        a.raw_reads = None;
        let b = snap(120, 30, &[(0, 30)]);
        let w = Window::between(&a, &b);
        assert_eq!(w.raw_reads.total, 30);
        assert_eq!(w.reads.total, 20);
    }
}
