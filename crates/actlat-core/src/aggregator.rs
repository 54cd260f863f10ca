//! Running average and maximum of tail percentages across windows.
//!
//! The "average" is a recursive halving: each new window is folded in at equal
//! weight with the running value, `avg = round2((avg + new) / 2)`. That is an
//! exponential moving average with factor 0.5, not an arithmetic mean, and it
//! is what historical reports were produced with.

use serde::Serialize;

use crate::tail::{ClassTails, TailVector, round2};

/// Smoothed average and maximum for one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunningStats {
    avg: Vec<f64>,
    max: Vec<f64>,
}

impl RunningStats {
    /// The first window seeds both the average and the maximum.
    pub fn seed(tail: &TailVector) -> Self {
        Self { avg: tail.values().to_vec(), max: tail.values().to_vec() }
    }

    pub fn update(&mut self, tail: &TailVector) {
        for (k, &v) in tail.values().iter().enumerate() {
            self.avg[k] = round2((self.avg[k] + v) / 2.0);
            if v > self.max[k] {
                self.max[k] = v;
            }
        }
    }

    pub fn avg(&self) -> TailVector {
        TailVector::from_values(self.avg.clone())
    }

    pub fn max(&self) -> TailVector {
        TailVector::from_values(self.max.clone())
    }
}

/// Final figures once the stream is done.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub windows: u64,
    pub avg: ClassTails,
    pub max: ClassTails,
    pub duration_sec: u64,
}

/// Folds every window's tails into [`RunningStats`] for both classes.
#[derive(Debug, Default)]
pub struct RollingAggregator {
    stats: Option<(RunningStats, RunningStats)>,
    windows: u64,
    last_end_sec: u64,
}

impl RollingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, tails: &ClassTails, end_sec: u64) {
        match &mut self.stats {
            None => self.stats = Some((RunningStats::seed(&tails.reads), RunningStats::seed(&tails.raw_reads))),
            Some((reads, raw_reads)) => {
                reads.update(&tails.reads);
                raw_reads.update(&tails.raw_reads);
            }
        }
        self.windows += 1;
        self.last_end_sec = end_sec;
    }

    pub fn windows(&self) -> u64 {
        self.windows
    }

    /// `None` until at least one window has been folded.
    pub fn summary(&self) -> Option<Summary> {
        let (reads, raw_reads) = self.stats.as_ref()?;
        Some(Summary {
            windows: self.windows,
            avg: ClassTails { reads: reads.avg(), raw_reads: raw_reads.avg() },
            max: ClassTails { reads: reads.max(), raw_reads: raw_reads.max() },
            duration_sec: self.last_end_sec,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tails(reads: &[f64], raw: &[f64]) -> ClassTails {
        ClassTails { reads: TailVector::from_values(reads.to_vec()), raw_reads: TailVector::from_values(raw.to_vec()) }
    }

    #[test]
    fn first_window_seeds_avg_and_max() {
        let mut agg = RollingAggregator::new();
        assert!(agg.summary().is_none());
        let t = tails(&[12.5, 3.25, 0.0], &[1.0, 0.5, 0.0]);
        agg.fold(&t, 3600);
        let s = agg.summary().unwrap();
        assert_eq!(s.avg, t);
        assert_eq!(s.max, t);
        assert_eq!(s.windows, 1);
        assert_eq!(s.duration_sec, 3600);
    }

    #[test]
    fn second_window_halves_towards_new_value() {
        let mut agg = RollingAggregator::new();
        agg.fold(&tails(&[10.0, 4.0], &[2.0, 1.0]), 60);
        agg.fold(&tails(&[5.01, 6.0], &[1.0, 0.0]), 120);
        let s = agg.summary().unwrap();
        assert_eq!(s.avg.reads.values(), &[round2(15.01 / 2.0), 5.0]);
        assert_eq!(s.avg.raw_reads.values(), &[1.5, 0.5]);
        assert_eq!(s.max.reads.values(), &[10.0, 6.0]);
        assert_eq!(s.max.raw_reads.values(), &[2.0, 1.0]);
        assert_eq!(s.duration_sec, 120);
    }

    #[test]
    fn average_is_recency_weighted_not_arithmetic() {
        let mut agg = RollingAggregator::new();
        for v in [0.0, 0.0, 8.0] {
            agg.fold(&tails(&[v], &[v]), 0);
        }
        // Arithmetic mean would be 2.67.
        assert_eq!(agg.summary().unwrap().avg.reads.values(), &[4.0]);
        assert_eq!(agg.windows(), 3);
    }
}
