//! Bucket percentages and "slower than 2^k ms" tail sums.

use serde::Serialize;

use crate::histogram::NUM_BUCKETS;
use crate::window::{ClassDelta, Window};

/// Round to two decimal places, deciding on the exact binary value of `x`.
///
/// Scaling by 100 first would round values such as `1.115` (stored just below
/// the half) upwards; formatting does not.
pub fn round2(x: f64) -> f64 {
    format!("{x:.2}").parse().unwrap_or(x)
}

/// Share of a window's operations that landed in each bucket, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentageVector {
    per_bucket: [f64; NUM_BUCKETS],
}

impl PercentageVector {
    /// An idle window (`total <= 0`) yields all zeros.
    pub fn from_delta(delta: &ClassDelta) -> Self {
        let mut per_bucket = [0.0; NUM_BUCKETS];
        if delta.total > 0 {
            let total = delta.total as f64;
            for (pct, &count) in per_bucket.iter_mut().zip(delta.buckets.as_slice()) {
                *pct = 100.0 * count as f64 / total;
            }
        }
        Self { per_bucket }
    }

    #[inline]
    pub fn get(&self, idx: usize) -> f64 {
        self.per_bucket[idx]
    }

    pub fn sum(&self) -> f64 {
        self.per_bucket.iter().sum()
    }
}

/// `values[k]` is the percentage of operations slower than `2^k` ms, i.e. the
/// sum of every bucket above `k`, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TailVector {
    values: Vec<f64>,
}

impl TailVector {
    /// Tail sums for thresholds `0..buckets`. Summation runs at full
    /// precision; only the final values are rounded.
    pub fn from_percentages(pct: &PercentageVector, buckets: usize) -> Self {
        // Accumulate from the top so each sum only ever grows.
        let mut above = [0.0; NUM_BUCKETS - 1];
        let mut acc = 0.0;
        for k in (0..NUM_BUCKETS - 1).rev() {
            acc += pct.get(k + 1);
            above[k] = acc;
        }
        let buckets = buckets.min(NUM_BUCKETS - 1);
        Self { values: above[..buckets].iter().map(|&v| round2(v)).collect() }
    }

    /// Shorthand for [`PercentageVector::from_delta`] followed by
    /// [`TailVector::from_percentages`].
    pub fn from_delta(delta: &ClassDelta, buckets: usize) -> Self {
        Self::from_percentages(&PercentageVector::from_delta(delta), buckets)
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Tail vectors for both classes of one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassTails {
    pub reads: TailVector,
    pub raw_reads: TailVector,
}

impl ClassTails {
    pub fn from_window(window: &Window, buckets: usize) -> Self {
        Self {
            reads: TailVector::from_delta(&window.reads, buckets),
            raw_reads: TailVector::from_delta(&window.raw_reads, buckets),
        }
    }
}
