//! Fixed-shape power-of-two latency histogram.
//!
//! The log producer buckets each operation by the highest set bit of its
//! latency in milliseconds, so bucket `i` covers `[2^i, 2^(i+1))` ms. Counts
//! in the log are cumulative since test start; a [`BucketHistogram`] holds one
//! such reading and [`BucketHistogram::diff`] turns two readings into the
//! per-window [`BucketDelta`].

/// Number of latency buckets in every histogram (`00`..=`16`).
pub const NUM_BUCKETS: usize = 17;

/// Cumulative bucket counts for one operation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketHistogram {
    counts: [u64; NUM_BUCKETS],
}

impl BucketHistogram {
    /// Create an all-zero histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count stored in bucket `idx`. Panics if `idx >= NUM_BUCKETS`.
    #[inline]
    pub fn get(&self, idx: usize) -> u64 {
        self.counts[idx]
    }

    /// Overwrite bucket `idx`. Panics if `idx >= NUM_BUCKETS`.
    #[inline]
    pub fn set(&mut self, idx: usize, count: u64) {
        self.counts[idx] = count;
    }

    pub fn counts(&self) -> &[u64; NUM_BUCKETS] {
        &self.counts
    }

    /// Sum over all buckets.
    pub fn sum(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Element-wise `self - earlier`.
    ///
    /// The result is signed and never clamped: a negative entry means the
    /// cumulative counts went backwards, which callers must report. Deltas are
    /// `i128` so any pair of `u64` counts differences exactly.
    pub fn diff(&self, earlier: &BucketHistogram) -> BucketDelta {
        let mut deltas = [0i128; NUM_BUCKETS];
        for (d, (&now, &then)) in deltas.iter_mut().zip(self.counts.iter().zip(earlier.counts.iter())) {
            *d = i128::from(now) - i128::from(then);
        }
        BucketDelta { deltas }
    }
}

/// Signed per-bucket difference between two cumulative histograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketDelta {
    deltas: [i128; NUM_BUCKETS],
}

impl BucketDelta {
    #[inline]
    pub fn get(&self, idx: usize) -> i128 {
        self.deltas[idx]
    }

    pub fn as_slice(&self) -> &[i128; NUM_BUCKETS] {
        &self.deltas
    }

    /// First bucket whose delta is negative, with that delta.
    pub fn first_negative(&self) -> Option<(usize, i128)> {
        self.deltas.iter().copied().enumerate().find(|&(_, d)| d < 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist(pairs: &[(usize, u64)]) -> BucketHistogram {
        let mut h = BucketHistogram::new();
        for &(i, c) in pairs {
            h.set(i, c);
        }
        h
    }

    #[test]
    fn diff_of_monotonic_readings_is_non_negative() {
        let earlier = hist(&[(0, 10), (1, 5), (4, 1)]);
        let later = hist(&[(0, 30), (1, 5), (4, 3), (9, 2)]);
        let d = later.diff(&earlier);
        assert_eq!(d.get(0), 20);
        assert_eq!(d.get(1), 0);
        assert_eq!(d.get(4), 2);
        assert_eq!(d.get(9), 2);
        assert!(d.first_negative().is_none());
        assert!(d.as_slice().iter().all(|&x| x >= 0));
    }

    #[test]
    fn diff_does_not_clamp_decreases() {
        let earlier = hist(&[(2, 50), (3, 7)]);
        let later = hist(&[(2, 60), (3, 4)]);
        let d = later.diff(&earlier);
        assert_eq!(d.get(2), 10);
        assert_eq!(d.get(3), -3);
        assert_eq!(d.first_negative(), Some((3, -3)));
    }

    #[test]
    fn diff_handles_counts_above_i64_max() {
        let earlier = hist(&[(0, 1)]);
        let later = hist(&[(0, u64::MAX), (1, 1 << 63)]);
        let d = later.diff(&earlier);
        assert_eq!(d.get(0), i128::from(u64::MAX) - 1);
        assert_eq!(d.get(1), 1i128 << 63);
        assert!(d.first_negative().is_none());
        assert_eq!(earlier.diff(&later).get(0), 1 - i128::from(u64::MAX));
    }

    #[test]
    fn sum_covers_every_bucket() {
        let h = hist(&[(0, 1), (16, 2)]);
        assert_eq!(h.sum(), 3);
        assert_eq!(h.counts().len(), NUM_BUCKETS);
    }
}
