//! One timestamped reading of both operation classes.

use crate::histogram::BucketHistogram;

// ---------------------------------------------------------------------------
// Operation classes
// ---------------------------------------------------------------------------

/// The two latency histograms the exerciser reports in every section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpClass {
    /// Device-level completion latency.
    RawReads,
    /// End-to-end completion latency.
    Reads,
}

impl OpClass {
    pub const ALL: [OpClass; 2] = [OpClass::RawReads, OpClass::Reads];

    /// The label that opens this class's block in the log.
    pub fn label(self) -> &'static str {
        match self {
            Self::RawReads => "RAW READS",
            Self::Reads => "READS",
        }
    }
}

impl std::fmt::Display for OpClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Cumulative total plus bucket counts for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassReading {
    pub total: u64,
    pub buckets: BucketHistogram,
}

/// Everything parsed from one `After <N> sec:` section.
///
/// A class whose `(<n> total)` line was absent from the section is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub time_sec: u64,
    pub raw_reads: Option<ClassReading>,
    pub reads: Option<ClassReading>,
}

impl Snapshot {
    pub fn new(time_sec: u64) -> Self {
        Self { time_sec, raw_reads: None, reads: None }
    }

    pub fn class(&self, class: OpClass) -> Option<&ClassReading> {
        match class {
            OpClass::RawReads => self.raw_reads.as_ref(),
            OpClass::Reads => self.reads.as_ref(),
        }
    }

    pub fn class_mut(&mut self, class: OpClass) -> &mut Option<ClassReading> {
        match class {
            OpClass::RawReads => &mut self.raw_reads,
            OpClass::Reads => &mut self.reads,
        }
    }

    /// `true` when neither class was found in the section.
    pub fn is_empty(&self) -> bool {
        self.raw_reads.is_none() && self.reads.is_none()
    }

    /// Reading for `class`, or an all-zero reading when the class was absent.
    pub fn reading_or_zero(&self, class: OpClass) -> ClassReading {
        self.class(class).copied().unwrap_or_default()
    }
}
