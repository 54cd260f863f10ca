//! Forward-only scanner that turns exerciser log text into [`Snapshot`]s.
//!
//! # Log layout
//!
//! ```text
//! After 60 sec:
//! RAW READS (52413 total)
//!  (00: 0000051298)  (01: 0000000764)  (02: 0000000264)  (03: 0000000069)
//!  (04: 0000000018)
//! READS (52413 total)
//!  (00: 0000050878)  (01: 0000001090)  (02: 0000000330)  (03: 0000000093)
//!
//! After 120 sec:
//! ...
//! ```
//!
//! A section runs from its header to the next blank line (or the next header).
//! Lines in a section that belong to neither class are skipped. Each class
//! line is followed by zero or more bucket lines; the first line that carries
//! no recognized `(NN: count)` token ends that class's block and is handed
//! back to the section loop.

use std::io::BufRead;

use tracing::{trace, warn};

use crate::error::{AnalyzerError, Result};
use crate::histogram::{BucketHistogram, NUM_BUCKETS};
use crate::snapshot::{ClassReading, OpClass, Snapshot};

const HEADER_PREFIX: &str = "After ";
const HEADER_SUFFIX: &str = " sec:";

// ---------------------------------------------------------------------------
// Line-level parsers
// ---------------------------------------------------------------------------

/// Parse `After <N> sec:` into `N`.
///
/// Returns `None` when the line is not a header at all, and
/// `Some(Err(reason))` when it starts like one but the number is unusable.
pub fn parse_header(line: &str) -> Option<std::result::Result<u64, String>> {
    let rest = line.strip_prefix(HEADER_PREFIX)?;
    let Some(end) = rest.find(HEADER_SUFFIX) else {
        return Some(Err(format!("header without '{}': {line:?}", HEADER_SUFFIX.trim())));
    };
    Some(rest[..end].trim().parse::<u64>().map_err(|e| format!("bad header time in {line:?}: {e}")))
}

/// Which class, if any, a line opens.
fn class_of(line: &str) -> Option<OpClass> {
    if line.starts_with("RAW READS ") {
        Some(OpClass::RawReads)
    } else if line.starts_with("READS ") {
        Some(OpClass::Reads)
    } else {
        None
    }
}

/// Extract `<n>` from a `<LABEL> (<n> total)` line.
pub fn parse_total(line: &str) -> Option<u64> {
    let open = line.find('(')?;
    let close = line[open..].find(" total)")? + open;
    line[open + 1..close].trim().parse().ok()
}

/// Every `(<id>: <count>)` pair on a bucket line, in order of appearance.
///
/// Ids must be two-digit tokens `00`..=`16`; anything else is ignored, so a
/// line with only unrecognized tokens yields nothing.
pub fn parse_bucket_pairs(line: &str) -> impl Iterator<Item = (usize, u64)> + '_ {
    line.split('(').skip(1).filter_map(|chunk| {
        let (inner, _) = chunk.split_once(')')?;
        let (id, count) = inner.split_once(':')?;
        let id = id.trim();
        if id.len() != 2 || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let idx: usize = id.parse().ok()?;
        if idx >= NUM_BUCKETS {
            return None;
        }
        Some((idx, count.trim().parse().ok()?))
    })
}

// ---------------------------------------------------------------------------
// SnapshotScanner
// ---------------------------------------------------------------------------

/// Pulls snapshots out of a buffered log stream, one section at a time.
///
/// The stream is never rewound; at most one line of lookahead is held back.
pub struct SnapshotScanner<R> {
    reader: R,
    line_no: u64,
    pending: Option<String>,
    last_time: Option<u64>,
}

impl<R: BufRead> SnapshotScanner<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line_no: 0, pending: None, last_time: None }
    }

    /// Number of lines consumed from the underlying reader so far.
    pub fn line_no(&self) -> u64 {
        self.line_no
    }

    /// Scan forward to the next header and parse its section.
    ///
    /// Returns `Ok(None)` at end of stream. A section that holds neither
    /// class still yields a snapshot; see [`Snapshot::is_empty`].
    pub fn next_snapshot(&mut self) -> Result<Option<Snapshot>> {
        let Some(time_sec) = self.next_header()? else {
            return Ok(None);
        };
        self.read_section(time_sec).map(Some)
    }

    /// Scan forward past the next header without parsing its section.
    ///
    /// Returns the header's time, or `None` at end of stream.
    pub fn skip_section(&mut self) -> Result<Option<u64>> {
        self.next_header()
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let trimmed = buf.trim_end_matches(['\n', '\r']).len();
        buf.truncate(trimmed);
        Ok(Some(buf))
    }

    fn push_back(&mut self, line: String) {
        debug_assert!(self.pending.is_none());
        self.pending = Some(line);
    }

    fn malformed(&self, reason: String) -> AnalyzerError {
        AnalyzerError::Malformed { line: self.line_no, reason }
    }

    fn next_header(&mut self) -> Result<Option<u64>> {
        while let Some(line) = self.next_line()? {
            let Some(parsed) = parse_header(&line) else {
                continue;
            };
            let time_sec = parsed.map_err(|reason| self.malformed(reason))?;
            if let Some(prev) = self.last_time {
                if time_sec <= prev {
                    return Err(self.malformed(format!(
                        "header time {time_sec} sec does not follow previous {prev} sec"
                    )));
                }
            }
            self.last_time = Some(time_sec);
            trace!(line = self.line_no, time_sec, "header");
            return Ok(Some(time_sec));
        }
        Ok(None)
    }

    fn read_section(&mut self, time_sec: u64) -> Result<Snapshot> {
        let mut snap = Snapshot::new(time_sec);

        while let Some(line) = self.next_line()? {
            if line.trim().is_empty() {
                break;
            }
            if parse_header(&line).is_some() {
                self.push_back(line);
                break;
            }
            let Some(class) = class_of(&line) else {
                continue;
            };
            let Some(total) = parse_total(&line) else {
                warn!(line = self.line_no, %class, "class line without a usable total, treating class as absent");
                continue;
            };
            if snap.class(class).is_some() {
                return Err(self.malformed(format!("{class} appears twice in the {time_sec} sec section")));
            }
            let buckets = self.read_buckets()?;
            *snap.class_mut(class) = Some(ClassReading { total, buckets });
        }

        Ok(snap)
    }

    /// Consume bucket lines until one carries no bucket token.
    ///
    /// Buckets never mentioned stay zero.
    fn read_buckets(&mut self) -> Result<BucketHistogram> {
        let mut hist = BucketHistogram::new();
        while let Some(line) = self.next_line()? {
            let mut found = false;
            for (idx, count) in parse_bucket_pairs(&line) {
                hist.set(idx, count);
                found = true;
            }
            if !found {
                self.push_back(line);
                break;
            }
        }
        Ok(hist)
    }
}
