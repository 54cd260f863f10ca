//! Analyzer settings.
//!
//! Settings come from command-line flags, optionally layered over a JSON
//! file. Every field of the file is optional; flags given explicitly win.
//!
//! # Example config
//!
//! ```json
//! { "buckets": 10, "skip_buckets": 2, "time": 7200, "format": "table" }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{AnalyzerError, Result};
use crate::histogram::NUM_BUCKETS;

pub const DEFAULT_BUCKETS: usize = 7;
pub const DEFAULT_SKIP_BUCKETS: usize = 3;
pub const DEFAULT_INTERVAL_SECS: u64 = 3600;

/// Highest number of threshold columns; bucket 16 has nothing above it.
pub const MAX_BUCKETS: usize = NUM_BUCKETS - 1;

/// How the report is rendered on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Validated settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Number of thresholds (`2^0`..`2^(buckets-1)` ms) tracked per class.
    pub buckets: usize,
    /// Column stride when printing thresholds.
    pub skip_buckets: usize,
    /// Requested report interval in seconds.
    pub interval_secs: u64,
    pub format: OutputFormat,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            buckets: DEFAULT_BUCKETS,
            skip_buckets: DEFAULT_SKIP_BUCKETS,
            interval_secs: DEFAULT_INTERVAL_SECS,
            format: OutputFormat::Table,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_BUCKETS).contains(&self.buckets) {
            return Err(AnalyzerError::Config(format!(
                "buckets should be between 1 and {MAX_BUCKETS}, given {}",
                self.buckets
            )));
        }
        if self.skip_buckets == 0 || self.skip_buckets > self.buckets {
            return Err(AnalyzerError::Config(format!(
                "skip buckets {} should be between 1 and buckets {}",
                self.skip_buckets, self.buckets
            )));
        }
        if self.interval_secs == 0 {
            return Err(AnalyzerError::Config("time must be a positive number of seconds".into()));
        }
        Ok(())
    }

    /// Apply the values present in `file`.
    pub fn merge_file(mut self, file: &ConfigFile) -> Self {
        if let Some(b) = file.buckets {
            self.buckets = b;
        }
        if let Some(s) = file.skip_buckets {
            self.skip_buckets = s;
        }
        if let Some(t) = file.time {
            self.interval_secs = t;
        }
        if let Some(f) = file.format {
            self.format = f;
        }
        self
    }
}

/// On-disk form of the settings; absent fields keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub buckets: Option<usize>,
    pub skip_buckets: Option<usize>,
    /// Report interval in seconds.
    pub time: Option<u64>,
    pub format: Option<OutputFormat>,
}

/// Load and parse a JSON config file.
///
/// Any failure, unreadable file included, is a [`AnalyzerError::Config`].
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AnalyzerError::Config(format!("reading config {}: {e}", path.display())))?;
    let config: ConfigFile = serde_json::from_str(&content)
        .map_err(|e| AnalyzerError::Config(format!("parsing config {}: {e}", path.display())))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = AnalyzerConfig::default();
        assert_eq!((c.buckets, c.skip_buckets, c.interval_secs), (7, 3, 3600));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn bucket_range_enforced() {
        for buckets in [0, 17] {
            let c = AnalyzerConfig { buckets, skip_buckets: 1, ..Default::default() };
            assert!(matches!(c.validate(), Err(AnalyzerError::Config(_))));
        }
        let c = AnalyzerConfig { buckets: 16, skip_buckets: 16, ..Default::default() };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn skip_must_not_exceed_buckets() {
        let c = AnalyzerConfig { buckets: 3, skip_buckets: 4, ..Default::default() };
        assert!(c.validate().is_err());
        let c = AnalyzerConfig { skip_buckets: 0, ..Default::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_interval_rejected() {
        let c = AnalyzerConfig { interval_secs: 0, ..Default::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn file_values_override_defaults() {
        let file: ConfigFile = serde_json::from_str(r#"{"buckets": 10, "time": 7200, "format": "json"}"#).unwrap();
        let c = AnalyzerConfig::default().merge_file(&file);
        assert_eq!(c.buckets, 10);
        assert_eq!(c.skip_buckets, DEFAULT_SKIP_BUCKETS);
        assert_eq!(c.interval_secs, 7200);
        assert_eq!(c.format, OutputFormat::Json);
    }

    #[test]
    fn bad_config_file_is_config_error() {
        let missing = std::env::temp_dir().join("actlat-no-such-config.json");
        let err = load_config(&missing).unwrap_err();
        assert!(matches!(err, AnalyzerError::Config(_)));
        assert_eq!(err.exit_code(), 2);

        let bad = std::env::temp_dir().join(format!("actlat-bad-config-{}.json", std::process::id()));
        std::fs::write(&bad, r#"{"buckets": "many"}"#).unwrap();
        let err = load_config(&bad).unwrap_err();
        std::fs::remove_file(&bad).unwrap();
        assert!(matches!(err, AnalyzerError::Config(ref msg) if msg.starts_with("parsing config")));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unknown_file_keys_rejected() {
        assert!(serde_json::from_str::<ConfigFile>(r#"{"bucket": 3}"#).is_err());
    }
}
