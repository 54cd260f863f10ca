//! Logging initialization using the `tracing` ecosystem.
//!
//! Diagnostics always go to stderr so that stdout carries nothing but the
//! report. An optional directory adds a daily-rotating log file via
//! `tracing-appender`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// Should be called once at program start.
///
/// # Parameters
///
/// - `log_level`: filter directive, e.g. `"warn"` or `"actlat_core=debug"`
/// - `log_dir`: optional directory for daily-rotating log files
/// - `file_prefix`: log file name prefix (e.g. `"actlat"`)
pub fn init_logging(log_level: &str, log_dir: Option<&str>, file_prefix: &str) {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(true).with_ansi(true);

    if let Some(dir) = log_dir {
        let file_appender = tracing_appender::rolling::daily(dir, file_prefix);
        let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false).with_target(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();
    }
}
