//! Process-wide tracing setup: JSON lines into a daily-rotated file plus a
//! human-readable stdout stream.

use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_DIR: &str = "log";
const LOG_FILE: &str = "pulsewatch.log";

/// Maps a configured level name to a filter directive. `fatal` and `panic`
/// are accepted as aliases for `error`; anything unrecognized falls back to
/// `info`.
pub fn directive_for(level: &str) -> &'static str {
    match level {
        "off" => "off",
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" | "fatal" | "panic" => "error",
        _ => "info",
    }
}

/// Installs the global subscriber. Called once at startup, after the
/// configuration is loaded; `RUST_LOG` overrides the configured level.
pub fn init(config_level: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(LOG_DIR, LOG_FILE);
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive_for(config_level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}
