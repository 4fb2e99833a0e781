use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install a global `tracing` subscriber for the configured level and format
///
/// `RUST_LOG` takes precedence over the configured level. Returns `false` when
/// a subscriber was already installed, in which case nothing changes.
#[must_use]
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_ascii_lowercase()));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    if config.format == "json" {
        subscriber.json().try_init().is_ok()
    } else {
        subscriber.try_init().is_ok()
    }
}
