//! Diagnostic logging setup.

use tracing::Subscriber;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Stderr subscriber filtered at `level`; `RUST_LOG` takes precedence when set.
pub fn subscriber(level: &str) -> impl Subscriber + Send + Sync {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
}

/// Installs [`subscriber`] globally.
///
/// Calling this more than once is harmless: later calls leave the first subscriber in place.
pub fn setup_logging(level: &str) {
    subscriber(level).try_init().ok();
}
