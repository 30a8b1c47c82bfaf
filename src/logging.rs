//! Logging configuration using tracing

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when nothing else asks for more.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Picks the filter directive: `/v` means debug, then an explicit level
/// (`Log=`), then the `RUST_LOG` directive, then the default.  An
/// unparsable `RUST_LOG` falls through to the default.
pub fn filter_for(verbose: bool, level: Option<&str>, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else if let Some(level) = level {
        EnvFilter::new(level)
    } else {
        rust_log
            .and_then(|directive| EnvFilter::try_new(directive).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
    }
}

/// Initialize the logging system.  Output goes to stderr so stdout stays
/// free for the result line.  A second call is a no-op.
pub fn init(verbose: bool, level: Option<&str>) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let _ = tracing_subscriber::registry()
        .with(filter_for(verbose, level, rust_log.as_deref()))
        .with(fmt::layer().without_time().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
