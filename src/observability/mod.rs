//! Structured logging setup.
//!
//! [`init_logging`] installs a `tracing` fmt subscriber filtered by
//! `RUST_LOG`. Output goes to stderr so `cpgview query` can print JSON on
//! stdout undisturbed.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "cpgview=info,tower_http=info";

/// Filter used when `RUST_LOG` is unset and verbose output was requested.
pub const VERBOSE_FILTER: &str = "cpgview=debug,tower_http=debug";

/// Pick the fallback directive for the given verbosity.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Initialize structured logging with `RUST_LOG` support.
///
/// Call once at startup; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(false);
        init_logging(true);
        tracing::info!("still alive after double init");
    }

    #[test]
    fn verbosity_selects_filter() {
        assert_eq!(default_filter(false), DEFAULT_FILTER);
        assert_eq!(default_filter(true), VERBOSE_FILTER);
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        assert!(EnvFilter::try_new(VERBOSE_FILTER).is_ok());
    }
}
