//! Log output for the binary and the shell.
//!
//! Only this crate's events are shown, on stderr, at the level chosen with
//! `-q`/`-v`. A set `RUST_LOG` replaces that choice entirely.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const CRATE_TARGET: &str = "instrument_locator";

/// How much of the crate's own logging reaches stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Warnings, e.g. a degraded image lookup.
    #[default]
    Normal,
    /// Queries and mutations.
    Verbose,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// Filter directive used when `RUST_LOG` is unset.
    #[must_use]
    pub fn directive(self) -> String {
        let level = match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
            Self::Trace => "trace",
        };
        format!("{CRATE_TARGET}={level}")
    }
}

/// Installs the stderr subscriber; later calls leave the first one in place.
///
/// Event targets are printed from [`Verbosity::Verbose`] up.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));
    let detailed = verbosity >= Verbosity::Verbose;

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(detailed)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init();
}
