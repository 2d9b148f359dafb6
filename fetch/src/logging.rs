//! Logger initialisation for the CLI.
//!
//! Diagnostics go through the `log` facade; the binary installs
//! `env_logger` with a level derived from `-v`/`-q`. `RUST_LOG` still takes
//! precedence when set.

use log::LevelFilter;

/// Map CLI verbosity flags to a log level.
///
/// # Examples
///
/// ```
/// use log::LevelFilter;
/// use opensource_fetch::logging::level_for;
///
/// assert_eq!(level_for(0, false), LevelFilter::Warn);
/// assert_eq!(level_for(1, false), LevelFilter::Debug);
/// assert_eq!(level_for(0, true), LevelFilter::Error);
/// ```
#[must_use]
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the process-wide logger writing to standard error.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(verbosity: u8, quiet: bool) {
    let result = env_logger::Builder::new()
        .filter_level(level_for(verbosity, quiet))
        .parse_default_env()
        .format_timestamp(None)
        .format_target(verbosity > 1)
        .try_init();
    if result.is_err() {
        log::trace!("logger already initialised");
    }
}
