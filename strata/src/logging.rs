//! Diagnostics for the resolution engine.
//!
//! Resolution emits few events: parent-chain truncations, provider
//! fallbacks, CLI command outcomes. They go to stderr through a small
//! level-gated [`Logger`] rather than a structured logging stack, so
//! library output never mixes with the resolved documents written to
//! stdout. The resolver carries a copy of the logger the caller
//! initialized; with no caller wiring it stays at [`LogLevel::Normal`]
//! and debug events are dropped.

use std::env;
use std::fmt;

/// Verbosity of the diagnostics stream.
///
/// Ordered from least verbose (`Quiet`) to most verbose (`Verbose`).
///
/// # Examples
///
/// ```
/// use strata::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Suppress all non-essential output.
    Quiet,
    /// Errors and warnings only.
    Normal,
    /// Errors, warnings, info and debug events.
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl LogLevel {
    /// Parses a log level from a string.
    ///
    /// Recognizes: "quiet", "normal", "verbose" (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not recognized.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }
}

/// A level-gated stderr logger.
///
/// Cheap to copy, so the resolver and the CLI can each hold one without
/// sharing state.
///
/// # Examples
///
/// ```
/// use strata::{LogLevel, Logger};
///
/// let logger = Logger::new(LogLevel::Normal);
/// logger.warn("cache store unavailable, loading from members");
/// logger.debug("this is dropped below Verbose");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// Creates a logger gated at the given level.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Returns the configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    fn enabled(&self, required: LogLevel) -> bool {
        self.level >= required
    }

    /// Logs an error event. Suppressed only at `Quiet`.
    pub fn error(&self, message: &str) {
        if self.enabled(LogLevel::Normal) {
            eprintln!("ERROR: {message}");
        }
    }

    /// Logs a warning event. Suppressed only at `Quiet`.
    pub fn warn(&self, message: &str) {
        if self.enabled(LogLevel::Normal) {
            eprintln!("WARN: {message}");
        }
    }

    /// Logs an informational event. Shown at `Verbose` only.
    pub fn info(&self, message: &str) {
        if self.enabled(LogLevel::Verbose) {
            eprintln!("INFO: {message}");
        }
    }

    /// Logs a debug event, such as a truncated parent chain. Shown at
    /// `Verbose` only.
    pub fn debug(&self, message: &str) {
        if self.enabled(LogLevel::Verbose) {
            eprintln!("DEBUG: {message}");
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Normal)
    }
}

/// Builds a logger from CLI flags and the environment.
///
/// The priority order is:
/// 1. CLI flags (`verbose` over `quiet` when both are set)
/// 2. The `STRATA_LOG_MODE` environment variable
/// 3. [`LogLevel::Normal`]
///
/// # Examples
///
/// ```
/// use strata::init_logger;
///
/// let logger = init_logger(true, false);
/// logger.debug("resolving service-x at /team-a/prod");
/// ```
#[must_use]
pub fn init_logger(verbose: bool, quiet: bool) -> Logger {
    if verbose {
        return Logger::new(LogLevel::Verbose);
    }
    if quiet {
        return Logger::new(LogLevel::Quiet);
    }

    if let Ok(env_value) = env::var("STRATA_LOG_MODE") {
        if let Ok(level) = LogLevel::parse(&env_value) {
            return Logger::new(level);
        }
    }

    Logger::new(LogLevel::Normal)
}
