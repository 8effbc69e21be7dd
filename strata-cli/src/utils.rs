//! Shared utilities for CLI commands.

use std::path::PathBuf;

use crate::error::CliError;
use strata::{Resolver, Settings};

/// Global options shared by every command.
pub struct GlobalOptions {
    /// Verbose output enabled.
    pub verbose: bool,
    /// Quiet output enabled.
    pub quiet: bool,
    /// Settings file override.
    pub settings: Option<PathBuf>,
}

/// Loads engine settings from the configured file, or from defaults plus
/// environment overrides when no file is given.
pub fn load_settings(global: &GlobalOptions) -> Result<Settings, CliError> {
    let settings = match &global.settings {
        Some(path) => Settings::load(path)
            .map_err(|e| CliError::Settings(format!("{}: {e}", path.display())))?,
        None => Settings::from_env().map_err(|e| CliError::Settings(e.to_string()))?,
    };
    Ok(settings)
}

/// Builds a resolver over the providers the settings describe, routing
/// its diagnostics through the logger the CLI flags select.
pub fn build_resolver(global: &GlobalOptions) -> Result<Resolver, CliError> {
    let settings = load_settings(global)?;
    let logger = strata::init_logger(global.verbose, global.quiet);
    Ok(Resolver::from_settings(settings)?.with_logger(logger))
}
