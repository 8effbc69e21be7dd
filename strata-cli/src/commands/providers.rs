//! Providers command implementation.

use crate::error::CliError;
use crate::utils::{build_resolver, GlobalOptions};
use clap::Args;

/// List the configured providers.
#[derive(Args)]
pub struct ProvidersCommand {}

impl ProvidersCommand {
    /// Execute the providers command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let resolver = build_resolver(global)?;
        let registry = resolver.registry();

        for kind in registry.kinds() {
            if kind == registry.default_kind() {
                println!("{kind} (default)");
            } else {
                println!("{kind}");
            }
        }
        Ok(())
    }
}
