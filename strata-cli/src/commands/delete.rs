//! Delete command implementation.

use crate::error::CliError;
use crate::utils::{build_resolver, GlobalOptions};
use clap::Args;
use strata::ProviderKind;

/// Delete a document from a provider scope.
#[derive(Args)]
pub struct DeleteCommand {
    /// Name of the config
    pub name: String,

    /// Group path segment (repeatable, ordered)
    #[arg(short, long = "group", value_name = "SEGMENT")]
    pub groups: Vec<String>,

    /// Provider to delete through
    #[arg(long, default_value = "default")]
    pub provider: ProviderKind,
}

impl DeleteCommand {
    /// Execute the delete command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let resolver = build_resolver(global)?;
        resolver.delete_config(&self.name, &self.groups, self.provider)?;

        if !global.quiet {
            eprintln!("Deleted '{}' at /{}", self.name, self.groups.join("/"));
        }
        Ok(())
    }
}
