//! Write command implementation.
//!
//! Writes a YAML document, read from a file or stdin, to a provider
//! scope.

use std::io::Read;
use std::path::PathBuf;

use crate::error::CliError;
use crate::utils::{build_resolver, GlobalOptions};
use clap::Args;
use strata::ProviderKind;

/// Write a document to a provider scope.
#[derive(Args)]
pub struct WriteCommand {
    /// Name of the config
    pub name: String,

    /// Group path segment (repeatable, ordered)
    #[arg(short, long = "group", value_name = "SEGMENT")]
    pub groups: Vec<String>,

    /// Provider to write through
    #[arg(long, default_value = "default")]
    pub provider: ProviderKind,

    /// YAML file to write (stdin when omitted)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

impl WriteCommand {
    /// Execute the write command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let contents = match &self.file {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };
        let document = strata::document::from_yaml_str(&contents)?;

        let resolver = build_resolver(global)?;
        resolver.write_config(&self.name, &document, &self.groups, self.provider)?;

        if !global.quiet {
            eprintln!("Wrote '{}' at /{}", self.name, self.groups.join("/"));
        }
        Ok(())
    }
}
