//! Resolve command implementation.
//!
//! Resolves a named configuration document at a group path, optionally
//! running the evaluation pipeline, and prints the result.

use crate::error::CliError;
use crate::utils::{build_resolver, GlobalOptions};
use clap::{Args, ValueEnum};
use serde_json::{Map, Value};
use strata::{ProviderKind, ResolveRequest, SchemaConfig, Transformations};

/// Output serialization for resolved documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML output.
    Yaml,
    /// JSON output.
    Json,
}

/// Resolve a named config at a group path.
#[derive(Args)]
pub struct ResolveCommand {
    /// Name of the config (defaults to the configured root name)
    pub name: Option<String>,

    /// Group path segment (repeatable, ordered)
    #[arg(short, long = "group", value_name = "SEGMENT")]
    pub groups: Vec<String>,

    /// Provider to resolve through
    #[arg(long, default_value = "effective")]
    pub provider: ProviderKind,

    /// Run the evaluation pipeline on the merged document
    #[arg(long)]
    pub evaluate: bool,

    /// Default variable, as name=value (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub variables: Vec<String>,

    /// Key coerced to a boolean after evaluation (repeatable)
    #[arg(long = "boolean-key", value_name = "KEY")]
    pub boolean_keys: Vec<String>,

    /// Key coerced to an integer after evaluation (repeatable)
    #[arg(long = "number-key", value_name = "KEY")]
    pub number_keys: Vec<String>,

    /// Key whose entries normalize to {value, encrypted} (repeatable)
    #[arg(long = "encrypted-key", value_name = "KEY")]
    pub encrypted_keys: Vec<String>,

    /// Name of a schema the evaluated document must satisfy
    #[arg(long, value_name = "NAME")]
    pub schema: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "yaml")]
    pub format: OutputFormat,
}

impl ResolveCommand {
    /// Execute the resolve command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let resolver = build_resolver(global)?;

        let mut default_variables = Map::new();
        for pair in &self.variables {
            let Some((name, value)) = pair.split_once('=') else {
                return Err(CliError::InvalidArguments(format!(
                    "--var expects NAME=VALUE, got '{pair}'"
                )));
            };
            default_variables.insert(name.to_string(), Value::String(value.to_string()));
        }

        let request = ResolveRequest {
            name: self.name,
            provider: self.provider,
            groups: self.groups,
            evaluate: self.evaluate,
            default_config: None,
            default_variables,
            transformations: Transformations {
                boolean_keys: self.boolean_keys,
                number_keys: self.number_keys,
            },
            schema_config: self.schema.map(|schema| SchemaConfig {
                schema: Some(schema),
                ..SchemaConfig::default()
            }),
            encrypted_keys: self.encrypted_keys,
        };

        if global.verbose {
            let name = request
                .name
                .as_deref()
                .unwrap_or(&resolver.settings().root_name);
            eprintln!("Resolving '{name}' at /{}", request.groups.join("/"));
        }

        let document = resolver.resolve(&request)?;
        let rendered = match self.format {
            OutputFormat::Yaml => strata::document::to_yaml_string(&document)?,
            OutputFormat::Json => {
                serde_json::to_string_pretty(&document).map_err(std::io::Error::other)?
            }
        };
        println!("{rendered}");
        Ok(())
    }
}
