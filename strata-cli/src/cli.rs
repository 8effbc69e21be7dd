//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{DeleteCommand, ProvidersCommand, ResolveCommand, WriteCommand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for hierarchical configuration resolution.
#[derive(Parser)]
#[command(name = "strata")]
#[command(version, about = "Resolve hierarchically scoped configuration", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Path to a settings file
    #[arg(long, value_name = "PATH", global = true, env = "STRATA_SETTINGS")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Resolve a named config at a group path
    Resolve(ResolveCommand),

    /// Write a document to a provider scope
    Write(WriteCommand),

    /// Delete a document from a provider scope
    Delete(DeleteCommand),

    /// List the configured providers
    Providers(ProvidersCommand),
}
