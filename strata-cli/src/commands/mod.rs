//! Command implementations for the strata CLI.

mod delete;
mod providers;
mod resolve;
mod write;

pub use delete::DeleteCommand;
pub use providers::ProvidersCommand;
pub use resolve::ResolveCommand;
pub use write::WriteCommand;
