//! Command pattern interfaces
//!
//! Each CLI operation is a [`Command`] built from parsed arguments by a
//! [`CommandFactory`].

use crate::errors::ConvertResult;

/// Represents an executable command in the application
pub trait Command {
    /// Execute the command
    fn execute(&self) -> ConvertResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory {
    /// Create the command selected by `args`
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    fn create_command(&self, args: &clap::ArgMatches) -> ConvertResult<Box<dyn Command>>;
}
