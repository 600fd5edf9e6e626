//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor`
//! trait, keeping argument parsing and execution logic together per
//! command.

mod decode;
mod encode;
mod info;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use info::InfoCommand;

use anyhow::Result;

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements this
/// trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self) -> Result<()>;
}
