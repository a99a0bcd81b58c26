//! CLI module - command-line interface
//!
//! Contains the REPL and reserved command handling.

pub mod commands;
pub mod repl;

pub use commands::{handle_command, CommandResult};
pub use repl::Repl;
