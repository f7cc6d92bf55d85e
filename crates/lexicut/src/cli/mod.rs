//! Command-line interface module.

mod commands;
mod handlers;

pub use commands::{Cli, Commands, OutputFormat};
pub use handlers::{assemble, delete, edit, history, list, show, undo};
