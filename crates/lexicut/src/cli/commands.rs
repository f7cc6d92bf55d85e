//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use uuid::Uuid;

/// Lexicut - edit multi-source video by editing its transcript
#[derive(Parser, Debug)]
#[command(name = "lexicut")]
#[command(about = "Edit multi-source video by editing its transcript", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file, layered over the bundled defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project directory (overrides the configured one)
    #[arg(long, global = true)]
    pub projects_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a project from a sources/words JSON file and save it
    Assemble {
        /// Path to the project JSON ({id, name, sources, words})
        input: PathBuf,

        /// Skip the automatic first pass
        #[arg(long)]
        no_assembly_cut: bool,
    },

    /// Let the agent edit a project according to an instruction
    Edit {
        /// Project id
        project: String,

        /// What to change, in plain language
        instruction: String,

        /// Override the configured round cap
        #[arg(long)]
        max_iterations: Option<usize>,
    },

    /// Print a project's screenplay
    Show {
        /// Project id
        project: String,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// List a project's undoable commands
    History {
        /// Project id
        project: String,
    },

    /// Undo one command (the most recent when no id is given)
    Undo {
        /// Project id
        project: String,

        /// Command id from `lexicut history`
        #[arg(long)]
        command: Option<Uuid>,
    },

    /// List saved projects
    List,

    /// Delete a saved project
    Delete {
        /// Project id
        project: String,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    /// Human-readable screenplay
    Human,
    /// Project snapshot JSON
    Json,
}
