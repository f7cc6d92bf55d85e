//! Lexicut CLI binary.
//!
//! - Assemble a project from transcribed sources
//! - Edit it with the agent, inspect it, and undo individual edits

use clap::Parser;
use lexicut::{
    FileSystemProjectStore, LexicutConfig, ObservabilityConfig, init_observability,
};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands};

    // A missing .env is fine; the environment may already carry the key.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_observability(
        &ObservabilityConfig::from_env()
            .with_verbose(cli.verbose)
            .with_json_logs(cli.json_logs),
    )?;

    let config = match &cli.config {
        Some(path) => LexicutConfig::from_file(path)?,
        None => LexicutConfig::load()?,
    }
    .with_default_cache_path();
    let projects_dir = cli
        .projects_dir
        .clone()
        .unwrap_or_else(|| config.storage.resolve_projects_dir());
    let store = FileSystemProjectStore::new(projects_dir)?;

    match cli.command {
        Commands::Assemble {
            input,
            no_assembly_cut,
        } => {
            cli::assemble(config, &store, &input, no_assembly_cut).await?;
        }

        Commands::Edit {
            project,
            instruction,
            max_iterations,
        } => {
            cli::edit(&config, &store, &project, &instruction, max_iterations).await?;
        }

        Commands::Show { project, format } => {
            cli::show(&store, &project, format).await?;
        }

        Commands::History { project } => {
            cli::history(&store, &project).await?;
        }

        Commands::Undo { project, command } => {
            cli::undo(&store, &project, command).await?;
        }

        Commands::List => {
            cli::list(&store).await?;
        }

        Commands::Delete { project } => {
            cli::delete(&store, &project).await?;
        }
    }

    Ok(())
}
