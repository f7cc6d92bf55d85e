//! Command handlers.

use super::OutputFormat;
use lexicut::{
    AgentLoop, AnthropicClient, AssembleRequest, AssemblyCutOutcome, EditSession, JsonError,
    LexicutConfig, LexicutResult, ProcessingPipeline, ProjectStore, StorageError,
    StorageErrorKind, format_screenplay, open_session, save_session,
};
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

fn stream_to_stdout(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

/// Build and save a project.
pub async fn assemble(
    config: LexicutConfig,
    store: &dyn ProjectStore,
    input: &Path,
    no_assembly_cut: bool,
) -> LexicutResult<()> {
    let raw = tokio::fs::read_to_string(input).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            input.display(),
            e
        )))
    })?;
    let request: AssembleRequest = serde_json::from_str(&raw)
        .map_err(|e| JsonError::new(format!("Invalid project file {}: {}", input.display(), e)))?;

    let mut config = config;
    if no_assembly_cut {
        config.agent.assembly_cut = false;
    }
    let pipeline = ProcessingPipeline::new(config).with_anthropic_from_env();
    let output = pipeline.assemble(request, stream_to_stdout).await?;
    save_session(store, &output.session).await?;

    let session = &output.session;
    println!();
    println!("Assembled project {}", session.id());
    println!("  Sentences: {}", session.timeline().len());
    println!("  Ordering: {}", output.order.strategy);
    if !session.broll_sources().is_empty() {
        println!("  B-roll sources: {}", session.broll_sources().join(", "));
    }
    match &output.assembly_cut {
        AssemblyCutOutcome::Skipped(reason) => println!("  Assembly cut skipped: {reason}"),
        AssemblyCutOutcome::Completed(outcome) => println!(
            "  Assembly cut: {} edits in {} rounds",
            outcome.command_ids.len(),
            outcome.iterations
        ),
        AssemblyCutOutcome::Failed(message) => {
            println!("  Assembly cut failed, kept the assembled order: {message}")
        }
    }
    Ok(())
}

/// Run the agent against a saved project.
///
/// Edits made before a transport failure are saved before the error is
/// returned.
pub async fn edit(
    config: &LexicutConfig,
    store: &dyn ProjectStore,
    project: &str,
    instruction: &str,
    max_iterations: Option<usize>,
) -> LexicutResult<()> {
    let config = match max_iterations {
        Some(max) => config.clone().with_max_iterations(max)?,
        None => config.clone(),
    };
    let mut session = open_session(store, project).await?;
    let client = AnthropicClient::from_env(config.agent.model.clone())?;
    let loop_config = config.agent.loop_config();

    let mut streamed = String::new();
    let result = AgentLoop::new(&client)
        .with_config(loop_config)
        .run(&mut session, instruction, |text| {
            streamed.push_str(text);
            stream_to_stdout(text);
        })
        .await;
    save_session(store, &session).await?;

    let outcome = result?;
    println!();
    if !streamed.trim_end().ends_with(outcome.message.trim()) {
        println!("{}", outcome.message);
    }
    println!(
        "{} edits, {} tool calls, {} rounds",
        outcome.command_ids.len(),
        outcome.tool_call_count,
        outcome.iterations
    );
    Ok(())
}

/// Print a project.
pub async fn show(store: &dyn ProjectStore, project: &str, format: OutputFormat) -> LexicutResult<()> {
    let session = open_session(store, project).await?;
    match format {
        OutputFormat::Human => print!("{}", format_screenplay(&session)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&session.snapshot())
                .map_err(|e| JsonError::new(format!("Failed to encode project: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Print the undoable commands, oldest first.
pub async fn history(store: &dyn ProjectStore, project: &str) -> LexicutResult<()> {
    let session = open_session(store, project).await?;
    print_history(&session);
    Ok(())
}

fn print_history(session: &EditSession) {
    let commands = session.history().commands();
    if commands.is_empty() {
        println!("No undoable commands.");
        return;
    }
    for command in commands {
        println!(
            "{}  {}  {}",
            command.id,
            command.timestamp.format("%Y-%m-%d %H:%M:%S"),
            command.label
        );
    }
}

/// Undo one command and save.
pub async fn undo(store: &dyn ProjectStore, project: &str, command: Option<Uuid>) -> LexicutResult<()> {
    let mut session = open_session(store, project).await?;
    let undone = match command {
        Some(id) => session.undo(id),
        None => session.undo_last(),
    };

    match undone {
        Some(command) => {
            save_session(store, &session).await?;
            println!("Undid: {}", command.label);
        }
        None => match command {
            Some(id) => println!("No command {id} in the history."),
            None => println!("Nothing to undo."),
        },
    }
    Ok(())
}

/// Print saved projects with their names and save times.
pub async fn list(store: &dyn ProjectStore) -> LexicutResult<()> {
    for meta in store.list().await? {
        println!(
            "{}\t{}\tcreated {}\tupdated {}",
            meta.id,
            meta.name,
            format_millis(meta.created_at),
            format_millis(meta.updated_at)
        );
    }
    Ok(())
}

fn format_millis(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Delete a project.
pub async fn delete(store: &dyn ProjectStore, project: &str) -> LexicutResult<()> {
    store.delete(project).await?;
    println!("Deleted project {project}");
    Ok(())
}
