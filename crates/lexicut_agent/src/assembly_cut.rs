//! Advisory first pass run right after the timeline is built.

use crate::{AgentConfig, AgentLoop, AgentOutcome, ASSEMBLY_CUT_INSTRUCTION, ASSEMBLY_CUT_PROMPT};
use lexicut_interface::ReasoningDriver;
use lexicut_timeline::EditSession;
use tracing::{info, instrument, warn};

/// Result of an assembly cut.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyCutOutcome {
    /// Not attempted
    Skipped(String),
    /// The loop ran to completion
    Completed(AgentOutcome),
    /// The loop failed; its edits were reverted
    Failed(String),
}

/// Run the assembly-cut loop on a freshly built session.
///
/// Skipped when there is no driver (no credential) or fewer than two
/// sentences. On failure every command recorded during the run is undone,
/// leaving the timeline as it was before the call.
#[instrument(skip_all, fields(entries = session.timeline().len()))]
pub async fn run_assembly_cut<D, F>(
    driver: Option<&D>,
    session: &mut EditSession,
    config: AgentConfig,
    on_text: F,
) -> AssemblyCutOutcome
where
    D: ReasoningDriver + ?Sized,
    F: FnMut(&str) + Send,
{
    let Some(driver) = driver else {
        info!("No reasoning service configured, skipping assembly cut");
        return AssemblyCutOutcome::Skipped("no reasoning service configured".to_string());
    };
    if session.timeline().len() < 2 {
        info!("Fewer than two sentences, skipping assembly cut");
        return AssemblyCutOutcome::Skipped("fewer than two sentences".to_string());
    }

    let recorded_before = session.history().len();
    let result = AgentLoop::new(driver)
        .with_config(config)
        .with_system_prompt(ASSEMBLY_CUT_PROMPT)
        .run(session, ASSEMBLY_CUT_INSTRUCTION, on_text)
        .await;

    match result {
        Ok(outcome) => {
            info!(
                commands = outcome.command_ids.len(),
                "Assembly cut completed"
            );
            AssemblyCutOutcome::Completed(outcome)
        }
        Err(e) => {
            let partial: Vec<_> = session
                .history()
                .commands()
                .iter()
                .skip(recorded_before)
                .map(|command| command.id)
                .collect();
            for id in partial.into_iter().rev() {
                session.undo(id);
            }
            warn!(error = %e, "Assembly cut failed, keeping the assembled order");
            AssemblyCutOutcome::Failed(e.to_string())
        }
    }
}
