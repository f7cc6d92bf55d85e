//! Lexicut - transcript-driven editing for multi-source video.
//!
//! Lexicut turns per-word transcripts into a screenplay of sentences that a
//! person or a reasoning agent edits through a fixed set of operations. Every
//! edit is recorded as a command that can be undone on its own, regardless of
//! what happened after it.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lexicut::{AgentLoop, AnthropicClient, AssembleRequest, LexicutConfig, ProcessingPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LexicutConfig::load()?;
//!     let pipeline = ProcessingPipeline::new(config.clone()).with_anthropic_from_env();
//!
//!     let request: AssembleRequest = serde_json::from_str(&std::fs::read_to_string("project.json")?)?;
//!     let mut output = pipeline.assemble(request, |text| print!("{text}")).await?;
//!
//!     let client = AnthropicClient::from_env(config.agent.model)?;
//!     let outcome = AgentLoop::new(&client)
//!         .run(&mut output.session, "Cut the filler words", |text| print!("{text}"))
//!         .await?;
//!     println!("{} edits", outcome.command_ids.len());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `lexicut_error` - Error types
//! - `lexicut_core` - Words, sentences, sources and conversation messages
//! - `lexicut_interface` - Collaborator traits
//! - `lexicut_assembly` - Word segmenter and assembly orderer
//! - `lexicut_timeline` - Timeline, selective-undo history, edit sessions
//! - `lexicut_models` - Anthropic streaming client and orderer
//! - `lexicut_agent` - Editing tools and the agentic tool loop
//! - `lexicut_storage` - Project persistence and content fingerprints
//! - `lexicut_cache` - In-flight job sharing and result caching
//!
//! This crate re-exports everything and adds configuration, logging setup and
//! the processing pipeline.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod observability;
mod pipeline;
mod project;

pub use config::{AgentSettings, LexicutConfig, StorageSettings};
pub use observability::{ObservabilityConfig, init_observability};
pub use pipeline::{AssembleRequest, PipelineOutput, ProcessingPipeline};
pub use project::{open_session, save_session};

pub use lexicut_agent::*;
pub use lexicut_assembly::*;
pub use lexicut_cache::*;
pub use lexicut_core::*;
pub use lexicut_error::*;
pub use lexicut_interface::*;
pub use lexicut_models::*;
pub use lexicut_storage::*;
pub use lexicut_timeline::*;
