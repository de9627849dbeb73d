//! # DeepSprint - Multi-Step Automated Research Server
//!
//! DeepSprint turns a research topic into an ordered plan of discrete steps,
//! fans the steps out as independent concurrent search-and-summarize tasks,
//! streams each result back the moment it completes, and synthesizes all
//! step output into one consolidated report.
//!
//! ## Overview
//!
//! DeepSprint can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `deepsprint-server` binary
//! 2. **As a library** - Drive the research coordinator from your own code
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use deepsprint::{LLMClientFactory, Provider};
//! use deepsprint::research::{ReportSynthesizer, ResearchCoordinator, StepExecutor};
//! use deepsprint::types::ResearchRun;
//! use futures::StreamExt;
//!
//! let provider = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3.2".to_string(),
//! };
//! let llm = std::sync::Arc::from(provider.create_client().await?);
//!
//! let run = ResearchRun::from_steps("1234".to_string(), vec![
//!     "Find general information about mindtrip.ai".to_string(),
//!     "Find the funding history of mindtrip.ai".to_string(),
//! ]);
//!
//! let coordinator = ResearchCoordinator::new(executor, synthesizer);
//! let mut events = std::pin::pin!(coordinator.execute(run));
//! while let Some(event) = events.next().await {
//!     println!("{}", event.to_record());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes (NDJSON execution stream)
//! - [`artifacts`] - On-disk persistence of step and final reports
//! - [`llm`] - LLM client implementations (Ollama, OpenAI)
//! - [`research`] - Planning, fan-out/fan-in orchestration, synthesis
//! - [`search`] - Web search providers and page summarization
//! - [`types`] - Common types and error handling
//!
//! ## Execution model
//!
//! One concurrent execution is launched per step, eagerly and without a
//! worker-pool cap, a deliberate simplicity tradeoff for the small,
//! I/O-bound batches a research plan produces. Results stream in completion
//! order; callers re-sort by step index if presentation order matters. A
//! failing step degrades to an error record and never aborts its siblings.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// On-disk artifact persistence.
pub mod artifacts;
/// LLM provider clients and abstractions.
pub mod llm;
/// Research planning, orchestration and synthesis.
pub mod research;
/// Web search providers and page summarization.
pub mod search;
/// Core types (requests, responses, run model, errors).
pub mod types;
/// Configuration and markup utilities.
pub mod utils;

// Re-export commonly used types
pub use artifacts::ArtifactStore;
pub use llm::{LLMClient, LLMClientFactory, Provider};
pub use research::{
    ReportSynthesizer, ResearchCoordinator, ResearchPlanner, RunRegistry, StepExecutor,
};
pub use search::{DaedraSearch, PageSummarizer, SearchProvider, SerperSearch, SourceReader};
pub use types::{AppError, Result};
pub use utils::config::Config;

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Service configuration
    pub config: Arc<Config>,
    /// LLM collaborator used for planning, summarization and synthesis
    pub llm: Arc<dyn LLMClient>,
    /// Web search collaborator
    pub search: Arc<dyn SearchProvider>,
    /// Page fetch-and-summarize collaborator
    pub reader: Arc<dyn SourceReader>,
    /// Artifact persistence
    pub artifacts: Arc<ArtifactStore>,
    /// Process-wide research run id registry
    pub runs: Arc<RunRegistry>,
}
