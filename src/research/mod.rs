//! Multi-Step Research Coordination
//!
//! This module is the core of DeepSprint: it turns a research topic into an
//! ordered plan, fans the plan's steps out as independent concurrent
//! executions, streams each result back the moment it completes, and
//! synthesizes everything into one final report.
//!
//! # Architecture
//!
//! - [`planner::ResearchPlanner`] - Builds a plan, key entities and search
//!   terms for a topic
//! - [`step::StepExecutor`] - Runs one step: search, fetch, summarize,
//!   compose, persist
//! - [`coordinator::ResearchCoordinator`] - Fan-out/fan-in orchestration and
//!   completion-order streaming
//! - [`report::ReportSynthesizer`] - Final report over the accumulated step
//!   output
//! - [`registry::RunRegistry`] - Process-wide run identifier
//!
//! # Research Workflow
//!
//! 1. **Planning** - Decompose the topic into single-line research steps
//! 2. **Fan-out** - One concurrent execution per step, no ordering between
//!    siblings
//! 3. **Streaming** - Results surface in completion order, fast steps first
//! 4. **Synthesis** - One executive report over everything that succeeded

/// Fan-out/fan-in orchestration and completion-order streaming.
pub mod coordinator;
/// Topic decomposition into plans, entities and search terms.
pub mod planner;
/// Process-wide research run identifier.
pub mod registry;
/// Final report synthesis.
pub mod report;
/// Single-step execution pipeline.
pub mod step;

pub use coordinator::ResearchCoordinator;
pub use planner::ResearchPlanner;
pub use registry::RunRegistry;
pub use report::ReportSynthesizer;
pub use step::StepExecutor;
