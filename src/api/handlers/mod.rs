//! Request handlers for the DeepSprint API.

/// Plan building and regeneration.
pub mod plan;
/// Streamed run execution.
pub mod research;
