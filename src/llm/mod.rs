//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for the LLM collaborator used by
//! the planner, the source summarizer, the step executor and the report
//! synthesizer. Provider-specific implementations sit behind one trait so the
//! rest of the application never cares which backend is answering.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`Provider`] - Runtime provider selection
//! - [`LLMClientFactory`] - Creates clients from a default provider
//!
//! # Supported Providers
//!
//! - `ollama` - Local Ollama server (default)
//! - `openai` - OpenAI API and compatible endpoints

/// Core LLM client trait, provider enum and factory.
pub mod client;

/// Ollama client implementation.
pub mod ollama;

/// OpenAI client implementation.
pub mod openai;

pub use client::{LLMClient, LLMClientFactory, Provider};
