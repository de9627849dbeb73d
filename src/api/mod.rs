//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for DeepSprint, built on the Axum
//! web framework.
//!
//! # API Endpoints
//!
//! ## Planning (`/api/plan`)
//! - `POST /api/plan` - Build a research plan for a topic
//! - `POST /api/plan/regenerate` - Rebuild the plan under a fresh run id
//!
//! ## Execution (`/api/research`)
//! - `POST /api/research/execute` - Execute a run; streams newline-delimited
//!   JSON records (one per step, in completion order, then the final report)
//!
//! ## Health (`/api/health`)
//! - `GET /api/health` - Health check endpoint

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
