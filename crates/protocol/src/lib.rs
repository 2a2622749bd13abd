//! # sb-protocol
//!
//! Core protocol definitions and data models for shotbug.
//!
//! This crate defines all shared data structures used for:
//! - The job record polled by clients while a screenshot is processed
//! - The bug analysis and browser diagnostics attached to a job
//! - Tool calls exchanged with the reasoning model
//! - Job events streamed to subscribers
//!
//! ## Modules
//!
//! - [`job_models`]: Job record, status and partial updates
//! - [`analysis_models`]: Bug analysis, severity and browser context
//! - [`tool_models`]: Tool calls, tool definitions and filed issues
//! - [`ipc`]: Events emitted while a job progresses
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, ts-rs, chrono and uuid
//! - TypeScript generation: All types derive `TS` for client compatibility
//! - Independent compilation: No dependencies on other shotbug crates

pub mod analysis_models;
pub mod ipc;
pub mod job_models;
pub mod tool_models;

// Re-export all public types for convenience
pub use analysis_models::*;
pub use ipc::*;
pub use job_models::*;
pub use tool_models::*;
