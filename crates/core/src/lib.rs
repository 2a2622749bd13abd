//! # sb-core
//!
//! Job orchestration and the agent loop that turns a screenshot into a bug ticket.
//!
//! This crate provides:
//! - Configuration loading from the `.shotbug/` directory and the environment
//! - The reasoning model abstraction and its adapters
//! - The tool registry and the agent loop that drives it
//! - Sandbox lifecycle management
//! - The job record store and the job orchestrator
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`agents`]: Vision model trait and adapter implementations
//! - [`engine`]: Bounded tool-calling agent loop
//! - [`tools`]: Closed set of tools the model may call
//! - [`sandbox`]: Ephemeral sandbox provider and lease management
//! - [`state`]: Job records, the store and the `JobManager`
//! - [`tracker`]: Issue tracker client
//! - [`hosting`]: Screenshot hosting
//! - [`init`]: `.shotbug/` scaffolding

pub mod agents;
pub mod config;
pub mod engine;
pub mod hosting;
pub mod init;
pub mod sandbox;
pub mod state;
pub mod tools;
pub mod tracker;
