//! Job state.
//!
//! This module provides:
//! - Merge rules for job records (`job`)
//! - The `JobStore` trait and its in-memory implementation (`store`)
//! - The `JobManager` that orchestrates each job (`manager`)

pub mod job;
pub mod manager;
pub mod store;

pub use manager::JobManager;
pub use store::{InMemoryJobStore, JobStore};
