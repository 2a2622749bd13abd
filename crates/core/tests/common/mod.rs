//! Common test utilities shared by the integration tests.
//!
//! This module provides:
//! - Test fixtures (sample screenshots, scripted tool calls, a wired-up harness)
//! - Mock external services (sandbox provider, issue tracker, image host)
//! - Custom assertions over job records and events

pub mod assertions;
pub mod fixtures;
pub mod mock_services;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_services::*;
