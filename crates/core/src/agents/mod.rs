//! Reasoning model abstraction.
//!
//! This module provides the `VisionModel` trait (Adapter Pattern), the
//! conversation types exchanged with it, and the adapters that talk to real
//! model services.

pub mod adapters;
pub mod base;
pub mod factory;

pub use adapters::{GeminiAdapter, MockModel};
pub use base::{AgentError, Message, ModelRequest, ModelTurn, Part, Role, VisionModel};
pub use factory::ModelFactory;
