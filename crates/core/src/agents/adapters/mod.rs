//! Model adapter implementations.

mod gemini_adapter;
pub mod mock_agent;

pub use gemini_adapter::{GeminiAdapter, DEFAULT_GEMINI_BASE_URL};
pub use mock_agent::MockModel;
