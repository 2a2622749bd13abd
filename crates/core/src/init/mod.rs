//! Initialization of a `.shotbug/` directory.
//!
//! `shotbug init` writes the templates embedded in the binary:
//! - Global configuration (`config.toml`)
//! - The agent's instruction frame (`agent.md`)
//!
//! # Example
//!
//! ```no_run
//! use sb_core::init::{generate_shotbug_structure, InitOptions};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//! };
//!
//! let written = generate_shotbug_structure(options).await?;
//! println!("Wrote {} files", written.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_shotbug_structure, InitOptions};
pub use templates::{get_template, list_templates};
