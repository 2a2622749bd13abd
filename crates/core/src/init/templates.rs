//! Embedded template files for `.shotbug` initialization.
//!
//! The workspace `templates/` directory is embedded at compile time with
//! `rust-embed`, so `shotbug init` needs no files next to the binary.

use rust_embed::RustEmbed;

/// Files from the workspace root `templates/` directory.
///
/// With the `debug-embed` feature, debug builds embed as well instead of
/// reading from disk at runtime.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Get template file content by path, relative to the templates root.
///
/// # Example
/// ```
/// use sb_core::init::templates::get_template;
///
/// let config = get_template("config.toml").unwrap_or_default();
/// assert!(config.contains("[model]"));
/// ```
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// List all template paths starting with `prefix`, sorted.
pub fn list_templates(prefix: &str) -> Vec<String> {
    let mut paths: Vec<String> = TemplateAssets::iter()
        .filter(|path| path.starts_with(prefix))
        .map(|path| path.to_string())
        .collect();
    paths.sort();
    paths
}
