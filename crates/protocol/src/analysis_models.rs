//! Bug analysis and browser diagnostic models.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// How badly the bug affects users.
///
/// - Critical: System crash, data loss, security issue
/// - High: Major feature broken, blocking workflow
/// - Medium: Feature partially broken, workaround exists
/// - Low: Minor UI issue, cosmetic problem
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Tracker priority for this severity.
    ///
    /// Uses the ordinal scale 0 = none, 1 = urgent, 2 = high, 3 = normal, 4 = low.
    pub fn default_priority(self) -> u8 {
        match self {
            Severity::Critical => 1,
            Severity::High => 2,
            Severity::Medium => 3,
            Severity::Low => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured description of the bug shown in a screenshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct BugAnalysis {
    /// Concise bug title.
    pub title: String,

    /// Detailed description, usually Markdown.
    pub description: String,

    /// Error messages visible in the screenshot, verbatim.
    #[serde(default)]
    pub error_messages: Vec<String>,

    /// URLs visible in the screenshot (address bar, error pages, ...).
    #[serde(default)]
    pub urls: Vec<String>,

    pub severity: Severity,

    #[serde(default)]
    pub suggested_labels: Vec<String>,

    /// What page the user was on and what they were doing.
    #[serde(default)]
    pub ui_state: String,
}

/// Diagnostics collected by visiting a URL from inside the sandbox.
///
/// Every field except `url` is best-effort and may be empty.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct BrowserContext {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,

    /// Final HTTP status code after redirects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub console_errors: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub network_errors: Vec<String>,
}

impl BrowserContext {
    /// The minimal context returned when exploration could not complete.
    pub fn minimal(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}
