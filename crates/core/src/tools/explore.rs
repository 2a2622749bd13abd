//! URL exploration inside the sandbox.
//!
//! The sandbox fetches the page with `curl` and the response is reduced to a
//! [`BrowserContext`]. Exploration is advisory: once the arguments are valid,
//! any failure inside the sandbox yields the minimal context `{url}`.

use crate::sandbox::SandboxSession;
use crate::tools::ToolError;
use sb_protocol::BrowserContext;
use serde_json::Value;
use std::time::Duration;

/// Upper bound handed to `curl` for the whole transfer.
const FETCH_TIMEOUT_SECS: u64 = 20;
/// Upper bound for the sandbox command, including process startup.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(FETCH_TIMEOUT_SECS + 10);
const STATUS_MARKER: &str = "__SHOTBUG_HTTP_STATUS__:";
const MAX_ERRORS: usize = 20;

pub async fn explore_url(session: &SandboxSession, args: &Value) -> Result<BrowserContext, ToolError> {
    let url = parse_url(args)?;
    tracing::info!(sandbox_id = %session.id(), url = %url, "Exploring URL");

    match session.run(&fetch_command(&url), COMMAND_TIMEOUT).await {
        Ok(output) => Ok(parse_fetch(&url, &output.stdout, &output.stderr)),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Exploration failed, returning minimal context");
            Ok(BrowserContext::minimal(url))
        }
    }
}

fn parse_url(args: &Value) -> Result<String, ToolError> {
    let raw = args
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ToolError::InvalidParameters("missing 'url' parameter".to_string()))?;

    let parsed = reqwest::Url::parse(raw)
        .map_err(|e| ToolError::InvalidParameters(format!("invalid url '{raw}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ToolError::InvalidParameters(format!(
            "unsupported scheme '{}': only http and https can be explored",
            parsed.scheme()
        )));
    }
    Ok(parsed.to_string())
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn fetch_command(url: &str) -> String {
    format!(
        "curl -sS -L --max-time {FETCH_TIMEOUT_SECS} -w '\\n{STATUS_MARKER}%{{http_code}}' {}",
        shell_quote(url)
    )
}

fn parse_fetch(url: &str, stdout: &str, stderr: &str) -> BrowserContext {
    let (body, status_code) = match stdout.rsplit_once(STATUS_MARKER) {
        Some((body, code)) => (body, code.trim().parse::<u16>().ok().filter(|code| *code != 0)),
        None => (stdout, None),
    };

    let mut network_errors: Vec<String> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if let Some(code) = status_code.filter(|code| *code >= 400) {
        network_errors.push(format!("HTTP {code} from {url}"));
    }
    network_errors.truncate(MAX_ERRORS);

    BrowserContext {
        url: url.to_string(),
        page_title: extract_title(body),
        status_code,
        console_errors: Vec::new(),
        network_errors,
    }
}

fn extract_title(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let start = open + lower[open..].find('>')? + 1;
    let end = start + lower[start..].find("</title>")?;
    let title = html[start..end].split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}
