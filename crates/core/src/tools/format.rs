//! Markdown body of a filed ticket.

use sb_protocol::{BrowserContext, BugAnalysis};

const FOOTER: &str = "*This ticket was automatically generated from a screenshot*";

/// Build the ticket description from the model's analysis, the most recent
/// exploration result and the screenshot reference.
///
/// A `data:` screenshot URL is never pasted into the body.
pub fn build_description(
    analysis: &BugAnalysis,
    browser: Option<&BrowserContext>,
    screenshot_url: Option<&str>,
) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push("## Description\n".to_string());
    sections.push(analysis.description.trim().to_string());
    sections.push(String::new());

    if !analysis.error_messages.is_empty() {
        sections.push("## Error Messages\n".to_string());
        for error in &analysis.error_messages {
            sections.push(fenced(std::slice::from_ref(error)));
        }
        sections.push(String::new());
    }

    let target = browser
        .map(|b| b.url.as_str())
        .or_else(|| analysis.urls.first().map(String::as_str))
        .unwrap_or("Unknown URL");
    let ui_state = match analysis.ui_state.trim() {
        "" => "Bring the page into the state shown in the screenshot",
        state => state,
    };
    sections.push("## Steps to Reproduce\n".to_string());
    sections.push(format!("1. Navigate to: {target}"));
    sections.push(format!("2. {ui_state}"));
    sections.push("3. Observe the error shown in the screenshot".to_string());
    sections.push(String::new());

    sections.push("## Environment\n".to_string());
    if let Some(browser) = browser {
        sections.push(format!("- **URL**: {}", browser.url));
        if let Some(title) = &browser.page_title {
            sections.push(format!("- **Page**: {title}"));
        }
        if let Some(status) = browser.status_code {
            sections.push(format!("- **HTTP status**: {status}"));
        }
    }
    sections.push(format!("- **Severity**: {}", analysis.severity));
    sections.push(String::new());

    if let Some(browser) = browser {
        if !browser.console_errors.is_empty() {
            sections.push("## Console Errors\n".to_string());
            sections.push(fenced(&browser.console_errors));
            sections.push(String::new());
        }
        if !browser.network_errors.is_empty() {
            sections.push("## Network Errors\n".to_string());
            sections.push(fenced(&browser.network_errors));
            sections.push(String::new());
        }
    }

    match screenshot_url {
        Some(url) if url.starts_with("data:") => {
            sections.push("## Screenshot\n".to_string());
            sections.push("*Screenshot embedded as base64 data*".to_string());
            sections.push(String::new());
        }
        Some(url) => {
            sections.push("## Screenshot\n".to_string());
            sections.push(format!("![Bug Screenshot]({url})"));
            sections.push(String::new());
        }
        None => {}
    }

    sections.push("---".to_string());
    sections.push(FOOTER.to_string());
    sections.join("\n")
}

fn fenced(lines: &[String]) -> String {
    format!("```\n{}\n```", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_protocol::Severity;

    fn analysis() -> BugAnalysis {
        BugAnalysis {
            title: "Login button unresponsive".to_string(),
            description: "Clicking **Log in** does nothing.".to_string(),
            error_messages: Vec::new(),
            urls: Vec::new(),
            severity: Severity::High,
            suggested_labels: Vec::new(),
            ui_state: String::new(),
        }
    }

    fn explored() -> BrowserContext {
        BrowserContext {
            url: "https://acme.test/login".to_string(),
            page_title: Some("Acme Login".to_string()),
            status_code: Some(503),
            console_errors: Vec::new(),
            network_errors: vec!["HTTP 503 from https://acme.test/login".to_string()],
        }
    }

    #[test]
    fn test_description_section_first() {
        let body = build_description(&analysis(), None, None);
        assert!(body.starts_with("## Description\n\nClicking **Log in** does nothing.\n"));
    }

    #[test]
    fn test_error_messages_fenced() {
        let mut analysis = analysis();
        analysis.error_messages = vec![
            "Uncaught TypeError: handler is not a function".to_string(),
            "500 Internal Server Error".to_string(),
        ];

        let body = build_description(&analysis, None, None);

        assert!(body.contains(
            "## Error Messages\n\n```\nUncaught TypeError: handler is not a function\n```\n```\n500 Internal Server Error\n```"
        ));
    }

    #[test]
    fn test_error_messages_omitted_when_empty() {
        let body = build_description(&analysis(), None, None);
        assert!(!body.contains("## Error Messages"));
    }

    #[test]
    fn test_steps_prefer_explored_url() {
        let mut analysis = analysis();
        analysis.urls = vec!["https://acme.test/from-screenshot".to_string()];
        analysis.ui_state = "Login form with filled credentials".to_string();

        let body = build_description(&analysis, Some(&explored()), None);
        assert!(body.contains(
            "## Steps to Reproduce\n\n1. Navigate to: https://acme.test/login\n2. Login form with filled credentials\n3. Observe"
        ));

        let body = build_description(&analysis, None, None);
        assert!(body.contains("1. Navigate to: https://acme.test/from-screenshot"));
    }

    #[test]
    fn test_steps_without_any_url() {
        let body = build_description(&analysis(), None, None);
        assert!(body.contains("1. Navigate to: Unknown URL"));
        assert!(body.contains("2. Bring the page into the state shown in the screenshot"));
    }

    #[test]
    fn test_environment_lists_browser_context() {
        let body = build_description(&analysis(), Some(&explored()), None);
        assert!(body.contains(
            "## Environment\n\n- **URL**: https://acme.test/login\n- **Page**: Acme Login\n- **HTTP status**: 503\n- **Severity**: high"
        ));

        let bare = build_description(&analysis(), None, None);
        assert!(bare.contains("## Environment\n\n- **Severity**: high"));
    }

    #[test]
    fn test_console_and_network_errors() {
        let mut context = explored();
        context.console_errors = vec!["ReferenceError: x is not defined".to_string()];

        let body = build_description(&analysis(), Some(&context), None);

        assert!(body.contains("## Console Errors\n\n```\nReferenceError: x is not defined\n```"));
        assert!(body.contains("## Network Errors\n\n```\nHTTP 503 from https://acme.test/login\n```"));

        let quiet = build_description(&analysis(), Some(&BrowserContext::minimal("https://acme.test")), None);
        assert!(!quiet.contains("## Console Errors"));
        assert!(!quiet.contains("## Network Errors"));
    }

    #[test]
    fn test_screenshot_reference() {
        let hosted = build_description(&analysis(), None, Some("https://i.ibb.co/x/shot.png"));
        assert!(hosted.contains("## Screenshot\n\n![Bug Screenshot](https://i.ibb.co/x/shot.png)"));

        let embedded = build_description(&analysis(), None, Some("data:image/png;base64,AAAA"));
        assert!(embedded.contains("## Screenshot\n\n*Screenshot embedded as base64 data*"));
        assert!(!embedded.contains("AAAA"));

        let none = build_description(&analysis(), None, None);
        assert!(!none.contains("## Screenshot"));
    }

    #[test]
    fn test_footer_last() {
        let body = build_description(&analysis(), Some(&explored()), Some("https://i.ibb.co/x/shot.png"));
        assert!(body.ends_with(&format!("\n---\n{FOOTER}")));
    }
}
