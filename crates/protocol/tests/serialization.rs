use sb_protocol::*;
use serde_json::json;
use uuid::Uuid;

#[test]
fn test_job_status_serialization() {
    let status = JobStatus::GatheringContext;
    let json = serde_json::to_value(status).expect("Failed to serialize JobStatus");

    assert_eq!(json, "gathering-context");

    let deserialized: JobStatus =
        serde_json::from_value(json).expect("Failed to deserialize JobStatus");
    assert_eq!(deserialized, JobStatus::GatheringContext);
}

#[test]
fn test_job_status_transitions() {
    assert!(JobStatus::Pending.can_transition_to(JobStatus::Analyzing));
    assert!(JobStatus::Analyzing.can_transition_to(JobStatus::Analyzing));
    assert!(JobStatus::Analyzing.can_transition_to(JobStatus::CreatingTicket));
    assert!(JobStatus::CreatingTicket.can_transition_to(JobStatus::Failed));
    assert!(JobStatus::Pending.can_transition_to(JobStatus::Failed));

    assert!(!JobStatus::CreatingTicket.can_transition_to(JobStatus::Analyzing));
    assert!(!JobStatus::Completed.can_transition_to(JobStatus::Failed));
    assert!(!JobStatus::Failed.can_transition_to(JobStatus::Completed));
    assert!(!JobStatus::Failed.can_transition_to(JobStatus::Failed));
}

#[test]
fn test_job_record_uses_camel_case_fields() {
    let mut record = JobRecord::new(Uuid::new_v4());
    record.ticket_url = Some("https://linear.app/acme/issue/ENG-1".to_string());
    record.ticket_id = Some("ENG-1".to_string());

    let json = serde_json::to_value(&record).expect("Failed to serialize JobRecord");

    assert_eq!(json["status"], "pending");
    assert_eq!(json["progress"], 0);
    assert_eq!(json["currentStep"], "Initializing...");
    assert_eq!(json["ticketId"], "ENG-1");
    assert!(json.get("createdAt").is_some());
    assert!(json.get("updatedAt").is_some());
    // Unset optionals are omitted rather than serialized as null
    assert!(json.get("error").is_none());
    assert!(json.get("bugAnalysis").is_none());

    let deserialized: JobRecord =
        serde_json::from_value(json).expect("Failed to deserialize JobRecord");
    assert_eq!(deserialized, record);
}

#[test]
fn test_bug_analysis_defaults_missing_lists() {
    let json = json!({
        "title": "Login button unresponsive",
        "description": "Clicking login does nothing",
        "severity": "high"
    });

    let analysis: BugAnalysis = serde_json::from_value(json).expect("Failed to parse analysis");
    assert_eq!(analysis.severity, Severity::High);
    assert!(analysis.error_messages.is_empty());
    assert!(analysis.urls.is_empty());
    assert!(analysis.suggested_labels.is_empty());
    assert_eq!(analysis.ui_state, "");
}

#[test]
fn test_severity_default_priority() {
    assert_eq!(Severity::Critical.default_priority(), 1);
    assert_eq!(Severity::High.default_priority(), 2);
    assert_eq!(Severity::Medium.default_priority(), 3);
    assert_eq!(Severity::Low.default_priority(), 4);
}

#[test]
fn test_tool_result_payload_shape() {
    let ok = ToolResultPayload::Result(json!({ "url": "https://example.com" }));
    assert_eq!(ok.to_value(), json!({ "result": { "url": "https://example.com" } }));
    assert_eq!(serde_json::to_value(&ok).expect("serialize"), ok.to_value());

    let err = ToolResultPayload::Error("connection refused".to_string());
    assert!(err.is_error());
    assert_eq!(err.to_value(), json!({ "error": "connection refused" }));
}

#[test]
fn test_event_enum_serialization() {
    let job_id = Uuid::new_v4();
    let event = Event::JobStatusUpdate {
        job_id,
        status: JobStatus::Analyzing,
        progress: 10,
    };

    let json = serde_json::to_value(&event).expect("Failed to serialize Event");
    assert_eq!(json["type"], "jobStatusUpdate");
    assert_eq!(json["payload"]["status"], "analyzing");
    assert_eq!(event.job_id(), job_id);
    assert!(!event.is_terminal());

    let failed = Event::JobFailed {
        job_id,
        error: "boom".to_string(),
    };
    let json = serde_json::to_value(&failed).expect("Failed to serialize Event");
    assert_eq!(json["type"], "jobFailed");
    assert!(failed.is_terminal());
}
