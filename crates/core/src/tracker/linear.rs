//! Linear GraphQL client.

use crate::config::models::TrackerConfig;
use crate::tracker::{IssueTracker, TicketDraft, TrackerError};
use async_trait::async_trait;
use sb_protocol::Issue;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::OnceCell;

const CREATE_ISSUE: &str = r#"
mutation CreateIssue($input: IssueCreateInput!) {
  issueCreate(input: $input) {
    success
    issue { id identifier title url }
  }
}"#;

const TEAMS: &str = r#"
query Teams {
  teams { nodes { id name } }
}"#;

const LABELS: &str = r#"
query Labels($names: [String!], $teamId: ID) {
  issueLabels(filter: {
    name: { in: $names },
    or: [{ team: { id: { eq: $teamId } } }, { team: { null: true } }]
  }) { nodes { id name } }
}"#;

pub struct LinearClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    /// Explicit team from config, or the first team of the workspace once queried.
    team_id: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TeamsData {
    teams: Nodes<Team>,
}

#[derive(Debug, Deserialize)]
struct Team {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelsData {
    issue_labels: Nodes<Label>,
}

#[derive(Debug, Deserialize)]
struct Label {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueCreateData {
    issue_create: IssueCreatePayload,
}

#[derive(Debug, Deserialize)]
struct IssueCreatePayload {
    success: bool,
    issue: Option<Issue>,
}

impl LinearClient {
    pub fn new(config: &TrackerConfig, api_key: impl Into<String>) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TrackerError::Request(e.to_string()))?;

        let team_id = match &config.team_id {
            Some(id) => OnceCell::from(id.clone()),
            None => OnceCell::new(),
        };

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: api_key.into(),
            team_id,
        })
    }

    async fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, TrackerError> {
        let response = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| TrackerError::Request(e.to_string()))?;

        let status = response.status();
        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| TrackerError::Request(format!("HTTP {}: {e}", status.as_u16())))?;

        into_data(body)
    }

    async fn team_id(&self) -> Result<&str, TrackerError> {
        let id = self
            .team_id
            .get_or_try_init(|| async {
                let data: TeamsData = self.graphql(TEAMS, json!({})).await?;
                let team = data.teams.nodes.into_iter().next().ok_or(TrackerError::NoTeam)?;
                tracing::info!(team = %team.name, team_id = %team.id, "Using first Linear team");
                Ok::<_, TrackerError>(team.id)
            })
            .await?;
        Ok(id.as_str())
    }

    /// Resolve label names to ids. Names without a matching label are skipped.
    async fn label_ids(&self, team_id: &str, names: &[String]) -> Vec<String> {
        if names.is_empty() {
            return Vec::new();
        }

        let result: Result<LabelsData, TrackerError> = self
            .graphql(LABELS, json!({ "names": names, "teamId": team_id }))
            .await;

        match result {
            Ok(data) => match_labels(names, data.issue_labels.nodes),
            Err(e) => {
                tracing::warn!(error = %e, "Could not resolve labels; filing without them");
                Vec::new()
            }
        }
    }
}

fn into_data<T>(body: GraphQlResponse<T>) -> Result<T, TrackerError> {
    if !body.errors.is_empty() {
        let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
        return Err(TrackerError::Api(messages.join("; ")));
    }
    body.data
        .ok_or_else(|| TrackerError::Api("response carried no data".to_string()))
}

fn match_labels(names: &[String], labels: Vec<Label>) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for label in labels {
        let wanted = names.iter().any(|name| name.eq_ignore_ascii_case(&label.name));
        if wanted && !ids.contains(&label.id) {
            ids.push(label.id);
        }
    }
    ids
}

#[async_trait]
impl IssueTracker for LinearClient {
    async fn create_issue(&self, draft: &TicketDraft) -> Result<Issue, TrackerError> {
        let team_id = self.team_id().await?;
        let label_ids = self.label_ids(team_id, &draft.labels).await;

        let mut input = json!({
            "teamId": team_id,
            "title": draft.title,
            "description": draft.description,
            "priority": draft.priority,
        });
        if !label_ids.is_empty() {
            input["labelIds"] = json!(label_ids);
        }

        let data: IssueCreateData = self.graphql(CREATE_ISSUE, json!({ "input": input })).await?;
        let payload = data.issue_create;
        let issue = match (payload.success, payload.issue) {
            (true, Some(issue)) => issue,
            _ => return Err(TrackerError::Rejected),
        };

        tracing::info!(identifier = %issue.identifier, url = %issue.url, "Linear ticket created");
        Ok(issue)
    }
}
