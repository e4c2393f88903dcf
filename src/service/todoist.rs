use super::TaskService;
use crate::commit::Command;
use crate::error::ServiceError;
use crate::tasks::{Due, Project, Section, Snapshot, Task};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Public Todoist endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.todoist.com";

const SYNC_PATH: &str = "/api/v1/sync";
const SNAPSHOT_RESOURCES: &str = r#"["projects","sections","items"]"#;
const LABEL_RESOURCES: &str = r#"["labels"]"#;

/// Todoist sync API adapter
pub struct TodoistService {
    token: String,
    base_url: String,
    client: reqwest::Client,
}

impl TodoistService {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Point the adapter at another host (used against mock servers)
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn sync(&self, form: &[(&str, &str)]) -> Result<reqwest::Response, ServiceError> {
        let url = format!("{}{}", self.base_url, SYNC_PATH);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }
        Ok(response)
    }

    async fn read<T: serde::de::DeserializeOwned>(
        &self,
        resources: &str,
    ) -> Result<T, ServiceError> {
        let response = self
            .sync(&[("sync_token", "*"), ("resource_types", resources)])
            .await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn submit(&self, commands: Vec<Value>) -> Result<(), ServiceError> {
        let total = commands.len();
        let payload = Value::Array(commands).to_string();
        let response = self.sync(&[("commands", payload.as_str())]).await?;
        let text = response.text().await?;
        let reply: WriteReply =
            serde_json::from_str(&text).map_err(|e| ServiceError::Decode(e.to_string()))?;

        let rejected: Vec<(&String, &Value)> = reply
            .sync_status
            .iter()
            .filter(|(_, status)| status.as_str() != Some("ok"))
            .collect();
        for (uuid, status) in &rejected {
            tracing::warn!("Command {} rejected: {}", uuid, status);
        }
        if !rejected.is_empty() {
            return Err(ServiceError::Rejected {
                rejected: rejected.len(),
                total,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TaskService for TodoistService {
    async fn fetch_snapshot(&self) -> Result<Snapshot, ServiceError> {
        let reply: SnapshotReply = self.read(SNAPSHOT_RESOURCES).await?;
        reply.into_snapshot()
    }

    async fn commit(&self, commands: &[Command]) -> Result<(), ServiceError> {
        if commands.is_empty() {
            return Ok(());
        }
        self.submit(commands.iter().map(to_wire).collect()).await
    }

    async fn ensure_label(&self, name: &str) -> Result<bool, ServiceError> {
        let reply: LabelReply = self.read(LABEL_RESOURCES).await?;
        if reply.labels.iter().any(|l| !l.is_deleted && l.name == name) {
            return Ok(false);
        }

        tracing::info!("Label '{}' not found, creating it", name);
        self.submit(vec![wire_command("label_add", json!({ "name": name }))])
            .await?;
        Ok(true)
    }
}

fn wire_command(kind: &str, args: Value) -> Value {
    json!({
        "type": kind,
        "uuid": uuid::Uuid::new_v4().to_string(),
        "args": args,
    })
}

fn to_wire(command: &Command) -> Value {
    match command {
        Command::UpdateTaskLabels { id, labels } => {
            wire_command("item_update", json!({ "id": id, "labels": labels }))
        }
        Command::UpdateTaskContent { id, content } => {
            wire_command("item_update", json!({ "id": id, "content": content }))
        }
        Command::UpdateTaskDue { id, date, string } => {
            let mut due = json!({ "date": date.format("%Y-%m-%d").to_string() });
            if let Some(string) = string {
                due["string"] = json!(string);
            }
            wire_command("item_update", json!({ "id": id, "due": due }))
        }
        Command::RenameProject { id, name } => {
            wire_command("project_update", json!({ "id": id, "name": name }))
        }
        Command::RenameSection { id, name } => {
            wire_command("section_update", json!({ "id": id, "name": name }))
        }
    }
}

#[derive(Debug, Deserialize)]
struct WriteReply {
    #[serde(default)]
    sync_status: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct LabelReply {
    #[serde(default)]
    labels: Vec<WireLabel>,
}

#[derive(Debug, Deserialize)]
struct WireLabel {
    name: String,
    #[serde(default)]
    is_deleted: bool,
}

#[derive(Debug, Deserialize)]
struct SnapshotReply {
    #[serde(default)]
    projects: Vec<WireProject>,
    #[serde(default)]
    sections: Vec<WireSection>,
    #[serde(default)]
    items: Vec<WireItem>,
}

#[derive(Debug, Deserialize)]
struct WireProject {
    id: String,
    name: String,
    #[serde(default)]
    inbox_project: bool,
    #[serde(default)]
    child_order: i64,
    #[serde(default)]
    is_deleted: bool,
    #[serde(default)]
    is_archived: bool,
}

#[derive(Debug, Deserialize)]
struct WireSection {
    id: String,
    name: String,
    project_id: String,
    #[serde(default)]
    section_order: i64,
    #[serde(default)]
    is_deleted: bool,
    #[serde(default)]
    is_archived: bool,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    id: String,
    content: String,
    project_id: String,
    #[serde(default)]
    section_id: Option<String>,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    child_order: i64,
    #[serde(default)]
    checked: bool,
    #[serde(default)]
    is_deleted: bool,
    #[serde(default)]
    due: Option<WireDue>,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireDue {
    date: String,
    #[serde(default)]
    is_recurring: bool,
    #[serde(default)]
    string: Option<String>,
}

impl SnapshotReply {
    fn into_snapshot(self) -> Result<Snapshot, ServiceError> {
        let projects = self
            .projects
            .into_iter()
            .filter(|p| !p.is_deleted && !p.is_archived)
            .map(|p| Project {
                id: p.id,
                name: p.name,
                is_inbox: p.inbox_project,
                order: p.child_order,
            })
            .collect();

        let sections = self
            .sections
            .into_iter()
            .filter(|s| !s.is_deleted && !s.is_archived)
            .map(|s| Section {
                id: s.id,
                name: s.name,
                project_id: s.project_id,
                order: s.section_order,
            })
            .collect();

        let mut tasks = Vec::new();
        for item in self.items.into_iter().filter(|i| !i.is_deleted) {
            let due = item.due.map(parse_due).transpose()?;
            tasks.push(Task {
                id: item.id,
                content: item.content,
                project_id: item.project_id,
                section_id: item.section_id,
                parent_id: item.parent_id,
                order: item.child_order,
                is_completed: item.checked,
                due,
                labels: item.labels,
            });
        }

        Ok(Snapshot {
            projects,
            sections,
            tasks,
        })
    }
}

/// Due dates come as `YYYY-MM-DD`, or with a time as `YYYY-MM-DDTHH:MM:SS[Z]`
fn parse_due(due: WireDue) -> Result<Due, ServiceError> {
    let bad = |_| ServiceError::Decode(format!("invalid due date '{}'", due.date));

    let (date, datetime) = if due.date.len() > 10 {
        let datetime = NaiveDateTime::parse_from_str(due.date.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S")
            .map_err(bad)?;
        (datetime.date(), Some(datetime))
    } else {
        (NaiveDate::parse_from_str(&due.date, "%Y-%m-%d").map_err(bad)?, None)
    };

    Ok(Due {
        date,
        datetime,
        is_recurring: due.is_recurring,
        string: due.string,
    })
}
