use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Get the current wall-clock time in local timezone
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// A project (top-level container of sections and tasks)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Remote identifier
    pub id: String,
    /// Display name, possibly ending in disposition markers
    pub name: String,
    /// Whether this is the service's reserved inbox project
    #[serde(default)]
    pub is_inbox: bool,
    /// Position among sibling projects
    #[serde(default)]
    pub order: i64,
}

/// A section inside a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
    /// Owning project
    pub project_id: String,
    /// Position inside the project
    #[serde(default)]
    pub order: i64,
}

/// Due information attached to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Due {
    /// Calendar date the task is due
    pub date: NaiveDate,
    /// Exact due time, when the task has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<NaiveDateTime>,
    /// Whether the due date recurs
    #[serde(default)]
    pub is_recurring: bool,
    /// Human readable recurrence, e.g. "every day"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
}

impl Due {
    /// Due date without a time component
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            datetime: None,
            is_recurring: false,
            string: None,
        }
    }

    /// The moment the task becomes due: the exact time if known, else midnight
    pub fn moment(&self) -> NaiveDateTime {
        self.datetime
            .unwrap_or_else(|| self.date.and_time(chrono::NaiveTime::MIN))
    }
}

/// A task. Tasks with a `parent_id` form a forest inside one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Task text, possibly carrying header glyphs, markers and start directives
    pub content: String,
    pub project_id: String,
    /// Section, or `None` for tasks outside any section
    #[serde(default)]
    pub section_id: Option<String>,
    /// Parent task, or `None` for a root task
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Position among siblings
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub due: Option<Due>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Task {
    /// Check whether the task carries `label`
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Everything fetched from the service in one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Snapshot {
    /// Create a new empty snapshot
    pub fn new() -> Self {
        Self::default()
    }
}
