use crate::disposition::{Disposition, DispositionCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Last-known classification of one project, section or task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Disposition code computed in the previous cycle
    #[serde(default)]
    pub disposition: DispositionCode,
    /// Disposition inherited from the parent task (tasks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_type: Option<Disposition>,
    /// Due date seen in the previous cycle (recurring root tasks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// Persisted change-detection state
///
/// Records are created lazily on first write and never deleted. A missing
/// record reads the same as a fresh one, so lookups never fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationStore {
    /// Format version for the TOML file (current: 1)
    #[serde(default = "current_format_version")]
    pub format_version: u32,

    // BTreeMap keeps the serialized file ordered, which keeps diffs stable
    #[serde(default)]
    projects: BTreeMap<String, ClassificationRecord>,
    #[serde(default)]
    sections: BTreeMap<String, ClassificationRecord>,
    #[serde(default)]
    tasks: BTreeMap<String, ClassificationRecord>,
}

fn current_format_version() -> u32 {
    1
}

impl Default for ClassificationStore {
    fn default() -> Self {
        Self {
            format_version: current_format_version(),
            projects: BTreeMap::new(),
            sections: BTreeMap::new(),
            tasks: BTreeMap::new(),
        }
    }
}

/// Which table a node's record lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Project,
    Section,
    Task,
}

impl ClassificationStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all tables
    pub fn len(&self) -> usize {
        self.projects.len() + self.sections.len() + self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self, kind: RecordKind) -> &BTreeMap<String, ClassificationRecord> {
        match kind {
            RecordKind::Project => &self.projects,
            RecordKind::Section => &self.sections,
            RecordKind::Task => &self.tasks,
        }
    }

    fn table_mut(&mut self, kind: RecordKind) -> &mut BTreeMap<String, ClassificationRecord> {
        match kind {
            RecordKind::Project => &mut self.projects,
            RecordKind::Section => &mut self.sections,
            RecordKind::Task => &mut self.tasks,
        }
    }

    /// Get the stored record, if one was ever written
    pub fn record(&self, kind: RecordKind, id: &str) -> Option<&ClassificationRecord> {
        self.table(kind).get(id)
    }

    fn record_mut(&mut self, kind: RecordKind, id: &str) -> &mut ClassificationRecord {
        self.table_mut(kind).entry(id.to_string()).or_default()
    }

    /// Stored disposition; unset if there is no record
    pub fn disposition(&self, kind: RecordKind, id: &str) -> DispositionCode {
        self.record(kind, id)
            .map(|r| r.disposition)
            .unwrap_or_default()
    }

    /// Store a freshly computed disposition
    ///
    /// # Arguments
    /// * `kind` - Table to write to
    /// * `id` - Node identity
    /// * `code` - Disposition computed this cycle
    ///
    /// # Returns
    /// `true` if the code differs from the stored one (the node is dirty)
    pub fn update_disposition(&mut self, kind: RecordKind, id: &str, code: DispositionCode) -> bool {
        if self.disposition(kind, id) == code {
            // Do not create records for nodes that never declared anything
            return false;
        }
        self.record_mut(kind, id).disposition = code;
        true
    }

    /// Disposition a task inherited from its parent
    pub fn parent_type(&self, task_id: &str) -> Option<Disposition> {
        self.record(RecordKind::Task, task_id)
            .and_then(|r| r.parent_type)
    }

    pub fn set_parent_type(&mut self, task_id: &str, parent_type: Option<Disposition>) {
        if self.parent_type(task_id) == parent_type {
            return;
        }
        self.record_mut(RecordKind::Task, task_id).parent_type = parent_type;
    }

    /// Due date seen for a task in the previous cycle
    pub fn due_date(&self, task_id: &str) -> Option<NaiveDate> {
        self.record(RecordKind::Task, task_id)
            .and_then(|r| r.due_date)
    }

    pub fn set_due_date(&mut self, task_id: &str, date: NaiveDate) {
        self.record_mut(RecordKind::Task, task_id).due_date = Some(date);
    }
}
