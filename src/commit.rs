//! Change committer
//!
//! Collects everything a cycle wants to change and turns it into one ordered
//! batch of commands for the task service.

use crate::tasks::Task;
use chrono::NaiveDate;
use std::collections::HashMap;

/// One write against the task service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the full label list of a task
    UpdateTaskLabels { id: String, labels: Vec<String> },
    /// Replace the content of a task
    UpdateTaskContent { id: String, content: String },
    /// Move a task's due date, keeping its recurrence
    UpdateTaskDue {
        id: String,
        date: NaiveDate,
        string: Option<String>,
    },
    RenameProject { id: String, name: String },
    RenameSection { id: String, name: String },
}

impl Command {
    /// ID of the object the command targets
    pub fn target_id(&self) -> &str {
        match self {
            Command::UpdateTaskLabels { id, .. }
            | Command::UpdateTaskContent { id, .. }
            | Command::UpdateTaskDue { id, .. }
            | Command::RenameProject { id, .. }
            | Command::RenameSection { id, .. } => id,
        }
    }
}

/// Pending changes of one cycle
///
/// Renames and content rewrites are keyed by target so that a later rewrite
/// in the same cycle replaces an earlier one. Label updates are only emitted
/// for tasks whose final label membership differs from what was fetched.
#[derive(Debug, Default)]
pub struct ChangeSet {
    commands: Vec<Command>,
    content_slots: HashMap<String, usize>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands queued so far, in submission order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    /// Queue a content rewrite for a task, replacing any earlier one
    pub fn set_content(&mut self, task_id: &str, content: &str) {
        let command = Command::UpdateTaskContent {
            id: task_id.to_string(),
            content: content.to_string(),
        };
        self.upsert(format!("task:{}", task_id), command);
    }

    pub fn rename_project(&mut self, project_id: &str, name: &str) {
        let command = Command::RenameProject {
            id: project_id.to_string(),
            name: name.to_string(),
        };
        self.upsert(format!("project:{}", project_id), command);
    }

    pub fn rename_section(&mut self, section_id: &str, name: &str) {
        let command = Command::RenameSection {
            id: section_id.to_string(),
            name: name.to_string(),
        };
        self.upsert(format!("section:{}", section_id), command);
    }

    pub fn move_due(&mut self, task_id: &str, date: NaiveDate, string: Option<String>) {
        self.commands.push(Command::UpdateTaskDue {
            id: task_id.to_string(),
            date,
            string,
        });
    }

    /// Queue a label update if the marker membership of `task` changes
    ///
    /// Other labels on the task are preserved in their original order.
    ///
    /// # Arguments
    /// * `task` - The task as fetched this cycle
    /// * `label` - The marker label
    /// * `marked` - Whether the task should carry the marker after this cycle
    ///
    /// # Returns
    /// `true` if an update was queued
    pub fn record_marker(&mut self, task: &Task, label: &str, marked: bool) -> bool {
        if task.has_label(label) == marked {
            return false;
        }

        let labels = if marked {
            let mut labels = task.labels.clone();
            labels.push(label.to_string());
            labels
        } else {
            task.labels.iter().filter(|l| *l != label).cloned().collect()
        };

        self.commands.push(Command::UpdateTaskLabels {
            id: task.id.clone(),
            labels,
        });
        true
    }

    fn upsert(&mut self, key: String, command: Command) {
        match self.content_slots.get(&key) {
            Some(&slot) => self.commands[slot] = command,
            None => {
                self.content_slots.insert(key, self.commands.len());
                self.commands.push(command);
            }
        }
    }
}
