//! Common test utilities for integration tests

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use gtd_autolabel::{
    ClassificationStore, Command, Due, EngineSettings, Outcome, Project, Section, Snapshot, Task,
    propagate,
};

/// Label used by the default settings
pub const LABEL: &str = "next_action";

/// Local date-time on a fixed day
pub fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builder for snapshots; sibling order follows insertion order
#[derive(Default)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
    next_order: i64,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn order(&mut self) -> i64 {
        self.next_order += 1;
        self.next_order
    }

    pub fn project(mut self, id: &str, name: &str) -> Self {
        let order = self.order();
        self.snapshot.projects.push(Project {
            id: id.to_string(),
            name: name.to_string(),
            is_inbox: false,
            order,
        });
        self
    }

    pub fn inbox(mut self, id: &str) -> Self {
        let order = self.order();
        self.snapshot.projects.push(Project {
            id: id.to_string(),
            name: "Inbox".to_string(),
            is_inbox: true,
            order,
        });
        self
    }

    pub fn section(mut self, id: &str, project: &str, name: &str) -> Self {
        let order = self.order();
        self.snapshot.sections.push(Section {
            id: id.to_string(),
            name: name.to_string(),
            project_id: project.to_string(),
            order,
        });
        self
    }

    fn push_task(&mut self, id: &str, project: &str, section: Option<&str>, parent: Option<&str>, content: &str) {
        let order = self.order();
        self.snapshot.tasks.push(Task {
            id: id.to_string(),
            content: content.to_string(),
            project_id: project.to_string(),
            section_id: section.map(str::to_string),
            parent_id: parent.map(str::to_string),
            order,
            is_completed: false,
            due: None,
            labels: Vec::new(),
        });
    }

    /// Root task outside any section
    pub fn task(mut self, id: &str, project: &str, content: &str) -> Self {
        self.push_task(id, project, None, None, content);
        self
    }

    /// Root task in a section
    pub fn task_in(mut self, id: &str, project: &str, section: &str, content: &str) -> Self {
        self.push_task(id, project, Some(section), None, content);
        self
    }

    /// Sub-task placed in the parent's project and section
    pub fn subtask(mut self, id: &str, parent: &str, content: &str) -> Self {
        let parent_task = self.snapshot.find_task(parent).unwrap().clone();
        self.push_task(
            id,
            &parent_task.project_id,
            parent_task.section_id.as_deref(),
            Some(parent),
            content,
        );
        self
    }

    pub fn labelled(mut self, id: &str) -> Self {
        self.snapshot
            .find_task_mut(id)
            .unwrap()
            .labels
            .push(LABEL.to_string());
        self
    }

    pub fn completed(mut self, id: &str) -> Self {
        self.snapshot.find_task_mut(id).unwrap().is_completed = true;
        self
    }

    pub fn due(mut self, id: &str, due: Due) -> Self {
        self.snapshot.find_task_mut(id).unwrap().due = Some(due);
        self
    }

    pub fn build(self) -> Snapshot {
        self.snapshot
    }
}

/// Apply committed commands the way the service would
pub fn apply(snapshot: &mut Snapshot, commands: &[Command]) {
    for command in commands {
        match command {
            Command::UpdateTaskLabels { id, labels } => {
                snapshot.find_task_mut(id).unwrap().labels = labels.clone();
            }
            Command::UpdateTaskContent { id, content } => {
                snapshot.find_task_mut(id).unwrap().content = content.clone();
            }
            Command::UpdateTaskDue { id, date, .. } => {
                if let Some(due) = snapshot.find_task_mut(id).unwrap().due.as_mut() {
                    due.date = *date;
                }
            }
            Command::RenameProject { id, name } => {
                let project = snapshot.projects.iter_mut().find(|p| &p.id == id).unwrap();
                project.name = name.clone();
            }
            Command::RenameSection { id, name } => {
                let section = snapshot.sections.iter_mut().find(|s| &s.id == id).unwrap();
                section.name = name.clone();
            }
        }
    }
}

/// Run one walk and apply its commands to `snapshot`
pub fn cycle(
    settings: &EngineSettings,
    snapshot: &mut Snapshot,
    store: &mut ClassificationStore,
    now: NaiveDateTime,
) -> Outcome {
    let outcome = propagate(settings, snapshot, store, now);
    apply(snapshot, outcome.changes.commands());
    outcome
}

/// IDs of the tasks carrying the label, in snapshot order
pub fn marked(snapshot: &Snapshot) -> Vec<&str> {
    snapshot
        .tasks
        .iter()
        .filter(|t| t.has_label(LABEL))
        .map(|t| t.id.as_str())
        .collect()
}

pub fn content<'a>(snapshot: &'a Snapshot, id: &str) -> &'a str {
    &snapshot.find_task(id).unwrap().content
}
