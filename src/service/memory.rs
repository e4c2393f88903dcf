use super::TaskService;
use crate::commit::Command;
use crate::error::ServiceError;
use crate::tasks::Snapshot;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// In-process task service
///
/// Holds a snapshot, applies committed commands to it and remembers every
/// batch it received.
#[derive(Debug, Default)]
pub struct MemoryService {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: Snapshot,
    labels: Vec<String>,
    batches: Vec<Vec<Command>>,
    fail_fetches: usize,
    fail_commits: usize,
}

impl MemoryService {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                snapshot,
                ..Default::default()
            }),
        }
    }

    /// Current state of the held snapshot
    pub async fn snapshot(&self) -> Snapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// Replace the held snapshot, e.g. to simulate edits between cycles
    pub async fn edit<F: FnOnce(&mut Snapshot)>(&self, f: F) {
        f(&mut self.state.lock().await.snapshot);
    }

    /// Every non-empty batch committed so far
    pub async fn batches(&self) -> Vec<Vec<Command>> {
        self.state.lock().await.batches.clone()
    }

    pub async fn labels(&self) -> Vec<String> {
        self.state.lock().await.labels.clone()
    }

    /// Make the next `count` fetches fail
    pub async fn fail_next_fetches(&self, count: usize) {
        self.state.lock().await.fail_fetches = count;
    }

    /// Reject the next `count` non-empty commits without applying them
    pub async fn fail_next_commits(&self, count: usize) {
        self.state.lock().await.fail_commits = count;
    }
}

#[async_trait]
impl TaskService for MemoryService {
    async fn fetch_snapshot(&self) -> Result<Snapshot, ServiceError> {
        let mut state = self.state.lock().await;
        if state.fail_fetches > 0 {
            state.fail_fetches -= 1;
            return Err(ServiceError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(state.snapshot.clone())
    }

    async fn commit(&self, commands: &[Command]) -> Result<(), ServiceError> {
        if commands.is_empty() {
            return Ok(());
        }

        let mut state = self.state.lock().await;
        if state.fail_commits > 0 {
            state.fail_commits -= 1;
            return Err(ServiceError::Rejected {
                rejected: commands.len(),
                total: commands.len(),
            });
        }
        for command in commands {
            apply(&mut state.snapshot, command);
        }
        state.batches.push(commands.to_vec());
        Ok(())
    }

    async fn ensure_label(&self, name: &str) -> Result<bool, ServiceError> {
        let mut state = self.state.lock().await;
        if state.labels.iter().any(|l| l == name) {
            return Ok(false);
        }
        state.labels.push(name.to_string());
        Ok(true)
    }
}

fn apply(snapshot: &mut Snapshot, command: &Command) {
    match command {
        Command::UpdateTaskLabels { id, labels } => {
            if let Some(task) = snapshot.find_task_mut(id) {
                task.labels = labels.clone();
            }
        }
        Command::UpdateTaskContent { id, content } => {
            if let Some(task) = snapshot.find_task_mut(id) {
                task.content = content.clone();
            }
        }
        Command::UpdateTaskDue { id, date, .. } => {
            if let Some(due) = snapshot.find_task_mut(id).and_then(|t| t.due.as_mut()) {
                due.date = *date;
                due.datetime = None;
            }
        }
        Command::RenameProject { id, name } => {
            if let Some(project) = snapshot.projects.iter_mut().find(|p| &p.id == id) {
                project.name = name.clone();
            }
        }
        Command::RenameSection { id, name } => {
            if let Some(section) = snapshot.sections.iter_mut().find(|s| &s.id == id) {
                section.name = name.clone();
            }
        }
    }
}
