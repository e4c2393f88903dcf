//! Task service adapters
//!
//! The engine never talks to the network. The runner fetches a snapshot
//! through a [`TaskService`], hands it to the engine and commits the result
//! through the same service.
//!
//! - `todoist`: the Todoist sync API over HTTPS
//! - `memory`: an in-process service holding a snapshot, used by tests

mod memory;
mod todoist;

pub use memory::MemoryService;
pub use todoist::{DEFAULT_BASE_URL, TodoistService};

use crate::commit::Command;
use crate::error::ServiceError;
use crate::tasks::Snapshot;
use async_trait::async_trait;

#[async_trait]
pub trait TaskService: Send + Sync {
    /// Fetch every project, section and open task
    async fn fetch_snapshot(&self) -> Result<Snapshot, ServiceError>;

    /// Submit a batch of commands in one request
    async fn commit(&self, commands: &[Command]) -> Result<(), ServiceError>;

    /// Make sure a label with this name exists
    ///
    /// # Returns
    /// `true` if the label had to be created
    async fn ensure_label(&self, name: &str) -> Result<bool, ServiceError>;
}
