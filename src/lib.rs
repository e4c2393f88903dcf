//! GTD Autolabel Library
//!
//! This library keeps a "next action" label on the right tasks of a Todoist
//! account. Project, section and task names end in marker characters that say
//! whether their children are worked on one at a time (`-`) or all at once
//! (`=`); every cycle the labels are recomputed from those markers and only the
//! differences are sent back.
//!
//! # Architecture
//!
//! The library follows a 3-layer architecture:
//! - **Domain Layer**: `disposition`, `header`, `suppression`, `recurring` and
//!   `engine` - pure classification and propagation, no I/O
//! - **Persistence Layer**: `classification` and `storage` - the TOML file that
//!   remembers dispositions between cycles for change detection
//! - **Service Layer**: `service` and `runner` - the Todoist adapter and the
//!   polling loop that drives fetch, propagate, save and commit
//!
//! # Example
//!
//! ```no_run
//! use gtd_autolabel::{EngineSettings, Reconciler, Storage, TodoistService};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let service = TodoistService::new("api-token");
//!     let storage = Storage::new("gtd-autolabel-state.toml");
//!     let mut reconciler = Reconciler::new(service, storage, EngineSettings::default())?;
//!     let report = reconciler.run_cycle().await?;
//!     println!("{} change(s)", report.committed);
//!     Ok(())
//! }
//! ```

pub mod classification;
pub mod commit;
pub mod config;
pub mod disposition;
pub mod engine;
pub mod error;
pub mod formatting;
pub mod header;
pub mod recurring;
pub mod runner;
pub mod service;
pub mod storage;
pub mod suppression;
pub mod tasks;
pub mod validation;

// Re-export commonly used types
pub use classification::{ClassificationRecord, ClassificationStore, RecordKind};
pub use commit::{ChangeSet, Command};
pub use config::Config;
pub use disposition::{Disposition, DispositionCode, Markers, NodeKind};
pub use engine::{EngineSettings, Outcome, propagate};
pub use error::{ConfigError, CycleError, DirectiveError, ServiceError, StoreError};
pub use runner::{CycleReport, Reconciler, Schedule};
pub use service::{MemoryService, TaskService, TodoistService};
pub use storage::Storage;
pub use tasks::{Due, Project, Section, Snapshot, Task};
