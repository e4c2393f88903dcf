//! Task hierarchy models
//!
//! Transient snapshot data fetched from the task service every cycle.
//! It is split into submodules:
//! - `model`: projects, sections, tasks and the snapshot holding them
//! - `queries`: lookups over a snapshot
//! - `forest`: parent-indexed view of the tasks of one section

mod forest;
mod model;
mod queries;

// Re-export all public types
pub use forest::TaskForest;
pub use model::{Due, Project, Section, Snapshot, Task, local_now};
