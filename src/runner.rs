//! Polling loop
//!
//! One cycle: fetch a snapshot, run the propagation walk, commit the changes,
//! then keep and save the updated classification store. Cycles never overlap; the loop
//! sleeps for whatever is left of the delay after each one.

use crate::classification::ClassificationStore;
use crate::engine::{self, EngineSettings};
use crate::error::{CycleError, ServiceError, StoreError};
use crate::formatting::{describe_command, format_cycle_summary};
use crate::service::TaskService;
use crate::storage::Storage;
use crate::tasks::local_now;
use anyhow::Result;
use chrono::NaiveDateTime;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// What one cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Commands submitted
    pub committed: usize,
    /// Tasks carrying the marker afterwards
    pub marked: usize,
    /// Directive warnings raised
    pub warnings: usize,
    pub elapsed: Duration,
}

/// Runs cycles against one task service and one state file
pub struct Reconciler<S> {
    service: S,
    storage: Storage,
    store: ClassificationStore,
    settings: EngineSettings,
}

impl<S: TaskService> Reconciler<S> {
    /// Create a reconciler, loading the classification store from `storage`
    pub fn new(service: S, storage: Storage, settings: EngineSettings) -> Result<Self, StoreError> {
        let store = storage.load()?;
        debug!(
            "Loaded {} classification record(s) from {}",
            store.len(),
            storage.path().display()
        );
        Ok(Self {
            service,
            storage,
            store,
            settings,
        })
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn store(&self) -> &ClassificationStore {
        &self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Make sure the marker label exists on the service
    pub async fn provision_label(&self) -> Result<(), ServiceError> {
        if self.service.ensure_label(&self.settings.label).await? {
            info!("Created label '{}'", self.settings.label);
        }
        Ok(())
    }

    /// Run one cycle at the current local time
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        self.run_cycle_at(local_now()).await
    }

    /// Run one cycle as if the local time were `now`
    pub async fn run_cycle_at(&mut self, now: NaiveDateTime) -> Result<CycleReport, CycleError> {
        let started = Instant::now();

        let snapshot = self
            .service
            .fetch_snapshot()
            .await
            .map_err(CycleError::Fetch)?;
        debug!(
            "Fetched {} project(s), {} section(s), {} task(s)",
            snapshot.projects.len(),
            snapshot.sections.len(),
            snapshot.tasks.len()
        );

        // The walk works on a copy; a lost batch is recomputed from the old state
        let mut next = self.store.clone();
        let outcome = engine::propagate(&self.settings, &snapshot, &mut next, now);

        let commands = outcome.changes.into_commands();
        for command in &commands {
            debug!("Queued {}", describe_command(command, &snapshot));
        }
        self.service
            .commit(&commands)
            .await
            .map_err(CycleError::Commit)?;
        info!("{}", format_cycle_summary(commands.len()));

        self.store = next;
        self.storage.save(&self.store)?;

        Ok(CycleReport {
            committed: commands.len(),
            marked: outcome.marked,
            warnings: outcome.warnings,
            elapsed: started.elapsed(),
        })
    }
}

/// When cycles run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Target time from the start of one cycle to the start of the next
    pub delay: Duration,
    /// Run a single cycle and stop
    pub onetime: bool,
}

/// Time left to wait after a cycle that took `elapsed`
pub fn remaining_delay(delay: Duration, elapsed: Duration) -> Duration {
    delay.saturating_sub(elapsed)
}

/// Run cycles until interrupted, or once with `schedule.onetime`
///
/// A failed cycle is logged and retried after the delay. In one-time mode the
/// failure is returned instead.
pub async fn run<S: TaskService>(reconciler: &mut Reconciler<S>, schedule: Schedule) -> Result<()> {
    loop {
        let started = Instant::now();
        match reconciler.run_cycle().await {
            Ok(report) if report.warnings > 0 => {
                warn!("{} task(s) carry directives that could not be read", report.warnings);
            }
            Ok(_) => {}
            Err(e) if schedule.onetime => return Err(e.into()),
            Err(e) => error!("Cycle failed, retrying next cycle: {}", e),
        }

        if schedule.onetime {
            return Ok(());
        }

        let elapsed = started.elapsed();
        if elapsed > schedule.delay {
            debug!(
                "Cycle took {:.1}s, longer than the {}s delay; skipping sleep",
                elapsed.as_secs_f64(),
                schedule.delay.as_secs()
            );
        }

        tokio::select! {
            _ = tokio::time::sleep(remaining_delay(schedule.delay, elapsed)) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl+C, shutting down...");
                return Ok(());
            }
        }
    }
}
