//! Cron scheduler for the periodic tasks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use docsync_core::error::AppError;

use crate::task::PeriodicTask;

/// What happened on one scheduled tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The task ran to completion with this summary.
    Completed(Value),
    /// The task ran and returned an error, which was logged.
    Failed(String),
    /// The previous run of the same task had not finished yet.
    Skipped,
}

/// A registered task with its overlap guard.
#[derive(Debug, Clone)]
struct TaskSlot {
    task: Arc<dyn PeriodicTask>,
    cron: String,
    running: Arc<AtomicBool>,
    run_lock: Arc<Mutex<()>>,
}

/// Clears the running flag when a run ends, even by unwinding.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TaskSlot {
    async fn tick(&self) -> TickOutcome {
        let name = self.task.name();
        if self.running.swap(true, Ordering::AcqRel) {
            tracing::warn!(task = name, "Previous run still in progress, tick skipped");
            return TickOutcome::Skipped;
        }
        let _running = RunningGuard(&self.running);
        let _exclusive = self.run_lock.lock().await;

        let started = Instant::now();
        tracing::info!(task = name, "Periodic task started");
        match self.task.run().await {
            Ok(summary) => {
                tracing::info!(
                    task = name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Periodic task completed"
                );
                TickOutcome::Completed(summary)
            }
            Err(e) => {
                tracing::error!(
                    task = name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Periodic task failed: {}",
                    e
                );
                TickOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Runs registered tasks on their cron schedules.
///
/// Every run holds one shared lock, so two tasks never execute at the same
/// time. A task whose previous run is still in progress (running or waiting
/// for the lock) skips the tick.
pub struct SyncScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Shared by every task run
    run_lock: Arc<Mutex<()>>,
    /// Registered tasks in registration order
    slots: Vec<TaskSlot>,
}

impl std::fmt::Debug for SyncScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncScheduler")
            .field("tasks", &self.registered())
            .finish()
    }
}

impl SyncScheduler {
    /// Create a scheduler with no tasks
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            run_lock: Arc::new(Mutex::new(())),
            slots: Vec::new(),
        })
    }

    /// Register a task under a six-field cron expression
    pub async fn register(
        &mut self,
        task: Arc<dyn PeriodicTask>,
        cron: &str,
    ) -> Result<(), AppError> {
        let slot = TaskSlot {
            task,
            cron: cron.to_string(),
            running: Arc::new(AtomicBool::new(false)),
            run_lock: Arc::clone(&self.run_lock),
        };
        let name = slot.task.name().to_string();

        let scheduled = slot.clone();
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let slot = scheduled.clone();
            Box::pin(async move {
                slot.tick().await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid schedule '{}' for {}: {}", cron, name, e))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {} schedule: {}", name, e)))?;

        tracing::info!(task = %name, cron, "Registered periodic task");
        self.slots.push(slot);
        Ok(())
    }

    /// Run a registered task immediately, under the same rules as a tick
    pub async fn run_now(&self, name: &str) -> Option<TickOutcome> {
        let slot = self.slots.iter().find(|s| s.task.name() == name)?;
        Some(slot.tick().await)
    }

    /// Names and cron expressions of the registered tasks
    pub fn registered(&self) -> Vec<(String, String)> {
        self.slots
            .iter()
            .map(|s| (s.task.name().to_string(), s.cron.clone()))
            .collect()
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!(tasks = self.slots.len(), "Sync scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler. A run already in progress is not interrupted.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Sync scheduler shut down");
        Ok(())
    }
}
