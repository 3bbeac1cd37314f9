use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;
use uuid::Uuid;

/// Zero-argument async callback fired by a periodic trigger
pub type TickCallable = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Periodic trigger registration backend.
///
/// Registration is assumed to fail transiently now and then, so callers
/// wrap it in a retry loop.
#[async_trait]
pub trait TriggerRegistrar: Send + Sync {
    /// Schedule the callable bound under `name` to fire every `every_minutes`
    async fn register_periodic(&self, name: &str, every_minutes: u64) -> Result<()>;

    /// Remove every trigger owned by this process
    async fn deregister_all(&self) -> Result<()>;
}

/// Registrar backed by a cron scheduler running repeated jobs.
///
/// Entry points are bound by name first; registering then attaches the
/// bound callable to a repeated job. Job ids are tracked so a later
/// deregistration can remove exactly what this process added.
pub struct CronTriggerRegistrar {
    scheduler: JobScheduler,
    bindings: RwLock<HashMap<String, TickCallable>>,
    jobs: Mutex<Vec<Uuid>>,
}

impl CronTriggerRegistrar {
    pub async fn new() -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create JobScheduler: {}", e))?;
        scheduler
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start JobScheduler: {}", e))?;

        Ok(Self {
            scheduler,
            bindings: RwLock::new(HashMap::new()),
            jobs: Mutex::new(Vec::new()),
        })
    }

    /// Bind a named entry point; `register_periodic` looks it up later
    pub async fn bind(&self, name: &str, callable: TickCallable) {
        self.bindings
            .write()
            .await
            .insert(name.to_string(), callable);
    }
}

#[async_trait]
impl TriggerRegistrar for CronTriggerRegistrar {
    async fn register_periodic(&self, name: &str, every_minutes: u64) -> Result<()> {
        let callable = self
            .bindings
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("No callable bound for trigger '{}'", name))?;

        let job = Job::new_repeated_async(
            Duration::from_secs(every_minutes * 60),
            move |_uuid, _scheduler| {
                let callable = callable.clone();
                Box::pin(async move {
                    callable().await;
                })
            },
        )
        .map_err(|e| anyhow!("Failed to create job for '{}': {}", name, e))?;

        let job_id = self
            .scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("Failed to add job for '{}': {}", name, e))?;

        self.jobs.lock().await.push(job_id);
        info!("Registered trigger '{}' every {} minutes", name, every_minutes);

        Ok(())
    }

    async fn deregister_all(&self) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        // drop an id only once its job is gone; on failure the rest stay
        // tracked for the next attempt
        while let Some(&job_id) = jobs.last() {
            self.scheduler
                .remove(&job_id)
                .await
                .map_err(|e| anyhow!("Failed to remove job {}: {}", job_id, e))?;
            jobs.pop();
        }
        info!("All scheduled jobs removed");
        Ok(())
    }
}
