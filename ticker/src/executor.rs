//! The orchestration loop
//!
//! A coarse periodic trigger fires `tick` with unpredictable phase; the
//! executor decides which tasks were due since the last tick and runs each
//! exactly once per due window. A second, slower trigger fires
//! `check_health`, the watchdog that restarts the registrations when the
//! main loop has gone dark.

use crate::cache::{self, Cache};
use crate::clock::Clock;
use crate::config::TickerConfig;
use crate::constants::{keys, triggers};
use crate::context::SchedulerContext;
use crate::errors::ExecutorError;
use crate::provider::TaskProvider;
use crate::retry::RetryRunner;
use crate::task::Task;
use crate::trigger::TriggerRegistrar;
use anyhow::Result;
use chrono::Timelike;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Recovery action invoked when the watchdog decides the loop has stalled.
/// Without one, the watchdog restarts the executor directly.
pub type StallHandler = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

pub struct Executor {
    config: TickerConfig,
    context: Arc<SchedulerContext>,
    provider: Arc<dyn TaskProvider>,
    cache: Arc<dyn Cache>,
    registrar: Arc<dyn TriggerRegistrar>,
    clock: Arc<dyn Clock>,
    on_stall: Option<StallHandler>,
    retry: RetryRunner,
}

impl Executor {
    pub fn new(
        config: TickerConfig,
        context: Arc<SchedulerContext>,
        provider: Arc<dyn TaskProvider>,
        cache: Arc<dyn Cache>,
        registrar: Arc<dyn TriggerRegistrar>,
        clock: Arc<dyn Clock>,
        on_stall: Option<StallHandler>,
    ) -> Self {
        let retry = RetryRunner::new(config.retry_attempts, config.retry_interval());
        Self {
            config,
            context,
            provider,
            cache,
            registrar,
            clock,
            on_stall,
            retry,
        }
    }

    /// Main entry point, fired by the fast periodic trigger.
    ///
    /// Never returns an error: a failing tick reports through the debug
    /// sink and ends cleanly so the next tick starts from a known state.
    pub async fn tick(&self, args: Value) {
        match self.try_acquire().await {
            Ok(true) => {}
            Ok(false) => {
                // another tick holds the flag; leaving it in place is the point
                debug!("Tick skipped, a previous run is still in flight");
                return;
            }
            Err(e) => {
                let message = format!("Failure in {}: {}", triggers::MAIN, e);
                error!("{}", message);
                self.context.debug(&message);
                return;
            }
        }

        if let Err(e) = self.run_due_tasks(args).await {
            let message = format!("Failure in {}: {}", triggers::MAIN, e);
            error!("{}", message);
            self.context.debug(&message);
        }

        if let Err(e) = self.cache.remove(keys::INSTANCE_RUNNING).await {
            error!("Failed to release the running flag: {}", e);
        }
    }

    /// Advisory lock: the running flag with a TTL of half the catch-up
    /// window, so a crashed holder self-clears instead of wedging the loop
    async fn try_acquire(&self) -> Result<bool> {
        let current = self.cache.get(keys::INSTANCE_RUNNING).await?;
        if cache::parse_flag(current.as_deref()) {
            return Ok(false);
        }

        self.cache
            .put(keys::INSTANCE_RUNNING, "true", Some(self.config.mutex_ttl()))
            .await?;
        Ok(true)
    }

    async fn run_due_tasks(&self, args: Value) -> Result<()> {
        let tasks = self.due_tasks().await?;

        let previous = cache::parse_timestamp(
            self.cache
                .get(keys::PREVIOUS_EXECUTION_TIMESTAMP)
                .await?
                .as_deref(),
        );
        let now = self.clock.now_millis();

        // persisted before any task runs: the timestamp marks this tick,
        // not the completion of its tasks
        self.cache
            .put(
                keys::PREVIOUS_EXECUTION_TIMESTAMP,
                &now.to_string(),
                Some(self.config.catchup_window()),
            )
            .await?;

        let window_seconds = self.config.catchup_window_seconds as f64;
        for task in &tasks {
            let scheduled = task.scheduled_timestamp(self.clock.as_ref());
            let elapsed_seconds = (now - scheduled) as f64 / 1000.0;

            if previous < scheduled && elapsed_seconds >= 0.0 && elapsed_seconds < window_seconds {
                info!("Task due, executing: {}", task.task_name());
                task.execute(&self.context, args.clone()).await;
            }
        }

        Ok(())
    }

    /// Valid tasks due today, parsed fresh from the provider. Invalid
    /// definitions are reported and dropped; tasks not due today are
    /// silently dropped.
    pub async fn due_tasks(&self) -> Result<Vec<Task>> {
        let definitions = self.provider.get().await?;

        let mut tasks = Vec::new();
        for raw in &definitions {
            let task = Task::parse(raw, &self.context);
            if !task.is_valid() {
                self.context
                    .debug(&format!("Skipping invalid task: {}", task.task_name()));
                continue;
            }
            if task.scheduled_timestamp(self.clock.as_ref()) == 0 {
                continue;
            }
            tasks.push(task);
        }

        Ok(tasks)
    }

    /// Watchdog, fired by the slow periodic trigger.
    ///
    /// Quiet hours and an external registration in progress both silence
    /// it; otherwise a missing previous-execution timestamp means the main
    /// tick has not run within the timestamp's own TTL, and recovery kicks
    /// in.
    pub async fn check_health(&self) {
        let hour = self.clock.now().hour();
        if self.in_quiet_hours(hour) {
            return;
        }

        match self.cache.get(keys::INSTANCE_SCHEDULING).await {
            Ok(value) => {
                if cache::parse_flag(value.as_deref()) {
                    debug!("Health check skipped, a registration is in progress");
                    return;
                }
            }
            Err(e) => {
                error!("Health check could not read the scheduling flag: {}", e);
                return;
            }
        }

        let previous = match self.cache.get(keys::PREVIOUS_EXECUTION_TIMESTAMP).await {
            Ok(value) => cache::parse_timestamp(value.as_deref()),
            Err(e) => {
                error!("Health check could not read the previous timestamp: {}", e);
                return;
            }
        };

        if previous != 0 {
            return;
        }

        let message = format!("{} has not run recently, restarting", triggers::MAIN);
        warn!("{}", message);
        self.context.debug(&message);

        match &self.on_stall {
            Some(handler) => handler().await,
            None => {
                if let Err(e) = self.restart().await {
                    error!("Recovery restart failed: {}", e);
                    self.context.debug(&format!("Recovery restart failed: {}", e));
                }
            }
        }
    }

    fn in_quiet_hours(&self, hour: u32) -> bool {
        let start = self.config.quiet_hours_start;
        let end = self.config.quiet_hours_end;
        if start <= end {
            hour >= start && hour < end
        } else {
            // window wraps midnight
            hour >= start || hour < end
        }
    }

    /// Drop and re-register both periodic triggers, then run one tick
    /// immediately so the restart takes effect now rather than on the
    /// next natural tick
    pub async fn restart(&self) -> Result<(), ExecutorError> {
        self.stop().await?;

        self.register_trigger(triggers::HEALTH_CHECK, self.config.health_check_every_minutes)
            .await?;
        self.register_trigger(triggers::MAIN, self.config.tick_every_minutes)
            .await?;

        info!("Triggers registered, running the first tick now");
        self.tick(Value::Null).await;

        Ok(())
    }

    async fn register_trigger(
        &self,
        name: &'static str,
        every_minutes: u64,
    ) -> Result<(), ExecutorError> {
        let registrar = self.registrar.clone();
        self.retry
            .run(|| {
                let registrar = registrar.clone();
                async move { registrar.register_periodic(name, every_minutes).await }
            })
            .await
            .map(|_| ())
            .map_err(|e| ExecutorError::Registration {
                trigger: name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Wait for any external registration to settle, then drop all
    /// triggers. Deregistering mid-registration could leave the process
    /// with no triggers at all, hence the wait; the wait is bounded so a
    /// stuck flag surfaces as an error instead of hanging forever.
    pub async fn stop(&self) -> Result<(), ExecutorError> {
        self.wait_while_scheduling().await?;

        self.registrar
            .deregister_all()
            .await
            .map_err(|e| ExecutorError::Deregistration {
                reason: e.to_string(),
            })?;

        info!("All periodic triggers removed");
        Ok(())
    }

    async fn wait_while_scheduling(&self) -> Result<(), ExecutorError> {
        let poll = self.config.stop_poll_interval();
        let deadline = tokio::time::Instant::now() + self.config.stop_wait_max();

        loop {
            let scheduling = match self.cache.get(keys::INSTANCE_SCHEDULING).await {
                Ok(value) => cache::parse_flag(value.as_deref()),
                Err(e) => {
                    warn!("Could not read the scheduling flag: {}", e);
                    false
                }
            };
            if !scheduling {
                return Ok(());
            }

            if tokio::time::Instant::now() + poll > deadline {
                return Err(ExecutorError::StopTimeout {
                    waited_seconds: self.config.stop_wait_max_seconds,
                });
            }

            debug!("Waiting for the scheduling flag to clear");
            tokio::time::sleep(poll).await;
        }
    }
}
