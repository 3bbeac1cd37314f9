use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command as AsyncCommand;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use ticker::cache::{Cache, MemoryCache, SqliteCache};
use ticker::clock::SystemClock;
use ticker::config::TickerConfig;
use ticker::constants::triggers;
use ticker::context::{CallableRegistry, SchedulerContext, TaskFn};
use ticker::executor::{Executor, StallHandler};
use ticker::provider::StaticTaskProvider;
use ticker::sink::{DebugSink, TracingSink, WebhookSink};
use ticker::trigger::CronTriggerRegistrar;

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("ticker=info".parse()?)
        .add_directive("tokio_cron_scheduler=warn".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("sqlx=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting the tick scheduler");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = TickerConfig::load(Path::new(&config_path))?;
    info!(
        "Configuration loaded from '{}': {} tasks, {} commands",
        config_path,
        config.tasks.len(),
        config.commands.len()
    );

    let cache: Arc<dyn Cache> = match &config.cache_path {
        Some(path) => {
            let cache = SqliteCache::new(path).await?;
            Arc::new(cache)
        }
        None => {
            warn!("No cache_path configured, state will not survive restarts");
            Arc::new(MemoryCache::new())
        }
    };

    let debug_sink: Arc<dyn DebugSink> = match &config.debug_webhook_url {
        Some(url) => {
            info!("Debug messages forwarded to {}", url);
            Arc::new(WebhookSink::new(url.clone()))
        }
        None => Arc::new(TracingSink),
    };

    let mut callables = CallableRegistry::new();
    for (name, command) in &config.commands {
        callables.register(name, shell_callable(name.clone(), command.clone()));
    }
    if callables.is_empty() {
        warn!("No commands configured, every task definition will come up invalid");
    } else {
        info!("{} task callables registered", callables.len());
    }

    let context = Arc::new(SchedulerContext::with_overrides(
        callables,
        HashMap::new(),
        debug_sink,
    ));

    let provider = Arc::new(StaticTaskProvider::new(config.tasks.clone()));
    let registrar = Arc::new(CronTriggerRegistrar::new().await?);

    // the watchdog only reports; restarts run here, off its tick
    let (stall_tx, mut stall_rx) = tokio::sync::mpsc::channel::<()>(1);
    let on_stall: StallHandler = Arc::new(move || {
        let stall_tx = stall_tx.clone();
        Box::pin(async move {
            if stall_tx.try_send(()).is_err() {
                warn!("Recovery already pending, stall signal dropped");
            }
        })
    });

    let executor = Arc::new(Executor::new(
        config.clone(),
        context,
        provider,
        cache,
        registrar.clone(),
        Arc::new(SystemClock),
        Some(on_stall),
    ));

    let tick_executor = executor.clone();
    registrar
        .bind(
            triggers::MAIN,
            Arc::new(move || {
                let executor = tick_executor.clone();
                Box::pin(async move { executor.tick(Value::Null).await })
            }),
        )
        .await;

    let health_executor = executor.clone();
    registrar
        .bind(
            triggers::HEALTH_CHECK,
            Arc::new(move || {
                let executor = health_executor.clone();
                Box::pin(async move { executor.check_health().await })
            }),
        )
        .await;

    let recovery_executor = executor.clone();
    tokio::spawn(async move {
        while stall_rx.recv().await.is_some() {
            info!("Stall reported, re-registering the triggers");
            if let Err(e) = recovery_executor.restart().await {
                error!("Recovery restart failed: {}", e);
            }
        }
    });

    executor.restart().await?;
    info!("Scheduler running, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    executor.stop().await?;

    Ok(())
}

/// Wrap a shell command line as a task callable. The JSON args value is
/// handed to the command through the TICKER_ARGS environment variable;
/// a non-zero exit becomes a task failure carrying stderr.
fn shell_callable(name: String, command: String) -> TaskFn {
    Arc::new(move |args: Value| {
        let name = name.clone();
        let command = command.clone();
        Box::pin(async move {
            let output = AsyncCommand::new("sh")
                .arg("-c")
                .arg(&command)
                .env("TICKER_ARGS", args.to_string())
                .output()
                .await?;

            if output.status.success() {
                info!("Command '{}' completed", name);
                Ok(())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stdout = String::from_utf8_lossy(&output.stdout);
                let detail = if stderr.trim().is_empty() {
                    stdout
                } else {
                    stderr
                };
                Err(anyhow::anyhow!(
                    "Command '{}' failed with {}: {}",
                    name,
                    output.status,
                    detail.trim()
                ))
            }
        })
    })
}
