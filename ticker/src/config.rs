use crate::constants::{health, retry, stop, windows};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Runtime configuration, loaded from a TOML file
///
/// Every timing field falls back to the defaults in `constants` so a
/// minimal file only needs the task definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerConfig {
    #[serde(default = "default_catchup_window_seconds")]
    pub catchup_window_seconds: u64,
    #[serde(default = "default_tick_every_minutes")]
    pub tick_every_minutes: u64,
    #[serde(default = "default_health_check_every_minutes")]
    pub health_check_every_minutes: u64,
    #[serde(default = "default_quiet_hours_start")]
    pub quiet_hours_start: u32,
    #[serde(default = "default_quiet_hours_end")]
    pub quiet_hours_end: u32,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    #[serde(default = "default_stop_poll_interval_ms")]
    pub stop_poll_interval_ms: u64,
    #[serde(default = "default_stop_wait_max_seconds")]
    pub stop_wait_max_seconds: u64,
    /// SQLite file for the shared state; in-memory when absent
    pub cache_path: Option<String>,
    /// Webhook receiving the debug messages; log-only when absent
    pub debug_webhook_url: Option<String>,
    /// Task definitions in the textual DSL, evaluated in order
    #[serde(default)]
    pub tasks: Vec<String>,
    /// Callable name to shell command line
    #[serde(default)]
    pub commands: HashMap<String, String>,
}

fn default_catchup_window_seconds() -> u64 {
    windows::CATCH_UP_SECONDS
}

fn default_tick_every_minutes() -> u64 {
    windows::TICK_EVERY_MINUTES
}

fn default_health_check_every_minutes() -> u64 {
    windows::HEALTH_CHECK_EVERY_MINUTES
}

fn default_quiet_hours_start() -> u32 {
    health::QUIET_HOURS_START
}

fn default_quiet_hours_end() -> u32 {
    health::QUIET_HOURS_END
}

fn default_retry_attempts() -> u32 {
    retry::ATTEMPTS
}

fn default_retry_interval_ms() -> u64 {
    retry::INTERVAL_MS
}

fn default_stop_poll_interval_ms() -> u64 {
    stop::POLL_INTERVAL_MS
}

fn default_stop_wait_max_seconds() -> u64 {
    stop::WAIT_MAX_SECONDS
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            catchup_window_seconds: windows::CATCH_UP_SECONDS,
            tick_every_minutes: windows::TICK_EVERY_MINUTES,
            health_check_every_minutes: windows::HEALTH_CHECK_EVERY_MINUTES,
            quiet_hours_start: health::QUIET_HOURS_START,
            quiet_hours_end: health::QUIET_HOURS_END,
            retry_attempts: retry::ATTEMPTS,
            retry_interval_ms: retry::INTERVAL_MS,
            stop_poll_interval_ms: stop::POLL_INTERVAL_MS,
            stop_wait_max_seconds: stop::WAIT_MAX_SECONDS,
            cache_path: None,
            debug_webhook_url: None,
            tasks: Vec::new(),
            commands: HashMap::new(),
        }
    }
}

impl TickerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from '{}'", path.display()))?;
        let config: TickerConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config from '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_every_minutes == 0 {
            bail!("tick_every_minutes must be at least 1");
        }
        if self.health_check_every_minutes == 0 {
            bail!("health_check_every_minutes must be at least 1");
        }
        if self.quiet_hours_start > 23 {
            bail!("quiet_hours_start must be within 0-23");
        }
        if self.quiet_hours_end > 24 {
            bail!("quiet_hours_end must be within 0-24");
        }
        Ok(())
    }

    pub fn catchup_window(&self) -> Duration {
        Duration::from_secs(self.catchup_window_seconds)
    }

    /// TTL for the running flag; a crashed holder self-clears after this
    pub fn mutex_ttl(&self) -> Duration {
        Duration::from_secs(self.catchup_window_seconds / 2)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn stop_poll_interval(&self) -> Duration {
        Duration::from_millis(self.stop_poll_interval_ms)
    }

    pub fn stop_wait_max(&self) -> Duration {
        Duration::from_secs(self.stop_wait_max_seconds)
    }
}
