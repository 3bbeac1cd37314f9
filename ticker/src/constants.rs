//! Cache keys, trigger names and default runtime values
//!
//! Single source of truth for the fixed strings persisted in the shared
//! cache and for the windows, retry budgets and bounds used when the
//! configuration does not override them.

#![allow(dead_code)] // Some constants are defined for future use

/// Keys for the execution window state kept in the cache
pub mod keys {
    /// Mutex flag marking a tick body in flight
    pub const INSTANCE_RUNNING: &str = "ExecutorInstance_RUNNING";

    /// Flag set by external tooling while a (re)registration is in progress
    pub const INSTANCE_SCHEDULING: &str = "INSTANCE_SCHEDULING";

    /// Epoch millis of the last tick that ran the execution body
    pub const PREVIOUS_EXECUTION_TIMESTAMP: &str = "previous_execution_timestamp";
}

/// Names under which the periodic triggers are registered
pub mod triggers {
    /// Main once-per-minute entry point
    pub const MAIN: &str = "ExecutorInstance";

    /// Slower watchdog entry point
    pub const HEALTH_CHECK: &str = "HealthCheck";
}

/// Due-window defaults
pub mod windows {
    /// Maximum staleness within which a missed due instant still fires (seconds)
    pub const CATCH_UP_SECONDS: u64 = 600;

    /// Minutes between main ticks
    pub const TICK_EVERY_MINUTES: u64 = 1;

    /// Minutes between health check ticks
    pub const HEALTH_CHECK_EVERY_MINUTES: u64 = 10;
}

/// Retry defaults for trigger (re)registration
pub mod retry {
    /// Attempt budget before giving up
    pub const ATTEMPTS: u32 = 5;

    /// Fixed sleep between attempts (milliseconds)
    pub const INTERVAL_MS: u64 = 2000;

    /// Substring marking an error as non-retryable
    pub const INTERRUPT_SENTINEL: &str = "INTERRUPT";
}

/// Watchdog defaults
pub mod health {
    /// Start of the local quiet-hours window, inclusive
    pub const QUIET_HOURS_START: u32 = 0;

    /// End of the local quiet-hours window, exclusive
    pub const QUIET_HOURS_END: u32 = 7;
}

/// stop() poll bounds
pub mod stop {
    /// Sleep between polls of the scheduling flag (milliseconds)
    pub const POLL_INTERVAL_MS: u64 = 1000;

    /// Maximum total wait for the scheduling flag to clear (seconds)
    pub const WAIT_MAX_SECONDS: u64 = 60;
}

/// Debug sink constants
pub mod sink {
    /// Webhook request timeout (seconds)
    pub const WEBHOOK_TIMEOUT_SECONDS: u64 = 10;
}
