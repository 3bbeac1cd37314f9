//! Custom error types for the scheduler
//!
//! Only two failure classes are allowed to reach a caller: a retry loop
//! giving up, and a lifecycle operation that could not complete. Everything
//! else is swallowed at its local boundary and reported through the debug
//! sink.

use std::fmt;

/// Retry loop outcomes that end without a success
#[derive(Debug)]
pub enum RetryError {
    /// The error message carried the interrupt sentinel, retrying stopped early
    Interrupted { message: String },

    /// The attempt budget ran out
    Exhausted { attempts: u32, message: String },
}

/// Executor lifecycle errors
#[derive(Debug)]
pub enum ExecutorError {
    /// Registering a periodic trigger kept failing after all retries
    Registration { trigger: String, reason: String },

    /// Removing the registered triggers failed
    Deregistration { reason: String },

    /// stop() gave up waiting for the scheduling flag to clear
    StopTimeout { waited_seconds: u64 },
}

impl fmt::Display for RetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Interrupted { message } => {
                write!(f, "Operation interrupted: {}", message)
            }
            RetryError::Exhausted { attempts, message } => {
                write!(f, "All {} attempts failed. Error message: {}", attempts, message)
            }
        }
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorError::Registration { trigger, reason } => {
                write!(f, "Failed to register trigger '{}': {}", trigger, reason)
            }
            ExecutorError::Deregistration { reason } => {
                write!(f, "Failed to remove triggers: {}", reason)
            }
            ExecutorError::StopTimeout { waited_seconds } => {
                write!(
                    f,
                    "Gave up waiting for the scheduling flag after {}s",
                    waited_seconds
                )
            }
        }
    }
}

impl std::error::Error for RetryError {}
impl std::error::Error for ExecutorError {}
