use crate::constants::retry;
use crate::errors::RetryError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Runs an operation under a bounded attempt budget with a fixed sleep
/// between attempts.
///
/// An error whose message contains the interrupt sentinel stops the loop
/// immediately; every other error burns one attempt. Exhaustion surfaces
/// the last message seen.
#[derive(Debug, Clone)]
pub struct RetryRunner {
    attempts: u32,
    interval: Duration,
}

impl RetryRunner {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<T, RetryError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let mut last_message = String::new();

        for attempt in 1..=self.attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let message = e.to_string();
                    if message.contains(retry::INTERRUPT_SENTINEL) {
                        return Err(RetryError::Interrupted { message });
                    }
                    warn!("Attempt {}/{} failed: {}", attempt, self.attempts, message);
                    last_message = message;
                }
            }

            if attempt < self.attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        Err(RetryError::Exhausted {
            attempts: self.attempts,
            message: last_message,
        })
    }
}

impl Default for RetryRunner {
    fn default() -> Self {
        Self::new(retry::ATTEMPTS, Duration::from_millis(retry::INTERVAL_MS))
    }
}
