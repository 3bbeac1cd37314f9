use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use ticker::trigger::TriggerRegistrar;

/// Registrar that records registrations instead of scheduling anything.
/// Failures can be scripted to exercise the retry path.
pub struct RecordingRegistrar {
    registered: Mutex<Vec<(String, u64)>>,
    register_calls: AtomicUsize,
    deregister_calls: AtomicUsize,
    failures_remaining: AtomicUsize,
    failure_message: Mutex<String>,
}

impl RecordingRegistrar {
    pub fn new() -> Self {
        Self {
            registered: Mutex::new(Vec::new()),
            register_calls: AtomicUsize::new(0),
            deregister_calls: AtomicUsize::new(0),
            failures_remaining: AtomicUsize::new(0),
            failure_message: Mutex::new("registration backend busy".to_string()),
        }
    }

    /// Fail this many registration calls before accepting any.
    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    pub fn set_failure_message(&self, message: &str) {
        *self.failure_message.lock().unwrap() = message.to_string();
    }

    pub fn registered(&self) -> Vec<(String, u64)> {
        self.registered.lock().unwrap().clone()
    }

    pub fn registered_names(&self) -> Vec<String> {
        self.registered()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn deregister_calls(&self) -> usize {
        self.deregister_calls.load(Ordering::SeqCst)
    }
}

impl Default for RecordingRegistrar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TriggerRegistrar for RecordingRegistrar {
    async fn register_periodic(&self, name: &str, every_minutes: u64) -> Result<()> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            let message = self.failure_message.lock().unwrap().clone();
            return Err(anyhow!("{}", message));
        }

        self.registered
            .lock()
            .unwrap()
            .push((name.to_string(), every_minutes));
        Ok(())
    }

    async fn deregister_all(&self) -> Result<()> {
        self.deregister_calls.fetch_add(1, Ordering::SeqCst);
        self.registered.lock().unwrap().clear();
        Ok(())
    }
}
