use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use ticker::provider::TaskProvider;

/// Provider whose fetch always fails.
pub struct FailingProvider;

#[async_trait]
impl TaskProvider for FailingProvider {
    async fn get(&self) -> Result<Vec<String>> {
        Err(anyhow!("task source unavailable"))
    }
}

/// Provider that serves fixed definitions and counts how often it was asked.
pub struct CountingProvider {
    definitions: Vec<String>,
    fetches: AtomicUsize,
}

impl CountingProvider {
    pub fn new(definitions: Vec<&str>) -> Self {
        Self {
            definitions: definitions.into_iter().map(String::from).collect(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskProvider for CountingProvider {
    async fn get(&self) -> Result<Vec<String>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.definitions.clone())
    }
}
