use anyhow::Result;
use async_trait::async_trait;

/// Source of the current task definitions, consulted fresh on every tick
/// so definition changes take effect without a restart
#[async_trait]
pub trait TaskProvider: Send + Sync {
    /// Ordered raw definitions in the task DSL
    async fn get(&self) -> Result<Vec<String>>;
}

/// Provider over a fixed list, used for config-driven setups
pub struct StaticTaskProvider {
    definitions: Vec<String>,
}

impl StaticTaskProvider {
    pub fn new(definitions: Vec<String>) -> Self {
        Self { definitions }
    }
}

#[async_trait]
impl TaskProvider for StaticTaskProvider {
    async fn get(&self) -> Result<Vec<String>> {
        Ok(self.definitions.clone())
    }
}
