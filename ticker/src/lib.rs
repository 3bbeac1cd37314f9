pub mod cache;
pub mod clock;
pub mod config;
pub mod constants;
pub mod context;
pub mod day_predicates;
pub mod errors;
pub mod executor;
pub mod provider;
pub mod retry;
pub mod sink;
pub mod task;
pub mod trigger;

// Re-export commonly used types
pub use cache::{Cache, MemoryCache, SqliteCache};
pub use clock::{Clock, SystemClock};
pub use config::TickerConfig;
pub use context::{CallableRegistry, SchedulerContext, TaskFn};
pub use errors::{ExecutorError, RetryError};
pub use executor::{Executor, StallHandler};
pub use provider::{StaticTaskProvider, TaskProvider};
pub use retry::RetryRunner;
pub use sink::{DebugSink, TracingSink, WebhookSink};
pub use task::Task;
pub use trigger::{CronTriggerRegistrar, TickCallable, TriggerRegistrar};
