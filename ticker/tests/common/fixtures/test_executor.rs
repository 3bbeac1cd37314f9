use super::test_clock::FixedClock;
use super::test_context::{counting_callable, failing_callable, panicking_callable, RecordingSink};
use super::test_registrar::RecordingRegistrar;
use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use ticker::cache::MemoryCache;
use ticker::config::TickerConfig;
use ticker::context::{CallableRegistry, SchedulerContext};
use ticker::executor::{Executor, StallHandler};
use ticker::provider::{StaticTaskProvider, TaskProvider};

/// Callable registered in every harness context; invocations are counted.
pub const CALLABLE: &str = "reportSync";

/// Callable registered in every harness context; always fails.
pub const FAILING_CALLABLE: &str = "alwaysFails";

/// Callable registered in every harness context; panics when run.
pub const PANICKING_CALLABLE: &str = "alwaysPanics";

/// Defaults with waits shrunk to test scale.
pub fn test_config() -> TickerConfig {
    TickerConfig {
        retry_interval_ms: 10,
        stop_poll_interval_ms: 20,
        stop_wait_max_seconds: 1,
        ..TickerConfig::default()
    }
}

/// Executor wired to recording collaborators and a pinned clock.
///
/// The clock starts at Wednesday noon, so daily tasks placed a few
/// minutes before 12:00 are inside the catch-up window.
pub struct ExecutorHarness {
    pub executor: Executor,
    pub cache: Arc<MemoryCache>,
    pub sink: Arc<RecordingSink>,
    pub registrar: Arc<RecordingRegistrar>,
    pub clock: Arc<FixedClock>,
    pub calls: Arc<AtomicUsize>,
}

impl ExecutorHarness {
    pub fn new(definitions: Vec<&str>) -> Self {
        Self::build(static_provider(definitions), test_config(), None)
    }

    pub fn with_config(definitions: Vec<&str>, config: TickerConfig) -> Self {
        Self::build(static_provider(definitions), config, None)
    }

    pub fn with_provider(provider: Arc<dyn TaskProvider>) -> Self {
        Self::build(provider, test_config(), None)
    }

    pub fn with_stall_handler(definitions: Vec<&str>, handler: StallHandler) -> Self {
        Self::build(static_provider(definitions), test_config(), Some(handler))
    }

    pub fn build(
        provider: Arc<dyn TaskProvider>,
        config: TickerConfig,
        on_stall: Option<StallHandler>,
    ) -> Self {
        let sink = RecordingSink::new();
        let (counting, calls) = counting_callable();

        let mut callables = CallableRegistry::new();
        callables.register(CALLABLE, counting);
        callables.register(FAILING_CALLABLE, failing_callable("synthetic failure"));
        callables.register(PANICKING_CALLABLE, panicking_callable("synthetic panic"));

        let context = Arc::new(SchedulerContext::with_overrides(
            callables,
            HashMap::new(),
            sink.clone(),
        ));

        let cache = Arc::new(MemoryCache::new());
        let registrar = Arc::new(RecordingRegistrar::new());
        let clock = Arc::new(FixedClock::wednesday_noon());

        let executor = Executor::new(
            config,
            context,
            provider,
            cache.clone(),
            registrar.clone(),
            clock.clone(),
            on_stall,
        );

        Self {
            executor,
            cache,
            sink,
            registrar,
            clock,
            calls,
        }
    }
}

fn static_provider(definitions: Vec<&str>) -> Arc<StaticTaskProvider> {
    Arc::new(StaticTaskProvider::new(
        definitions.into_iter().map(String::from).collect(),
    ))
}
