use crate::day_predicates::{DayPredicate, DayPredicateRegistry};
use crate::sink::DebugSink;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Async callable a task invokes, resolved by name at parse time
pub type TaskFn = Arc<dyn Fn(Value) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Named registry resolving task function names to callables
#[derive(Default)]
pub struct CallableRegistry {
    callables: HashMap<String, TaskFn>,
}

impl CallableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, callable: TaskFn) {
        self.callables.insert(name.to_string(), callable);
    }

    pub fn get(&self, name: &str) -> Option<TaskFn> {
        self.callables.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.callables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callables.is_empty()
    }
}

/// Construction-time context shared by the parser and the executor:
/// day predicates, callables and the debug sink. Built once at startup,
/// never mutated afterwards.
pub struct SchedulerContext {
    pub day_predicates: DayPredicateRegistry,
    pub callables: CallableRegistry,
    pub debug_sink: Arc<dyn DebugSink>,
}

impl SchedulerContext {
    /// Merge predicate overrides over the defaults and replace the sink
    pub fn with_overrides(
        callables: CallableRegistry,
        day_predicates: HashMap<String, DayPredicate>,
        debug_sink: Arc<dyn DebugSink>,
    ) -> Self {
        Self {
            day_predicates: DayPredicateRegistry::with_overrides(day_predicates),
            callables,
            debug_sink,
        }
    }

    pub fn debug(&self, message: &str) {
        self.debug_sink.emit(message);
    }
}
