use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use ticker::context::TaskFn;
use ticker::executor::StallHandler;
use ticker::sink::DebugSink;

/// Sink that records every message for later assertions.
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages()
            .iter()
            .any(|message| message.contains(needle))
    }
}

impl DebugSink for RecordingSink {
    fn emit(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Callable that counts its invocations.
pub fn counting_callable() -> (TaskFn, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let callable: TaskFn = Arc::new(move |_args: Value| {
        let counter = counter.clone();
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    });
    (callable, calls)
}

/// Callable that always fails with the given message.
pub fn failing_callable(message: &str) -> TaskFn {
    let message = message.to_string();
    Arc::new(move |_args: Value| {
        let message = message.clone();
        Box::pin(async move { Err(anyhow::anyhow!("{}", message)) })
    })
}

/// Callable that panics mid-flight instead of returning an error.
pub fn panicking_callable(message: &'static str) -> TaskFn {
    Arc::new(move |_args: Value| Box::pin(async move { panic!("{}", message) }))
}

/// Stall handler that only counts how often it was invoked.
pub fn counting_stall_handler() -> (StallHandler, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let handler: StallHandler = Arc::new(move || {
        let counter = counter.clone();
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    });
    (handler, calls)
}
