//! Reusable test utilities:
//! - Deterministic clock and calendar helpers
//! - Recording debug sink and trigger registrar
//! - Scripted task providers
//! - A pre-wired executor harness

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod test_clock;
pub mod test_context;
pub mod test_executor;
pub mod test_provider;
pub mod test_registrar;

pub use test_clock::{local_datetime, FixedClock};
pub use test_context::{
    counting_callable, counting_stall_handler, failing_callable, panicking_callable, RecordingSink,
};
pub use test_executor::{
    test_config, ExecutorHarness, CALLABLE, FAILING_CALLABLE, PANICKING_CALLABLE,
};
pub use test_provider::{CountingProvider, FailingProvider};
pub use test_registrar::RecordingRegistrar;
