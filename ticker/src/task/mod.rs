//! Task model: recurrence variants parsed from the textual DSL
//!
//! ```text
//! dailyTask  <funcName> <hour> <minute> <dayPredicateName>
//! hourlyTask <funcName> <hoursInterval> <startHour> <stopHour> <dayPredicateName>
//! ```
//!
//! Surrounding whitespace is ignored; the fields themselves are separated
//! by single spaces. A definition that does not fit the grammar, or names
//! an unknown callable or day predicate, becomes an `Invalid` task carrying
//! the original string. Well-formed numbers out of range parse into their
//! variant and are rejected by `is_valid` instead, so the skip can be
//! logged with the task's own name.

pub mod daily;
pub mod hourly;

pub use daily::DailyTask;
pub use hourly::HourlyTask;

use crate::clock::Clock;
use crate::context::{SchedulerContext, TaskFn};
use serde_json::Value;
use tracing::error;

pub const DAILY_KEYWORD: &str = "dailyTask";
pub const HOURLY_KEYWORD: &str = "hourlyTask";

/// One parsed task definition, rebuilt fresh from raw text on every tick
pub enum Task {
    Daily(DailyTask),
    Hourly(HourlyTask),
    Invalid(InvalidTask),
}

impl Task {
    /// Route a raw definition by its leading keyword. Padding around the
    /// definition is tolerated; an `Invalid` task still keeps `raw` verbatim.
    pub fn parse(raw: &str, context: &SchedulerContext) -> Task {
        let fields: Vec<&str> = raw.trim().split(' ').collect();
        match fields.first().copied() {
            Some(DAILY_KEYWORD) => match DailyTask::parse(&fields, context) {
                Some(task) => Task::Daily(task),
                None => Task::Invalid(InvalidTask::new(raw)),
            },
            Some(HOURLY_KEYWORD) => match HourlyTask::parse(&fields, context) {
                Some(task) => Task::Hourly(task),
                None => Task::Invalid(InvalidTask::new(raw)),
            },
            _ => Task::Invalid(InvalidTask::new(raw)),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Task::Daily(task) => task.is_valid(),
            Task::Hourly(task) => task.is_valid(),
            Task::Invalid(_) => false,
        }
    }

    /// Human-readable name carrying the variant's parameters
    pub fn task_name(&self) -> String {
        match self {
            Task::Daily(task) => task.task_name(),
            Task::Hourly(task) => task.task_name(),
            Task::Invalid(task) => task.task_name(),
        }
    }

    /// Due instant for today in epoch millis, 0 when not due today
    pub fn scheduled_timestamp(&self, clock: &dyn Clock) -> i64 {
        match self {
            Task::Daily(task) => task.scheduled_timestamp(clock),
            Task::Hourly(task) => task.scheduled_timestamp(clock),
            Task::Invalid(_) => 0,
        }
    }

    /// Run the callable with failure isolation; never propagates
    pub async fn execute(&self, context: &SchedulerContext, args: Value) {
        let (name, callable) = match self {
            Task::Daily(task) => (task.task_name(), task.callable.clone()),
            Task::Hourly(task) => (task.task_name(), task.callable.clone()),
            Task::Invalid(_) => return,
        };
        run_callable(&name, callable, context, args).await;
    }
}

/// Placeholder for definitions the parser could not understand
pub struct InvalidTask {
    raw: String,
}

impl InvalidTask {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
        }
    }

    /// The original string verbatim, for diagnostics
    pub fn task_name(&self) -> String {
        self.raw.clone()
    }
}

/// Shared execute wrapper: a task failure is logged and reported but must
/// never block the sibling tasks of the same tick. The callable runs in
/// its own task so even a panic stays contained.
async fn run_callable(name: &str, callable: TaskFn, context: &SchedulerContext, args: Value) {
    context.debug(&format!("Running {}", name));

    let handle = tokio::spawn(async move { callable(args).await });

    let failure = match handle.await {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e.to_string(),
        Err(e) => format!("panicked: {}", e),
    };

    let message = format!("{} FAILED: {}", name, failure);
    error!("{}", message);
    context.debug(&message);
}

pub(crate) fn is_identifier(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// One or two ASCII digits, the width the grammar allows for hour fields
pub(crate) fn parse_two_digit(field: &str) -> Option<i32> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Any-width unsigned number, used for the hourly interval
pub(crate) fn parse_number(field: &str) -> Option<i32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
