use super::{is_identifier, parse_two_digit};
use crate::clock::Clock;
use crate::context::{SchedulerContext, TaskFn};
use crate::day_predicates::DayPredicate;
use chrono::TimeZone;

/// Task due once per eligible day at a fixed local hour and minute
pub struct DailyTask {
    func_name: String,
    hour: i32,
    minute: i32,
    day_predicate: DayPredicate,
    pub(super) callable: TaskFn,
}

impl DailyTask {
    /// `dailyTask <funcName> <hour> <minute> <dayPredicateName>`
    pub(super) fn parse(fields: &[&str], context: &SchedulerContext) -> Option<Self> {
        if fields.len() != 5 {
            return None;
        }

        let func_name = fields[1];
        if !is_identifier(func_name) {
            return None;
        }

        let hour = parse_two_digit(fields[2])?;
        let minute = parse_two_digit(fields[3])?;
        let day_predicate = context.day_predicates.get(fields[4])?;
        let callable = context.callables.get(func_name)?;

        Some(Self {
            func_name: func_name.to_string(),
            hour,
            minute,
            day_predicate,
            callable,
        })
    }

    pub fn is_valid(&self) -> bool {
        (0..=23).contains(&self.hour) && (0..=59).contains(&self.minute)
    }

    pub fn task_name(&self) -> String {
        format!("({}:{}) \"{}\"", self.hour, self.minute, self.func_name)
    }

    /// Today at `hour:minute:00.000` local time when the day predicate
    /// accepts today, 0 otherwise. Whether the instant already passed is
    /// the executor's concern, not the task's.
    pub fn scheduled_timestamp(&self, clock: &dyn Clock) -> i64 {
        let now = clock.now();
        let today = now.date_naive();

        if !(self.day_predicate)(today) {
            return 0;
        }

        today
            .and_hms_opt(self.hour as u32, self.minute as u32, 0)
            .and_then(|naive| now.timezone().from_local_datetime(&naive).earliest())
            .map(|instant| instant.timestamp_millis())
            .unwrap_or(0)
    }
}
