use super::{is_identifier, parse_number, parse_two_digit};
use crate::clock::Clock;
use crate::context::{SchedulerContext, TaskFn};
use crate::day_predicates::DayPredicate;
use chrono::{Duration, TimeZone, Timelike};

/// Task due every `hours_interval` hours between `start_hour` and
/// `stop_hour` on eligible days
pub struct HourlyTask {
    func_name: String,
    hours_interval: i32,
    start_hour: i32,
    stop_hour: i32,
    day_predicate: DayPredicate,
    pub(super) callable: TaskFn,
}

impl HourlyTask {
    /// `hourlyTask <funcName> <hoursInterval> <startHour> <stopHour> <dayPredicateName>`
    pub(super) fn parse(fields: &[&str], context: &SchedulerContext) -> Option<Self> {
        if fields.len() != 6 {
            return None;
        }

        let func_name = fields[1];
        if !is_identifier(func_name) {
            return None;
        }

        let hours_interval = parse_number(fields[2])?;
        let start_hour = parse_two_digit(fields[3])?;
        let stop_hour = parse_two_digit(fields[4])?;
        let day_predicate = context.day_predicates.get(fields[5])?;
        let callable = context.callables.get(func_name)?;

        Some(Self {
            func_name: func_name.to_string(),
            hours_interval,
            start_hour,
            stop_hour,
            day_predicate,
            callable,
        })
    }

    pub fn is_valid(&self) -> bool {
        (0..=23).contains(&self.start_hour)
            && (0..=23).contains(&self.stop_hour)
            && self.stop_hour >= self.start_hour
            && self.hours_interval >= 0
    }

    pub fn task_name(&self) -> String {
        format!(
            "(Every {}h from {} till {}) \"{}\"",
            self.hours_interval, self.start_hour, self.stop_hour, self.func_name
        )
    }

    /// Most recent hour slot aligned to `start_hour` with period
    /// `hours_interval`, at the full hour local time. A slot before the
    /// start clamps to the start today; a slot past the stop rolls over to
    /// the start tomorrow. 0 when today is not eligible or the interval
    /// is 0 (no slot is ever reached).
    pub fn scheduled_timestamp(&self, clock: &dyn Clock) -> i64 {
        let now = clock.now();
        let today = now.date_naive();

        if !(self.day_predicate)(today) {
            return 0;
        }
        if self.hours_interval == 0 {
            return 0;
        }

        let current_hour = now.hour() as i32;
        let slot = current_hour + (self.start_hour - current_hour) % self.hours_interval;

        let (date, hour) = if slot < self.start_hour {
            (today, self.start_hour)
        } else if slot > self.stop_hour {
            (today + Duration::days(1), self.start_hour)
        } else {
            (today, slot)
        };

        date.and_hms_opt(hour as u32, 0, 0)
            .and_then(|naive| now.timezone().from_local_datetime(&naive).earliest())
            .map(|instant| instant.timestamp_millis())
            .unwrap_or(0)
    }
}
