//! Calendar gates deciding whether a task's recurrence applies today
//!
//! Predicates take an explicit date so tests can pin the calendar. Task
//! definitions reference them by name; unknown names make the definition
//! unparseable.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashMap;
use std::sync::Arc;

pub type DayPredicate = Arc<dyn Fn(NaiveDate) -> bool + Send + Sync>;

pub const EVERYDAY: &str = "everyday";
pub const WEEK_DAY: &str = "weekDay";
pub const LAST_WEEK_DAY_OF_MONTH: &str = "lastWeekDayOfMonth";

pub fn is_saturday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sat
}

pub fn is_sunday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

pub fn is_weekend(date: NaiveDate) -> bool {
    is_saturday(date) || is_sunday(date)
}

/// True on the last business day of a month: the date itself is a business
/// day and the next business day already belongs to the following month
pub fn is_last_week_day_of_month(date: NaiveDate) -> bool {
    if is_weekend(date) {
        return false;
    }

    let mut next = date + Duration::days(1);
    while is_weekend(next) {
        next += Duration::days(1);
    }

    next.month() != date.month()
}

/// Named predicate registry; built-ins can be overridden by name
pub struct DayPredicateRegistry {
    predicates: HashMap<String, DayPredicate>,
}

impl DayPredicateRegistry {
    /// Registry holding only the built-in predicates
    pub fn defaults() -> Self {
        let mut predicates: HashMap<String, DayPredicate> = HashMap::new();
        predicates.insert(EVERYDAY.to_string(), Arc::new(|_| true));
        predicates.insert(WEEK_DAY.to_string(), Arc::new(|date| !is_weekend(date)));
        predicates.insert(
            LAST_WEEK_DAY_OF_MONTH.to_string(),
            Arc::new(|date| is_last_week_day_of_month(date)),
        );
        Self { predicates }
    }

    /// Defaults with caller-supplied predicates merged over them by name
    pub fn with_overrides(overrides: HashMap<String, DayPredicate>) -> Self {
        let mut registry = Self::defaults();
        for (name, predicate) in overrides {
            registry.predicates.insert(name, predicate);
        }
        registry
    }

    pub fn get(&self, name: &str) -> Option<DayPredicate> {
        self.predicates.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }
}

impl Default for DayPredicateRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}
