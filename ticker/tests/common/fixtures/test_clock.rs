use chrono::{DateTime, Local, TimeZone};
use std::sync::Mutex;
use ticker::clock::Clock;

/// Builds a local timestamp, panicking on impossible or ambiguous inputs.
pub fn local_datetime(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .expect("fixture datetime must be unambiguous")
}

/// Clock pinned to a settable instant.
pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Wednesday, June 12 2024, 12:00 local time.
    pub fn wednesday_noon() -> Self {
        Self::new(local_datetime(2024, 6, 12, 12, 0, 0))
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }
}
