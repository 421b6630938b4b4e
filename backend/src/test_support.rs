//! Test utilities shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled only for tests or with the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

/// Clock pinned to a settable instant.
///
/// # Examples
/// ```
/// use booking::test_support::MutableClock;
/// use mockable::Clock;
///
/// let clock = MutableClock::at(2024, 2, 1, 12);
/// clock.advance_days(1);
/// assert_eq!(clock.utc().date_naive().to_string(), "2024-02-02");
/// ```
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock reading `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock reading the given UTC date at `hour:00:00`.
    pub fn at(year: i32, month: u32, day: u32, hour: u32) -> Self {
        let now = match Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).single() {
            Some(now) => now,
            None => panic!("invalid fixture date {year}-{month}-{day} {hour}:00"),
        };
        Self::new(now)
    }

    /// Share as the trait object services expect.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Move the clock forward by whole days.
    pub fn advance_days(&self, days: i64) {
        *self.lock_clock() += TimeDelta::days(days);
    }

    /// Jump to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// UTC instant for fixtures, panicking on impossible dates.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single() {
        Some(instant) => instant,
        None => panic!("invalid fixture instant {year}-{month}-{day} {hour}:{minute}"),
    }
}
