//! Shared test doubles for clock- and delay-dependent code.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::SubmissionDelay;

/// Clock frozen at noon on a fixed day.
///
/// `local()` reads the same wall-clock time in whatever zone the tests run
/// in, so the local date never drifts across midnight.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock {
    now: NaiveDateTime,
}

impl FixtureClock {
    /// Clock frozen at 12:00 on the given day.
    ///
    /// # Panics
    ///
    /// Panics when the arguments do not name a calendar day.
    #[must_use]
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        let now = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .unwrap_or_else(|| panic!("fixture clock date {year}-{month}-{day} is invalid"));
        Self { now }
    }

    /// [`FixtureClock::on`] wrapped for injection.
    #[must_use]
    pub fn shared_on(year: i32, month: u32, day: u32) -> Arc<dyn Clock> {
        Arc::new(Self::on(year, month, day))
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        Local
            .from_local_datetime(&self.now)
            .earliest()
            .unwrap_or_else(|| self.utc().with_timezone(&Local))
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now.and_utc()
    }
}

/// Delay that returns at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateDelay;

#[async_trait]
impl SubmissionDelay for ImmediateDelay {
    async fn wait(&self, _duration: Duration) {}
}

/// Delay that returns at once and remembers every requested duration.
#[derive(Debug, Default)]
pub struct RecordingDelay(Mutex<Vec<Duration>>);

impl RecordingDelay {
    /// Durations requested so far.
    ///
    /// # Panics
    ///
    /// Panics when the recording mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<Duration> {
        match self.0.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => panic!("recording delay mutex"),
        }
    }
}

#[async_trait]
impl SubmissionDelay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        match self.0.lock() {
            Ok(mut guard) => guard.push(duration),
            Err(_) => panic!("recording delay mutex"),
        }
    }
}
