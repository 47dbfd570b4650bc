//! Civil clock in the assistant's time zone

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;

use crate::{Error, LocalTime, Result};

pub trait Clock: Send + Sync {
    fn local_time(&self) -> Result<LocalTime>;
}

/// System clock converted into an IANA time zone
#[derive(Debug, Clone, Copy)]
pub struct CivilClock {
    tz: Tz,
}

impl CivilClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Parse an IANA zone name such as `Europe/London`
    pub fn from_name(name: &str) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|e| Error::Clock(format!("unknown time zone {}: {}", name, e)))?;
        Ok(Self::new(tz))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Local time for an arbitrary instant
    pub fn at(&self, instant: DateTime<Utc>) -> LocalTime {
        let local = instant.with_timezone(&self.tz);
        LocalTime::new(local.hour(), local.minute())
    }
}

impl Clock for CivilClock {
    fn local_time(&self) -> Result<LocalTime> {
        Ok(self.at(Utc::now()))
    }
}

/// Clock pinned to a settable time; `None` makes it fail
#[derive(Debug, Default)]
pub struct FixedClock {
    time: Mutex<Option<LocalTime>>,
}

impl FixedClock {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self {
            time: Mutex::new(Some(LocalTime::new(hour, minute))),
        }
    }

    /// A clock whose every read fails
    pub fn broken() -> Self {
        Self::default()
    }

    pub fn set(&self, hour: u32, minute: u32) {
        *self.time.lock() = Some(LocalTime::new(hour, minute));
    }
}

impl Clock for FixedClock {
    fn local_time(&self) -> Result<LocalTime> {
        let time = *self.time.lock();
        time.ok_or_else(|| Error::Clock("clock unavailable".to_string()))
    }
}
