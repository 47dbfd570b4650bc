//! Time-of-day greeting rule
//!
//! Shared by the opening line and the `get_current_time` tool so both always
//! agree on the band boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Greeting word for an hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Greeting {
    /// 05:00 - 11:59
    Morning,
    /// 12:00 - 17:59
    Afternoon,
    /// 18:00 - 04:59
    Evening,
}

impl Greeting {
    /// Greeting for an hour in `0..24`
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "Good morning",
            Self::Afternoon => "Good afternoon",
            Self::Evening => "Good evening",
        }
    }
}

impl fmt::Display for Greeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wall-clock time in the assistant's civil time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub hour: u32,
    pub minute: u32,
}

impl LocalTime {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    pub fn greeting(&self) -> Greeting {
        Greeting::for_hour(self.hour)
    }
}

/// Hour unpadded, minute zero-padded: `9:05`, `14:30`
impl fmt::Display for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_hour_zero() {
        assert_eq!(Greeting::for_hour(0), Greeting::Evening);
    }

    #[test]
    fn test_boundary_hour_five() {
        assert_eq!(Greeting::for_hour(4), Greeting::Evening);
        assert_eq!(Greeting::for_hour(5), Greeting::Morning);
    }

    #[test]
    fn test_boundary_hour_twelve() {
        assert_eq!(Greeting::for_hour(11), Greeting::Morning);
        assert_eq!(Greeting::for_hour(12), Greeting::Afternoon);
    }

    #[test]
    fn test_boundary_hour_eighteen() {
        assert_eq!(Greeting::for_hour(17), Greeting::Afternoon);
        assert_eq!(Greeting::for_hour(18), Greeting::Evening);
        assert_eq!(Greeting::for_hour(23), Greeting::Evening);
    }

    #[test]
    fn test_greeting_words() {
        assert_eq!(Greeting::Morning.to_string(), "Good morning");
        assert_eq!(Greeting::Afternoon.as_str(), "Good afternoon");
        assert_eq!(Greeting::Evening.as_str(), "Good evening");
    }

    #[test]
    fn test_local_time_format() {
        assert_eq!(LocalTime::new(9, 5).to_string(), "9:05");
        assert_eq!(LocalTime::new(14, 30).to_string(), "14:30");
        assert_eq!(LocalTime::new(0, 0).to_string(), "0:00");
    }
}
