//! Rotation policy and file naming.
//!
//! A day is split at local midnight and local noon into two periods; each
//! period writes to its own `app_<YYYY-MM-DD>_<AM|PM>.log` file.
use chrono::{DateTime, Local, Timelike as _};

/// Half-day period of a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Before noon.
    Am,
    /// Noon and later.
    Pm,
}

impl Period {
    /// Period containing `ts`.
    #[must_use]
    pub fn of(ts: &DateTime<Local>) -> Self {
        if ts.hour() < 12 { Self::Am } else { Self::Pm }
    }

    /// Token used in file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }
}

/// Name of the log file that records at `ts` belong to.
#[must_use]
pub fn file_name(ts: &DateTime<Local>) -> String {
    format!(
        "app_{}_{}.log",
        ts.format("%Y-%m-%d"),
        Period::of(ts).as_str()
    )
}

/// Return `true` if a midnight or noon boundary lies between
/// `last_rotation` and `now`.
///
/// This detects boundary crossing, not boundary count: an idle gap spanning
/// several boundaries still yields a single rotation.
#[must_use]
pub fn needs_rotation(last_rotation: &DateTime<Local>, now: &DateTime<Local>) -> bool {
    last_rotation.date_naive() != now.date_naive()
        || (last_rotation.hour() < 12 && now.hour() >= 12)
}
