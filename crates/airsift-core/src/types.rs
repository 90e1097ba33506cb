//! Core value types for parsed HTTP response content.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date and time extracted from an HTTP `Date:` response header.
///
/// Example header as returned by a web server:
///
/// ```text
/// Date: Fri, 21 Aug 2015 22:06:40 GMT
/// ```
///
/// Field conventions follow the header grammar rather than C's `struct tm`:
/// the weekday is counted from Sunday and the month is 1-based. A value of
/// this type is only ever produced by a successful parse; there are no
/// sentinel fields to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpDateTime {
    /// Day of the week, 0 = Sunday .. 6 = Saturday.
    pub day_since_sunday: u8,

    /// Four-digit year, e.g. 2015.
    pub year: u16,

    /// Month of the year, 1 = January .. 12 = December.
    pub month: u8,

    /// Day of the month, 1..31.
    pub day: u8,

    /// Hour of the day, 0..23. Midnight = 0, noon = 12.
    pub hour: u8,

    /// Minute, 0..59.
    pub minute: u8,

    /// Second, 0..61 (some server clocks emit leap seconds).
    pub second: u8,
}

impl HttpDateTime {
    /// Weekday names as they appear on the wire, indexed by
    /// [`day_since_sunday`](Self::day_since_sunday).
    pub const DAY_NAMES: [&'static str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

    /// Month names as they appear on the wire, indexed by
    /// [`month`](Self::month) minus one.
    pub const MONTH_NAMES: [&'static str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    /// Wire name of the weekday, if the index is in range.
    #[must_use]
    pub fn day_name(&self) -> Option<&'static str> {
        Self::DAY_NAMES
            .get(usize::from(self.day_since_sunday))
            .copied()
    }

    /// Wire name of the month, if the number is in range.
    #[must_use]
    pub fn month_name(&self) -> Option<&'static str> {
        self.month
            .checked_sub(1)
            .and_then(|m| Self::MONTH_NAMES.get(usize::from(m)))
            .copied()
    }

    /// Convert to a chrono UTC timestamp.
    ///
    /// Returns `None` if the fields do not name a real calendar instant
    /// (e.g. day 31 in February). The stored weekday index is not consulted;
    /// chrono derives the weekday from the date itself.
    #[must_use]
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        Utc.with_ymd_and_hms(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )
        .single()
    }
}

impl fmt::Display for HttpDateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}, {:02} {} {:04} {:02}:{:02}:{:02} GMT",
            self.day_name().unwrap_or("???"),
            self.day,
            self.month_name().unwrap_or("???"),
            self.year,
            self.hour,
            self.minute,
            self.second
        )
    }
}
