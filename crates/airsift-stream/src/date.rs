//! Strict parser for the HTTP `Date:` response header.
//!
//! Grammar accepted, through the timezone:
//!
//! ```text
//! Date: Www, DD Mon YYYY HH:MM:SS GMT
//! Date: Fri, 21 Aug 2015 22:06:40 GMT
//! ```
//!
//! Only `GMT` is accepted as the timezone. Digits are validated as ASCII
//! digits but not range-checked, matching what servers actually emit; use
//! [`HttpDateTime::to_utc`] for calendar validation.

use airsift_core::{Error, HttpDateTime, Result};
use airsift_modem::ModemLink;

use crate::filter::HttpReader;

impl<L: ModemLink> HttpReader<L> {
    /// Skip ahead to the next `Date:` header and parse its value.
    ///
    /// Scans the filtered stream for the literal `"Date: "`, then consumes
    /// the fixed-grammar value that follows. The stream is left positioned
    /// on the byte after `GMT`.
    ///
    /// # Errors
    ///
    /// - Any stream failure (closed, timeout, unbound) while scanning or
    ///   consuming propagates unchanged.
    /// - [`Error::MalformedDate`] if a name, digit, or the timezone does
    ///   not match the grammar. No partial value escapes; the result is the
    ///   only thing to check.
    pub async fn find_date(&mut self) -> Result<HttpDateTime> {
        self.find(b"Date: ").await?;

        let mut name = [0u8; 3];

        // Day of week: Sun Mon Tue Wed Thu Fri Sat
        self.read_exact(&mut name).await?;
        let day_since_sunday = day_from_name(&name)?;

        // ", " between day name and day of month
        self.skip(2).await?;

        let day = self.read_two_digits("day of month").await?;

        // Space before the month
        self.skip(1).await?;

        // Month: Jan Feb Mar Apr May Jun Jul Aug Sep Oct Nov Dec
        self.read_exact(&mut name).await?;
        let month = month_from_name(&name)?;

        // Space before the year
        self.skip(1).await?;

        let year = self.read_year().await?;

        // Space before the hour
        self.skip(1).await?;

        let hour = self.read_two_digits("hour").await?;

        // ':' before the minute
        self.skip(1).await?;

        let minute = self.read_two_digits("minute").await?;

        // ':' before the second
        self.skip(1).await?;

        let second = self.read_two_digits("second").await?;

        // Space before the timezone
        self.skip(1).await?;

        self.read_exact(&mut name).await?;
        if &name != b"GMT" {
            return Err(Error::malformed_date(format!(
                "timezone {:?} is not GMT",
                String::from_utf8_lossy(&name)
            )));
        }

        Ok(HttpDateTime {
            day_since_sunday,
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Consume and discard `count` filtered bytes without validation.
    async fn skip(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            self.read().await?;
        }
        Ok(())
    }

    /// Two ASCII digits as one number, e.g. `"21"` -> 21.
    async fn read_two_digits(&mut self, what: &str) -> Result<u8> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf).await?;
        Ok(digit(buf[0], what)? * 10 + digit(buf[1], what)?)
    }

    /// Four ASCII digits as a year, e.g. `"2015"` -> 2015.
    async fn read_year(&mut self) -> Result<u16> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf).await?;

        let mut year = 0u16;
        for byte in buf {
            year = year * 10 + u16::from(digit(byte, "year")?);
        }
        Ok(year)
    }
}

/// Map a wire weekday name to its day-since-Sunday index.
fn day_from_name(name: &[u8]) -> Result<u8> {
    HttpDateTime::DAY_NAMES
        .iter()
        .position(|day| day.as_bytes() == name)
        .map(|index| index as u8)
        .ok_or_else(|| {
            Error::malformed_date(format!(
                "unknown day name {:?}",
                String::from_utf8_lossy(name)
            ))
        })
}

/// Map a wire month name to its 1-based month number.
fn month_from_name(name: &[u8]) -> Result<u8> {
    HttpDateTime::MONTH_NAMES
        .iter()
        .position(|month| month.as_bytes() == name)
        .map(|index| index as u8 + 1)
        .ok_or_else(|| {
            Error::malformed_date(format!(
                "unknown month name {:?}",
                String::from_utf8_lossy(name)
            ))
        })
}

/// One ASCII digit as its value.
fn digit(byte: u8, what: &str) -> Result<u8> {
    if byte.is_ascii_digit() {
        Ok(byte - b'0')
    } else {
        Err(Error::malformed_date(format!("{what} is not numeric")))
    }
}
