//! Unsigned decimal number parsing from the filtered stream.

use airsift_core::{Error, Result};
use airsift_modem::ModemLink;

use crate::filter::HttpReader;

impl<L: ModemLink> HttpReader<L> {
    /// Read an unsigned decimal number, optionally fractional.
    ///
    /// Accepts forms like `34`, `15.`, `90.54`, and `.2`. The number must
    /// be followed by at least one more byte: the read that terminates the
    /// digits has to succeed, and the terminating byte is pushed back so it
    /// stays the next readable byte.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedNumber`] if there are no digits on either side
    ///   of the decimal point.
    /// - Any stream failure (closed, timeout, unbound) before the
    ///   terminating byte propagates unchanged; a stream that ends right
    ///   after the digits is a failure, not a valid termination.
    pub async fn read_number(&mut self) -> Result<f64> {
        let mut result = 0.0_f64;
        let mut saw_digit = false;

        // Integer part, if there is one
        let mut byte = self.read().await?;
        while byte.is_ascii_digit() {
            saw_digit = true;
            result = result * 10.0 + f64::from(byte - b'0');
            byte = self.read().await?;
        }

        if byte != b'.' {
            if !saw_digit {
                return Err(Error::malformed_number("no digits before terminator"));
            }
            self.unread(byte);
            return Ok(result);
        }

        // Fractional part, if there is one
        let mut scale = 0.1_f64;
        byte = self.read().await?;
        while byte.is_ascii_digit() {
            saw_digit = true;
            result += scale * f64::from(byte - b'0');
            scale /= 10.0;
            byte = self.read().await?;
        }

        if !saw_digit {
            // A lone '.' with digits on neither side
            return Err(Error::malformed_number("no digits around decimal point"));
        }

        self.unread(byte);
        Ok(result)
    }
}
