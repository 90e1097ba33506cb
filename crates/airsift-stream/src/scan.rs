//! Literal pattern scanning over the filtered stream.

use airsift_core::Result;
use airsift_modem::ModemLink;

use crate::filter::HttpReader;

impl<L: ModemLink> HttpReader<L> {
    /// Read filtered bytes until `pattern` has been seen in full.
    ///
    /// A mismatch restarts the scan at the beginning of the pattern without
    /// reconsidering the mismatching byte, so the pattern must not restart
    /// inside a partial occurrence of itself (no `"abab"`-style patterns,
    /// and no input like `"DaDate: "` when scanning for `"Date: "`).
    ///
    /// # Errors
    ///
    /// The first read failure (closed, timeout, unbound) propagates; the
    /// scan never completes on its own otherwise.
    pub async fn find(&mut self, pattern: &[u8]) -> Result<()> {
        debug_assert!(!pattern.is_empty(), "empty pattern matches nothing");

        let mut matched = 0;
        while matched < pattern.len() {
            let byte = self.read().await?;
            if byte == pattern[matched] {
                matched += 1;
            } else {
                matched = 0;
            }
        }
        Ok(())
    }
}
