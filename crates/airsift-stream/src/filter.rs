//! De-framing filter for the modem's in-band control notices.
//!
//! The WiFi modem shares one serial stream between the HTTP response and
//! its own transfer chatter: a more-data notice (`\n+IPD,<count>:`) can
//! appear anywhere in the data, and a closed notice (`0,CLOSED`) marks the
//! end. [`HttpReader`] pulls raw bytes from a [`ModemLink`], recognizes and
//! elides both notices, and yields every other byte unchanged and in order.
//!
//! # Recognition
//!
//! Notices are recognized character by character with a state machine:
//!
//! ```text
//!               '\n'   '+'    'I'    'P'    'D'    ','        ':'
//! ┌──────┐      ┌──────┬──────┬──────┬──────┬──────┬─────────┐
//! │ Idle │─────>│DataNl│DataPlus│DataI│DataIp│DataIpd│DataLen │──> notice
//! └──────┘      └──────┴──────┴──────┴──────┴──────┴─────────┘    elided
//!    │           DataLen absorbs the count field until ':'
//!    │
//!    │  '0'    ','    'C'    'L'    'O'    'S'    'E'       'D'
//!    └────────>CloseZero..CloseClose ─────────────────────────> closed
//!
//! Any unexpected character refutes the match: the recognizer returns to
//! Idle and everything buffered so far replays as ordinary payload.
//! ```
//!
//! # Why buffer at all
//!
//! Recognizing `\n+IPD,` needs six bytes of lookahead, and bytes already
//! consumed cannot be pushed back into the link. Tentatively matched bytes
//! therefore go into a small pending arena with a write cursor and a read
//! cursor. While a match is in progress the cursors track each other
//! (nothing is emitted); when a match is refuted the read cursor snaps to
//! the start and the arena drains to the consumer as ordinary data, in
//! original order. One arena serves both purposes.
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use airsift_modem::mock::ScriptedLink;
//! use airsift_stream::HttpReader;
//!
//! # async fn example() -> airsift_core::Result<()> {
//! let link = ScriptedLink::preloaded(b"He\n+IPD,5:llo0,CLOSED");
//!
//! let mut reader = HttpReader::new();
//! reader.begin(link, Duration::from_millis(3000));
//!
//! let mut word = [0u8; 5];
//! reader.read_exact(&mut word).await?;
//! assert_eq!(&word, b"Hello");
//!
//! reader.end();
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, trace, warn};

use airsift_core::constants::{
    DATA_NOTICE_TERMINATOR, DEFAULT_READ_TIMEOUT_MS, PENDING_CAPACITY, POLL_INTERVAL_MS,
};
use airsift_core::{Error, Result};
use airsift_modem::ModemLink;

/// States of the control-notice recognizer.
///
/// Two chains share the idle state: the more-data chain opened by `\n` and
/// the closed chain opened by `0`. Every state defines a successor both for
/// the expected next character and for everything else, so the transition
/// table is exhaustive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    /// No notice in progress; ordinary bytes flow through one at a time.
    Idle,

    /// Seen `\n`.
    DataNl,

    /// Seen `\n+`.
    DataPlus,

    /// Seen `\n+I`.
    DataI,

    /// Seen `\n+IP`.
    DataIp,

    /// Seen `\n+IPD`.
    DataIpd,

    /// Seen `\n+IPD,`: absorbing the byte-count field until `:`.
    DataLen,

    /// Seen `0`.
    CloseZero,

    /// Seen `0,`.
    CloseComma,

    /// Seen `0,C`.
    CloseC,

    /// Seen `0,CL`.
    CloseCl,

    /// Seen `0,CLO`.
    CloseClo,

    /// Seen `0,CLOS`.
    CloseClos,

    /// Seen `0,CLOSE`; a final `D` completes the closed notice.
    CloseClose,
}

/// De-framing reader over a modem link.
///
/// Binds to a [`ModemLink`] with [`begin`](Self::begin), yields clean
/// payload bytes through [`read`](Self::read), and hands the link back with
/// [`end`](Self::end). All higher-level parsing in this crate (pattern
/// scanning, the `Date:` header, decimal numbers) funnels through `read`.
///
/// # Timeouts
///
/// Each `read` call polls the link until a byte is available or the
/// per-call window passes. The deadline is measured from the moment that
/// specific call began, never cumulatively across calls, so a slow drip of
/// bytes can be read indefinitely as long as each byte arrives in time.
#[derive(Debug)]
pub struct HttpReader<L> {
    /// The bound link, or `None` between sessions.
    link: Option<L>,

    /// Per-read timeout supplied at `begin`.
    timeout: Duration,

    /// Current state of the notice recognizer.
    state: FilterState,

    /// Arena holding bytes of a tentative notice match, doubling as the
    /// replay queue when a match is refuted.
    pending: [u8; PENDING_CAPACITY],

    /// Index of the next free arena slot.
    next_in: usize,

    /// If less than `next_in`, index of the next arena byte to replay.
    next_out: usize,

    /// Raw byte displaced by an arena overflow, re-examined after the
    /// replay drains.
    carry: Option<u8>,

    /// Clean-side pushback slot, served before anything else.
    unread: Option<u8>,
}

impl<L: ModemLink> HttpReader<L> {
    /// Create an unbound reader.
    ///
    /// Every read fails with [`Error::NotBound`] until [`begin`](Self::begin)
    /// is called.
    pub fn new() -> Self {
        Self {
            link: None,
            timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            state: FilterState::Idle,
            pending: [0; PENDING_CAPACITY],
            next_in: 0,
            next_out: 0,
            carry: None,
            unread: None,
        }
    }

    /// Bind a link and start a fresh session.
    ///
    /// Call after the HTTP request has been issued and before the first
    /// [`read`](Self::read). Resets the recognizer, the arena cursors, and
    /// both pushback slots, so rebinding after [`end`](Self::end) carries no
    /// residue from the previous session.
    ///
    /// `timeout` bounds each individual `read` call.
    pub fn begin(&mut self, link: L, timeout: Duration) {
        debug!(timeout_ms = timeout.as_millis() as u64, "binding modem link");
        self.link = Some(link);
        self.timeout = timeout;
        self.state = FilterState::Idle;
        self.next_in = 0;
        self.next_out = 0;
        self.carry = None;
        self.unread = None;
    }

    /// Release the link and end the session.
    ///
    /// Returns the link so the caller can tear down the connection.
    /// Subsequent reads fail with [`Error::NotBound`].
    pub fn end(&mut self) -> Option<L> {
        debug!("releasing modem link");
        self.link.take()
    }

    /// True while a link is bound.
    pub fn is_bound(&self) -> bool {
        self.link.is_some()
    }

    /// Current recognizer state, for debugging and tests.
    pub fn state(&self) -> FilterState {
        self.state
    }

    /// Push back one already-filtered byte.
    ///
    /// The byte is returned by the next [`read`](Self::read) before anything
    /// else. The slot holds a single byte; callers park at most one byte
    /// between reads.
    pub fn unread(&mut self, byte: u8) {
        debug_assert!(self.unread.is_none(), "unread slot already occupied");
        self.unread = Some(byte);
    }

    /// Read the next payload byte, eliding control notices.
    ///
    /// # Errors
    ///
    /// - [`Error::NotBound`] if no link is bound.
    /// - [`Error::ReadTimeout`] if no byte arrived within the per-call
    ///   window.
    /// - [`Error::LinkClosed`] the moment the closed notice completes; all
    ///   payload bytes before it have already been delivered, and the caller
    ///   should [`end`](Self::end) the session.
    pub async fn read(&mut self) -> Result<u8> {
        if self.link.is_none() {
            return Err(Error::NotBound);
        }

        if let Some(byte) = self.unread.take() {
            return Ok(byte);
        }

        let deadline = Instant::now() + self.timeout;
        loop {
            // Replaying a refuted match takes precedence over new input.
            if self.next_out < self.next_in {
                let byte = self.pending[self.next_out];
                self.next_out += 1;
                return Ok(byte);
            }

            // Idle with the arena drained: recycle it from the start.
            if self.state == FilterState::Idle {
                self.next_in = 0;
                self.next_out = 0;
            }

            let byte = match self.carry.take() {
                Some(byte) => byte,
                None => self.poll_raw_byte(deadline).await?,
            };

            if self.next_in == PENDING_CAPACITY {
                // Arena full mid-match. Abandon the match, replay the arena
                // as payload, and re-examine this byte once the replay has
                // drained. Nothing is lost; an over-long notice is simply
                // not elided.
                warn!(state = ?self.state, "pending arena full, abandoning notice match");
                self.state = FilterState::Idle;
                self.next_out = 0;
                self.carry = Some(byte);
                continue;
            }

            self.pending[self.next_in] = byte;
            self.advance(byte)?;
        }
    }

    /// Fill `buf` with the next `buf.len()` payload bytes, in order.
    ///
    /// # Errors
    ///
    /// The first read failure propagates immediately and leaves `buf`
    /// partially written.
    pub async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        for slot in buf.iter_mut() {
            *slot = self.read().await?;
        }
        Ok(())
    }

    /// Busy-wait on the link until a byte is available or `deadline` passes.
    async fn poll_raw_byte(&mut self, deadline: Instant) -> Result<u8> {
        loop {
            let link = self.link.as_mut().ok_or(Error::NotBound)?;
            if link.has_data() {
                if let Some(byte) = link.read_byte() {
                    return Ok(byte);
                }
                // No byte after all; keep polling.
            }
            if Instant::now() >= deadline {
                return Err(Error::ReadTimeout {
                    duration_ms: self.timeout.as_millis() as u64,
                });
            }
            sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    /// Drive one byte through the recognizer transition table.
    ///
    /// The byte has already been written at `pending[next_in]`; this method
    /// decides whether it extends a tentative match (cursors track, nothing
    /// emitted), refutes one (read cursor snaps to the start, the arena
    /// replays), confirms the more-data notice (arena dropped outright), or
    /// completes the closed notice.
    fn advance(&mut self, byte: u8) -> Result<()> {
        use FilterState::*;

        match self.state {
            Idle => match byte {
                b'\n' => self.swallow(DataNl),
                b'0' => self.swallow(CloseZero),
                _ => {
                    // Ordinary byte: enqueue it and make it immediately
                    // replayable.
                    self.next_in += 1;
                    self.next_out = 0;
                }
            },
            DataNl => self.advance_if(byte, b'+', DataPlus),
            DataPlus => self.advance_if(byte, b'I', DataI),
            DataI => self.advance_if(byte, b'P', DataIp),
            DataIp => self.advance_if(byte, b'D', DataIpd),
            DataIpd => self.advance_if(byte, b',', DataLen),
            DataLen => {
                if byte == DATA_NOTICE_TERMINATOR {
                    // Full `\n+IPD,<count>:` confirmed: drop it outright.
                    trace!(swallowed = self.next_in + 1, "elided more-data notice");
                    self.next_in = 0;
                    self.next_out = 0;
                    self.state = Idle;
                } else {
                    // Still inside the count field.
                    self.swallow(DataLen);
                }
            }
            CloseZero => self.advance_if(byte, b',', CloseComma),
            CloseComma => self.advance_if(byte, b'C', CloseC),
            CloseC => self.advance_if(byte, b'L', CloseCl),
            CloseCl => self.advance_if(byte, b'O', CloseClo),
            CloseClo => self.advance_if(byte, b'S', CloseClos),
            CloseClos => self.advance_if(byte, b'E', CloseClose),
            CloseClose => {
                if byte == b'D' {
                    trace!("peer closed the connection");
                    return Err(Error::LinkClosed);
                }
                // Not the closed notice after all: replay `0,CLOSE` plus
                // this byte.
                self.next_in += 1;
                self.next_out = 0;
                self.state = Idle;
            }
        }

        Ok(())
    }

    /// Keep buffering into the tentative match and move to `next`.
    fn swallow(&mut self, next: FilterState) {
        self.next_in += 1;
        self.next_out = self.next_in;
        self.state = next;
    }

    /// Advance to `next` if `byte` is the expected character; otherwise the
    /// match is refuted and the whole arena becomes replayable payload.
    ///
    /// Replayed bytes are not re-scanned: a notice whose first character is
    /// buried inside a refuted match is delivered as payload.
    fn advance_if(&mut self, byte: u8, want: u8, next: FilterState) {
        if byte == want {
            self.swallow(next);
        } else {
            self.next_in += 1;
            self.next_out = 0;
            self.state = FilterState::Idle;
        }
    }
}

impl<L: ModemLink> Default for HttpReader<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airsift_core::constants::CLOSED_NOTICE;
    use airsift_modem::mock::ScriptedLink;

    const TIMEOUT: Duration = Duration::from_millis(50);

    /// Test helper: reader bound to a link preloaded with `bytes`.
    fn reader_over(bytes: &[u8]) -> HttpReader<ScriptedLink> {
        let mut reader = HttpReader::new();
        reader.begin(ScriptedLink::preloaded(bytes), TIMEOUT);
        reader
    }

    /// Test helper: read until the first error, collecting payload bytes.
    async fn drain(reader: &mut HttpReader<ScriptedLink>) -> (Vec<u8>, Error) {
        let mut out = Vec::new();
        loop {
            match reader.read().await {
                Ok(byte) => out.push(byte),
                Err(error) => return (out, error),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_clean_stream_passes_through() {
        let mut reader = reader_over(b"HTTP/1.1 200 OK");

        let (out, error) = drain(&mut reader).await;
        assert_eq!(out, b"HTTP/1.1 200 OK");
        assert!(error.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_data_notice_elided_mid_stream() {
        let mut reader = reader_over(b"He\n+IPD,5:llo");

        let (out, _) = drain(&mut reader).await;
        assert_eq!(out, b"Hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_data_notice_elided_at_start() {
        let mut reader = reader_over(b"\n+IPD,12:payload");

        let (out, _) = drain(&mut reader).await;
        assert_eq!(out, b"payload");
    }

    #[tokio::test(start_paused = true)]
    async fn test_count_field_may_contain_commas() {
        // The modem emits multi-field counts such as "0,1475"; everything
        // up to the colon is part of the notice.
        let mut reader = reader_over(b"ab\n+IPD,0,1475:cd");

        let (out, _) = drain(&mut reader).await;
        assert_eq!(out, b"abcd");
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_notices() {
        let mut reader = reader_over(b"\n+IPD,1:\n+IPD,2:x");

        let (out, _) = drain(&mut reader).await;
        assert_eq!(out, b"x");
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_notice_signals_closed() {
        let mut reader = reader_over(b"Hi0,CLOSED");

        let (out, error) = drain(&mut reader).await;
        assert_eq!(out, b"Hi");
        assert!(error.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_notice_alone() {
        let mut reader = reader_over(CLOSED_NOTICE);

        let (out, error) = drain(&mut reader).await;
        assert!(out.is_empty());
        assert!(error.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refuted_data_match_replays_literally() {
        let mut reader = reader_over(b"A\n+IPXB");

        let (out, _) = drain(&mut reader).await;
        assert_eq!(out, b"A\n+IPXB");
    }

    #[tokio::test(start_paused = true)]
    async fn test_refuted_close_match_replays_literally() {
        let mut reader = reader_over(b"0,CLOSX next");

        let (out, _) = drain(&mut reader).await;
        assert_eq!(out, b"0,CLOSX next");
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_refuted_at_final_byte() {
        let mut reader = reader_over(b"0,CLOSER");

        let (out, _) = drain(&mut reader).await;
        assert_eq!(out, b"0,CLOSER");
    }

    #[tokio::test(start_paused = true)]
    async fn test_lone_zero_is_payload() {
        let mut reader = reader_over(b"ab0cd");

        let (out, _) = drain(&mut reader).await;
        assert_eq!(out, b"ab0cd");
    }

    #[tokio::test(start_paused = true)]
    async fn test_replayed_bytes_are_not_rescanned() {
        // The second newline refutes the first tentative match and is
        // replayed as payload, so the notice it would have opened is
        // delivered literally as well.
        let mut reader = reader_over(b"\n\n+IPD,5:x");

        let (out, _) = drain(&mut reader).await;
        assert_eq!(out, b"\n\n+IPD,5:x");
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_not_bound() {
        let mut reader: HttpReader<ScriptedLink> = HttpReader::new();

        let error = reader.read().await.unwrap_err();
        assert!(matches!(error, Error::NotBound));
        assert!(!reader.is_bound());
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_after_end_not_bound() {
        let mut reader = reader_over(b"x");
        assert_eq!(reader.read().await.unwrap(), b'x');

        let link = reader.end();
        assert!(link.is_some());

        let error = reader.read().await.unwrap_err();
        assert!(matches!(error, Error::NotBound));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_on_silent_link() {
        let mut reader = HttpReader::new();
        reader.begin(ScriptedLink::silent(), TIMEOUT);

        let error = reader.read().await.unwrap_err();
        assert!(matches!(error, Error::ReadTimeout { duration_ms: 50 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_per_call_not_cumulative() {
        let (link, handle) = ScriptedLink::new();
        let mut reader = HttpReader::new();
        reader.begin(link, TIMEOUT);

        // Each byte arrives 30ms after the previous read began; every call
        // stays inside its own 50ms window.
        tokio::spawn(async move {
            for chunk in [b"a", b"b", b"c"] {
                sleep(Duration::from_millis(30)).await;
                handle.push(chunk);
            }
        });

        assert_eq!(reader.read().await.unwrap(), b'a');
        assert_eq!(reader.read().await.unwrap(), b'b');
        assert_eq!(reader.read().await.unwrap(), b'c');
    }

    #[tokio::test(start_paused = true)]
    async fn test_notice_split_across_timeout_boundary() {
        let (link, handle) = ScriptedLink::new();
        let mut reader = HttpReader::new();
        reader.begin(link, TIMEOUT);

        // A read that times out mid-notice keeps the partial match; the
        // next read picks up where recognition left off.
        handle.push(b"\n+IP");
        let error = reader.read().await.unwrap_err();
        assert!(error.is_timeout());
        assert_eq!(reader.state(), FilterState::DataIp);

        handle.push(b"D,5:ok");
        assert_eq!(reader.read().await.unwrap(), b'o');
        assert_eq!(reader.read().await.unwrap(), b'k');
        assert_eq!(reader.state(), FilterState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebind_after_end_carries_no_residue() {
        let mut reader = reader_over(b"\n+IP");
        let _ = reader.read().await; // times out mid-match
        assert_eq!(reader.state(), FilterState::DataIp);

        reader.end();
        reader.begin(ScriptedLink::preloaded(b"fresh"), TIMEOUT);
        assert_eq!(reader.state(), FilterState::Idle);

        let (out, _) = drain(&mut reader).await;
        assert_eq!(out, b"fresh");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unread_byte_is_served_first() {
        let mut reader = reader_over(b"ab");

        assert_eq!(reader.read().await.unwrap(), b'a');
        reader.unread(b'a');
        assert_eq!(reader.read().await.unwrap(), b'a');
        assert_eq!(reader.read().await.unwrap(), b'b');
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_exact_fills_in_order() {
        let mut reader = reader_over(b"12\n+IPD,9:345");

        let mut buf = [0u8; 5];
        reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"12345");
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_exact_partial_on_failure() {
        let mut reader = reader_over(b"xy0,CLOSED");

        let mut buf = [0u8; 4];
        let error = reader.read_exact(&mut buf).await.unwrap_err();
        assert!(error.is_closed());
        assert_eq!(&buf[..2], b"xy");
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlong_count_field_replays_lossless() {
        // "\n+IPD," plus a count field long enough to fill the arena: the
        // tentative match is abandoned and every byte comes back as
        // payload, in order.
        let mut input = Vec::new();
        input.extend_from_slice(b"\n+IPD,");
        input.extend_from_slice(&[b'9'; 15]);
        input.extend_from_slice(b":tail");

        let mut reader = reader_over(&input);

        let (out, _) = drain(&mut reader).await;
        assert_eq!(out, input);
    }

    #[tokio::test(start_paused = true)]
    async fn test_longest_elidable_count_field() {
        // Prefix (6) + 13 count bytes + ':' exactly fits the 20-byte arena.
        let mut input = Vec::new();
        input.extend_from_slice(b"\n+IPD,");
        input.extend_from_slice(&[b'7'; 13]);
        input.extend_from_slice(b":ok");

        let mut reader = reader_over(&input);

        let (out, _) = drain(&mut reader).await;
        assert_eq!(out, b"ok");
    }
}
