//! Scripted mock modem link.
//!
//! Simulates the serial side of a WiFi modem by replaying bytes that a test
//! pushes through a [`ScriptedLinkHandle`]. Tests can preload a complete
//! canned response, or drip-feed chunks while a read is in flight to
//! exercise partial-arrival and timeout paths.

use std::sync::{Arc, Mutex};

use bytes::{Buf, BytesMut};
use tracing::trace;

use crate::traits::ModemLink;

/// Mock modem link driven by a script of pushed byte chunks.
///
/// Created together with its controlling handle; the handle may be cloned
/// and moved into a task that feeds the link while the reader polls it.
///
/// # Examples
///
/// ```
/// use airsift_modem::ModemLink;
/// use airsift_modem::mock::ScriptedLink;
///
/// let (mut link, handle) = ScriptedLink::new();
///
/// handle.push(b"ab");
/// assert_eq!(link.read_byte(), Some(b'a'));
/// assert_eq!(link.read_byte(), Some(b'b'));
/// assert_eq!(link.read_byte(), None);
/// ```
#[derive(Debug)]
pub struct ScriptedLink {
    /// Bytes pushed by the handle but not yet read.
    queue: Arc<Mutex<BytesMut>>,

    /// Link name, for log lines in multi-link tests.
    name: String,
}

impl ScriptedLink {
    /// Create a new scripted link with the default name.
    ///
    /// Returns the link together with the handle that feeds it.
    pub fn new() -> (Self, ScriptedLinkHandle) {
        Self::with_name("Scripted Link".to_string())
    }

    /// Create a new scripted link with a custom name.
    pub fn with_name(name: String) -> (Self, ScriptedLinkHandle) {
        let queue = Arc::new(Mutex::new(BytesMut::new()));

        let link = Self {
            queue: Arc::clone(&queue),
            name: name.clone(),
        };

        let handle = ScriptedLinkHandle { queue, name };

        (link, handle)
    }

    /// Link preloaded with a complete canned response.
    ///
    /// The feeding handle is dropped; the link will never receive more
    /// data, so reads past the end of `bytes` see an empty link.
    pub fn preloaded(bytes: &[u8]) -> Self {
        let (link, handle) = Self::new();
        handle.push(bytes);
        link
    }

    /// Link that never produces any data, for timeout paths.
    pub fn silent() -> Self {
        Self::new().0
    }

    /// Get the link name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for ScriptedLink {
    fn default() -> Self {
        Self::new().0
    }
}

impl ModemLink for ScriptedLink {
    fn has_data(&self) -> bool {
        self.queue.lock().map(|q| !q.is_empty()).unwrap_or(false)
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut queue = self.queue.lock().ok()?;
        if queue.is_empty() {
            return None;
        }
        Some(queue.get_u8())
    }
}

/// Handle for feeding a [`ScriptedLink`].
///
/// Can be cloned and shared across tasks; every clone feeds the same link.
#[derive(Debug, Clone)]
pub struct ScriptedLinkHandle {
    /// Shared queue between handle and link.
    queue: Arc<Mutex<BytesMut>>,

    /// Link name.
    name: String,
}

impl ScriptedLinkHandle {
    /// Append a chunk of bytes to the link's incoming queue.
    pub fn push(&self, bytes: &[u8]) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.extend_from_slice(bytes);
            trace!(link = %self.name, pushed = bytes.len(), "scripted chunk queued");
        }
    }

    /// Append a text chunk to the link's incoming queue.
    pub fn push_str(&self, text: &str) {
        self.push(text.as_bytes());
    }

    /// Number of bytes queued but not yet read by the link.
    pub fn pending(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Get the link name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
