//! Byte-source abstraction for WiFi modem links.
//!
//! This crate defines the seam between the de-framing reader in
//! `airsift-stream` and whatever carries the modem's serial output: the
//! [`ModemLink`] trait, plus a scripted mock implementation for development
//! and testing without a physical modem.
//!
//! # Design Philosophy
//!
//! - **Synchronous and non-blocking**: a link answers "is a byte ready?"
//!   and "give me the ready byte" and nothing else. The only suspension
//!   point in the system is the reader's polling loop, so links never need
//!   an async runtime of their own.
//! - **Exclusively owned**: the reader takes the link by value when it
//!   binds and hands it back when it releases. There is never more than one
//!   consumer, so implementations need no locking of their own beyond what
//!   their transport requires.
//!
//! # Mock Implementations
//!
//! [`mock::ScriptedLink`] replays bytes that a test pushes through a
//! cloneable handle, supporting both preloaded canned responses and
//! chunk-by-chunk drip feeds:
//!
//! ```
//! use airsift_modem::ModemLink;
//! use airsift_modem::mock::ScriptedLink;
//!
//! let (mut link, handle) = ScriptedLink::new();
//! assert!(!link.has_data());
//!
//! handle.push(b"HTTP/1.1 200 OK\r\n");
//! assert!(link.has_data());
//! assert_eq!(link.read_byte(), Some(b'H'));
//! ```

pub mod mock;
pub mod traits;

pub use mock::{ScriptedLink, ScriptedLinkHandle};
pub use traits::ModemLink;
