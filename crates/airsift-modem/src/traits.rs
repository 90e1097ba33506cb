//! Modem link trait definition.
//!
//! [`ModemLink`] is the contract between the de-framing reader and the
//! transport that carries the modem's serial output. Establishing the
//! underlying WiFi/socket connection, issuing the HTTP request, and the
//! physical link layer all live behind this seam.

/// Raw byte source backed by a WiFi modem's serial output.
///
/// The contract is poll-then-read:
///
/// 1. [`has_data`](Self::has_data) answers without blocking whether at
///    least one byte can be read immediately.
/// 2. [`read_byte`](Self::read_byte) returns a byte that `has_data`
///    promised.
///
/// The trait is deliberately synchronous: the reader owns the waiting (its
/// polling loop sleeps between availability checks), so a link only ever
/// reports and hands over what is already buffered.
///
/// # Examples
///
/// Draining everything currently buffered on a link:
///
/// ```
/// use airsift_modem::ModemLink;
///
/// fn drain<L: ModemLink>(link: &mut L) -> Vec<u8> {
///     let mut bytes = Vec::new();
///     while link.has_data() {
///         if let Some(byte) = link.read_byte() {
///             bytes.push(byte);
///         }
///     }
///     bytes
/// }
/// ```
pub trait ModemLink {
    /// True if at least one byte can be read without blocking.
    fn has_data(&self) -> bool;

    /// The next raw byte from the link.
    ///
    /// Callers check [`has_data`](Self::has_data) first. Returns `None`
    /// when no byte is available after all; callers treat that as a
    /// spurious wakeup and resume polling.
    fn read_byte(&mut self) -> Option<u8>;
}
