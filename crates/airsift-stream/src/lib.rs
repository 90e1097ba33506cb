//! De-framed reading of HTTP responses carried over a chatty WiFi modem
//! link.
//!
//! The modem interleaves its own transfer notices (`\n+IPD,<count>:`,
//! `0,CLOSED`) with the response bytes. [`HttpReader`] elides them and
//! exposes a clean, ordered byte stream, together with the small strict
//! parsers a constrained HTTP client actually needs: a literal pattern
//! scanner, a `Date:` header parser, and an unsigned decimal number parser.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use airsift_modem::mock::ScriptedLink;
//! use airsift_stream::HttpReader;
//!
//! # async fn example() -> airsift_core::Result<()> {
//! let link = ScriptedLink::preloaded(
//!     b"HTTP/1.1 200 OK\r\nDate: Fri, 21 Aug 2015 22:06:40 GMT\r\n\r\ntemp=11.9\n",
//! );
//!
//! let mut reader = HttpReader::new();
//! reader.begin(link, Duration::from_millis(3000));
//!
//! let stamp = reader.find_date().await?;
//! reader.find(b"temp=").await?;
//! let temperature = reader.read_number().await?;
//!
//! println!("{temperature} degrees at {stamp}");
//! reader.end();
//! # Ok(())
//! # }
//! ```

pub mod date;
pub mod filter;
pub mod number;
pub mod scan;

pub use filter::{FilterState, HttpReader};
