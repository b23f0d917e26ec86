//! Binary codec for the PostgreSQL frontend/backend protocol v3.
//!
//! This crate turns bytes into protocol messages and values and back. It does
//! no I/O: a transport feeds a [`MessageFramer`] and drains parsed messages,
//! and query code decodes column values with the functions in [`types`].
//!
//! - [`frame`]: incremental framing with size limits and poisoning
//! - [`message`]: backend and frontend messages with lazy bodies
//! - [`types`]: binary value formats (scalars, arrays, ranges, geometry,
//!   hstore, varbit, inet)
//! - [`iter`]: the fallible iteration protocol shared by every streaming
//!   decoder
//!
//! ```
//! use pgproto_codec::{FallibleIterator, MessageFramer};
//! use pgproto_codec::message::BackendMessage;
//!
//! let mut framer = MessageFramer::new();
//! // DataRow with one column holding "42"
//! let messages = framer
//!     .feed(&[b'D', 0, 0, 0, 12, 0, 1, 0, 0, 0, 2, b'4', b'2'])
//!     .unwrap();
//! let BackendMessage::DataRow(row) = &messages[0] else { unreachable!() };
//! let values: Vec<Option<&[u8]>> = row.values().collect().unwrap();
//! assert_eq!(values, [Some(&b"42"[..])]);
//! ```

pub mod config;
mod cursor;
pub mod error;
pub mod frame;
pub mod iter;
pub mod message;
pub mod oid;
pub mod types;

pub use config::FramerConfig;
pub use error::{DecodeError, EncodeError, Error, ProtocolError, Result};
pub use frame::{Frame, MessageFramer};
pub use iter::{FallibleIterator, IntoFallibleIterator};
pub use message::{BackendMessage, FrontendMessage};
pub use oid::Oid;
