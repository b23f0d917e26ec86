//! Error types for the wire codec.
//!
//! Three failure classes are kept apart because callers recover from them
//! differently:
//!
//! - [`DecodeError`]: a single value or sub-structure is malformed. The
//!   surrounding message is still usable, so a row consumer may surface the
//!   field as an error marker and keep going.
//! - [`ProtocolError`]: the frame stream itself is inconsistent. The framer
//!   is poisoned and the connection must be closed.
//! - [`EncodeError`]: the caller asked to serialize something the wire format
//!   cannot represent. Nothing is written to the output buffer.

use std::error::Error as StdError;
use std::fmt;
use std::str::Utf8Error;

/// A malformed value or message sub-structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended before the value was complete.
    UnexpectedEof { needed: usize, available: usize },
    /// A fixed-width value had the wrong number of bytes.
    InvalidLength { expected: usize, actual: usize },
    /// Text was not valid UTF-8.
    InvalidUtf8(Utf8Error),
    /// A flag, tag, count or length violated the format.
    InvalidFormat(&'static str),
    /// Bytes were left over after the value was fully decoded.
    TrailingData { remaining: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedEof { needed, available } => write!(
                f,
                "unexpected end of buffer: needed {} bytes, {} available",
                needed, available
            ),
            DecodeError::InvalidLength { expected, actual } => {
                write!(f, "invalid value length: expected {}, got {}", expected, actual)
            }
            DecodeError::InvalidUtf8(err) => write!(f, "invalid utf-8: {}", err),
            DecodeError::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
            DecodeError::TrailingData { remaining } => {
                write!(f, "{} trailing bytes after value", remaining)
            }
        }
    }
}

impl StdError for DecodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DecodeError::InvalidUtf8(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Utf8Error> for DecodeError {
    fn from(err: Utf8Error) -> Self {
        DecodeError::InvalidUtf8(err)
    }
}

/// A frame-level protocol violation.
///
/// These are fatal for the stream: once a [`MessageFramer`](crate::MessageFramer)
/// reports one it refuses to produce further frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The length prefix is smaller than the mandatory header.
    InvalidLength { tag: Option<u8>, length: i32 },
    /// The message exceeds the configured maximum size.
    MessageTooLarge { length: usize, max: usize },
    /// Unknown message type byte.
    UnknownMessageType(u8),
    /// Unknown request code in an untagged startup-class message.
    UnknownRequestCode(i32),
    /// A message body did not match the layout required by its tag.
    Malformed { tag: Option<u8>, source: DecodeError },
    /// A previous violation left the stream unusable.
    Poisoned,
}

impl ProtocolError {
    pub(crate) fn malformed(tag: Option<u8>, source: DecodeError) -> Self {
        ProtocolError::Malformed { tag, source }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidLength { tag, length } => match tag {
                Some(tag) => write!(f, "invalid length {} for message {:?}", length, *tag as char),
                None => write!(f, "invalid length {} for startup message", length),
            },
            ProtocolError::MessageTooLarge { length, max } => {
                write!(f, "message too large: {} > {}", length, max)
            }
            ProtocolError::UnknownMessageType(ty) => {
                write!(f, "unknown message type: 0x{:02x}", ty)
            }
            ProtocolError::UnknownRequestCode(code) => {
                write!(f, "unknown startup request code: {}", code)
            }
            ProtocolError::Malformed { tag, source } => match tag {
                Some(tag) => write!(f, "malformed {:?} message: {}", *tag as char, source),
                None => write!(f, "malformed startup message: {}", source),
            },
            ProtocolError::Poisoned => write!(f, "stream poisoned by an earlier protocol error"),
        }
    }
}

impl StdError for ProtocolError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ProtocolError::Malformed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A value the wire format cannot represent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A length or count does not fit the field that carries it.
    ValueTooLarge { what: &'static str, len: usize },
    /// The number of array elements differs from the declared dimensions.
    ElementCountMismatch { expected: usize, actual: usize },
    /// A varbit byte buffer does not match its bit count.
    BitLengthMismatch { bit_len: usize, byte_len: usize },
    /// A NUL-terminated string contains an interior NUL byte.
    NulInString(&'static str),
    /// The value cannot be expressed on the wire for another reason.
    InvalidValue(&'static str),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::ValueTooLarge { what, len } => {
                write!(f, "{} too large for wire format: {}", what, len)
            }
            EncodeError::ElementCountMismatch { expected, actual } => write!(
                f,
                "array dimensions declare {} elements but {} were supplied",
                expected, actual
            ),
            EncodeError::BitLengthMismatch { bit_len, byte_len } => write!(
                f,
                "varbit of {} bits needs {} bytes, got {}",
                bit_len,
                bit_len.div_ceil(8),
                byte_len
            ),
            EncodeError::NulInString(what) => write!(f, "{} contains a NUL byte", what),
            EncodeError::InvalidValue(msg) => write!(f, "invalid value: {}", msg),
        }
    }
}

impl StdError for EncodeError {}

/// Any codec error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Decode(DecodeError),
    Protocol(ProtocolError),
    Encode(EncodeError),
}

impl Error {
    /// Whether the connection that produced this error must be closed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(err) => write!(f, "decode error: {}", err),
            Error::Protocol(err) => write!(f, "protocol violation: {}", err),
            Error::Encode(err) => write!(f, "encode error: {}", err),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Decode(err) => Some(err),
            Error::Protocol(err) => Some(err),
            Error::Encode(err) => Some(err),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Error::Decode(err)
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err)
    }
}

impl From<EncodeError> for Error {
    fn from(err: EncodeError) -> Self {
        Error::Encode(err)
    }
}

/// Result alias defaulting to the umbrella [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
