//! Authentication errors.

use std::error::Error as StdError;
use std::fmt;

/// A failed or rejected authentication exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A server SASL message did not have the expected shape.
    InvalidServerMessage(&'static str),
    /// The server nonce does not extend the client nonce.
    NonceMismatch,
    /// The server's final signature did not match.
    InvalidServerSignature,
    /// The server asked for an iteration count this client will not run.
    UnsupportedIterations(u32),
    /// The server reported an error in its final message (`e=...`).
    Server(String),
    /// A base64 field could not be decoded.
    Base64(base64::DecodeError),
    /// A step was called out of order.
    InvalidState(&'static str),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidServerMessage(msg) => write!(f, "invalid SCRAM server message: {msg}"),
            AuthError::NonceMismatch => write!(f, "SCRAM server nonce does not extend client nonce"),
            AuthError::InvalidServerSignature => write!(f, "SCRAM server signature mismatch"),
            AuthError::UnsupportedIterations(n) => {
                write!(f, "unsupported SCRAM iteration count: {n}")
            }
            AuthError::Server(msg) => write!(f, "SCRAM authentication failed: {msg}"),
            AuthError::Base64(err) => write!(f, "invalid base64 in SCRAM message: {err}"),
            AuthError::InvalidState(msg) => write!(f, "SCRAM exchange out of order: {msg}"),
        }
    }
}

impl StdError for AuthError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AuthError::Base64(err) => Some(err),
            _ => None,
        }
    }
}

impl From<base64::DecodeError> for AuthError {
    fn from(err: base64::DecodeError) -> Self {
        AuthError::Base64(err)
    }
}

/// A hash requested with parameters no supported algorithm provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashError {
    /// The requested output length is outside the supported bounds.
    UnsupportedOutputSize(usize),
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashError::UnsupportedOutputSize(size) => {
                write!(f, "unsupported digest output size: {size} bytes")
            }
        }
    }
}

impl StdError for HashError {}
