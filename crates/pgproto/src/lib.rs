//! PostgreSQL frontend/backend protocol v3, without the I/O.
//!
//! `pgproto` bundles the wire codec ([`pgproto_codec`]) and the
//! authentication primitives ([`pgproto_auth`]) behind one dependency:
//!
//! - framing and message parsing: [`MessageFramer`], [`BackendMessage`],
//!   [`FrontendMessage`]
//! - binary values: [`types`]
//! - lazy decoding: [`FallibleIterator`]
//! - password, MD5 and SCRAM responses: [`auth`]
//!
//! A connection layer owns the socket, feeds bytes to a framer, and reacts
//! to each message:
//!
//! ```
//! use pgproto::prelude::*;
//!
//! let mut out = BytesMut::new();
//! FrontendMessage::Query("SELECT 1".into()).encode(&mut out).unwrap();
//!
//! let mut framer = MessageFramer::new();
//! let messages = framer.feed(b"Z\x00\x00\x00\x05I").unwrap();
//! assert_eq!(
//!     messages,
//!     [BackendMessage::ReadyForQuery(TransactionStatus::Idle)]
//! );
//! ```

pub mod auth;

pub use pgproto_codec::{
    DecodeError, EncodeError, Error, FallibleIterator, Frame, FramerConfig, IntoFallibleIterator,
    MessageFramer, Oid, ProtocolError, Result, config, error, frame, iter, message, oid, types,
};
pub use pgproto_codec::{BackendMessage, FrontendMessage};

pub use pgproto_auth::{
    AuthError, ChannelBinding, HashAlgorithm, HashError, ScramSha256, VariableDigest,
};

/// Cryptographic building blocks re-exported from `pgproto-auth`.
pub mod crypto {
    pub use pgproto_auth::hash::{HashAlgorithm, VariableDigest, digest_fixed};
    pub use pgproto_auth::hmac::{hmac, hmac_sha256, hmac_sha512, verify_hmac_sha256};
    pub use pgproto_auth::md5::md5_password;
    pub use pgproto_auth::scram::{SCRAM_SHA_256, SCRAM_SHA_256_PLUS};
}

/// Commonly used types.
pub mod prelude {
    pub use bytes::BytesMut;
    pub use pgproto_codec::message::{BackendMessage, FrontendMessage, TransactionStatus};
    pub use pgproto_codec::{FallibleIterator, FramerConfig, MessageFramer};
}
