//! Authentication primitives for the PostgreSQL protocol.
//!
//! This crate computes what a client sends during authentication; the
//! connection layer decides when to send it.
//!
//! - [`hash`]: SHA-2 digests with fixed or runtime-selected output size
//! - [`hmac`](mod@crate::hmac): HMAC over SHA-2, with constant-time verification
//! - [`scram`]: the SCRAM-SHA-256 client exchange
//! - [`md5`](mod@crate::md5): the legacy MD5 password response

pub mod error;
pub mod hash;
pub mod hmac;
pub mod md5;
pub mod scram;

pub use self::error::{AuthError, HashError};
pub use self::hash::{HashAlgorithm, VariableDigest, digest_fixed};
pub use self::hmac::{hmac_sha256, hmac_sha512, verify_hmac_sha256};
pub use self::md5::md5_password;
pub use self::scram::{ChannelBinding, SCRAM_SHA_256, SCRAM_SHA_256_PLUS, ScramSha256};
