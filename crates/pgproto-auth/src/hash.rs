//! SHA-2 digests.
//!
//! [`digest_fixed`] is the zero-cost path when the algorithm is known at
//! compile time. [`HashAlgorithm`] picks the algorithm at runtime, e.g. from
//! a negotiated mechanism. [`VariableDigest`] defers the output length to
//! finalize time.

use sha2::digest::{DynDigest, Output};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};

use crate::error::HashError;

/// The SHA-2 family members this crate supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
}

impl HashAlgorithm {
    /// Digest length in bytes.
    pub const fn output_size(self) -> usize {
        match self {
            HashAlgorithm::Sha224 | HashAlgorithm::Sha512_224 => 28,
            HashAlgorithm::Sha256 | HashAlgorithm::Sha512_256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Internal block length in bytes, as used by HMAC.
    pub const fn block_size(self) -> usize {
        match self {
            HashAlgorithm::Sha224 | HashAlgorithm::Sha256 => 64,
            _ => 128,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha224 => "SHA-224",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
            HashAlgorithm::Sha512_224 => "SHA-512/224",
            HashAlgorithm::Sha512_256 => "SHA-512/256",
        }
    }

    /// A fresh incremental hasher.
    pub fn hasher(self) -> Box<dyn DynDigest + Send> {
        match self {
            HashAlgorithm::Sha224 => Box::new(Sha224::new()),
            HashAlgorithm::Sha256 => Box::new(Sha256::new()),
            HashAlgorithm::Sha384 => Box::new(Sha384::new()),
            HashAlgorithm::Sha512 => Box::new(Sha512::new()),
            HashAlgorithm::Sha512_224 => Box::new(Sha512_224::new()),
            HashAlgorithm::Sha512_256 => Box::new(Sha512_256::new()),
        }
    }

    /// One-shot digest of `data`.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        let mut hasher = self.hasher();
        hasher.update(data);
        hasher.finalize().into_vec()
    }
}

/// One-shot digest with the algorithm fixed at compile time.
pub fn digest_fixed<D: Digest>(data: &[u8]) -> Output<D> {
    D::digest(data)
}

/// An incremental hasher whose output length is chosen when it finishes.
///
/// Input is absorbed into a SHA-512 state; [`finalize`](Self::finalize)
/// returns the leading `output_size` bytes of the SHA-512 digest, for any
/// size in `1..=`[`MAX_OUTPUT_SIZE`](Self::MAX_OUTPUT_SIZE). The truncation
/// is plain prefixing, so a 32-byte output is not SHA-512/256 (which uses
/// its own initial state); use [`HashAlgorithm`] for the named variants.
#[derive(Debug, Clone, Default)]
pub struct VariableDigest {
    inner: Sha512,
}

impl VariableDigest {
    /// Largest output [`finalize`](Self::finalize) accepts.
    pub const MAX_OUTPUT_SIZE: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.inner, data);
    }

    /// Finishes the hash with `output_size` bytes of output.
    ///
    /// Fails with [`HashError::UnsupportedOutputSize`] unless
    /// `1 <= output_size <= MAX_OUTPUT_SIZE`.
    pub fn finalize(self, output_size: usize) -> Result<Vec<u8>, HashError> {
        if !(1..=Self::MAX_OUTPUT_SIZE).contains(&output_size) {
            return Err(HashError::UnsupportedOutputSize(output_size));
        }
        let mut out = Digest::finalize(self.inner).to_vec();
        out.truncate(output_size);
        Ok(out)
    }
}

#[cfg(test)]
pub(crate) fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::new(), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}
