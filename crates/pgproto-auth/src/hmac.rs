//! HMAC (RFC 2104) over the SHA-2 family.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac, SimpleHmac};
use sha2::digest::core_api::BlockSizeUser;
use sha2::{Digest, Sha256, Sha512};

fn keyed<M: Mac + KeyInit>(key: &[u8]) -> M {
    // HMAC pads or hashes the key itself, so every length is valid.
    <M as KeyInit>::new_from_slice(key).expect("HMAC accepts keys of any length")
}

/// HMAC over any block digest.
pub fn hmac<D>(key: &[u8], data: &[u8]) -> Vec<u8>
where
    D: Digest + BlockSizeUser,
{
    let mut mac = keyed::<SimpleHmac<D>>(key);
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = keyed::<Hmac<Sha256>>(key);
    mac.update(data);
    let mut out = [0_u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac = keyed::<Hmac<Sha512>>(key);
    mac.update(data);
    let mut out = [0_u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// Checks `tag` against HMAC-SHA256 of `data` in constant time.
pub fn verify_hmac_sha256(key: &[u8], data: &[u8], tag: &[u8]) -> bool {
    let mut mac = keyed::<Hmac<Sha256>>(key);
    mac.update(data);
    mac.verify_slice(tag).is_ok()
}
