//! `BIT` and `VARBIT` strings.

use bytes::{BufMut, BytesMut};

use super::{len_i32, transactional};
use crate::cursor::Cursor;
use crate::error::{DecodeError, EncodeError};

/// A `VARBIT` value: a bit count and the bytes packing those bits, most
/// significant bit first.
///
/// Always holds `bytes.len() == bit_len.div_ceil(8)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Varbit<'a> {
    len: usize,
    bytes: &'a [u8],
}

impl<'a> Varbit<'a> {
    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The packed bytes.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The bit at `idx`, or `None` past the end.
    pub fn get(&self, idx: usize) -> Option<bool> {
        if idx >= self.len {
            return None;
        }
        Some(self.bytes[idx / 8] & (0x80 >> (idx % 8)) != 0)
    }
}

/// Serializes a `VARBIT` or `BIT` value.
///
/// `bytes` must hold exactly `bit_len.div_ceil(8)` bytes.
pub fn varbit_to_sql(bit_len: usize, bytes: &[u8], buf: &mut BytesMut) -> Result<(), EncodeError> {
    if bytes.len() != bit_len.div_ceil(8) {
        return Err(EncodeError::BitLengthMismatch {
            bit_len,
            byte_len: bytes.len(),
        });
    }
    transactional(buf, |buf| {
        buf.put_i32(len_i32("varbit length", bit_len)?);
        buf.put_slice(bytes);
        Ok(())
    })
}

/// Deserializes a `VARBIT` or `BIT` value.
pub fn varbit_from_sql(buf: &[u8]) -> Result<Varbit<'_>, DecodeError> {
    let mut cur = Cursor::new(buf);
    let len = cur.read_i32()?;
    if len < 0 {
        return Err(DecodeError::InvalidFormat("negative varbit length"));
    }
    let len = len as usize;
    let bytes = cur.take_remaining();
    if bytes.len() != len.div_ceil(8) {
        return Err(DecodeError::InvalidFormat("varbit byte length does not match bit count"));
    }
    Ok(Varbit { len, bytes })
}
