//! `HSTORE` key/value maps.
//!
//! Wire form: an `i32` entry count, then per entry a length-prefixed key and
//! a length-prefixed value, where a value length of `-1` is NULL. Keys are
//! never NULL.

use bytes::{BufMut, BytesMut};
use fallible_iterator::FallibleIterator;

use super::{len_i32, patch_i32, transactional};
use crate::cursor::Cursor;
use crate::error::{DecodeError, EncodeError};
use crate::iter::Counted;

/// Serializes an `HSTORE` value.
pub fn hstore_to_sql<'a, I>(entries: I, buf: &mut BytesMut) -> Result<(), EncodeError>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    transactional(buf, |buf| {
        let count_idx = buf.len();
        buf.put_i32(0);

        let mut count = 0_usize;
        for (key, value) in entries {
            count += 1;
            buf.put_i32(len_i32("hstore key", key.len())?);
            buf.put_slice(key.as_bytes());
            match value {
                Some(value) => {
                    buf.put_i32(len_i32("hstore value", value.len())?);
                    buf.put_slice(value.as_bytes());
                }
                None => buf.put_i32(-1),
            }
        }
        patch_i32(buf, count_idx, len_i32("hstore entry count", count)?);
        Ok(())
    })
}

/// Deserializes an `HSTORE` value.
pub fn hstore_from_sql(buf: &[u8]) -> Result<HstoreEntries<'_>, DecodeError> {
    let mut cur = Cursor::new(buf);
    let count = cur.read_i32()?;
    if count < 0 {
        return Err(DecodeError::InvalidFormat("negative hstore entry count"));
    }
    Ok(HstoreEntries(Counted::new(cur.take_remaining(), count as usize)))
}

/// A fallible iterator over `HSTORE` entries.
#[derive(Debug, Clone)]
pub struct HstoreEntries<'a>(Counted<'a>);

impl<'a> FallibleIterator for HstoreEntries<'a> {
    type Item = (&'a str, Option<&'a str>);
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<(&'a str, Option<&'a str>)>, DecodeError> {
        self.0.step(|cur| {
            let key = cur
                .read_nullable()?
                .ok_or(DecodeError::InvalidFormat("hstore key is NULL"))?;
            let key = std::str::from_utf8(key)?;
            let value = match cur.read_nullable()? {
                Some(value) => Some(std::str::from_utf8(value)?),
                None => None,
            };
            Ok((key, value))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
