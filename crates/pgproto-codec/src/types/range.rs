//! Range types.
//!
//! A range is a flags byte followed by zero, one or two length-prefixed
//! bound values. Unbounded sides carry no payload.

use bytes::{BufMut, BytesMut};

use super::{IsNull, len_i32, patch_i32, transactional};
use crate::cursor::Cursor;
use crate::error::{DecodeError, EncodeError};

const RANGE_EMPTY: u8 = 0x01;
const RANGE_LOWER_INCLUSIVE: u8 = 0x02;
const RANGE_UPPER_INCLUSIVE: u8 = 0x04;
const RANGE_LOWER_UNBOUNDED: u8 = 0x08;
const RANGE_UPPER_UNBOUNDED: u8 = 0x10;
const RANGE_KNOWN_FLAGS: u8 = 0x1f;

/// One side of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound<T> {
    /// An inclusive bound.
    Inclusive(T),
    /// An exclusive bound.
    Exclusive(T),
    /// No bound.
    Unbounded,
}

impl<T> RangeBound<T> {
    /// Maps the bound value, keeping its inclusivity.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> RangeBound<U> {
        match self {
            RangeBound::Inclusive(v) => RangeBound::Inclusive(f(v)),
            RangeBound::Exclusive(v) => RangeBound::Exclusive(f(v)),
            RangeBound::Unbounded => RangeBound::Unbounded,
        }
    }
}

/// A decoded range whose bound values borrow the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range<'a> {
    /// The empty range.
    Empty,
    /// A range with lower and upper bounds. A `None` bound value is SQL NULL.
    Nonempty(RangeBound<Option<&'a [u8]>>, RangeBound<Option<&'a [u8]>>),
}

/// Serializes an empty range.
pub fn empty_range_to_sql(buf: &mut BytesMut) {
    buf.put_u8(RANGE_EMPTY);
}

/// Serializes a range value.
///
/// Each bound closure writes its value (if any) and returns the bound kind;
/// the payload of an `Unbounded` side is discarded.
pub fn range_to_sql<F, G>(lower: F, upper: G, buf: &mut BytesMut) -> Result<(), EncodeError>
where
    F: FnOnce(&mut BytesMut) -> Result<RangeBound<IsNull>, EncodeError>,
    G: FnOnce(&mut BytesMut) -> Result<RangeBound<IsNull>, EncodeError>,
{
    transactional(buf, |buf| {
        let tag_idx = buf.len();
        buf.put_u8(0);
        let mut tag = 0;

        match write_bound(lower, buf)? {
            RangeBound::Inclusive(()) => tag |= RANGE_LOWER_INCLUSIVE,
            RangeBound::Exclusive(()) => {}
            RangeBound::Unbounded => tag |= RANGE_LOWER_UNBOUNDED,
        }
        match write_bound(upper, buf)? {
            RangeBound::Inclusive(()) => tag |= RANGE_UPPER_INCLUSIVE,
            RangeBound::Exclusive(()) => {}
            RangeBound::Unbounded => tag |= RANGE_UPPER_UNBOUNDED,
        }

        buf[tag_idx] = tag;
        Ok(())
    })
}

fn write_bound<F>(bound: F, buf: &mut BytesMut) -> Result<RangeBound<()>, EncodeError>
where
    F: FnOnce(&mut BytesMut) -> Result<RangeBound<IsNull>, EncodeError>,
{
    let base = buf.len();
    buf.put_i32(0);

    let (kind, is_null) = match bound(buf)? {
        RangeBound::Inclusive(is_null) => (RangeBound::Inclusive(()), is_null),
        RangeBound::Exclusive(is_null) => (RangeBound::Exclusive(()), is_null),
        RangeBound::Unbounded => {
            buf.truncate(base);
            return Ok(RangeBound::Unbounded);
        }
    };

    let size = match is_null {
        IsNull::No => len_i32("range bound", buf.len() - base - 4)?,
        IsNull::Yes => {
            buf.truncate(base + 4);
            -1
        }
    };
    patch_i32(buf, base, size);
    Ok(kind)
}

/// Deserializes a range value.
pub fn range_from_sql(buf: &[u8]) -> Result<Range<'_>, DecodeError> {
    let mut cur = Cursor::new(buf);
    let tag = cur.read_u8()?;
    if tag & !RANGE_KNOWN_FLAGS != 0 {
        return Err(DecodeError::InvalidFormat("unknown range flags"));
    }

    if tag & RANGE_EMPTY != 0 {
        if tag != RANGE_EMPTY {
            return Err(DecodeError::InvalidFormat("empty range with bound flags"));
        }
        cur.finish()?;
        return Ok(Range::Empty);
    }

    let lower = read_bound(&mut cur, tag, RANGE_LOWER_INCLUSIVE, RANGE_LOWER_UNBOUNDED)?;
    let upper = read_bound(&mut cur, tag, RANGE_UPPER_INCLUSIVE, RANGE_UPPER_UNBOUNDED)?;
    cur.finish()?;
    Ok(Range::Nonempty(lower, upper))
}

fn read_bound<'a>(
    cur: &mut Cursor<'a>,
    tag: u8,
    inclusive: u8,
    unbounded: u8,
) -> Result<RangeBound<Option<&'a [u8]>>, DecodeError> {
    if tag & unbounded != 0 {
        return Ok(RangeBound::Unbounded);
    }
    let value = cur.read_nullable()?;
    if tag & inclusive != 0 {
        Ok(RangeBound::Inclusive(value))
    } else {
        Ok(RangeBound::Exclusive(value))
    }
}
