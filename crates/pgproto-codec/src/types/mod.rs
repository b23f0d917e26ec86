//! Binary encoding of PostgreSQL values.
//!
//! Each supported type has a `*_to_sql` function that appends the binary wire
//! form to a [`BytesMut`] and a `*_from_sql` function that decodes it from a
//! borrowed slice. Composite decoders return views that borrow the input and
//! expose their contents through [`FallibleIterator`](crate::FallibleIterator)s.
//!
//! Integers and floats are big-endian and fixed width. Text is UTF-8 with no
//! length limit beyond the enclosing length prefix.
//!
//! Encoders that can fail restore the output buffer to its original length
//! before returning the error.

use bytes::{BufMut, BytesMut};

use crate::error::{DecodeError, EncodeError};

mod array;
mod geometric;
mod hstore;
mod inet;
mod range;
mod value;
mod varbit;

pub use array::{Array, ArrayDimension, ArrayDimensions, ArrayValues, array_from_sql, array_to_sql};
pub use geometric::{
    Box, Path, PathPoints, Point, box_from_sql, box_to_sql, path_from_sql, path_to_sql,
    point_from_sql, point_to_sql,
};
pub use hstore::{HstoreEntries, hstore_from_sql, hstore_to_sql};
pub use inet::{Inet, inet_from_sql, inet_to_sql};
pub use range::{Range, RangeBound, empty_range_to_sql, range_from_sql, range_to_sql};
pub use value::{Value, decode_value, encode_value};
pub use varbit::{Varbit, varbit_from_sql, varbit_to_sql};

/// Microseconds between the Unix epoch and the PostgreSQL epoch (2000-01-01).
pub const PG_EPOCH_UNIX_MICROS: i64 = 946_684_800_000_000;

/// Days between the Unix epoch and the PostgreSQL epoch.
pub const PG_EPOCH_UNIX_DAYS: i32 = 10_957;

/// Whether a serializer produced a value or SQL NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsNull {
    Yes,
    No,
}

/// Runs `f`, truncating `buf` back to its starting length if it fails.
pub(crate) fn transactional<F>(buf: &mut BytesMut, f: F) -> Result<(), EncodeError>
where
    F: FnOnce(&mut BytesMut) -> Result<(), EncodeError>,
{
    let base = buf.len();
    let res = f(buf);
    if res.is_err() {
        buf.truncate(base);
    }
    res
}

pub(crate) fn len_i32(what: &'static str, len: usize) -> Result<i32, EncodeError> {
    i32::try_from(len).map_err(|_| EncodeError::ValueTooLarge { what, len })
}

/// Overwrites four bytes at `at` with a big-endian `i32`.
pub(crate) fn patch_i32(buf: &mut BytesMut, at: usize, value: i32) {
    buf[at..at + 4].copy_from_slice(&value.to_be_bytes());
}

/// Writes an `i32` length prefix followed by the bytes `serializer` appends,
/// or `-1` if it reports NULL.
pub fn write_nullable<F>(serializer: F, buf: &mut BytesMut) -> Result<(), EncodeError>
where
    F: FnOnce(&mut BytesMut) -> Result<IsNull, EncodeError>,
{
    let base = buf.len();
    buf.put_i32(0);
    let size = match serializer(buf) {
        Ok(IsNull::No) => match len_i32("value", buf.len() - base - 4) {
            Ok(size) => size,
            Err(err) => {
                buf.truncate(base);
                return Err(err);
            }
        },
        Ok(IsNull::Yes) => {
            buf.truncate(base + 4);
            -1
        }
        Err(err) => {
            buf.truncate(base);
            return Err(err);
        }
    };
    patch_i32(buf, base, size);
    Ok(())
}

fn fixed<const N: usize>(buf: &[u8]) -> Result<[u8; N], DecodeError> {
    <[u8; N]>::try_from(buf).map_err(|_| DecodeError::InvalidLength {
        expected: N,
        actual: buf.len(),
    })
}

/// Serializes a `BOOL` value.
pub fn bool_to_sql(v: bool, buf: &mut BytesMut) {
    buf.put_u8(u8::from(v));
}

/// Deserializes a `BOOL` value.
pub fn bool_from_sql(buf: &[u8]) -> Result<bool, DecodeError> {
    let [b] = fixed::<1>(buf)?;
    Ok(b != 0)
}

/// Serializes a `BYTEA` value.
pub fn bytea_to_sql(v: &[u8], buf: &mut BytesMut) {
    buf.put_slice(v);
}

/// Deserializes a `BYTEA` value.
pub fn bytea_from_sql(buf: &[u8]) -> &[u8] {
    buf
}

/// Serializes a `"char"` value.
pub fn char_to_sql(v: i8, buf: &mut BytesMut) {
    buf.put_i8(v);
}

/// Deserializes a `"char"` value.
pub fn char_from_sql(buf: &[u8]) -> Result<i8, DecodeError> {
    Ok(i8::from_be_bytes(fixed(buf)?))
}

/// Serializes an `INT2` value.
pub fn int2_to_sql(v: i16, buf: &mut BytesMut) {
    buf.put_i16(v);
}

/// Deserializes an `INT2` value.
pub fn int2_from_sql(buf: &[u8]) -> Result<i16, DecodeError> {
    Ok(i16::from_be_bytes(fixed(buf)?))
}

/// Serializes an `INT4` value.
pub fn int4_to_sql(v: i32, buf: &mut BytesMut) {
    buf.put_i32(v);
}

/// Deserializes an `INT4` value.
pub fn int4_from_sql(buf: &[u8]) -> Result<i32, DecodeError> {
    Ok(i32::from_be_bytes(fixed(buf)?))
}

/// Serializes an `INT8` value.
pub fn int8_to_sql(v: i64, buf: &mut BytesMut) {
    buf.put_i64(v);
}

/// Deserializes an `INT8` value.
pub fn int8_from_sql(buf: &[u8]) -> Result<i64, DecodeError> {
    Ok(i64::from_be_bytes(fixed(buf)?))
}

/// Serializes an `OID` value.
pub fn oid_to_sql(v: u32, buf: &mut BytesMut) {
    buf.put_u32(v);
}

/// Deserializes an `OID` value.
pub fn oid_from_sql(buf: &[u8]) -> Result<u32, DecodeError> {
    Ok(u32::from_be_bytes(fixed(buf)?))
}

/// Serializes a `FLOAT4` value.
pub fn float4_to_sql(v: f32, buf: &mut BytesMut) {
    buf.put_f32(v);
}

/// Deserializes a `FLOAT4` value.
pub fn float4_from_sql(buf: &[u8]) -> Result<f32, DecodeError> {
    Ok(f32::from_be_bytes(fixed(buf)?))
}

/// Serializes a `FLOAT8` value.
pub fn float8_to_sql(v: f64, buf: &mut BytesMut) {
    buf.put_f64(v);
}

/// Deserializes a `FLOAT8` value.
pub fn float8_from_sql(buf: &[u8]) -> Result<f64, DecodeError> {
    Ok(f64::from_be_bytes(fixed(buf)?))
}

/// Serializes a `TEXT`, `VARCHAR`, `CHAR(n)` or `NAME` value.
pub fn text_to_sql(v: &str, buf: &mut BytesMut) {
    buf.put_slice(v.as_bytes());
}

/// Deserializes a `TEXT`, `VARCHAR`, `CHAR(n)` or `NAME` value.
pub fn text_from_sql(buf: &[u8]) -> Result<&str, DecodeError> {
    Ok(std::str::from_utf8(buf)?)
}

/// Serializes a `TIMESTAMP` or `TIMESTAMPTZ` value.
///
/// The value is microseconds since midnight 2000-01-01 UTC.
pub fn timestamp_to_sql(v: i64, buf: &mut BytesMut) {
    buf.put_i64(v);
}

/// Deserializes a `TIMESTAMP` or `TIMESTAMPTZ` value.
pub fn timestamp_from_sql(buf: &[u8]) -> Result<i64, DecodeError> {
    Ok(i64::from_be_bytes(fixed(buf)?))
}

/// Serializes a `DATE` value as days since 2000-01-01.
pub fn date_to_sql(v: i32, buf: &mut BytesMut) {
    buf.put_i32(v);
}

/// Deserializes a `DATE` value.
pub fn date_from_sql(buf: &[u8]) -> Result<i32, DecodeError> {
    Ok(i32::from_be_bytes(fixed(buf)?))
}

/// Serializes a `TIME` value as microseconds since midnight.
pub fn time_to_sql(v: i64, buf: &mut BytesMut) {
    buf.put_i64(v);
}

/// Deserializes a `TIME` value.
///
/// `TIMETZ` carries an additional 4-byte zone offset; pass only the first
/// eight bytes here.
pub fn time_from_sql(buf: &[u8]) -> Result<i64, DecodeError> {
    Ok(i64::from_be_bytes(fixed(buf)?))
}

/// Serializes a `MACADDR` value.
pub fn macaddr_to_sql(v: [u8; 6], buf: &mut BytesMut) {
    buf.put_slice(&v);
}

/// Deserializes a `MACADDR` value.
pub fn macaddr_from_sql(buf: &[u8]) -> Result<[u8; 6], DecodeError> {
    fixed(buf)
}

/// Serializes a `UUID` value.
pub fn uuid_to_sql(v: [u8; 16], buf: &mut BytesMut) {
    buf.put_slice(&v);
}

/// Deserializes a `UUID` value.
pub fn uuid_from_sql(buf: &[u8]) -> Result<[u8; 16], DecodeError> {
    fixed(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_rejects_wrong_length() {
        assert_eq!(
            int4_from_sql(&[0, 0, 1]),
            Err(DecodeError::InvalidLength {
                expected: 4,
                actual: 3
            })
        );
        assert!(bool_from_sql(&[]).is_err());
        assert!(uuid_from_sql(&[0; 15]).is_err());
    }

    #[test]
    fn integers_are_big_endian() {
        let mut buf = BytesMut::new();
        int2_to_sql(0x0102, &mut buf);
        int4_to_sql(-1, &mut buf);
        assert_eq!(&buf[..], &[0x01, 0x02, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn text_rejects_invalid_utf8() {
        assert!(matches!(
            text_from_sql(&[0xff, 0xfe]),
            Err(DecodeError::InvalidUtf8(_))
        ));
        assert_eq!(text_from_sql(b"").unwrap(), "");
    }

    #[test]
    fn write_nullable_null_and_empty() {
        let mut buf = BytesMut::new();
        write_nullable(|_| Ok(IsNull::Yes), &mut buf).unwrap();
        write_nullable(|_| Ok(IsNull::No), &mut buf).unwrap();
        write_nullable(
            |buf| {
                text_to_sql("hi", buf);
                Ok(IsNull::No)
            },
            &mut buf,
        )
        .unwrap();
        assert_eq!(
            &buf[..],
            &[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0, 0, 0, 0, 2, b'h', b'i']
        );
    }

    #[test]
    fn write_nullable_rolls_back_on_error() {
        let mut buf = BytesMut::from(&b"keep"[..]);
        let res = write_nullable(
            |buf| {
                buf.put_slice(b"partial");
                Err(EncodeError::InvalidValue("nope"))
            },
            &mut buf,
        );
        assert!(res.is_err());
        assert_eq!(&buf[..], b"keep");
    }

    #[test]
    fn bool_nonzero_is_true() {
        assert!(bool_from_sql(&[2]).unwrap());
        assert!(!bool_from_sql(&[0]).unwrap());
    }
}
