//! Dynamic dispatch of scalar values by type OID.
//!
//! Row consumers that only know a column's OID at runtime decode through
//! [`decode_value`]. A malformed field yields a [`DecodeError`] for that field
//! alone; the rest of the row stays readable.

use bytes::BytesMut;

use super::{
    Inet, IsNull, Point, bool_from_sql, bool_to_sql, bytea_to_sql, char_from_sql, char_to_sql,
    date_from_sql, date_to_sql, float4_from_sql, float4_to_sql, float8_from_sql, float8_to_sql,
    inet_from_sql, inet_to_sql, int2_from_sql, int2_to_sql, int4_from_sql, int4_to_sql,
    int8_from_sql, int8_to_sql, macaddr_from_sql, macaddr_to_sql, oid_from_sql, oid_to_sql,
    point_from_sql, point_to_sql, text_from_sql, text_to_sql, time_from_sql, time_to_sql,
    timestamp_from_sql, timestamp_to_sql, uuid_from_sql, uuid_to_sql,
};
use crate::error::{DecodeError, EncodeError};
use crate::oid::{self, Oid};

/// An owned scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Char(i8),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Oid(u32),
    Float4(f32),
    Float8(f64),
    Text(String),
    Bytea(Vec<u8>),
    /// Microseconds since 2000-01-01.
    Timestamp(i64),
    /// Microseconds since 2000-01-01 UTC.
    TimestampTz(i64),
    /// Days since 2000-01-01.
    Date(i32),
    /// Microseconds since midnight.
    Time(i64),
    Uuid([u8; 16]),
    MacAddr([u8; 6]),
    Inet(Inet),
    Point(Point),
    /// A value of a type without a scalar decoder, kept as raw bytes.
    Unknown { type_oid: Oid, bytes: Vec<u8> },
}

impl Value {
    /// The OID this value encodes as, or `None` for NULL.
    pub fn type_oid(&self) -> Option<Oid> {
        let oid = match self {
            Value::Null => return None,
            Value::Bool(_) => oid::BOOL,
            Value::Char(_) => oid::CHAR,
            Value::Int2(_) => oid::INT2,
            Value::Int4(_) => oid::INT4,
            Value::Int8(_) => oid::INT8,
            Value::Oid(_) => oid::OID,
            Value::Float4(_) => oid::FLOAT4,
            Value::Float8(_) => oid::FLOAT8,
            Value::Text(_) => oid::TEXT,
            Value::Bytea(_) => oid::BYTEA,
            Value::Timestamp(_) => oid::TIMESTAMP,
            Value::TimestampTz(_) => oid::TIMESTAMPTZ,
            Value::Date(_) => oid::DATE,
            Value::Time(_) => oid::TIME,
            Value::Uuid(_) => oid::UUID,
            Value::MacAddr(_) => oid::MACADDR,
            Value::Inet(_) => oid::INET,
            Value::Point(_) => oid::POINT,
            Value::Unknown { type_oid, .. } => *type_oid,
        };
        Some(oid)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Decodes a binary-format field of type `type_oid`; `None` is SQL NULL.
pub fn decode_value(type_oid: Oid, raw: Option<&[u8]>) -> Result<Value, DecodeError> {
    let Some(raw) = raw else {
        return Ok(Value::Null);
    };
    let value = match type_oid {
        oid::BOOL => Value::Bool(bool_from_sql(raw)?),
        oid::CHAR => Value::Char(char_from_sql(raw)?),
        oid::INT2 => Value::Int2(int2_from_sql(raw)?),
        oid::INT4 => Value::Int4(int4_from_sql(raw)?),
        oid::INT8 => Value::Int8(int8_from_sql(raw)?),
        oid::OID => Value::Oid(oid_from_sql(raw)?),
        oid::FLOAT4 => Value::Float4(float4_from_sql(raw)?),
        oid::FLOAT8 => Value::Float8(float8_from_sql(raw)?),
        oid::TEXT | oid::VARCHAR | oid::BPCHAR | oid::NAME => {
            Value::Text(text_from_sql(raw)?.to_owned())
        }
        oid::BYTEA => Value::Bytea(raw.to_vec()),
        oid::TIMESTAMP => Value::Timestamp(timestamp_from_sql(raw)?),
        oid::TIMESTAMPTZ => Value::TimestampTz(timestamp_from_sql(raw)?),
        oid::DATE => Value::Date(date_from_sql(raw)?),
        oid::TIME => Value::Time(time_from_sql(raw)?),
        oid::UUID => Value::Uuid(uuid_from_sql(raw)?),
        oid::MACADDR => Value::MacAddr(macaddr_from_sql(raw)?),
        oid::INET | oid::CIDR => Value::Inet(inet_from_sql(raw)?),
        oid::POINT => Value::Point(point_from_sql(raw)?),
        _ => Value::Unknown {
            type_oid,
            bytes: raw.to_vec(),
        },
    };
    Ok(value)
}

/// Appends the binary form of `value` to `buf`.
///
/// Pair with [`write_nullable`](super::write_nullable) to emit the length
/// prefix.
pub fn encode_value(value: &Value, buf: &mut BytesMut) -> Result<IsNull, EncodeError> {
    match value {
        Value::Null => return Ok(IsNull::Yes),
        Value::Bool(v) => bool_to_sql(*v, buf),
        Value::Char(v) => char_to_sql(*v, buf),
        Value::Int2(v) => int2_to_sql(*v, buf),
        Value::Int4(v) => int4_to_sql(*v, buf),
        Value::Int8(v) => int8_to_sql(*v, buf),
        Value::Oid(v) => oid_to_sql(*v, buf),
        Value::Float4(v) => float4_to_sql(*v, buf),
        Value::Float8(v) => float8_to_sql(*v, buf),
        Value::Text(v) => text_to_sql(v, buf),
        Value::Bytea(v) => bytea_to_sql(v, buf),
        Value::Timestamp(v) | Value::TimestampTz(v) => timestamp_to_sql(*v, buf),
        Value::Date(v) => date_to_sql(*v, buf),
        Value::Time(v) => time_to_sql(*v, buf),
        Value::Uuid(v) => uuid_to_sql(*v, buf),
        Value::MacAddr(v) => macaddr_to_sql(*v, buf),
        Value::Inet(v) => inet_to_sql(v.addr(), v.netmask(), buf)?,
        Value::Point(v) => point_to_sql(v.x, v.y, buf),
        Value::Unknown { bytes, .. } => bytea_to_sql(bytes, buf),
    }
    Ok(IsNull::No)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::write_nullable;

    #[test]
    fn decodes_by_oid() {
        assert_eq!(
            decode_value(oid::INT4, Some(&7_i32.to_be_bytes())).unwrap(),
            Value::Int4(7)
        );
        assert_eq!(
            decode_value(oid::VARCHAR, Some(b"hey")).unwrap(),
            Value::Text("hey".into())
        );
        assert_eq!(decode_value(oid::INT4, None).unwrap(), Value::Null);
    }

    #[test]
    fn unknown_oid_keeps_bytes() {
        let value = decode_value(99_999, Some(b"\x01\x02")).unwrap();
        assert_eq!(value.type_oid(), Some(99_999));
        assert!(matches!(value, Value::Unknown { ref bytes, .. } if bytes == b"\x01\x02"));
    }

    #[test]
    fn malformed_field_is_isolated() {
        assert!(decode_value(oid::INT8, Some(&[0, 1])).is_err());
    }

    #[test]
    fn encode_then_decode() {
        let values = [
            Value::Bool(true),
            Value::Float8(2.5),
            Value::Text("héllo".into()),
            Value::Uuid([7; 16]),
            Value::Null,
        ];
        for value in values {
            let mut buf = BytesMut::new();
            write_nullable(|buf| encode_value(&value, buf), &mut buf).unwrap();
            let len = i32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
            let raw = (len >= 0).then(|| &buf[4..]);
            let oid = value.type_oid().unwrap_or(oid::TEXT);
            assert_eq!(decode_value(oid, raw).unwrap(), value);
        }
    }
}
