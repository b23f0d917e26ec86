//! Round-trip properties for every scalar and geometric value format.

use std::net::IpAddr;

use bytes::BytesMut;
use pgproto_codec::types::{self, Point, Value, decode_value, encode_value};
use pgproto_codec::{FallibleIterator, oid};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    -1.0e9_f64..1.0e9
}

fn encoded(f: impl FnOnce(&mut BytesMut)) -> BytesMut {
    let mut buf = BytesMut::new();
    f(&mut buf);
    buf
}

proptest! {
    #[test]
    fn bool_roundtrip(v in any::<bool>()) {
        let buf = encoded(|buf| types::bool_to_sql(v, buf));
        prop_assert_eq!(types::bool_from_sql(&buf).unwrap(), v);
    }

    #[test]
    fn char_roundtrip(v in any::<i8>()) {
        let buf = encoded(|buf| types::char_to_sql(v, buf));
        prop_assert_eq!(types::char_from_sql(&buf).unwrap(), v);
    }

    #[test]
    fn int4_roundtrip(v in any::<i32>()) {
        let buf = encoded(|buf| types::int4_to_sql(v, buf));
        prop_assert_eq!(types::int4_from_sql(&buf).unwrap(), v);
    }

    #[test]
    fn oid_roundtrip(v in any::<u32>()) {
        let buf = encoded(|buf| types::oid_to_sql(v, buf));
        prop_assert_eq!(types::oid_from_sql(&buf).unwrap(), v);
    }

    #[test]
    fn float4_roundtrip_bitwise(v in any::<f32>()) {
        let buf = encoded(|buf| types::float4_to_sql(v, buf));
        prop_assert_eq!(types::float4_from_sql(&buf).unwrap().to_bits(), v.to_bits());
    }

    #[test]
    fn bytea_roundtrip(v in prop::collection::vec(any::<u8>(), 0..64)) {
        let buf = encoded(|buf| types::bytea_to_sql(&v, buf));
        prop_assert_eq!(types::bytea_from_sql(&buf), &v[..]);
    }

    #[test]
    fn timestamp_roundtrip(v in any::<i64>()) {
        let buf = encoded(|buf| types::timestamp_to_sql(v, buf));
        prop_assert_eq!(types::timestamp_from_sql(&buf).unwrap(), v);
    }

    #[test]
    fn date_roundtrip(v in any::<i32>()) {
        let buf = encoded(|buf| types::date_to_sql(v, buf));
        prop_assert_eq!(types::date_from_sql(&buf).unwrap(), v);
    }

    #[test]
    fn time_roundtrip(v in 0_i64..86_400_000_000) {
        let buf = encoded(|buf| types::time_to_sql(v, buf));
        prop_assert_eq!(types::time_from_sql(&buf).unwrap(), v);
    }

    #[test]
    fn macaddr_roundtrip(v in any::<[u8; 6]>()) {
        let buf = encoded(|buf| types::macaddr_to_sql(v, buf));
        prop_assert_eq!(types::macaddr_from_sql(&buf).unwrap(), v);
    }

    #[test]
    fn inet_roundtrip(addr in any::<IpAddr>(), mask in any::<u8>()) {
        let bits = if addr.is_ipv4() { 32 } else { 128 };
        let netmask = mask % (bits + 1);
        let mut buf = BytesMut::new();
        types::inet_to_sql(addr, netmask, &mut buf).unwrap();

        let inet = types::inet_from_sql(&buf).unwrap();
        prop_assert_eq!(inet.addr(), addr);
        prop_assert_eq!(inet.netmask(), netmask);
    }

    #[test]
    fn point_roundtrip(x in coord(), y in coord()) {
        let buf = encoded(|buf| types::point_to_sql(x, y, buf));
        prop_assert_eq!(types::point_from_sql(&buf).unwrap(), Point::new(x, y));
    }

    #[test]
    fn box_roundtrip(x1 in coord(), y1 in coord(), x2 in coord(), y2 in coord()) {
        let buf = encoded(|buf| types::box_to_sql(x1, y1, x2, y2, buf));
        let decoded = types::box_from_sql(&buf).unwrap();
        prop_assert_eq!(decoded.upper_right, Point::new(x1, y1));
        prop_assert_eq!(decoded.lower_left, Point::new(x2, y2));
    }

    #[test]
    fn path_roundtrip(closed in any::<bool>(),
                      points in prop::collection::vec((coord(), coord()), 0..16)) {
        let mut buf = BytesMut::new();
        types::path_to_sql(closed, points.iter().copied(), &mut buf).unwrap();

        let path = types::path_from_sql(&buf).unwrap();
        prop_assert_eq!(path.closed(), closed);
        prop_assert_eq!(path.len(), points.len());
        let decoded: Vec<Point> = path.points().collect().unwrap();
        let expected: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn hstore_roundtrip(entries in prop::collection::vec((".{0,8}", prop::option::of(".{0,8}")), 0..8)) {
        let mut buf = BytesMut::new();
        types::hstore_to_sql(
            entries.iter().map(|(k, v)| (k.as_str(), v.as_deref())),
            &mut buf,
        )
        .unwrap();

        let decoded: Vec<(String, Option<String>)> = types::hstore_from_sql(&buf)
            .unwrap()
            .map(|(k, v)| Ok((k.to_owned(), v.map(str::to_owned))))
            .collect()
            .unwrap();
        prop_assert_eq!(decoded, entries);
    }

    #[test]
    fn value_dispatch_roundtrip(value in prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i8>().prop_map(Value::Char),
        any::<i32>().prop_map(Value::Int4),
        any::<u32>().prop_map(Value::Oid),
        any::<f32>().prop_filter("NaN is not equal to itself", |f| !f.is_nan()).prop_map(Value::Float4),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytea),
        any::<i64>().prop_map(Value::TimestampTz),
        any::<i32>().prop_map(Value::Date),
        (0_i64..86_400_000_000).prop_map(Value::Time),
        any::<[u8; 6]>().prop_map(Value::MacAddr),
    ]) {
        let mut buf = BytesMut::new();
        encode_value(&value, &mut buf).unwrap();
        let type_oid = value.type_oid().unwrap();
        prop_assert_eq!(decode_value(type_oid, Some(&buf[..])).unwrap(), value);
    }
}

#[test]
fn inet_and_point_dispatch_by_oid() {
    let mut buf = BytesMut::new();
    types::inet_to_sql("10.0.0.0".parse().unwrap(), 8, &mut buf).unwrap();
    let Value::Inet(inet) = decode_value(oid::CIDR, Some(&buf[..])).unwrap() else {
        panic!("expected inet");
    };
    assert_eq!(inet.netmask(), 8);

    let point = Value::Point(Point::new(1.5, -2.0));
    let mut buf = BytesMut::new();
    encode_value(&point, &mut buf).unwrap();
    assert_eq!(decode_value(oid::POINT, Some(&buf[..])).unwrap(), point);
}
