//! Property tests for the binary value formats.

use bytes::BytesMut;
use pgproto_codec::types::{
    self, ArrayDimension, IsNull, Range, RangeBound, array_from_sql, array_to_sql,
    range_from_sql, range_to_sql, varbit_from_sql, varbit_to_sql,
};
use pgproto_codec::{DecodeError, EncodeError, FallibleIterator, oid};
use proptest::prelude::*;

proptest! {
    #[test]
    fn int8_roundtrip(v in any::<i64>()) {
        let mut buf = BytesMut::new();
        types::int8_to_sql(v, &mut buf);
        prop_assert_eq!(types::int8_from_sql(&buf).unwrap(), v);
    }

    #[test]
    fn int2_roundtrip(v in any::<i16>()) {
        let mut buf = BytesMut::new();
        types::int2_to_sql(v, &mut buf);
        prop_assert_eq!(types::int2_from_sql(&buf).unwrap(), v);
    }

    #[test]
    fn float8_roundtrip_bitwise(v in any::<f64>()) {
        let mut buf = BytesMut::new();
        types::float8_to_sql(v, &mut buf);
        prop_assert_eq!(types::float8_from_sql(&buf).unwrap().to_bits(), v.to_bits());
    }

    #[test]
    fn text_roundtrip(s in ".*") {
        let mut buf = BytesMut::new();
        types::text_to_sql(&s, &mut buf);
        prop_assert_eq!(types::text_from_sql(&buf).unwrap(), s.as_str());
    }

    #[test]
    fn uuid_roundtrip(v in any::<[u8; 16]>()) {
        let mut buf = BytesMut::new();
        types::uuid_to_sql(v, &mut buf);
        prop_assert_eq!(types::uuid_from_sql(&buf).unwrap(), v);
    }

    #[test]
    fn fixed_width_rejects_wrong_length(extra in 1_usize..8) {
        let buf = vec![0_u8; 4 + extra];
        prop_assert!(types::int4_from_sql(&buf).is_err());
    }

    #[test]
    fn array_roundtrip(
        (dims, values) in prop::collection::vec(1_i32..4, 0..4).prop_flat_map(|lens| {
            let count = if lens.is_empty() {
                0
            } else {
                lens.iter().map(|&l| l as usize).product()
            };
            (Just(lens), prop::collection::vec(prop::option::of(any::<i32>()), count))
        })
    ) {
        let dims: Vec<ArrayDimension> = dims.into_iter().map(ArrayDimension::new).collect();
        let mut buf = BytesMut::new();
        array_to_sql(
            dims.iter().copied(),
            oid::INT4,
            values.iter(),
            |v, buf| match v {
                Some(v) => {
                    types::int4_to_sql(*v, buf);
                    Ok(IsNull::No)
                }
                None => Ok(IsNull::Yes),
            },
            &mut buf,
        )
        .unwrap();

        let array = array_from_sql(&buf).unwrap();
        prop_assert_eq!(array.element_type(), oid::INT4);
        prop_assert_eq!(array.has_nulls(), values.iter().any(Option::is_none));
        let decoded_dims: Vec<ArrayDimension> = array.dimensions().collect().unwrap();
        prop_assert_eq!(decoded_dims, dims);
        let decoded: Vec<Option<i32>> = array
            .values()
            .map(|v| v.map(types::int4_from_sql).transpose())
            .collect()
            .unwrap();
        prop_assert_eq!(decoded, values);
    }

    #[test]
    fn array_count_mismatch_writes_nothing(len in 1_i32..5, extra in 1_usize..3) {
        let values = vec![1_i32; len as usize + extra];
        let mut buf = BytesMut::from(&b"keep"[..]);
        let res = array_to_sql(
            [ArrayDimension::new(len)],
            oid::INT4,
            values.iter(),
            |v, buf| {
                types::int4_to_sql(*v, buf);
                Ok(IsNull::No)
            },
            &mut buf,
        );
        prop_assert!(res.is_err());
        prop_assert_eq!(&buf[..], b"keep");
    }

    #[test]
    fn varbit_invariant(bits in prop::collection::vec(any::<bool>(), 0..100)) {
        let mut packed = vec![0_u8; bits.len().div_ceil(8)];
        for (i, bit) in bits.iter().enumerate() {
            if *bit {
                packed[i / 8] |= 0x80 >> (i % 8);
            }
        }
        let mut buf = BytesMut::new();
        varbit_to_sql(bits.len(), &packed, &mut buf).unwrap();

        let varbit = varbit_from_sql(&buf).unwrap();
        prop_assert_eq!(varbit.len(), bits.len());
        prop_assert_eq!(varbit.bytes().len(), bits.len().div_ceil(8));
        let decoded: Vec<bool> = (0..varbit.len()).filter_map(|i| varbit.get(i)).collect();
        prop_assert_eq!(decoded, bits);
    }

    #[test]
    fn varbit_rejects_wrong_byte_count(bit_len in 0_usize..64, delta in 1_usize..3) {
        let bytes = vec![0_u8; bit_len.div_ceil(8) + delta];
        let mut buf = BytesMut::new();
        prop_assert!(varbit_to_sql(bit_len, &bytes, &mut buf).is_err());
        prop_assert!(buf.is_empty());
    }

    #[test]
    fn int4_range_roundtrip(lower in prop::option::of(any::<i32>()), upper in prop::option::of(any::<i32>()),
                            lower_inc in any::<bool>(), upper_inc in any::<bool>()) {
        let bound = |v: Option<i32>, inclusive: bool, buf: &mut BytesMut| -> Result<RangeBound<IsNull>, EncodeError> {
            let Some(v) = v else {
                return Ok(RangeBound::Unbounded);
            };
            types::int4_to_sql(v, buf);
            Ok(if inclusive {
                RangeBound::Inclusive(IsNull::No)
            } else {
                RangeBound::Exclusive(IsNull::No)
            })
        };
        let mut buf = BytesMut::new();
        range_to_sql(
            |buf| bound(lower, lower_inc, buf),
            |buf| bound(upper, upper_inc, buf),
            &mut buf,
        )
        .unwrap();

        let Range::Nonempty(lo, hi) = range_from_sql(&buf).unwrap() else {
            return Err(TestCaseError::fail("expected a non-empty range"));
        };
        let decode = |b: RangeBound<Option<&[u8]>>| -> Result<Option<(i32, bool)>, DecodeError> {
            match b {
                RangeBound::Unbounded => Ok(None),
                RangeBound::Inclusive(Some(raw)) => Ok(Some((types::int4_from_sql(raw)?, true))),
                RangeBound::Exclusive(Some(raw)) => Ok(Some((types::int4_from_sql(raw)?, false))),
                _ => Err(DecodeError::InvalidFormat("NULL bound")),
            }
        };
        prop_assert_eq!(decode(lo).unwrap(), lower.map(|v| (v, lower_inc)));
        prop_assert_eq!(decode(hi).unwrap(), upper.map(|v| (v, upper_inc)));
    }
}
