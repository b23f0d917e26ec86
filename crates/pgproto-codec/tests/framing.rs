//! Stream-level tests: chunked delivery, poisoning and lazy row decoding.

use bytes::{BufMut, BytesMut};
use pgproto_codec::message::{BackendMessage, TransactionStatus};
use pgproto_codec::{FallibleIterator, FramerConfig, MessageFramer, ProtocolError};
use proptest::prelude::*;

fn tagged(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend_from_slice(&(body.len() as i32 + 4).to_be_bytes());
    out.extend_from_slice(body);
    out
}

fn data_row(values: &[Option<&[u8]>]) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_u16(values.len() as u16);
    for value in values {
        match value {
            Some(v) => {
                body.put_i32(v.len() as i32);
                body.put_slice(v);
            }
            None => body.put_i32(-1),
        }
    }
    tagged(b'D', &body)
}

/// A typical simple-query response.
fn stream() -> Vec<u8> {
    let mut row_desc = BytesMut::new();
    row_desc.put_u16(2);
    for (name, type_oid) in [(&b"id\0"[..], 23_u32), (&b"name\0"[..], 25)] {
        row_desc.put_slice(name);
        row_desc.put_u32(0);
        row_desc.put_i16(0);
        row_desc.put_u32(type_oid);
        row_desc.put_i16(-1);
        row_desc.put_i32(-1);
        row_desc.put_i16(0);
    }

    let mut out = tagged(b'T', &row_desc);
    out.extend(data_row(&[Some(&b"1"[..]), Some(&b"alice"[..])]));
    out.extend(data_row(&[Some(&b"2"[..]), None]));
    out.extend(tagged(b'C', b"SELECT 2\0"));
    out.extend(tagged(b'Z', b"I"));
    out
}

fn parse_whole(data: &[u8]) -> Vec<BackendMessage> {
    MessageFramer::new().feed(data).unwrap()
}

#[test]
fn simple_query_response() {
    let messages = parse_whole(&stream());
    assert_eq!(messages.len(), 5);

    let BackendMessage::RowDescription(desc) = &messages[0] else {
        panic!("expected row description");
    };
    let names: Vec<&str> = desc.fields().map(|f| Ok(f.name)).collect().unwrap();
    assert_eq!(names, ["id", "name"]);

    let BackendMessage::DataRow(row) = &messages[2] else {
        panic!("expected data row");
    };
    let values: Vec<Option<&[u8]>> = row.values().collect().unwrap();
    assert_eq!(values, [Some(&b"2"[..]), None]);

    let BackendMessage::CommandComplete(done) = &messages[3] else {
        panic!("expected command complete");
    };
    assert_eq!(done.rows_affected(), Some(2));
    assert_eq!(
        messages[4],
        BackendMessage::ReadyForQuery(TransactionStatus::Idle)
    );
}

#[test]
fn truncated_field_short_circuits_then_ends() {
    // Declares 3 values but the second length runs past the end.
    let mut body = BytesMut::new();
    body.put_u16(3);
    body.put_i32(1);
    body.put_u8(b'x');
    body.put_i32(10);
    body.put_slice(b"abc");

    let messages = parse_whole(&tagged(b'D', &body));
    let BackendMessage::DataRow(row) = &messages[0] else {
        panic!("expected data row");
    };
    let mut values = row.values();
    assert_eq!(values.next().unwrap(), Some(Some(&b"x"[..])));
    assert!(values.next().is_err());
    assert_eq!(values.next().unwrap(), None);
    assert_eq!(values.size_hint(), (0, Some(0)));
}

#[test]
fn zip_and_filter_compose() {
    let messages = parse_whole(&stream());
    let BackendMessage::DataRow(row) = &messages[1] else {
        panic!("expected data row");
    };
    let BackendMessage::RowDescription(desc) = &messages[0] else {
        panic!("expected row description");
    };
    let pairs: Vec<(&str, Option<&[u8]>)> = desc
        .fields()
        .zip(row.values())
        .map(|(field, value)| Ok((field.name, value)))
        .collect()
        .unwrap();
    assert_eq!(pairs, [("id", Some(&b"1"[..])), ("name", Some(&b"alice"[..]))]);

    let text_columns = desc.fields().filter(|f| Ok(f.type_oid == 25)).count().unwrap();
    assert_eq!(text_columns, 1);
}

#[test]
fn poisoned_after_unknown_tag() {
    let mut framer = MessageFramer::new();
    let mut data = tagged(b'!', b"");
    data.extend(tagged(b'Z', b"I"));
    assert_eq!(
        framer.feed(&data).unwrap_err(),
        ProtocolError::UnknownMessageType(b'!')
    );
    assert_eq!(framer.next_backend().unwrap_err(), ProtocolError::Poisoned);
}

#[test]
fn fatal_error_survives_a_following_bad_header() {
    let mut data = tagged(
        b'E',
        b"SFATAL\0C28P01\0Mpassword authentication failed for user \"app\"\0\0",
    );
    data.extend_from_slice(&[b'Z', 0, 0, 0, 2]);

    let mut framer = MessageFramer::new();
    let messages = framer.feed(&data).unwrap();
    assert_eq!(messages.len(), 1);
    let BackendMessage::ErrorResponse(body) = &messages[0] else {
        panic!("expected error response");
    };
    let fields = body.to_error_fields().unwrap();
    assert!(fields.is_fatal());
    assert_eq!(fields.code, "28P01");

    assert_eq!(
        framer.feed(&[]).unwrap_err(),
        ProtocolError::InvalidLength {
            tag: Some(b'Z'),
            length: 2
        }
    );
    assert_eq!(framer.feed(&[]).unwrap_err(), ProtocolError::Poisoned);
}

#[test]
fn message_size_limit_counts_header() {
    let msg = tagged(b'd', &[0; 11]);
    assert_eq!(msg.len(), 16);

    let mut exact = MessageFramer::with_config(FramerConfig::new().max_message_size(16));
    assert_eq!(exact.feed(&msg).unwrap().len(), 1);

    let mut small = MessageFramer::with_config(FramerConfig::new().max_message_size(15));
    assert!(matches!(
        small.feed(&msg[..5]),
        Err(ProtocolError::MessageTooLarge { length: 16, max: 15 })
    ));
}

proptest! {
    #[test]
    fn chunk_boundaries_do_not_matter(cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..12)) {
        let data = stream();
        let expected = parse_whole(&data);

        let mut offsets: Vec<usize> = cuts.iter().map(|i| i.index(data.len() + 1)).collect();
        offsets.push(0);
        offsets.push(data.len());
        offsets.sort_unstable();
        offsets.dedup();

        let mut framer = MessageFramer::new();
        let mut got = Vec::new();
        for pair in offsets.windows(2) {
            got.extend(framer.feed(&data[pair[0]..pair[1]]).unwrap());
        }
        prop_assert_eq!(got, expected);
        prop_assert_eq!(framer.buffered_len(), 0);
    }

    #[test]
    fn byte_at_a_time_matches_whole(split in 0_usize..64) {
        let data = stream();
        let split = split.min(data.len());
        let mut framer = MessageFramer::new();
        let mut got = framer.feed(&data[..split]).unwrap();
        for b in &data[split..] {
            got.extend(framer.feed(std::slice::from_ref(b)).unwrap());
        }
        prop_assert_eq!(got, parse_whole(&data));
    }
}
