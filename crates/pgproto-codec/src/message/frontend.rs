//! Frontend (client to server) messages.

use bytes::{BufMut, BytesMut};

use super::{
    CANCEL_REQUEST_CODE, DescribeKind, GSSENC_REQUEST_CODE, PROTOCOL_VERSION, SSL_REQUEST_CODE,
    frontend_type,
};
use crate::cursor::Cursor;
use crate::error::{DecodeError, EncodeError, ProtocolError};
use crate::frame::Frame;
use crate::oid::Oid;
use crate::types::{len_i32, patch_i32, transactional};

/// Messages sent from the client to the PostgreSQL server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendMessage {
    /// Startup message (no type byte) - first message sent after connecting
    Startup {
        /// Protocol version (196608 for 3.0)
        version: i32,
        /// Connection parameters (user, database, etc.)
        params: Vec<(String, String)>,
    },

    /// SSL negotiation request
    SslRequest,

    /// GSSAPI encryption negotiation request
    GssEncRequest,

    /// Cancel a running query (sent on a separate connection)
    CancelRequest {
        /// Backend process ID
        process_id: i32,
        /// Secret key from BackendKeyData
        secret_key: i32,
    },

    /// Raw body of a `p` message.
    ///
    /// Cleartext, MD5, GSS and SASL responses all share this type byte; which
    /// one it is depends on the authentication exchange in progress.
    Password(Vec<u8>),

    /// SASL initial response (mechanism selection and initial data)
    SaslInitialResponse {
        /// SASL mechanism name (e.g., "SCRAM-SHA-256")
        mechanism: String,
        /// Initial response data
        data: Vec<u8>,
    },

    /// SASL response (continuation data)
    SaslResponse(Vec<u8>),

    /// Simple query (single SQL string, returns text format)
    Query(String),

    /// Parse a prepared statement (extended query protocol)
    Parse {
        /// Statement name ("" for unnamed)
        name: String,
        /// SQL query with $1, $2, etc. placeholders
        query: String,
        /// Parameter type OIDs (0 for server to infer)
        param_types: Vec<Oid>,
    },

    /// Bind parameters to a prepared statement
    Bind {
        /// Portal name ("" for unnamed)
        portal: String,
        /// Statement name to bind to
        statement: String,
        /// Parameter format codes (0=text, 1=binary)
        param_formats: Vec<i16>,
        /// Parameter values (None for NULL)
        params: Vec<Option<Vec<u8>>>,
        /// Result format codes (0=text, 1=binary)
        result_formats: Vec<i16>,
    },

    /// Describe a prepared statement or portal
    Describe {
        /// 'S' for statement, 'P' for portal
        kind: DescribeKind,
        /// Name of statement/portal
        name: String,
    },

    /// Execute a bound portal
    Execute {
        /// Portal name
        portal: String,
        /// Maximum rows to return (0 for all)
        max_rows: i32,
    },

    /// Close a prepared statement or portal
    Close {
        /// 'S' for statement, 'P' for portal
        kind: DescribeKind,
        /// Name of statement/portal
        name: String,
    },

    /// Sync - marks end of extended query, requests ReadyForQuery
    Sync,

    /// Flush - request server to send all pending output
    Flush,

    /// COPY data chunk
    CopyData(Vec<u8>),

    /// COPY operation complete
    CopyDone,

    /// COPY operation failed
    CopyFail(String),

    /// Terminate the connection
    Terminate,
}

impl FrontendMessage {
    /// A cleartext or MD5-hashed password response.
    pub fn password(password: &str) -> Result<FrontendMessage, EncodeError> {
        if password.contains('\0') {
            return Err(EncodeError::NulInString("password"));
        }
        let mut body = Vec::with_capacity(password.len() + 1);
        body.extend_from_slice(password.as_bytes());
        body.push(0);
        Ok(FrontendMessage::Password(body))
    }

    /// Appends the wire form of this message to `buf`.
    ///
    /// On error `buf` is left as it was.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<(), EncodeError> {
        match self {
            FrontendMessage::Startup { version, params } => untagged(buf, |buf| {
                buf.put_i32(*version);
                for (name, value) in params {
                    put_cstr(buf, "startup parameter name", name)?;
                    put_cstr(buf, "startup parameter value", value)?;
                }
                buf.put_u8(0);
                Ok(())
            }),
            FrontendMessage::SslRequest => untagged(buf, |buf| {
                buf.put_i32(SSL_REQUEST_CODE);
                Ok(())
            }),
            FrontendMessage::GssEncRequest => untagged(buf, |buf| {
                buf.put_i32(GSSENC_REQUEST_CODE);
                Ok(())
            }),
            FrontendMessage::CancelRequest {
                process_id,
                secret_key,
            } => untagged(buf, |buf| {
                buf.put_i32(CANCEL_REQUEST_CODE);
                buf.put_i32(*process_id);
                buf.put_i32(*secret_key);
                Ok(())
            }),
            FrontendMessage::Password(body) | FrontendMessage::SaslResponse(body) => {
                tagged(frontend_type::PASSWORD, buf, |buf| {
                    buf.put_slice(body);
                    Ok(())
                })
            }
            FrontendMessage::SaslInitialResponse { mechanism, data } => {
                tagged(frontend_type::PASSWORD, buf, |buf| {
                    put_cstr(buf, "SASL mechanism", mechanism)?;
                    buf.put_i32(len_i32("SASL initial response", data.len())?);
                    buf.put_slice(data);
                    Ok(())
                })
            }
            FrontendMessage::Query(query) => tagged(frontend_type::QUERY, buf, |buf| {
                put_cstr(buf, "query", query)
            }),
            FrontendMessage::Parse {
                name,
                query,
                param_types,
            } => tagged(frontend_type::PARSE, buf, |buf| {
                put_cstr(buf, "statement name", name)?;
                put_cstr(buf, "query", query)?;
                buf.put_i16(count_i16("parameter types", param_types.len())?);
                for oid in param_types {
                    buf.put_u32(*oid);
                }
                Ok(())
            }),
            FrontendMessage::Bind {
                portal,
                statement,
                param_formats,
                params,
                result_formats,
            } => tagged(frontend_type::BIND, buf, |buf| {
                put_cstr(buf, "portal name", portal)?;
                put_cstr(buf, "statement name", statement)?;
                put_formats(buf, "parameter formats", param_formats)?;
                buf.put_i16(count_i16("parameters", params.len())?);
                for param in params {
                    match param {
                        Some(value) => {
                            buf.put_i32(len_i32("parameter value", value.len())?);
                            buf.put_slice(value);
                        }
                        None => buf.put_i32(-1),
                    }
                }
                put_formats(buf, "result formats", result_formats)
            }),
            FrontendMessage::Describe { kind, name } => {
                tagged(frontend_type::DESCRIBE, buf, |buf| {
                    buf.put_u8(kind.as_byte());
                    put_cstr(buf, "describe target", name)
                })
            }
            FrontendMessage::Execute { portal, max_rows } => {
                tagged(frontend_type::EXECUTE, buf, |buf| {
                    put_cstr(buf, "portal name", portal)?;
                    buf.put_i32(*max_rows);
                    Ok(())
                })
            }
            FrontendMessage::Close { kind, name } => tagged(frontend_type::CLOSE, buf, |buf| {
                buf.put_u8(kind.as_byte());
                put_cstr(buf, "close target", name)
            }),
            FrontendMessage::Sync => tagged(frontend_type::SYNC, buf, |_| Ok(())),
            FrontendMessage::Flush => tagged(frontend_type::FLUSH, buf, |_| Ok(())),
            FrontendMessage::CopyData(data) => tagged(frontend_type::COPY_DATA, buf, |buf| {
                buf.put_slice(data);
                Ok(())
            }),
            FrontendMessage::CopyDone => tagged(frontend_type::COPY_DONE, buf, |_| Ok(())),
            FrontendMessage::CopyFail(message) => tagged(frontend_type::COPY_FAIL, buf, |buf| {
                put_cstr(buf, "copy failure message", message)
            }),
            FrontendMessage::Terminate => tagged(frontend_type::TERMINATE, buf, |_| Ok(())),
        }
    }

    /// Decodes client traffic, as a server would.
    pub fn parse(frame: &Frame) -> Result<FrontendMessage, ProtocolError> {
        let mut cur = Cursor::new(frame.body());
        match frame.tag() {
            None => parse_untagged(&mut cur),
            Some(tag) => match parse_tagged(tag, &mut cur) {
                Ok(Some(message)) => Ok(message),
                Ok(None) => Err(ProtocolError::UnknownMessageType(tag)),
                Err(err) => Err(ProtocolError::malformed(Some(tag), err)),
            },
        }
    }

    /// True for the requests after which a server expects another untagged
    /// frame (the real startup message).
    pub fn is_encryption_request(&self) -> bool {
        matches!(
            self,
            FrontendMessage::SslRequest | FrontendMessage::GssEncRequest
        )
    }
}

fn parse_untagged(cur: &mut Cursor<'_>) -> Result<FrontendMessage, ProtocolError> {
    let malformed = |err| ProtocolError::malformed(None, err);
    let code = cur.read_i32().map_err(malformed)?;
    let message = match code {
        SSL_REQUEST_CODE => FrontendMessage::SslRequest,
        GSSENC_REQUEST_CODE => FrontendMessage::GssEncRequest,
        CANCEL_REQUEST_CODE => FrontendMessage::CancelRequest {
            process_id: cur.read_i32().map_err(malformed)?,
            secret_key: cur.read_i32().map_err(malformed)?,
        },
        // Any 3.x minor version; the server answers with
        // NegotiateProtocolVersion if it wants an older one.
        version if version >> 16 == PROTOCOL_VERSION >> 16 => {
            let params = parse_startup_params(cur).map_err(malformed)?;
            return Ok(FrontendMessage::Startup { version, params });
        }
        other => return Err(ProtocolError::UnknownRequestCode(other)),
    };
    cur.finish().map_err(malformed)?;
    Ok(message)
}

fn parse_startup_params(cur: &mut Cursor<'_>) -> Result<Vec<(String, String)>, DecodeError> {
    let mut params = Vec::new();
    loop {
        let name = cur.read_cstr()?;
        if name.is_empty() {
            break;
        }
        let value = cur.read_cstr()?;
        params.push((name.to_owned(), value.to_owned()));
    }
    cur.finish()?;
    Ok(params)
}

fn parse_tagged(tag: u8, cur: &mut Cursor<'_>) -> Result<Option<FrontendMessage>, DecodeError> {
    let message = match tag {
        frontend_type::PASSWORD => FrontendMessage::Password(cur.take_remaining().to_vec()),
        frontend_type::QUERY => FrontendMessage::Query(cur.read_cstr()?.to_owned()),
        frontend_type::PARSE => {
            let name = cur.read_cstr()?.to_owned();
            let query = cur.read_cstr()?.to_owned();
            let count = read_count(cur)?;
            let mut param_types = Vec::with_capacity(count.min(cur.remaining() / 4));
            for _ in 0..count {
                param_types.push(cur.read_u32()?);
            }
            FrontendMessage::Parse {
                name,
                query,
                param_types,
            }
        }
        frontend_type::BIND => {
            let portal = cur.read_cstr()?.to_owned();
            let statement = cur.read_cstr()?.to_owned();
            let param_formats = read_formats(cur)?;
            let count = read_count(cur)?;
            let mut params = Vec::with_capacity(count.min(cur.remaining() / 4));
            for _ in 0..count {
                params.push(cur.read_nullable()?.map(<[u8]>::to_vec));
            }
            let result_formats = read_formats(cur)?;
            FrontendMessage::Bind {
                portal,
                statement,
                param_formats,
                params,
                result_formats,
            }
        }
        frontend_type::DESCRIBE | frontend_type::CLOSE => {
            let kind = DescribeKind::from_byte(cur.read_u8()?)
                .ok_or(DecodeError::InvalidFormat("invalid describe/close kind"))?;
            let name = cur.read_cstr()?.to_owned();
            if tag == frontend_type::DESCRIBE {
                FrontendMessage::Describe { kind, name }
            } else {
                FrontendMessage::Close { kind, name }
            }
        }
        frontend_type::EXECUTE => FrontendMessage::Execute {
            portal: cur.read_cstr()?.to_owned(),
            max_rows: cur.read_i32()?,
        },
        frontend_type::SYNC => FrontendMessage::Sync,
        frontend_type::FLUSH => FrontendMessage::Flush,
        frontend_type::COPY_DATA => FrontendMessage::CopyData(cur.take_remaining().to_vec()),
        frontend_type::COPY_DONE => FrontendMessage::CopyDone,
        frontend_type::COPY_FAIL => FrontendMessage::CopyFail(cur.read_cstr()?.to_owned()),
        frontend_type::TERMINATE => FrontendMessage::Terminate,
        _ => return Ok(None),
    };
    cur.finish()?;
    Ok(Some(message))
}

fn read_count(cur: &mut Cursor<'_>) -> Result<usize, DecodeError> {
    let count = cur.read_i16()?;
    usize::try_from(count).map_err(|_| DecodeError::InvalidFormat("negative count"))
}

fn read_formats(cur: &mut Cursor<'_>) -> Result<Vec<i16>, DecodeError> {
    let count = read_count(cur)?;
    let mut formats = Vec::with_capacity(count.min(cur.remaining() / 2));
    for _ in 0..count {
        formats.push(cur.read_i16()?);
    }
    Ok(formats)
}

/// Writes a type byte and a backfilled length around `body`.
fn tagged<F>(tag: u8, buf: &mut BytesMut, body: F) -> Result<(), EncodeError>
where
    F: FnOnce(&mut BytesMut) -> Result<(), EncodeError>,
{
    transactional(buf, |buf| {
        buf.put_u8(tag);
        framed(buf, body)
    })
}

/// Writes a startup-class message: length, then `body` (which starts with
/// the protocol version or request code).
fn untagged<F>(buf: &mut BytesMut, body: F) -> Result<(), EncodeError>
where
    F: FnOnce(&mut BytesMut) -> Result<(), EncodeError>,
{
    transactional(buf, |buf| framed(buf, body))
}

fn framed<F>(buf: &mut BytesMut, body: F) -> Result<(), EncodeError>
where
    F: FnOnce(&mut BytesMut) -> Result<(), EncodeError>,
{
    let at = buf.len();
    buf.put_i32(0);
    body(buf)?;
    let len = len_i32("message", buf.len() - at)?;
    patch_i32(buf, at, len);
    Ok(())
}

fn put_cstr(buf: &mut BytesMut, what: &'static str, s: &str) -> Result<(), EncodeError> {
    if s.as_bytes().contains(&0) {
        return Err(EncodeError::NulInString(what));
    }
    buf.put_slice(s.as_bytes());
    buf.put_u8(0);
    Ok(())
}

fn count_i16(what: &'static str, len: usize) -> Result<i16, EncodeError> {
    i16::try_from(len).map_err(|_| EncodeError::ValueTooLarge { what, len })
}

fn put_formats(buf: &mut BytesMut, what: &'static str, formats: &[i16]) -> Result<(), EncodeError> {
    buf.put_i16(count_i16(what, formats.len())?);
    for format in formats {
        buf.put_i16(*format);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn encode(msg: &FrontendMessage) -> BytesMut {
        let mut buf = BytesMut::new();
        msg.encode(&mut buf).unwrap();
        buf
    }

    fn reparse(msg: &FrontendMessage) -> FrontendMessage {
        let buf = encode(msg);
        let frame = match msg {
            FrontendMessage::Startup { .. }
            | FrontendMessage::SslRequest
            | FrontendMessage::GssEncRequest
            | FrontendMessage::CancelRequest { .. } => Frame::new(None, Bytes::copy_from_slice(&buf[4..])),
            _ => Frame::new(Some(buf[0]), Bytes::copy_from_slice(&buf[5..])),
        };
        FrontendMessage::parse(&frame).unwrap()
    }

    #[test]
    fn query_layout() {
        let buf = encode(&FrontendMessage::Query("SELECT 1".into()));
        assert_eq!(&buf[..], b"Q\x00\x00\x00\x0dSELECT 1\x00");
    }

    #[test]
    fn sync_layout() {
        assert_eq!(&encode(&FrontendMessage::Sync)[..], b"S\x00\x00\x00\x04");
    }

    #[test]
    fn ssl_request_layout() {
        let buf = encode(&FrontendMessage::SslRequest);
        assert_eq!(&buf[..4], &8_i32.to_be_bytes());
        assert_eq!(&buf[4..], &SSL_REQUEST_CODE.to_be_bytes());
    }

    #[test]
    fn startup_layout() {
        let msg = FrontendMessage::Startup {
            version: PROTOCOL_VERSION,
            params: vec![("user".into(), "postgres".into())],
        };
        let buf = encode(&msg);
        let len = i32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        assert_eq!(len as usize, buf.len());
        assert_eq!(&buf[8..], b"user\0postgres\0\0");
        assert_eq!(reparse(&msg), msg);
    }

    #[test]
    fn embedded_nul_leaves_buffer_untouched() {
        let mut buf = BytesMut::from(&b"prefix"[..]);
        let err = FrontendMessage::Query("SELECT\0 1".into())
            .encode(&mut buf)
            .unwrap_err();
        assert_eq!(err, EncodeError::NulInString("query"));
        assert_eq!(&buf[..], b"prefix");
        assert!(FrontendMessage::password("a\0b").is_err());
    }

    #[test]
    fn too_many_parameters() {
        let msg = FrontendMessage::Parse {
            name: String::new(),
            query: "SELECT".into(),
            param_types: vec![0; 40_000],
        };
        let mut buf = BytesMut::new();
        assert!(matches!(
            msg.encode(&mut buf),
            Err(EncodeError::ValueTooLarge { len: 40_000, .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn extended_query_messages_reparse() {
        let messages = [
            FrontendMessage::Parse {
                name: "s1".into(),
                query: "SELECT $1".into(),
                param_types: vec![23],
            },
            FrontendMessage::Bind {
                portal: String::new(),
                statement: "s1".into(),
                param_formats: vec![1],
                params: vec![Some(7_i32.to_be_bytes().to_vec()), None],
                result_formats: vec![1],
            },
            FrontendMessage::Describe {
                kind: DescribeKind::Portal,
                name: String::new(),
            },
            FrontendMessage::Execute {
                portal: String::new(),
                max_rows: 0,
            },
            FrontendMessage::Close {
                kind: DescribeKind::Statement,
                name: "s1".into(),
            },
            FrontendMessage::Sync,
            FrontendMessage::CopyFail("boom".into()),
            FrontendMessage::CancelRequest {
                process_id: 1,
                secret_key: 2,
            },
        ];
        for msg in messages {
            assert_eq!(reparse(&msg), msg);
        }
    }

    #[test]
    fn sasl_initial_response_is_password_on_the_wire() {
        let msg = FrontendMessage::SaslInitialResponse {
            mechanism: "SCRAM-SHA-256".into(),
            data: b"n,,n=,r=abc".to_vec(),
        };
        let buf = encode(&msg);
        assert_eq!(buf[0], b'p');
        let FrontendMessage::Password(body) = reparse(&msg) else {
            panic!("expected raw password body");
        };
        assert!(body.starts_with(b"SCRAM-SHA-256\0"));
        assert_eq!(&body[body.len() - 11..], b"n,,n=,r=abc");
    }

    #[test]
    fn unknown_request_code() {
        let frame = Frame::new(None, Bytes::from_static(&[0, 1, 0, 0]));
        assert_eq!(
            FrontendMessage::parse(&frame).unwrap_err(),
            ProtocolError::UnknownRequestCode(1 << 16)
        );
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let frame = Frame::new(Some(b'S'), Bytes::from_static(b"x"));
        assert!(matches!(
            FrontendMessage::parse(&frame),
            Err(ProtocolError::Malformed { tag: Some(b'S'), .. })
        ));
    }
}
