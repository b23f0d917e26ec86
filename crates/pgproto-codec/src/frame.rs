//! Incremental message framing.
//!
//! A [`MessageFramer`] buffers bytes as they arrive from a transport and
//! splits off one complete frame at a time. It never blocks; an incomplete
//! frame is `Ok(None)` and the caller appends more bytes.

use bytes::{Buf, Bytes, BytesMut};

use crate::config::FramerConfig;
use crate::error::{DecodeError, ProtocolError};
use crate::message::{BackendMessage, FrontendMessage, GSSENC_REQUEST_CODE, SSL_REQUEST_CODE};

const TAGGED_HEADER_LEN: usize = 5;
const UNTAGGED_HEADER_LEN: usize = 4;
// Length word plus request code.
const MIN_UNTAGGED_LEN: i32 = 8;

/// One complete message split off the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    tag: Option<u8>,
    body: Bytes,
}

impl Frame {
    pub fn new(tag: Option<u8>, body: Bytes) -> Self {
        Self { tag, body }
    }

    /// The type byte, or `None` for a startup-class frame.
    pub fn tag(&self) -> Option<u8> {
        self.tag
    }

    /// The payload after the length word.
    ///
    /// For startup-class frames this starts with the protocol version or
    /// request code.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// Incremental framer for one connection.
#[derive(Debug)]
pub struct MessageFramer {
    buf: BytesMut,
    config: FramerConfig,
    untagged_next: bool,
    poisoned: bool,
    // Raised by the next poll once `feed` has returned the messages before it.
    deferred: Option<ProtocolError>,
}

impl Default for MessageFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageFramer {
    /// Create a client-side framer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(FramerConfig::default())
    }

    /// Create a client-side framer.
    pub fn with_config(config: FramerConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(config.initial_capacity),
            config,
            untagged_next: false,
            poisoned: false,
            deferred: None,
        }
    }

    /// Create a server-side framer, which expects the first frame untagged.
    pub fn server() -> Self {
        Self::server_with_config(FramerConfig::default())
    }

    pub fn server_with_config(config: FramerConfig) -> Self {
        Self {
            untagged_next: true,
            ..Self::with_config(config)
        }
    }

    pub fn config(&self) -> &FramerConfig {
        &self.config
    }

    /// Number of bytes currently buffered.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Whether an earlier protocol error has made this framer unusable.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Append bytes read from the transport.
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// The input buffer, for transports that read into it directly.
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Feed bytes into the framer and return any complete backend messages.
    ///
    /// If a frame fails after others in the same call were parsed, those
    /// messages are returned and the error is raised by the next `feed` or
    /// poll. A FATAL `ErrorResponse` followed by garbage therefore still
    /// reaches the caller.
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<BackendMessage>, ProtocolError> {
        self.extend_from_slice(data);

        let mut messages = Vec::new();
        loop {
            match self.next_backend() {
                Ok(Some(msg)) => messages.push(msg),
                Ok(None) => return Ok(messages),
                Err(err) if messages.is_empty() => return Err(err),
                Err(err) => {
                    self.deferred = Some(err);
                    return Ok(messages);
                }
            }
        }
    }

    /// Split off the next complete frame, if one is buffered.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, ProtocolError> {
        if let Some(err) = self.deferred.take() {
            return Err(err);
        }
        if self.poisoned {
            return Err(ProtocolError::Poisoned);
        }
        let res = self.split_frame();
        self.poison_on_err(res)
    }

    /// Split off and parse the next backend message.
    pub fn next_backend(&mut self) -> Result<Option<BackendMessage>, ProtocolError> {
        let Some(frame) = self.next_frame()? else {
            return Ok(None);
        };
        let res = match frame.tag {
            Some(tag) => BackendMessage::parse(tag, frame.body),
            None => Err(ProtocolError::malformed(
                None,
                DecodeError::InvalidFormat("backend messages are always tagged"),
            )),
        };
        self.poison_on_err(res).map(Some)
    }

    /// Split off and parse the next frontend message, as a server would.
    pub fn next_frontend(&mut self) -> Result<Option<FrontendMessage>, ProtocolError> {
        let Some(frame) = self.next_frame()? else {
            return Ok(None);
        };
        let res = FrontendMessage::parse(&frame);
        self.poison_on_err(res).map(Some)
    }

    fn split_frame(&mut self) -> Result<Option<Frame>, ProtocolError> {
        if self.untagged_next {
            self.split_untagged()
        } else {
            self.split_tagged()
        }
    }

    fn split_tagged(&mut self) -> Result<Option<Frame>, ProtocolError> {
        if self.buf.len() < TAGGED_HEADER_LEN {
            return Ok(None);
        }

        let tag = self.buf[0];
        let length = i32::from_be_bytes([self.buf[1], self.buf[2], self.buf[3], self.buf[4]]);
        if length < 4 {
            return Err(ProtocolError::InvalidLength {
                tag: Some(tag),
                length,
            });
        }

        let total_len = length as usize + 1;
        if !self.reserve_frame(total_len)? {
            return Ok(None);
        }

        let mut frame = self.buf.split_to(total_len);
        frame.advance(TAGGED_HEADER_LEN);
        tracing::trace!(tag = %char::from(tag), length, "split frame");
        Ok(Some(Frame::new(Some(tag), frame.freeze())))
    }

    fn split_untagged(&mut self) -> Result<Option<Frame>, ProtocolError> {
        if self.buf.len() < UNTAGGED_HEADER_LEN {
            return Ok(None);
        }

        let length = i32::from_be_bytes([self.buf[0], self.buf[1], self.buf[2], self.buf[3]]);
        if length < MIN_UNTAGGED_LEN {
            return Err(ProtocolError::InvalidLength { tag: None, length });
        }

        let total_len = length as usize;
        if !self.reserve_frame(total_len)? {
            return Ok(None);
        }

        let mut frame = self.buf.split_to(total_len);
        frame.advance(UNTAGGED_HEADER_LEN);
        let code = i32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]);
        // The real startup message follows an SSL or GSSAPI negotiation.
        self.untagged_next = code == SSL_REQUEST_CODE || code == GSSENC_REQUEST_CODE;
        tracing::trace!(code, length, "split startup frame");
        Ok(Some(Frame::new(None, frame.freeze())))
    }

    /// Checks `total_len` against the limit and reports whether the whole
    /// frame is buffered, growing the buffer when it is not.
    fn reserve_frame(&mut self, total_len: usize) -> Result<bool, ProtocolError> {
        if total_len > self.config.max_message_size {
            return Err(ProtocolError::MessageTooLarge {
                length: total_len,
                max: self.config.max_message_size,
            });
        }
        if self.buf.len() < total_len {
            self.buf.reserve(total_len - self.buf.len());
            return Ok(false);
        }
        Ok(true)
    }

    fn poison_on_err<T>(&mut self, res: Result<T, ProtocolError>) -> Result<T, ProtocolError> {
        if let Err(err) = &res {
            tracing::warn!(error = %err, "protocol error, framer poisoned");
            self.poisoned = true;
            self.buf.clear();
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;
    use crate::message::{PROTOCOL_VERSION, TransactionStatus};

    fn ready_for_query() -> Vec<u8> {
        vec![b'Z', 0, 0, 0, 5, b'I']
    }

    #[test]
    fn incomplete_frame_is_not_an_error() {
        let mut framer = MessageFramer::new();
        let msg = ready_for_query();
        framer.extend_from_slice(&msg[..3]);
        assert_eq!(framer.next_frame().unwrap(), None);
        framer.extend_from_slice(&msg[3..5]);
        assert_eq!(framer.next_frame().unwrap(), None);
        framer.extend_from_slice(&msg[5..]);
        let frame = framer.next_frame().unwrap().unwrap();
        assert_eq!(frame.tag(), Some(b'Z'));
        assert_eq!(&frame.body()[..], b"I");
        assert_eq!(framer.buffered_len(), 0);
    }

    #[test]
    fn feed_drains_all_messages() {
        let mut framer = MessageFramer::new();
        let mut data = ready_for_query();
        data.extend_from_slice(&[b'1', 0, 0, 0, 4]);
        data.extend_from_slice(&[b'2', 0, 0]);

        let messages = framer.feed(&data).unwrap();
        assert_eq!(
            messages,
            vec![
                BackendMessage::ReadyForQuery(TransactionStatus::Idle),
                BackendMessage::ParseComplete,
            ]
        );
        assert_eq!(framer.buffered_len(), 3);
    }

    #[test]
    fn feed_keeps_messages_before_a_bad_frame() {
        let mut framer = MessageFramer::new();
        let mut data = ready_for_query();
        data.extend_from_slice(&[b'Z', 0, 0, 0, 2]);

        assert_eq!(
            framer.feed(&data).unwrap(),
            vec![BackendMessage::ReadyForQuery(TransactionStatus::Idle)]
        );
        assert!(framer.is_poisoned());
        assert_eq!(
            framer.next_backend().unwrap_err(),
            ProtocolError::InvalidLength {
                tag: Some(b'Z'),
                length: 2
            }
        );
        assert_eq!(framer.feed(&ready_for_query()).unwrap_err(), ProtocolError::Poisoned);
    }

    #[test]
    fn short_length_poisons() {
        let mut framer = MessageFramer::new();
        framer.extend_from_slice(&[b'Z', 0, 0, 0, 3]);
        assert_eq!(
            framer.next_frame().unwrap_err(),
            ProtocolError::InvalidLength {
                tag: Some(b'Z'),
                length: 3
            }
        );
        assert!(framer.is_poisoned());
        framer.extend_from_slice(&ready_for_query());
        assert_eq!(framer.next_frame().unwrap_err(), ProtocolError::Poisoned);
    }

    #[test]
    fn oversized_message_detected_from_header() {
        let mut framer = MessageFramer::with_config(FramerConfig::new().max_message_size(16));
        framer.extend_from_slice(&[b'D', 0, 0, 0, 100]);
        assert_eq!(
            framer.next_frame().unwrap_err(),
            ProtocolError::MessageTooLarge {
                length: 101,
                max: 16
            }
        );
    }

    #[test]
    fn malformed_body_poisons() {
        let mut framer = MessageFramer::new();
        framer.extend_from_slice(&[b'Z', 0, 0, 0, 5, b'?']);
        assert!(matches!(
            framer.next_backend(),
            Err(ProtocolError::Malformed { tag: Some(b'Z'), .. })
        ));
        assert_eq!(framer.next_backend().unwrap_err(), ProtocolError::Poisoned);
    }

    #[test]
    fn server_mode_expects_untagged_startup() {
        let mut framer = MessageFramer::server();
        let mut buf = BytesMut::new();
        FrontendMessage::SslRequest.encode(&mut buf).unwrap();
        let startup = FrontendMessage::Startup {
            version: PROTOCOL_VERSION,
            params: vec![("user".into(), "alice".into())],
        };
        startup.encode(&mut buf).unwrap();
        FrontendMessage::Query("SELECT 1".into())
            .encode(&mut buf)
            .unwrap();
        framer.buffer_mut().put_slice(&buf);

        assert_eq!(framer.next_frontend().unwrap(), Some(FrontendMessage::SslRequest));
        assert_eq!(framer.next_frontend().unwrap(), Some(startup));
        assert_eq!(
            framer.next_frontend().unwrap(),
            Some(FrontendMessage::Query("SELECT 1".into()))
        );
        assert_eq!(framer.next_frontend().unwrap(), None);
    }

    #[test]
    fn untagged_length_must_cover_code() {
        let mut framer = MessageFramer::server();
        framer.extend_from_slice(&[0, 0, 0, 7]);
        assert_eq!(
            framer.next_frame().unwrap_err(),
            ProtocolError::InvalidLength {
                tag: None,
                length: 7
            }
        );
    }

    #[test]
    fn backend_rejects_untagged_frames() {
        let mut framer = MessageFramer::server();
        let mut buf = BytesMut::new();
        FrontendMessage::SslRequest.encode(&mut buf).unwrap();
        framer.extend_from_slice(&buf);
        assert!(matches!(
            framer.next_backend(),
            Err(ProtocolError::Malformed { tag: None, .. })
        ));
    }
}
