//! Backend (server to client) messages.
//!
//! Bodies keep a reference-counted slice of the framer's buffer and decode
//! their repeated sub-structures lazily. Fixed-layout parts (key data,
//! transaction status, NUL terminators of single strings) are checked when
//! the message is parsed; per-item problems surface from the iterators.

use std::fmt;
use std::ops::Range;

use bytes::Bytes;
use fallible_iterator::FallibleIterator;

use super::{TransactionStatus, auth_type, backend_type};
use crate::cursor::Cursor;
use crate::error::{DecodeError, ProtocolError};
use crate::iter::Counted;
use crate::oid::Oid;

/// Messages sent from the PostgreSQL server to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendMessage {
    // Authentication messages
    /// Authentication successful
    AuthenticationOk,
    /// Server requests cleartext password
    AuthenticationCleartextPassword,
    /// Server requests MD5-hashed password with salt
    AuthenticationMd5Password(Md5PasswordBody),
    /// Server requests Kerberos V5 authentication
    AuthenticationKerberosV5,
    /// Server requests SCM credentials
    AuthenticationScmCredential,
    /// Server requests GSSAPI authentication
    AuthenticationGss,
    /// GSSAPI or SSPI continuation data
    AuthenticationGssContinue(GssContinueBody),
    /// Server requests SSPI authentication
    AuthenticationSspi,
    /// Server requests SASL authentication (lists mechanisms)
    AuthenticationSasl(SaslBody),
    /// SASL authentication continuation data
    AuthenticationSaslContinue(SaslContinueBody),
    /// SASL authentication final data
    AuthenticationSaslFinal(SaslFinalBody),

    // Connection info
    /// Backend process ID and secret key for cancellation
    BackendKeyData(BackendKeyDataBody),
    /// Server parameter status (e.g., server_encoding, TimeZone)
    ParameterStatus(ParameterStatusBody),
    /// Server is ready for a new query
    ReadyForQuery(TransactionStatus),
    /// Server doesn't support requested protocol features
    NegotiateProtocolVersion(NegotiateProtocolVersionBody),

    // Query results
    /// Describes the columns of a result set
    RowDescription(RowDescriptionBody),
    /// A single data row
    DataRow(DataRowBody),
    /// Query completed successfully
    CommandComplete(CommandCompleteBody),
    /// Empty query response
    EmptyQueryResponse,

    // Extended query protocol responses
    /// Parse completed successfully
    ParseComplete,
    /// Bind completed successfully
    BindComplete,
    /// Close completed successfully
    CloseComplete,
    /// Describes parameter types for a prepared statement
    ParameterDescription(ParameterDescriptionBody),
    /// No data will be returned
    NoData,
    /// Portal execution suspended (reached max_rows)
    PortalSuspended,

    // Errors and notices
    /// Error response with details
    ErrorResponse(ErrorResponseBody),
    /// Notice (warning) with details
    NoticeResponse(ErrorResponseBody),

    // COPY protocol
    /// Server is ready to receive COPY data
    CopyInResponse(CopyResponseBody),
    /// Server is sending COPY data
    CopyOutResponse(CopyResponseBody),
    /// COPY data format information for both directions
    CopyBothResponse(CopyResponseBody),
    /// COPY data chunk
    CopyData(CopyDataBody),
    /// COPY operation complete
    CopyDone,

    // Notifications
    /// Asynchronous notification (from LISTEN/NOTIFY)
    NotificationResponse(NotificationResponseBody),

    // Function call (legacy, rarely used)
    /// Function call result
    FunctionCallResponse(FunctionCallResponseBody),
}

impl BackendMessage {
    /// Parse the body of a message with type byte `tag`.
    ///
    /// `body` excludes the tag and length prefix.
    pub fn parse(tag: u8, body: Bytes) -> Result<BackendMessage, ProtocolError> {
        match parse_body(tag, body) {
            Ok(Some(message)) => Ok(message),
            Ok(None) => Err(ProtocolError::UnknownMessageType(tag)),
            Err(err) => Err(ProtocolError::malformed(Some(tag), err)),
        }
    }

    /// The type byte this message was sent with.
    pub fn tag(&self) -> u8 {
        match self {
            BackendMessage::AuthenticationOk
            | BackendMessage::AuthenticationCleartextPassword
            | BackendMessage::AuthenticationMd5Password(_)
            | BackendMessage::AuthenticationKerberosV5
            | BackendMessage::AuthenticationScmCredential
            | BackendMessage::AuthenticationGss
            | BackendMessage::AuthenticationGssContinue(_)
            | BackendMessage::AuthenticationSspi
            | BackendMessage::AuthenticationSasl(_)
            | BackendMessage::AuthenticationSaslContinue(_)
            | BackendMessage::AuthenticationSaslFinal(_) => backend_type::AUTHENTICATION,
            BackendMessage::BackendKeyData(_) => backend_type::BACKEND_KEY_DATA,
            BackendMessage::ParameterStatus(_) => backend_type::PARAMETER_STATUS,
            BackendMessage::ReadyForQuery(_) => backend_type::READY_FOR_QUERY,
            BackendMessage::NegotiateProtocolVersion(_) => backend_type::NEGOTIATE_PROTOCOL_VERSION,
            BackendMessage::RowDescription(_) => backend_type::ROW_DESCRIPTION,
            BackendMessage::DataRow(_) => backend_type::DATA_ROW,
            BackendMessage::CommandComplete(_) => backend_type::COMMAND_COMPLETE,
            BackendMessage::EmptyQueryResponse => backend_type::EMPTY_QUERY,
            BackendMessage::ParseComplete => backend_type::PARSE_COMPLETE,
            BackendMessage::BindComplete => backend_type::BIND_COMPLETE,
            BackendMessage::CloseComplete => backend_type::CLOSE_COMPLETE,
            BackendMessage::ParameterDescription(_) => backend_type::PARAMETER_DESCRIPTION,
            BackendMessage::NoData => backend_type::NO_DATA,
            BackendMessage::PortalSuspended => backend_type::PORTAL_SUSPENDED,
            BackendMessage::ErrorResponse(_) => backend_type::ERROR_RESPONSE,
            BackendMessage::NoticeResponse(_) => backend_type::NOTICE_RESPONSE,
            BackendMessage::CopyInResponse(_) => backend_type::COPY_IN_RESPONSE,
            BackendMessage::CopyOutResponse(_) => backend_type::COPY_OUT_RESPONSE,
            BackendMessage::CopyBothResponse(_) => backend_type::COPY_BOTH_RESPONSE,
            BackendMessage::CopyData(_) => backend_type::COPY_DATA,
            BackendMessage::CopyDone => backend_type::COPY_DONE,
            BackendMessage::NotificationResponse(_) => backend_type::NOTIFICATION_RESPONSE,
            BackendMessage::FunctionCallResponse(_) => backend_type::FUNCTION_CALL_RESPONSE,
        }
    }
}

/// Parses a body; `Ok(None)` means the tag is unknown.
fn parse_body(tag: u8, body: Bytes) -> Result<Option<BackendMessage>, DecodeError> {
    let mut cur = Cursor::new(&body);
    let message = match tag {
        backend_type::AUTHENTICATION => parse_authentication(&mut cur, &body)?,
        backend_type::BACKEND_KEY_DATA => {
            let process_id = cur.read_i32()?;
            let secret_key = cur.read_i32()?;
            cur.finish()?;
            BackendMessage::BackendKeyData(BackendKeyDataBody {
                process_id,
                secret_key,
            })
        }
        backend_type::PARAMETER_STATUS => {
            let name = cstr_range(&mut cur)?;
            let value = cstr_range(&mut cur)?;
            cur.finish()?;
            BackendMessage::ParameterStatus(ParameterStatusBody {
                name: body.slice(name),
                value: body.slice(value),
            })
        }
        backend_type::READY_FOR_QUERY => {
            let status = cur.read_u8()?;
            cur.finish()?;
            let status = TransactionStatus::from_byte(status)
                .ok_or(DecodeError::InvalidFormat("invalid transaction status"))?;
            BackendMessage::ReadyForQuery(status)
        }
        backend_type::NEGOTIATE_PROTOCOL_VERSION => {
            let newest_minor = cur.read_i32()?;
            let count = cur.read_i32()?;
            if count < 0 {
                return Err(DecodeError::InvalidFormat("negative protocol option count"));
            }
            BackendMessage::NegotiateProtocolVersion(NegotiateProtocolVersionBody {
                newest_minor,
                len: count as usize,
                storage: body.slice(8..),
            })
        }
        backend_type::ROW_DESCRIPTION => {
            let len = cur.read_u16()?;
            BackendMessage::RowDescription(RowDescriptionBody {
                len,
                storage: body.slice(2..),
            })
        }
        backend_type::DATA_ROW => {
            let len = cur.read_u16()?;
            BackendMessage::DataRow(DataRowBody {
                len,
                storage: body.slice(2..),
            })
        }
        backend_type::COMMAND_COMPLETE => {
            let tag = cstr_range(&mut cur)?;
            cur.finish()?;
            BackendMessage::CommandComplete(CommandCompleteBody {
                tag: body.slice(tag),
            })
        }
        backend_type::PARAMETER_DESCRIPTION => {
            let len = cur.read_u16()?;
            BackendMessage::ParameterDescription(ParameterDescriptionBody {
                len,
                storage: body.slice(2..),
            })
        }
        backend_type::ERROR_RESPONSE => {
            BackendMessage::ErrorResponse(ErrorResponseBody { storage: body.clone() })
        }
        backend_type::NOTICE_RESPONSE => {
            BackendMessage::NoticeResponse(ErrorResponseBody { storage: body.clone() })
        }
        backend_type::COPY_IN_RESPONSE => {
            BackendMessage::CopyInResponse(parse_copy_response(&mut cur, &body)?)
        }
        backend_type::COPY_OUT_RESPONSE => {
            BackendMessage::CopyOutResponse(parse_copy_response(&mut cur, &body)?)
        }
        backend_type::COPY_BOTH_RESPONSE => {
            BackendMessage::CopyBothResponse(parse_copy_response(&mut cur, &body)?)
        }
        backend_type::COPY_DATA => BackendMessage::CopyData(CopyDataBody(body.clone())),
        backend_type::NOTIFICATION_RESPONSE => {
            let process_id = cur.read_i32()?;
            let channel = cstr_range(&mut cur)?;
            let message = cstr_range(&mut cur)?;
            cur.finish()?;
            BackendMessage::NotificationResponse(NotificationResponseBody {
                process_id,
                channel: body.slice(channel),
                message: body.slice(message),
            })
        }
        backend_type::FUNCTION_CALL_RESPONSE => {
            let start = cur.position() + 4;
            let value = cur.read_nullable()?.map(|v| body.slice(start..start + v.len()));
            cur.finish()?;
            BackendMessage::FunctionCallResponse(FunctionCallResponseBody { value })
        }
        backend_type::EMPTY_QUERY
        | backend_type::PARSE_COMPLETE
        | backend_type::BIND_COMPLETE
        | backend_type::CLOSE_COMPLETE
        | backend_type::NO_DATA
        | backend_type::PORTAL_SUSPENDED
        | backend_type::COPY_DONE => {
            cur.finish()?;
            match tag {
                backend_type::EMPTY_QUERY => BackendMessage::EmptyQueryResponse,
                backend_type::PARSE_COMPLETE => BackendMessage::ParseComplete,
                backend_type::BIND_COMPLETE => BackendMessage::BindComplete,
                backend_type::CLOSE_COMPLETE => BackendMessage::CloseComplete,
                backend_type::NO_DATA => BackendMessage::NoData,
                backend_type::PORTAL_SUSPENDED => BackendMessage::PortalSuspended,
                _ => BackendMessage::CopyDone,
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(message))
}

fn parse_authentication(cur: &mut Cursor<'_>, body: &Bytes) -> Result<BackendMessage, DecodeError> {
    let auth_type = cur.read_i32()?;
    let message = match auth_type {
        auth_type::OK => BackendMessage::AuthenticationOk,
        auth_type::KERBEROS_V5 => BackendMessage::AuthenticationKerberosV5,
        auth_type::CLEARTEXT_PASSWORD => BackendMessage::AuthenticationCleartextPassword,
        auth_type::MD5_PASSWORD => BackendMessage::AuthenticationMd5Password(Md5PasswordBody {
            salt: cur.read_array()?,
        }),
        auth_type::SCM_CREDENTIAL => BackendMessage::AuthenticationScmCredential,
        auth_type::GSS => BackendMessage::AuthenticationGss,
        auth_type::SSPI => BackendMessage::AuthenticationSspi,
        auth_type::GSS_CONTINUE => {
            return Ok(BackendMessage::AuthenticationGssContinue(GssContinueBody(
                body.slice(4..),
            )));
        }
        auth_type::SASL => {
            return Ok(BackendMessage::AuthenticationSasl(SaslBody(body.slice(4..))));
        }
        auth_type::SASL_CONTINUE => {
            return Ok(BackendMessage::AuthenticationSaslContinue(SaslContinueBody(
                body.slice(4..),
            )));
        }
        auth_type::SASL_FINAL => {
            return Ok(BackendMessage::AuthenticationSaslFinal(SaslFinalBody(
                body.slice(4..),
            )));
        }
        _ => return Err(DecodeError::InvalidFormat("unknown authentication type")),
    };
    cur.finish()?;
    Ok(message)
}

fn parse_copy_response(cur: &mut Cursor<'_>, body: &Bytes) -> Result<CopyResponseBody, DecodeError> {
    let format = cur.read_i8()?;
    let len = cur.read_u16()?;
    Ok(CopyResponseBody {
        format,
        len,
        storage: body.slice(3..),
    })
}

/// Reads a NUL-terminated string and returns its span, terminator excluded.
fn cstr_range(cur: &mut Cursor<'_>) -> Result<Range<usize>, DecodeError> {
    let start = cur.position();
    let bytes = cur.read_cstr_bytes()?;
    Ok(start..start + bytes.len())
}

fn utf8(bytes: &[u8]) -> Result<&str, DecodeError> {
    Ok(std::str::from_utf8(bytes)?)
}

// ==================== Bodies ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Md5PasswordBody {
    salt: [u8; 4],
}

impl Md5PasswordBody {
    pub fn salt(&self) -> [u8; 4] {
        self.salt
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GssContinueBody(Bytes);

impl GssContinueBody {
    pub fn data(&self) -> &[u8] {
        &self.0
    }
}

/// The mechanism list of an `AuthenticationSASL` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslBody(Bytes);

impl SaslBody {
    pub fn mechanisms(&self) -> SaslMechanisms<'_> {
        SaslMechanisms {
            cur: Cursor::new(&self.0),
            done: false,
        }
    }
}

/// An iterator over the SASL mechanisms a server offers.
#[derive(Debug, Clone)]
pub struct SaslMechanisms<'a> {
    cur: Cursor<'a>,
    done: bool,
}

impl<'a> FallibleIterator for SaslMechanisms<'a> {
    type Item = &'a str;
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<&'a str>, DecodeError> {
        if self.done {
            return Ok(None);
        }
        let res = self.cur.read_cstr().and_then(|mechanism| {
            if mechanism.is_empty() {
                self.cur.finish().map(|()| None)
            } else {
                Ok(Some(mechanism))
            }
        });
        if !matches!(res, Ok(Some(_))) {
            self.done = true;
        }
        res
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslContinueBody(Bytes);

impl SaslContinueBody {
    pub fn data(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslFinalBody(Bytes);

impl SaslFinalBody {
    pub fn data(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendKeyDataBody {
    process_id: i32,
    secret_key: i32,
}

impl BackendKeyDataBody {
    pub fn process_id(&self) -> i32 {
        self.process_id
    }

    pub fn secret_key(&self) -> i32 {
        self.secret_key
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterStatusBody {
    name: Bytes,
    value: Bytes,
}

impl ParameterStatusBody {
    pub fn name(&self) -> Result<&str, DecodeError> {
        utf8(&self.name)
    }

    pub fn value(&self) -> Result<&str, DecodeError> {
        utf8(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiateProtocolVersionBody {
    newest_minor: i32,
    len: usize,
    storage: Bytes,
}

impl NegotiateProtocolVersionBody {
    /// Newest minor protocol version the server supports.
    pub fn newest_minor(&self) -> i32 {
        self.newest_minor
    }

    /// Startup options the server did not recognize.
    pub fn unrecognized_options(&self) -> UnrecognizedOptions<'_> {
        UnrecognizedOptions(Counted::new(&self.storage, self.len))
    }
}

/// An iterator over option names rejected during protocol negotiation.
#[derive(Debug, Clone)]
pub struct UnrecognizedOptions<'a>(Counted<'a>);

impl<'a> FallibleIterator for UnrecognizedOptions<'a> {
    type Item = &'a str;
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<&'a str>, DecodeError> {
        self.0.step(Cursor::read_cstr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// Column metadata of a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDescriptionBody {
    len: u16,
    storage: Bytes,
}

impl RowDescriptionBody {
    /// Number of columns.
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn fields(&self) -> Fields<'_> {
        Fields(Counted::new(&self.storage, usize::from(self.len)))
    }
}

/// Describes a single field (column) in a row description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    /// Column name
    pub name: &'a str,
    /// OID of the table (0 if not from a table)
    pub table_oid: Oid,
    /// Attribute number in the table (0 if not from a table)
    pub column_id: i16,
    /// OID of the column's data type
    pub type_oid: Oid,
    /// Data type size (-1 for variable-length types)
    pub type_size: i16,
    /// Type modifier (e.g., precision for NUMERIC)
    pub type_modifier: i32,
    /// Format code (0=text, 1=binary)
    pub format: i16,
}

impl Field<'_> {
    /// Check if this field uses binary format.
    pub const fn is_binary(&self) -> bool {
        self.format == 1
    }

    /// Check if this field uses text format.
    pub const fn is_text(&self) -> bool {
        self.format == 0
    }
}

/// An iterator over the fields of a row description.
#[derive(Debug, Clone)]
pub struct Fields<'a>(Counted<'a>);

impl<'a> FallibleIterator for Fields<'a> {
    type Item = Field<'a>;
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<Field<'a>>, DecodeError> {
        self.0.step(|cur| {
            Ok(Field {
                name: cur.read_cstr()?,
                table_oid: cur.read_u32()?,
                column_id: cur.read_i16()?,
                type_oid: cur.read_u32()?,
                type_size: cur.read_i16()?,
                type_modifier: cur.read_i32()?,
                format: cur.read_i16()?,
            })
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// One row of a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRowBody {
    len: u16,
    storage: Bytes,
}

impl DataRowBody {
    /// Number of columns.
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The column data that [`ranges`](Self::ranges) indexes into.
    pub fn buffer(&self) -> &[u8] {
        &self.storage
    }

    /// Byte ranges of each column within [`buffer`](Self::buffer); `None` is
    /// SQL NULL.
    pub fn ranges(&self) -> DataRowRanges<'_> {
        DataRowRanges(Counted::new(&self.storage, usize::from(self.len)))
    }

    /// Column values as borrowed slices; `None` is SQL NULL.
    pub fn values(&self) -> DataRowValues<'_> {
        DataRowValues(Counted::new(&self.storage, usize::from(self.len)))
    }
}

/// An iterator over the byte ranges of a data row's columns.
#[derive(Debug, Clone)]
pub struct DataRowRanges<'a>(Counted<'a>);

impl FallibleIterator for DataRowRanges<'_> {
    type Item = Option<Range<usize>>;
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<Option<Range<usize>>>, DecodeError> {
        self.0.step(|cur| {
            let start = cur.position() + 4;
            Ok(cur.read_nullable()?.map(|v| start..start + v.len()))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// An iterator over a data row's column values.
#[derive(Debug, Clone)]
pub struct DataRowValues<'a>(Counted<'a>);

impl<'a> FallibleIterator for DataRowValues<'a> {
    type Item = Option<&'a [u8]>;
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<Option<&'a [u8]>>, DecodeError> {
        self.0.step(Cursor::read_nullable)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCompleteBody {
    tag: Bytes,
}

impl CommandCompleteBody {
    /// The command tag, e.g. `INSERT 0 5`.
    pub fn tag(&self) -> Result<&str, DecodeError> {
        utf8(&self.tag)
    }

    /// Number of rows affected, taken from the last word of the tag.
    pub fn rows_affected(&self) -> Option<u64> {
        self.tag()
            .ok()?
            .rsplit(' ')
            .next()
            .and_then(|word| word.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptionBody {
    len: u16,
    storage: Bytes,
}

impl ParameterDescriptionBody {
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Type OIDs of the statement's parameters.
    pub fn parameters(&self) -> Parameters<'_> {
        Parameters(Counted::new(&self.storage, usize::from(self.len)))
    }
}

/// An iterator over parameter type OIDs.
#[derive(Debug, Clone)]
pub struct Parameters<'a>(Counted<'a>);

impl FallibleIterator for Parameters<'_> {
    type Item = Oid;
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<Oid>, DecodeError> {
        self.0.step(Cursor::read_u32)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyResponseBody {
    format: i8,
    len: u16,
    storage: Bytes,
}

impl CopyResponseBody {
    /// Overall COPY format (0=text, 1=binary)
    pub fn format(&self) -> i8 {
        self.format
    }

    /// Per-column format codes.
    pub fn column_formats(&self) -> ColumnFormats<'_> {
        ColumnFormats(Counted::new(&self.storage, usize::from(self.len)))
    }
}

/// An iterator over per-column format codes.
#[derive(Debug, Clone)]
pub struct ColumnFormats<'a>(Counted<'a>);

impl FallibleIterator for ColumnFormats<'_> {
    type Item = i16;
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<i16>, DecodeError> {
        self.0.step(Cursor::read_i16)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyDataBody(Bytes);

impl CopyDataBody {
    pub fn data(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationResponseBody {
    process_id: i32,
    channel: Bytes,
    message: Bytes,
}

impl NotificationResponseBody {
    /// Backend process ID that sent the notification
    pub fn process_id(&self) -> i32 {
        self.process_id
    }

    pub fn channel(&self) -> Result<&str, DecodeError> {
        utf8(&self.channel)
    }

    pub fn message(&self) -> Result<&str, DecodeError> {
        utf8(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCallResponseBody {
    value: Option<Bytes>,
}

impl FunctionCallResponseBody {
    /// The function result; `None` is SQL NULL.
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }
}

// ==================== Error and notice fields ====================

/// Body of an `ErrorResponse` or `NoticeResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponseBody {
    storage: Bytes,
}

impl ErrorResponseBody {
    /// The raw `(code, value)` fields in wire order.
    pub fn fields(&self) -> ErrorFieldIter<'_> {
        ErrorFieldIter {
            cur: Cursor::new(&self.storage),
            done: false,
        }
    }

    /// Collects the fields into an [`ErrorFields`].
    pub fn to_error_fields(&self) -> Result<ErrorFields, DecodeError> {
        ErrorFields::from_fields(self.fields())
    }
}

/// One field of an error or notice response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorField<'a> {
    /// Single-byte field code, e.g. `b'M'` for the message.
    pub code: u8,
    pub value: &'a str,
}

/// An iterator over the fields of an error or notice response.
#[derive(Debug, Clone)]
pub struct ErrorFieldIter<'a> {
    cur: Cursor<'a>,
    done: bool,
}

impl<'a> FallibleIterator for ErrorFieldIter<'a> {
    type Item = ErrorField<'a>;
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<ErrorField<'a>>, DecodeError> {
        if self.done {
            return Ok(None);
        }
        let res = self.cur.read_u8().and_then(|code| {
            if code == 0 {
                return self.cur.finish().map(|()| None);
            }
            let value = self.cur.read_cstr()?;
            Ok(Some(ErrorField { code, value }))
        });
        if !matches!(res, Ok(Some(_))) {
            self.done = true;
        }
        res
    }
}

/// Error and notice response fields.
///
/// PostgreSQL error responses contain multiple fields identified by single-byte codes.
/// All fields are optional except severity, code, and message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorFields {
    /// Severity (ERROR, FATAL, PANIC, WARNING, NOTICE, DEBUG, INFO, LOG)
    pub severity: String,
    /// Non-localized severity
    pub severity_nonlocalized: Option<String>,
    /// SQLSTATE code (e.g., "23505" for unique_violation)
    pub code: String,
    /// Primary error message
    pub message: String,
    /// Optional secondary message with more detail
    pub detail: Option<String>,
    /// Optional suggestion for fixing the problem
    pub hint: Option<String>,
    /// Position in query string (1-based)
    pub position: Option<i32>,
    /// Position in internal query
    pub internal_position: Option<i32>,
    /// Internal query that generated the error
    pub internal_query: Option<String>,
    /// Call stack context
    pub where_: Option<String>,
    /// Schema name
    pub schema: Option<String>,
    /// Table name
    pub table: Option<String>,
    /// Column name
    pub column: Option<String>,
    /// Data type name
    pub data_type: Option<String>,
    /// Constraint name
    pub constraint: Option<String>,
    /// Source file name
    pub file: Option<String>,
    /// Source line number
    pub line: Option<i32>,
    /// Source routine name
    pub routine: Option<String>,
}

impl ErrorFields {
    /// Collects raw fields, ignoring codes it does not know.
    pub fn from_fields<'a, I>(mut fields: I) -> Result<ErrorFields, DecodeError>
    where
        I: FallibleIterator<Item = ErrorField<'a>, Error = DecodeError>,
    {
        let mut out = ErrorFields::default();
        while let Some(ErrorField { code, value }) = fields.next()? {
            let owned = || Some(value.to_owned());
            match code {
                b'S' => out.severity = value.to_owned(),
                b'V' => out.severity_nonlocalized = owned(),
                b'C' => out.code = value.to_owned(),
                b'M' => out.message = value.to_owned(),
                b'D' => out.detail = owned(),
                b'H' => out.hint = owned(),
                b'P' => out.position = value.parse().ok(),
                b'p' => out.internal_position = value.parse().ok(),
                b'q' => out.internal_query = owned(),
                b'W' => out.where_ = owned(),
                b's' => out.schema = owned(),
                b't' => out.table = owned(),
                b'c' => out.column = owned(),
                b'd' => out.data_type = owned(),
                b'n' => out.constraint = owned(),
                b'F' => out.file = owned(),
                b'L' => out.line = value.parse().ok(),
                b'R' => out.routine = owned(),
                _ => {}
            }
        }
        Ok(out)
    }

    /// Check if this is a fatal error.
    pub fn is_fatal(&self) -> bool {
        self.severity == "FATAL" || self.severity == "PANIC"
    }

    /// Check if this is a regular error.
    pub fn is_error(&self) -> bool {
        self.severity == "ERROR"
    }

    /// Check if this is a warning or notice.
    pub fn is_warning(&self) -> bool {
        matches!(
            self.severity.as_str(),
            "WARNING" | "NOTICE" | "DEBUG" | "INFO" | "LOG"
        )
    }

    /// Get the SQLSTATE error class (first two characters).
    pub fn error_class(&self) -> &str {
        self.code.get(..2).unwrap_or(&self.code)
    }
}

impl fmt::Display for ErrorFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.severity, self.message, self.code)?;
        if let Some(detail) = &self.detail {
            write!(f, "\nDETAIL: {detail}")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\nHINT: {hint}")?;
        }
        if let Some(pos) = self.position {
            write!(f, "\nPOSITION: {pos}")?;
        }
        if let Some(where_) = &self.where_ {
            write!(f, "\nCONTEXT: {where_}")?;
        }
        Ok(())
    }
}
