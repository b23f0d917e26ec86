//! Responses to the server's authentication requests.
//!
//! These helpers turn an authentication request body into the frontend
//! message that answers it. Reading and writing the messages, and deciding
//! which request comes next, stays with the caller.

use pgproto_auth::{AuthError, ChannelBinding, SCRAM_SHA_256, SCRAM_SHA_256_PLUS, ScramSha256};
use pgproto_codec::message::{FrontendMessage, Md5PasswordBody, SaslBody, SaslContinueBody, SaslFinalBody};
use pgproto_codec::{DecodeError, EncodeError, FallibleIterator};

/// Answer to `AuthenticationMD5Password`.
pub fn md5_response(
    user: &str,
    password: &str,
    body: &Md5PasswordBody,
) -> Result<FrontendMessage, EncodeError> {
    FrontendMessage::password(&pgproto_auth::md5_password(user, password, body.salt()))
}

/// Starts SCRAM for an `AuthenticationSASL` request.
///
/// `tls_server_end_point` is the hash of the server certificate when the
/// connection runs over TLS; with it the `-PLUS` variant is used if offered.
/// Returns `Ok(None)` when the server offers no SCRAM-SHA-256 mechanism.
pub fn start_scram(
    body: &SaslBody,
    password: &[u8],
    tls_server_end_point: Option<Vec<u8>>,
) -> Result<Option<(ScramSha256, FrontendMessage)>, DecodeError> {
    let mut plain = false;
    let mut plus = false;
    let mut mechanisms = body.mechanisms();
    while let Some(mechanism) = mechanisms.next()? {
        match mechanism {
            SCRAM_SHA_256 => plain = true,
            SCRAM_SHA_256_PLUS => plus = true,
            _ => {}
        }
    }

    let channel_binding = match tls_server_end_point {
        Some(hash) if plus => ChannelBinding::TlsServerEndPoint(hash),
        Some(_) if plain => ChannelBinding::Unrequested,
        None if plain => ChannelBinding::Unsupported,
        _ => return Ok(None),
    };

    let scram = ScramSha256::new(password, channel_binding);
    tracing::debug!(mechanism = scram.mechanism(), "starting SASL exchange");
    let message = FrontendMessage::SaslInitialResponse {
        mechanism: scram.mechanism().to_owned(),
        data: scram.message().to_vec(),
    };
    Ok(Some((scram, message)))
}

/// Answer to `AuthenticationSASLContinue`.
pub fn scram_continue(
    scram: &mut ScramSha256,
    body: &SaslContinueBody,
) -> Result<FrontendMessage, AuthError> {
    scram.update(body.data())?;
    Ok(FrontendMessage::SaslResponse(scram.message().to_vec()))
}

/// Checks `AuthenticationSASLFinal`.
pub fn scram_finish(scram: &mut ScramSha256, body: &SaslFinalBody) -> Result<(), AuthError> {
    scram.finish(body.data())
}
