//! SCRAM-SHA-256 client (RFC 5802, RFC 7677).
//!
//! The exchange has three steps, each driven by the connection layer:
//!
//! 1. send [`ScramSha256::message`] in a SASLInitialResponse
//! 2. pass the server's SASLContinue data to [`ScramSha256::update`] and send
//!    the new [`message`](ScramSha256::message) in a SASLResponse
//! 3. pass the server's SASLFinal data to [`ScramSha256::finish`]
//!
//! The user name is left empty in the client-first message; PostgreSQL
//! takes it from the startup packet. Passwords are used as raw bytes
//! without SASLprep normalization.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::AuthError;
use crate::hmac::hmac_sha256;

/// SASL mechanism name for SCRAM-SHA-256.
pub const SCRAM_SHA_256: &str = "SCRAM-SHA-256";

/// SASL mechanism name for SCRAM-SHA-256 with channel binding.
pub const SCRAM_SHA_256_PLUS: &str = "SCRAM-SHA-256-PLUS";

const NONCE_LENGTH: usize = 24;

/// Channel binding state advertised in the GS2 header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelBinding {
    /// The client does not support channel binding.
    Unsupported,
    /// The client supports channel binding but the server did not offer it.
    Unrequested,
    /// `tls-server-end-point` binding with the hash of the server certificate.
    TlsServerEndPoint(Vec<u8>),
}

impl ChannelBinding {
    fn gs2_header(&self) -> &'static str {
        match self {
            ChannelBinding::Unsupported => "n,,",
            ChannelBinding::Unrequested => "y,,",
            ChannelBinding::TlsServerEndPoint(_) => "p=tls-server-end-point,,",
        }
    }

    fn cbind_data(&self) -> &[u8] {
        match self {
            ChannelBinding::TlsServerEndPoint(data) => data,
            _ => &[],
        }
    }
}

enum State {
    Update {
        nonce: String,
        password: Vec<u8>,
        channel_binding: ChannelBinding,
    },
    Finish {
        salted_password: [u8; 32],
        auth_message: String,
    },
    Done,
}

/// Client side of a SCRAM-SHA-256 exchange.
pub struct ScramSha256 {
    mechanism: &'static str,
    message: String,
    state: State,
}

impl ScramSha256 {
    /// Starts an exchange with a random nonce.
    pub fn new(password: &[u8], channel_binding: ChannelBinding) -> Self {
        Self::with_nonce("", password, channel_binding, random_nonce())
    }

    pub(crate) fn with_nonce(
        user: &str,
        password: &[u8],
        channel_binding: ChannelBinding,
        nonce: String,
    ) -> Self {
        let mut message = String::from(channel_binding.gs2_header());
        message.push_str("n=");
        push_saslname(&mut message, user);
        message.push_str(",r=");
        message.push_str(&nonce);

        let mechanism = match &channel_binding {
            ChannelBinding::TlsServerEndPoint(_) => SCRAM_SHA_256_PLUS,
            _ => SCRAM_SHA_256,
        };
        Self {
            mechanism,
            message,
            state: State::Update {
                nonce,
                password: password.to_vec(),
                channel_binding,
            },
        }
    }

    /// The SASL mechanism to announce for this exchange.
    pub fn mechanism(&self) -> &'static str {
        self.mechanism
    }

    /// The message to send to the server for the current step.
    pub fn message(&self) -> &[u8] {
        self.message.as_bytes()
    }

    /// Processes the server-first message and prepares the client-final one.
    pub fn update(&mut self, server_first: &[u8]) -> Result<(), AuthError> {
        let State::Update {
            nonce,
            password,
            channel_binding,
        } = std::mem::replace(&mut self.state, State::Done)
        else {
            return Err(AuthError::InvalidState("update called twice"));
        };

        let server_first = std::str::from_utf8(server_first)
            .map_err(|_| AuthError::InvalidServerMessage("server-first is not UTF-8"))?;
        let parsed = parse_server_first(server_first)?;

        if !parsed.nonce.starts_with(&nonce) || parsed.nonce.len() == nonce.len() {
            return Err(AuthError::NonceMismatch);
        }
        if parsed.iterations == 0 {
            return Err(AuthError::UnsupportedIterations(0));
        }

        let salt = STANDARD.decode(parsed.salt)?;
        let mut salted_password = [0_u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha256>(&password, &salt, parsed.iterations, &mut salted_password);

        let client_key = hmac_sha256(&salted_password, b"Client Key");
        let stored_key = Sha256::digest(client_key);

        let mut cbind_input = channel_binding.gs2_header().as_bytes().to_vec();
        cbind_input.extend_from_slice(channel_binding.cbind_data());

        let mut client_final = String::from("c=");
        STANDARD.encode_string(&cbind_input, &mut client_final);
        client_final.push_str(",r=");
        client_final.push_str(parsed.nonce);

        let client_first_bare = &self.message[channel_binding.gs2_header().len()..];
        let auth_message = format!("{client_first_bare},{server_first},{client_final}");

        let client_signature = hmac_sha256(&stored_key, auth_message.as_bytes());
        let mut client_proof = client_key;
        for (proof, sig) in client_proof.iter_mut().zip(client_signature) {
            *proof ^= sig;
        }

        client_final.push_str(",p=");
        STANDARD.encode_string(client_proof, &mut client_final);

        tracing::debug!(
            iterations = parsed.iterations,
            "SCRAM server-first processed, sending client-final"
        );
        self.message = client_final;
        self.state = State::Finish {
            salted_password,
            auth_message,
        };
        Ok(())
    }

    /// Verifies the server-final message.
    pub fn finish(&mut self, server_final: &[u8]) -> Result<(), AuthError> {
        let State::Finish {
            salted_password,
            auth_message,
        } = std::mem::replace(&mut self.state, State::Done)
        else {
            return Err(AuthError::InvalidState("finish called before update"));
        };

        let server_final = std::str::from_utf8(server_final)
            .map_err(|_| AuthError::InvalidServerMessage("server-final is not UTF-8"))?;
        let verifier = match parse_server_final(server_final)? {
            ServerFinal::Verifier(v) => STANDARD.decode(v)?,
            ServerFinal::Error(e) => return Err(AuthError::Server(e.to_owned())),
        };

        let server_key = hmac_sha256(&salted_password, b"Server Key");
        let expected = hmac_sha256(&server_key, auth_message.as_bytes());
        if !bool::from(expected.as_slice().ct_eq(&verifier)) {
            tracing::debug!("SCRAM server signature mismatch");
            return Err(AuthError::InvalidServerSignature);
        }

        tracing::debug!("SCRAM server signature verified");
        Ok(())
    }
}

impl std::fmt::Debug for ScramSha256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let step = match self.state {
            State::Update { .. } => "update",
            State::Finish { .. } => "finish",
            State::Done => "done",
        };
        f.debug_struct("ScramSha256")
            .field("mechanism", &self.mechanism)
            .field("step", &step)
            .finish_non_exhaustive()
    }
}

fn random_nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..NONCE_LENGTH)
        .map(|_| {
            // printable ASCII except ','
            let mut c = rng.gen_range(0x21_u8..0x7e);
            if c == b',' {
                c = 0x7e;
            }
            char::from(c)
        })
        .collect()
}

fn push_saslname(out: &mut String, name: &str) {
    for c in name.chars() {
        match c {
            ',' => out.push_str("=2C"),
            '=' => out.push_str("=3D"),
            c => out.push(c),
        }
    }
}

struct ServerFirst<'a> {
    nonce: &'a str,
    salt: &'a str,
    iterations: u32,
}

fn parse_server_first(msg: &str) -> Result<ServerFirst<'_>, AuthError> {
    let mut parts = msg.split(',');
    let nonce = attribute(parts.next(), 'r')?;
    let salt = attribute(parts.next(), 's')?;
    let iterations = attribute(parts.next(), 'i')?
        .parse()
        .map_err(|_| AuthError::InvalidServerMessage("invalid iteration count"))?;
    if nonce.contains(|c: char| !c.is_ascii_graphic()) {
        return Err(AuthError::InvalidServerMessage("invalid nonce"));
    }
    Ok(ServerFirst {
        nonce,
        salt,
        iterations,
    })
}

enum ServerFinal<'a> {
    Verifier(&'a str),
    Error(&'a str),
}

fn parse_server_final(msg: &str) -> Result<ServerFinal<'_>, AuthError> {
    let first = msg.split(',').next();
    if let Ok(error) = attribute(first, 'e') {
        return Ok(ServerFinal::Error(error));
    }
    attribute(first, 'v').map(ServerFinal::Verifier)
}

fn attribute(part: Option<&str>, name: char) -> Result<&str, AuthError> {
    let part = part.ok_or(AuthError::InvalidServerMessage("missing attribute"))?;
    let mut chars = part.chars();
    if chars.next() != Some(name) || chars.next() != Some('=') {
        return Err(AuthError::InvalidServerMessage("unexpected attribute"));
    }
    Ok(&part[2..])
}
