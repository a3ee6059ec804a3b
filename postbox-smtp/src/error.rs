//! Transport failures as reported to callers.
//!
//! Every failure carries a stable, non-zero numeric code so a caller can
//! branch on the kind of failure without parsing the message.

use thiserror::Error;

use crate::client::ClientError;

/// Errors surfaced by a [`crate::Transport`] or [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not open a connection, or the server refused to talk to us.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// STARTTLS was unavailable, rejected, or the handshake failed.
    #[error("TLS failure: {0}")]
    Tls(String),

    /// The server rejected the credentials, or offered no usable mechanism.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The server rejected the envelope sender.
    #[error("Sender rejected: {code} {message}")]
    SenderRejected { code: u16, message: String },

    /// The server rejected an envelope recipient.
    #[error("Recipient {recipient} rejected: {code} {message}")]
    RecipientRejected {
        recipient: String,
        code: u16,
        message: String,
    },

    /// The server refused DATA or the message content.
    #[error("Message rejected: {code} {message}")]
    MessageRejected { code: u16, message: String },

    /// The connect or total deadline passed.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Reading from or writing to the socket failed mid-session.
    #[error("I/O error: {0}")]
    Io(String),

    /// The server's reply could not be understood.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Server text was not valid UTF-8.
    #[error("Conversion failure: {0}")]
    Encoding(String),

    /// Upload was attempted before an envelope was set.
    #[error("No envelope set for this session")]
    MissingEnvelope,
}

impl TransportError {
    /// The numeric code reported alongside the message. Never `0`.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::ConnectionFailed(_) => 7,
            Self::Protocol(_) => 8,
            Self::Encoding(_) => 26,
            Self::Timeout(_) => 28,
            Self::Tls(_) => 35,
            Self::SenderRejected { .. }
            | Self::RecipientRejected { .. }
            | Self::MessageRejected { .. } => 55,
            Self::Io(_) => 56,
            Self::AuthenticationFailed(_) => 67,
            Self::MissingEnvelope => 3,
        }
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<ClientError> for TransportError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Io(e) => Self::Io(e.to_string()),
            ClientError::ConnectionClosed => {
                Self::Io("Connection closed unexpectedly".to_string())
            }
            ClientError::TlsError(msg) => Self::Tls(msg),
            ClientError::ParseError(msg) => Self::Protocol(msg),
            ClientError::Utf8Error(e) => Self::Encoding(e.to_string()),
        }
    }
}
