//! The outcome of a send.
//!
//! Callers get either `Ok(())` or a [`DeliveryError`] with a numeric code and
//! a message. Validation codes start at 1000; anything lower came from the
//! transport.

use postbox_common::ValidationError;
use postbox_smtp::TransportError;
use thiserror::Error;

/// Why a send did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The message was rejected before any network I/O took place.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The transport reported a failure.
    #[error("{message}")]
    Transport { code: u32, message: String },
}

impl DeliveryError {
    /// The numeric code for this failure. Never `0`.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::Validation(e) => e.code(),
            Self::Transport { code, .. } => *code,
        }
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<TransportError> for DeliveryError {
    fn from(error: TransportError) -> Self {
        Self::Transport {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

pub type DeliveryResult = Result<(), DeliveryError>;
