//! Validation errors for message construction.
//!
//! All of these are raised before any network I/O takes place and are never
//! retried.

use std::fmt;

use thiserror::Error;

/// Which part of a message an address was supplied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    Sender,
    Recipient,
    Cc,
    Bcc,
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sender => "sender",
            Self::Recipient => "recipient",
            Self::Cc => "cc recipient",
            Self::Bcc => "bcc recipient",
        })
    }
}

/// Errors that can occur while assembling a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An address failed the syntax check.
    #[error("Invalid {field} email address: '{address}'")]
    InvalidAddress {
        field: AddressField,
        address: String,
    },

    /// No sender was set on the message.
    #[error("Sender: a sender address is required")]
    MissingSender,

    /// The request named the wrong number of senders.
    #[error("Sender: invalid value. There must be exactly one sender, found {0}")]
    SenderCount(usize),

    /// To, Cc and Bcc are all empty.
    #[error(
        "Recipients: invalid value. There must be at least one recipient, either regular, cc, or bcc"
    )]
    NoRecipients,
}

impl ValidationError {
    /// Numeric code reported to callers.
    ///
    /// These sit above the range used by transport failures so the two can
    /// be told apart from the code alone.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::InvalidAddress { .. } => 1001,
            Self::MissingSender => 1002,
            Self::SenderCount(_) => 1003,
            Self::NoRecipients => 1004,
        }
    }
}
