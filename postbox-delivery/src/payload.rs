//! Header and body assembly.

use std::fmt::Write;

use postbox_common::{
    identifier::{current_date_header, domain_of, generate_message_id},
    line_ending::{header_safe, to_crlf},
};

use crate::{message::Message, transmitter::PayloadReader};

const CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// The finished wire form of a [`Message`]: headers, a blank line, then the
/// body, all CRLF terminated.
///
/// A payload is immutable once built. Read it through [`Payload::reader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Builds the payload with the current time and a fresh `Message-ID`.
    #[must_use]
    pub fn build(message: &Message) -> Self {
        let sender = message.sender().address.as_str();
        Self::build_with(
            message,
            &current_date_header(),
            &generate_message_id(domain_of(sender)),
        )
    }

    /// Builds the payload with the given `Date` and `Message-ID` values.
    ///
    /// Headers are written in a fixed order: Date, To, From, Cc, Message-ID,
    /// Subject, Content-Type. Cc is written even when empty. Bcc never is.
    #[must_use]
    pub fn build_with(message: &Message, date: &str, message_id: &str) -> Self {
        let mut out = String::with_capacity(message.body().len() + 512);

        // Writing to a String can't fail.
        let _ = write!(out, "Date: {date}\r\n");
        let _ = write!(out, "To: {}\r\n", message.to().header_value());
        let _ = write!(out, "From: {}\r\n", message.sender());
        let _ = write!(out, "Cc: {}\r\n", message.cc().header_value());
        let _ = write!(out, "Message-ID: {message_id}\r\n");
        let _ = write!(out, "Subject: {}\r\n", header_safe(message.subject()));
        let _ = write!(out, "Content-Type: {CONTENT_TYPE}\r\n");
        out.push_str("\r\n");
        out.push_str(&to_crlf(message.body()));
        out.push_str("\r\n");

        Self(out.into_bytes())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A fresh reader positioned at the start of the payload.
    #[must_use]
    pub fn reader(&self) -> PayloadReader<'_> {
        PayloadReader::new(&self.0)
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
