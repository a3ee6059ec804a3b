//! Sending a message through a [`Transport`].

use std::sync::Arc;

use postbox_common::{ValidationError, config::ConnectionConfig, internal, tracing};
use postbox_smtp::{Session, Transport, TransportError};

use crate::{
    error::DeliveryResult,
    message::Message,
    payload::Payload,
};

/// Delivers messages over a shared transport.
///
/// Cloning a `Mailer` is cheap; every clone uses the same transport. Sends
/// are independent of each other and may run concurrently.
#[derive(Debug)]
pub struct Mailer<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> Clone for Mailer<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> Mailer<T> {
    #[must_use]
    pub const fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Sends `message` using `connection`.
    ///
    /// The message needs at least one To, Cc or Bcc recipient; this is
    /// checked before the transport is touched. Bcc recipients are put on
    /// the envelope but never in the headers. Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DeliveryError::Validation`] if the message has no
    /// recipients, or [`crate::DeliveryError::Transport`] carrying the transport's
    /// code and message if connecting, authenticating or uploading fails.
    #[allow(
        clippy::needless_pass_by_value,
        reason = "the message belongs to this send and is not reused"
    )]
    pub async fn send(&self, message: Message, connection: &ConnectionConfig) -> DeliveryResult {
        if !message.has_recipients() {
            return Err(ValidationError::NoRecipients.into());
        }

        let payload = Payload::build(&message);
        let from = message.sender().address.normalized();
        let recipients = message.envelope_recipients();

        internal!(
            level = DEBUG,
            server = %connection.server_address(),
            from = %from,
            recipients = recipients.len(),
            bytes = payload.len(),
            "Sending message"
        );

        let result = self.deliver(&payload, from, recipients, connection).await;

        match &result {
            Ok(()) => tracing::info!(
                server = %connection.server_address(),
                "Message delivered"
            ),
            Err(e) => tracing::warn!(
                server = %connection.server_address(),
                code = e.code(),
                "Delivery failed: {e}"
            ),
        }

        result
    }

    async fn deliver(
        &self,
        payload: &Payload,
        from: String,
        recipients: Vec<String>,
        connection: &ConnectionConfig,
    ) -> DeliveryResult {
        let mut session = self.transport.connect(connection).await?;
        session.set_envelope(from, recipients);

        let mut reader = payload.reader();
        let sent = session.upload(&mut reader).await?;

        if sent != payload.len() {
            return Err(TransportError::Io(format!(
                "Transport consumed {sent} of {} payload bytes",
                payload.len()
            ))
            .into());
        }

        Ok(())
    }
}
