//! The message being sent, and the builder that validates its parts.

use ahash::AHashSet;
use postbox_common::{Address, AddressField, NamedAddress, RecipientSet, ValidationError};

/// A fully validated message: one sender, any number of recipients in each
/// of To/Cc/Bcc, a subject and an HTML body.
///
/// [`crate::Mailer::send`] consumes the message, so nothing from one send
/// can leak into the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    sender: NamedAddress,
    to: RecipientSet,
    cc: RecipientSet,
    bcc: RecipientSet,
    subject: String,
    body: String,
}

impl Message {
    #[must_use]
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    #[must_use]
    pub const fn sender(&self) -> &NamedAddress {
        &self.sender
    }

    #[must_use]
    pub const fn to(&self) -> &RecipientSet {
        &self.to
    }

    #[must_use]
    pub const fn cc(&self) -> &RecipientSet {
        &self.cc
    }

    #[must_use]
    pub const fn bcc(&self) -> &RecipientSet {
        &self.bcc
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether there is anyone to deliver to.
    #[must_use]
    pub fn has_recipients(&self) -> bool {
        !(self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty())
    }

    /// Every To, Cc and Bcc address in bracketed form, each listed once.
    ///
    /// The order is unspecified.
    #[must_use]
    pub fn envelope_recipients(&self) -> Vec<String> {
        let mut seen = AHashSet::new();
        self.to
            .envelope()
            .chain(self.cc.envelope())
            .chain(self.bcc.envelope())
            .filter(|address| seen.insert(address.clone()))
            .collect()
    }
}

/// Collects and validates the parts of a [`Message`].
///
/// Every address is checked as it is added, and the first bad one stops the
/// chain with an error naming the field it was given for:
///
/// ```
/// use postbox_delivery::Message;
///
/// # fn main() -> Result<(), postbox_common::ValidationError> {
/// let message = Message::builder()
///     .sender("sender@example.com", "Sender")?
///     .to("joe@example.com", "Joe Doe")?
///     .bcc("audit@example.com", "")?
///     .subject("Hello World")
///     .body("<h1>Hello World</h1>")
///     .build()?;
///
/// assert!(message.has_recipients());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone)]
pub struct MessageBuilder {
    sender: Option<NamedAddress>,
    to: RecipientSet,
    cc: RecipientSet,
    bcc: RecipientSet,
    subject: String,
    body: String,
}

impl MessageBuilder {
    /// Sets the sender, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAddress`] if `address` is not valid.
    pub fn sender(
        mut self,
        address: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let address = Address::parse(address, AddressField::Sender)?;
        self.sender = Some(NamedAddress::new(address, name));
        Ok(self)
    }

    /// Adds a To recipient.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAddress`] if `address` is not valid.
    pub fn to(
        mut self,
        address: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        self.to
            .insert(Address::parse(address, AddressField::Recipient)?, name);
        Ok(self)
    }

    /// Adds a Cc recipient.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAddress`] if `address` is not valid.
    pub fn cc(
        mut self,
        address: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        self.cc.insert(Address::parse(address, AddressField::Cc)?, name);
        Ok(self)
    }

    /// Adds a Bcc recipient. These go on the envelope only.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAddress`] if `address` is not valid.
    pub fn bcc(
        mut self,
        address: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        self.bcc
            .insert(Address::parse(address, AddressField::Bcc)?, name);
        Ok(self)
    }

    /// Merges an already validated set into the To recipients.
    #[must_use]
    pub fn to_all(mut self, recipients: RecipientSet) -> Self {
        self.to.extend(recipients);
        self
    }

    #[must_use]
    pub fn cc_all(mut self, recipients: RecipientSet) -> Self {
        self.cc.extend(recipients);
        self
    }

    #[must_use]
    pub fn bcc_all(mut self, recipients: RecipientSet) -> Self {
        self.bcc.extend(recipients);
        self
    }

    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Finishes the message.
    ///
    /// Recipients are not required here; [`crate::Mailer::send`] checks for
    /// them so a message can be built up in stages.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingSender`] if no sender was set.
    pub fn build(self) -> Result<Message, ValidationError> {
        Ok(Message {
            sender: self.sender.ok_or(ValidationError::MissingSender)?,
            to: self.to,
            cc: self.cc,
            bcc: self.bcc,
            subject: self.subject,
            body: self.body,
        })
    }
}
