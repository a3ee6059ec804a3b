//! Message assembly and delivery.
//!
//! A [`Message`] is built and validated with [`MessageBuilder`], rendered to
//! a [`Payload`], and handed to a [`Mailer`], which streams it to the server
//! through a [`PayloadReader`] and reports a [`DeliveryResult`].

mod error;
mod mailer;
mod message;
mod payload;
mod transmitter;

pub use error::{DeliveryError, DeliveryResult};
pub use mailer::Mailer;
pub use message::{Message, MessageBuilder};
pub use payload::Payload;
pub use transmitter::PayloadReader;
