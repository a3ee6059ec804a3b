//! SMTP submission for postbox.
//!
//! This crate is the network side of sending: it opens a session with a
//! submission server (optionally upgrading with STARTTLS and authenticating),
//! then streams a message to it from a [`ByteSource`].
//!
//! # Examples
//!
//! ```no_run
//! use postbox_common::config::ConnectionConfig;
//! use postbox_smtp::{Session, SmtpTransport, Transport};
//!
//! # async fn example() -> Result<(), postbox_smtp::TransportError> {
//! let transport = SmtpTransport::init();
//!
//! let mut session = transport.connect(&ConnectionConfig::new("smtp.example.com")).await?;
//! session.set_envelope(
//!     "<sender@example.com>".to_string(),
//!     vec!["<recipient@example.com>".to_string()],
//! );
//!
//! let mut content: &[u8] = b"Subject: Test\r\n\r\nHello World\r\n";
//! session.upload(&mut content).await?;
//!
//! transport.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod client;
mod error;
mod source;
mod transport;

pub use error::TransportError;
pub use source::ByteSource;
pub use transport::{Session, SmtpSession, SmtpTransport, Transport};
