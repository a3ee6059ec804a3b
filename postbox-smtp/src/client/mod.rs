//! Low-level SMTP submission client.
//!
//! [`SmtpClient`] speaks the protocol one command at a time; sequencing a
//! whole submission (EHLO, STARTTLS, AUTH, envelope, DATA) is the job of
//! [`crate::SmtpSession`].

#[allow(clippy::module_inception)]
mod client;
mod data;
mod error;
mod response;

pub(crate) use client::tls_config;
pub use client::SmtpClient;
pub use error::{ClientError, Result};
pub use response::{Response, ResponseLine};
