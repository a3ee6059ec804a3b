//! The submission transport: connect, authenticate, then upload one message.
//!
//! [`Transport`] and [`Session`] are the seam the delivery layer talks to.
//! [`SmtpTransport`] is the real implementation on top of [`SmtpClient`];
//! tests substitute their own.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use postbox_common::{config::ConnectionConfig, internal, tracing};
use tokio::time::{Instant, timeout_at};
use tokio_rustls::rustls::RootCertStore;

use crate::{
    client::{Response, SmtpClient, tls_config},
    error::TransportError,
    source::ByteSource,
};

/// Opens authenticated sessions with a submission server.
#[async_trait]
pub trait Transport: Send + Sync {
    type Session: Session;

    /// Connects and authenticates according to `config`.
    ///
    /// Both timeouts in `config.timeouts` are enforced from this point on:
    /// the connect timeout for establishing the connection and the total
    /// timeout for everything up to the end of [`Session::upload`].
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the server cannot be reached, TLS
    /// cannot be negotiated, authentication fails or a deadline passes.
    async fn connect(&self, config: &ConnectionConfig) -> Result<Self::Session, TransportError>;
}

/// A connected session that can carry one message.
#[async_trait]
pub trait Session: Send {
    /// Sets the envelope sender and recipients (bracketed or bare).
    fn set_envelope(&mut self, from: String, to: Vec<String>);

    /// Runs the mail transaction, pulling the content from `source`.
    ///
    /// Returns the number of bytes taken from `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the server rejects the envelope or the
    /// content, the connection fails, or the total deadline passes.
    async fn upload(&mut self, source: &mut dyn ByteSource) -> Result<usize, TransportError>;
}

/// Process-wide SMTP transport state.
///
/// Loading the platform trust store is the expensive, once-per-process part
/// of sending mail. Create one of these at start-up with
/// [`SmtpTransport::init`], share it with every mailer, and call
/// [`SmtpTransport::shutdown`] on the way out.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    roots: Arc<RootCertStore>,
}

impl SmtpTransport {
    /// Loads the native root certificates.
    ///
    /// Certificates that fail to load are logged and skipped.
    #[must_use]
    pub fn init() -> Self {
        let mut roots = RootCertStore::empty();
        let certs = rustls_native_certs::load_native_certs();
        if !certs.errors.is_empty() {
            tracing::warn!(?certs.errors, "Some certificates could not be loaded");
        }
        let (added, ignored) = roots.add_parsable_certificates(certs.certs);
        internal!(level = DEBUG, added, ignored, "Loaded native root certificates");

        Self::with_roots(roots)
    }

    /// Uses `roots` as the trust store instead of the platform one.
    #[must_use]
    pub fn with_roots(roots: RootCertStore) -> Self {
        Self {
            roots: Arc::new(roots),
        }
    }

    /// Releases the shared state.
    pub fn shutdown(self) {
        internal!(
            level = DEBUG,
            shared = Arc::strong_count(&self.roots) - 1,
            "SMTP transport shut down"
        );
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    type Session = SmtpSession;

    async fn connect(&self, config: &ConnectionConfig) -> Result<SmtpSession, TransportError> {
        let deadline = Instant::now() + config.timeouts.total();
        let connect_deadline = deadline.min(Instant::now() + config.timeouts.connect());
        let address = config.server_address();

        if config.accept_invalid_certs {
            tracing::warn!(
                server = %address,
                "SECURITY WARNING: TLS certificate validation is disabled for this connection"
            );
        }

        let client = timeout_at(
            connect_deadline,
            SmtpClient::connect(&address, config.host.clone()),
        )
        .await
        .map_err(|_| {
            TransportError::Timeout(format!(
                "Connecting to {address} timed out after {:?}",
                config.timeouts.connect()
            ))
        })?
        .map_err(|e| TransportError::ConnectionFailed(format!("Failed to connect to {address}: {e}")))?;

        let mut session = SmtpSession {
            client,
            deadline,
            total: config.timeouts.total(),
            envelope: None,
        };

        let tls = Arc::new(tls_config(
            Arc::clone(&self.roots),
            config.accept_invalid_certs,
        ));
        within(deadline, config.timeouts.total(), session.handshake(config, tls)).await?;

        tracing::debug!(server = %address, tls = session.client.is_tls(), "Session established");
        Ok(session)
    }
}

/// Applies the session deadline to `future`.
async fn within<T>(
    deadline: Instant,
    total: Duration,
    future: impl Future<Output = Result<T, TransportError>>,
) -> Result<T, TransportError> {
    timeout_at(deadline, future).await.map_err(|_| {
        TransportError::Timeout(format!("Operation exceeded total timeout of {total:?}"))
    })?
}

/// One connected, authenticated SMTP session.
pub struct SmtpSession {
    client: SmtpClient,
    deadline: Instant,
    total: Duration,
    envelope: Option<(String, Vec<String>)>,
}

impl SmtpSession {
    /// Greeting, EHLO, STARTTLS and AUTH.
    async fn handshake(
        &mut self,
        config: &ConnectionConfig,
        tls: Arc<tokio_rustls::rustls::ClientConfig>,
    ) -> Result<(), TransportError> {
        let greeting = self.client.read_greeting().await?;
        if !greeting.is_success() {
            return Err(TransportError::ConnectionFailed(format!(
                "Server rejected connection: {} {}",
                greeting.code,
                greeting.message()
            )));
        }

        let mut ehlo = self.ehlo(&config.helo_name).await?;

        if config.use_tls {
            if !ehlo.supports("STARTTLS") {
                return Err(TransportError::Tls(
                    "Server does not advertise STARTTLS".to_string(),
                ));
            }

            let response = self.client.starttls(tls).await?;
            if !response.is_success() {
                return Err(TransportError::Tls(format!(
                    "Server rejected STARTTLS: {} {}",
                    response.code,
                    response.message()
                )));
            }

            // RFC 3207: capabilities must be re-read after the upgrade.
            ehlo = self.ehlo(&config.helo_name).await?;
        }

        if config.has_credentials() {
            self.authenticate(&ehlo, &config.username, &config.password)
                .await?;
        }

        Ok(())
    }

    async fn ehlo(&mut self, helo_name: &str) -> Result<Response, TransportError> {
        let response = self.client.ehlo(helo_name).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(TransportError::ConnectionFailed(format!(
                "Server rejected EHLO: {} {}",
                response.code,
                response.message()
            )))
        }
    }

    async fn authenticate(
        &mut self,
        ehlo: &Response,
        username: &str,
        password: &str,
    ) -> Result<(), TransportError> {
        let mechanisms = ehlo.auth_mechanisms();

        let response = if mechanisms.iter().any(|m| m == "PLAIN") {
            self.client.auth_plain(username, password).await?
        } else if mechanisms.iter().any(|m| m == "LOGIN") {
            self.client.auth_login(username, password).await?
        } else {
            return Err(TransportError::AuthenticationFailed(format!(
                "No supported AUTH mechanism offered (server offers: {})",
                if mechanisms.is_empty() {
                    "none".to_string()
                } else {
                    mechanisms.join(" ")
                }
            )));
        };

        if response.is_success() {
            Ok(())
        } else {
            Err(TransportError::AuthenticationFailed(format!(
                "{} {}",
                response.code,
                response.message()
            )))
        }
    }

    /// MAIL FROM, RCPT TO for each recipient, DATA, content, QUIT.
    async fn transaction(
        &mut self,
        from: &str,
        recipients: &[String],
        source: &mut dyn ByteSource,
    ) -> Result<usize, TransportError> {
        let response = self.client.mail_from(from).await?;
        if !response.is_success() {
            return Err(TransportError::SenderRejected {
                code: response.code,
                message: response.message(),
            });
        }

        for recipient in recipients {
            let response = self.client.rcpt_to(recipient).await?;
            if !response.is_success() {
                return Err(TransportError::RecipientRejected {
                    recipient: recipient.clone(),
                    code: response.code,
                    message: response.message(),
                });
            }
        }

        let response = self.client.data().await?;
        if !response.is_intermediate() {
            return Err(TransportError::MessageRejected {
                code: response.code,
                message: response.message(),
            });
        }

        let (response, sent) = self.client.send_data_from(source).await?;
        if !response.is_success() {
            return Err(TransportError::MessageRejected {
                code: response.code,
                message: response.message(),
            });
        }

        // The message is accepted at this point; a failed QUIT doesn't change that.
        if let Err(e) = self.client.quit().await {
            tracing::warn!("QUIT failed after successful delivery: {e}");
        }

        Ok(sent)
    }
}

#[async_trait]
impl Session for SmtpSession {
    fn set_envelope(&mut self, from: String, to: Vec<String>) {
        self.envelope = Some((from, to));
    }

    async fn upload(&mut self, source: &mut dyn ByteSource) -> Result<usize, TransportError> {
        let (from, to) = self
            .envelope
            .take()
            .ok_or(TransportError::MissingEnvelope)?;

        let (deadline, total) = (self.deadline, self.total);
        within(deadline, total, self.transaction(&from, &to, source)).await
    }
}
