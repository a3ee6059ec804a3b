//! SMTP client connection with STARTTLS, AUTH and streamed DATA.

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use postbox_common::{address::normalize, incoming, outgoing};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};
use tokio_rustls::{
    TlsConnector,
    rustls::{ClientConfig, RootCertStore, pki_types::ServerName},
};

use super::{
    data::DotStuffer,
    error::{ClientError, Result},
    response::Response,
};
use crate::source::ByteSource;

/// Initial size of the read buffer for SMTP responses.
const BUFFER_SIZE: usize = 8192;

/// Maximum size of the read buffer to prevent unbounded growth (1MB).
const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// How much is pulled from a [`ByteSource`] per read during DATA.
const CHUNK_SIZE: usize = 16 * 1024;

/// An SMTP client connection that can be either plain TCP or TLS-wrapped.
enum ClientConnection {
    Plain(TcpStream),
    Tls(Box<tokio_rustls::client::TlsStream<TcpStream>>),
}

impl ClientConnection {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Self::Plain(stream) => stream.write_all(data).await?,
            Self::Tls(stream) => stream.write_all(data).await?,
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        match self {
            Self::Plain(stream) => stream.flush().await?,
            Self::Tls(stream) => stream.flush().await?,
        }
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = match self {
            Self::Plain(stream) => stream.read(buf).await?,
            Self::Tls(stream) => stream.read(buf).await?,
        };
        if n == 0 {
            return Err(ClientError::ConnectionClosed);
        }
        Ok(n)
    }

    async fn upgrade_to_tls(self, domain: &str, config: Arc<ClientConfig>) -> Result<Self> {
        match self {
            Self::Plain(stream) => {
                let server_name = ServerName::try_from(domain.to_string())
                    .map_err(|e| ClientError::TlsError(format!("Invalid domain: {e}")))?;

                let tls_stream = TlsConnector::from(config)
                    .connect(server_name, stream)
                    .await
                    .map_err(|e| ClientError::TlsError(e.to_string()))?;

                Ok(Self::Tls(Box::new(tls_stream)))
            }
            Self::Tls(_) => Err(ClientError::TlsError(
                "Connection is already TLS".to_string(),
            )),
        }
    }
}

/// Builds the rustls configuration for a STARTTLS upgrade.
pub(crate) fn tls_config(roots: Arc<RootCertStore>, accept_invalid_certs: bool) -> ClientConfig {
    let mut config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    if accept_invalid_certs {
        config
            .dangerous()
            .set_certificate_verifier(Arc::new(NoVerifier));
    }

    config
}

/// A certificate verifier that accepts all certificates (for testing only).
#[derive(Debug)]
struct NoVerifier;

impl tokio_rustls::rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &tokio_rustls::rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[tokio_rustls::rustls::pki_types::CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: tokio_rustls::rustls::pki_types::UnixTime,
    ) -> std::result::Result<
        tokio_rustls::rustls::client::danger::ServerCertVerified,
        tokio_rustls::rustls::Error,
    > {
        Ok(tokio_rustls::rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &tokio_rustls::rustls::pki_types::CertificateDer<'_>,
        _dss: &tokio_rustls::rustls::DigitallySignedStruct,
    ) -> std::result::Result<
        tokio_rustls::rustls::client::danger::HandshakeSignatureValid,
        tokio_rustls::rustls::Error,
    > {
        Ok(tokio_rustls::rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &tokio_rustls::rustls::pki_types::CertificateDer<'_>,
        _dss: &tokio_rustls::rustls::DigitallySignedStruct,
    ) -> std::result::Result<
        tokio_rustls::rustls::client::danger::HandshakeSignatureValid,
        tokio_rustls::rustls::Error,
    > {
        Ok(tokio_rustls::rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<tokio_rustls::rustls::SignatureScheme> {
        use tokio_rustls::rustls::SignatureScheme;

        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ED25519,
        ]
    }
}

/// An SMTP client for sending commands and receiving responses.
pub struct SmtpClient {
    connection: Option<ClientConnection>,
    buffer: Vec<u8>,
    buffer_pos: usize,
    server_domain: String,
}

impl SmtpClient {
    /// Connects to `addr`. `server_domain` is used for TLS SNI and
    /// certificate checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(addr: &str, server_domain: impl Into<String>) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;

        Ok(Self {
            connection: Some(ClientConnection::Plain(stream)),
            buffer: vec![0u8; BUFFER_SIZE],
            buffer_pos: 0,
            server_domain: server_domain.into(),
        })
    }

    /// Whether STARTTLS has completed on this connection.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self.connection, Some(ClientConnection::Tls(_)))
    }

    /// Reads the initial server greeting (220 response).
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn read_greeting(&mut self) -> Result<Response> {
        self.read_response().await
    }

    async fn send_line(&mut self, line: &str, logged: &str) -> Result<()> {
        outgoing!(command = logged);
        let connection = self
            .connection
            .as_mut()
            .ok_or(ClientError::ConnectionClosed)?;
        connection.send(format!("{line}\r\n").as_bytes()).await?;
        connection.flush().await
    }

    /// Sends a raw command and reads the response.
    ///
    /// # Errors
    ///
    /// Returns an error if sending or reading fails.
    pub async fn command(&mut self, command: &str) -> Result<Response> {
        self.send_line(command, command).await?;
        self.read_response().await
    }

    /// Sends EHLO with the specified domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn ehlo(&mut self, domain: &str) -> Result<Response> {
        self.command(&format!("EHLO {domain}")).await
    }

    /// Sends STARTTLS and, on a 2xx reply, upgrades the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the handshake fails.
    pub async fn starttls(&mut self, config: Arc<ClientConfig>) -> Result<Response> {
        let response = self.command("STARTTLS").await?;

        if response.is_success() {
            let connection = self
                .connection
                .take()
                .ok_or(ClientError::ConnectionClosed)?;
            // Anything buffered before the handshake came in the clear.
            self.buffer_pos = 0;
            self.connection = Some(
                connection
                    .upgrade_to_tls(&self.server_domain, config)
                    .await?,
            );
        }

        Ok(response)
    }

    /// `AUTH PLAIN` with an initial response (RFC 4616).
    ///
    /// # Errors
    ///
    /// Returns an error if sending or reading fails.
    pub async fn auth_plain(&mut self, username: &str, password: &str) -> Result<Response> {
        let token = STANDARD.encode(format!("\0{username}\0{password}"));
        self.send_line(&format!("AUTH PLAIN {token}"), "AUTH PLAIN <redacted>")
            .await?;
        self.read_response().await
    }

    /// `AUTH LOGIN`, answering the username and password challenges.
    ///
    /// # Errors
    ///
    /// Returns an error if sending or reading fails.
    pub async fn auth_login(&mut self, username: &str, password: &str) -> Result<Response> {
        let response = self.command("AUTH LOGIN").await?;
        if !response.is_intermediate() {
            return Ok(response);
        }

        self.send_line(&STANDARD.encode(username), "<username>")
            .await?;
        let response = self.read_response().await?;
        if !response.is_intermediate() {
            return Ok(response);
        }

        self.send_line(&STANDARD.encode(password), "<redacted>")
            .await?;
        self.read_response().await
    }

    /// Sends MAIL FROM. The address may be bare or already bracketed.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn mail_from(&mut self, from: &str) -> Result<Response> {
        self.command(&format!("MAIL FROM:{}", normalize(from)))
            .await
    }

    /// Sends RCPT TO. The address may be bare or already bracketed.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn rcpt_to(&mut self, to: &str) -> Result<Response> {
        self.command(&format!("RCPT TO:{}", normalize(to))).await
    }

    /// Sends DATA command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn data(&mut self) -> Result<Response> {
        self.command("DATA").await
    }

    /// Streams message content from `source` until it is exhausted, then sends
    /// the end-of-data marker and reads the server's verdict.
    ///
    /// Returns the reply together with the number of bytes taken from
    /// `source` (before dot-stuffing).
    ///
    /// # Errors
    ///
    /// Returns an error if sending or reading fails.
    pub async fn send_data_from(
        &mut self,
        source: &mut dyn ByteSource,
    ) -> Result<(Response, usize)> {
        let connection = self
            .connection
            .as_mut()
            .ok_or(ClientError::ConnectionClosed)?;

        let mut chunk = vec![0u8; CHUNK_SIZE];
        let mut stuffed = Vec::with_capacity(CHUNK_SIZE + CHUNK_SIZE / 8);
        let mut stuffer = DotStuffer::new();
        let mut total = 0;

        loop {
            let n = source.read_chunk(&mut chunk).min(chunk.len());
            if n == 0 {
                break;
            }
            total += n;

            stuffed.clear();
            stuffer.stuff(&chunk[..n], &mut stuffed);
            connection.send(&stuffed).await?;
        }

        connection.send(stuffer.terminator()).await?;
        connection.flush().await?;
        outgoing!(bytes = total, "message data sent");

        let response = self.read_response().await?;
        Ok((response, total))
    }

    /// Sends QUIT command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn quit(&mut self) -> Result<Response> {
        self.command("QUIT").await
    }

    /// Reads a complete SMTP response from the server.
    async fn read_response(&mut self) -> Result<Response> {
        loop {
            if let Some((response, consumed)) =
                Response::parse_response(&self.buffer[..self.buffer_pos])?
            {
                self.buffer.copy_within(consumed..self.buffer_pos, 0);
                self.buffer_pos -= consumed;

                incoming!(code = response.code, message = %response.message());
                return Ok(response);
            }

            if self.buffer_pos >= self.buffer.len() {
                let new_size = self.buffer.len() * 2;
                if new_size > MAX_BUFFER_SIZE {
                    return Err(ClientError::ParseError(format!(
                        "Response too large (exceeds {MAX_BUFFER_SIZE} bytes)"
                    )));
                }
                self.buffer.resize(new_size, 0);
            }

            let connection = self
                .connection
                .as_mut()
                .ok_or(ClientError::ConnectionClosed)?;
            let n = connection.read(&mut self.buffer[self.buffer_pos..]).await?;
            self.buffer_pos += n;
        }
    }
}
