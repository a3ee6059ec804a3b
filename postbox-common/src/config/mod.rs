//! Connection settings for the submission server.

mod timeouts;

use serde::{Deserialize, Serialize};

pub use timeouts::Timeouts;

/// Submission port used with STARTTLS (RFC 6409).
pub const SUBMISSION_PORT: u16 = 587;

/// Plain SMTP port.
pub const SMTP_PORT: u16 = 25;

/// Where and how to connect for a send.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,

    /// Explicit port. `None` (or `0`) picks a default from `use_tls`.
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Require STARTTLS before authenticating.
    ///
    /// Default: `true`
    #[serde(default = "defaults::use_tls")]
    pub use_tls: bool,

    /// Skip certificate verification.
    ///
    /// **SECURITY WARNING**: only for testing against self-signed servers.
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Name we introduce ourselves with in EHLO.
    ///
    /// Default: `localhost`
    #[serde(default = "defaults::helo_name")]
    pub helo_name: String,

    #[serde(default)]
    pub timeouts: Timeouts,
}

impl ConnectionConfig {
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            username: String::new(),
            password: String::new(),
            use_tls: defaults::use_tls(),
            accept_invalid_certs: false,
            helo_name: defaults::helo_name(),
            timeouts: Timeouts::default(),
        }
    }

    /// The port to connect to: an explicit non-zero port, otherwise 587 with
    /// TLS or 25 without.
    #[must_use]
    pub fn resolved_port(&self) -> u16 {
        match self.port {
            Some(port) if port > 0 => port,
            _ if self.use_tls => SUBMISSION_PORT,
            _ => SMTP_PORT,
        }
    }

    /// `host:port` for connecting.
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.resolved_port())
    }

    /// Whether AUTH should be attempted.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

// Hand-written so the password never lands in logs.
impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("use_tls", &self.use_tls)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("helo_name", &self.helo_name)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

mod defaults {
    pub const fn use_tls() -> bool {
        true
    }

    pub fn helo_name() -> String {
        "localhost".to_string()
    }
}
