//! The send request read from a RON file.

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use postbox_common::{AddressField, RecipientSet, ValidationError, config::ConnectionConfig};
use postbox_delivery::Message;
use serde::Deserialize;

/// Environment variable naming the request file.
pub const CONFIG_ENV: &str = "POSTBOX_CONFIG";

/// Where to look when neither `--config` nor [`CONFIG_ENV`] is given.
pub const DEFAULT_PATHS: [&str; 2] = ["./postbox.config.ron", "/etc/postbox/postbox.config.ron"];

/// Everything needed for one send.
///
/// ```ron
/// (
///     connection: (host: "smtp.example.com", username: "me", password: "secret"),
///     sender: { "me@example.com": "Me" },
///     recipients: { "you@example.com": "You" },
///     subject: "Hello",
///     body: "<p>Hi</p>",
/// )
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SendRequest {
    pub connection: ConnectionConfig,

    /// Exactly one address to display name entry.
    pub sender: AHashMap<String, String>,

    #[serde(default)]
    pub recipients: AHashMap<String, String>,

    #[serde(default)]
    pub cc_recipients: AHashMap<String, String>,

    #[serde(default)]
    pub bcc_recipients: AHashMap<String, String>,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub body: String,
}

impl SendRequest {
    /// Reads and parses a request file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't a valid request.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read request from {}: {}", path.display(), e)
        })?;

        ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse request {}: {}", path.display(), e))
    }

    /// Validates the addresses and assembles the message.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::SenderCount`] unless exactly one sender is
    /// given, or [`ValidationError::InvalidAddress`] for the first bad address.
    pub fn into_message(self) -> Result<Message, ValidationError> {
        let count = self.sender.len();
        let mut senders = self.sender.into_iter();
        let (Some((address, name)), None) = (senders.next(), senders.next()) else {
            return Err(ValidationError::SenderCount(count));
        };

        Message::builder()
            .sender(address, name)?
            .to_all(RecipientSet::try_from_pairs(
                self.recipients,
                AddressField::Recipient,
            )?)
            .cc_all(RecipientSet::try_from_pairs(
                self.cc_recipients,
                AddressField::Cc,
            )?)
            .bcc_all(RecipientSet::try_from_pairs(
                self.bcc_recipients,
                AddressField::Bcc,
            )?)
            .subject(self.subject)
            .body(self.body)
            .build()
    }
}

/// Find the request file using the following precedence:
/// 1. `explicit` (the `--config` argument)
/// 2. `POSTBOX_CONFIG` environment variable
/// 3. ./postbox.config.ron (current working directory)
/// 4. /etc/postbox/postbox.config.ron (system-wide)
///
/// # Errors
///
/// Returns an error if an explicitly named file doesn't exist, or if none of
/// the default locations has one.
pub fn find_config_file(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path);
        }
        anyhow::bail!("Request file does not exist: {}", path.display());
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        anyhow::bail!(
            "{CONFIG_ENV} points to non-existent file: {}",
            path.display()
        );
    }

    if let Some(path) = DEFAULT_PATHS.iter().map(PathBuf::from).find(|p| p.exists()) {
        return Ok(path);
    }

    let paths_tried = DEFAULT_PATHS
        .iter()
        .map(|p| format!("  - {p}"))
        .collect::<Vec<_>>()
        .join("\n");

    anyhow::bail!(
        "No request file found. Tried:\n  - --config\n  - {CONFIG_ENV} environment variable\n{paths_tried}"
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(ron: &str) -> SendRequest {
        ron::from_str(ron).unwrap()
    }

    #[test]
    fn test_minimal_request() {
        let request = parse(
            r#"(
                connection: (host: "smtp.example.com"),
                sender: { "me@example.com": "" },
                recipients: { "you@example.com": "You" },
            )"#,
        );

        assert_eq!(request.connection.resolved_port(), 587);
        assert!(request.cc_recipients.is_empty());
        assert_eq!(request.subject, "");

        let message = request.into_message().unwrap();
        assert_eq!(message.sender().to_string(), "<me@example.com>");
        assert_eq!(message.to().header_value(), "\"You\" <you@example.com>");
    }

    #[test]
    fn test_sender_must_be_single() {
        let none = parse(r#"(connection: (host: "h.example.com"), sender: {})"#);
        assert_eq!(none.into_message(), Err(ValidationError::SenderCount(0)));

        let two = parse(
            r#"(
                connection: (host: "h.example.com"),
                sender: { "a@example.com": "A", "b@example.com": "B" },
            )"#,
        );
        assert_eq!(two.into_message(), Err(ValidationError::SenderCount(2)));
    }

    #[test]
    fn test_invalid_cc_is_named() {
        let request = parse(
            r#"(
                connection: (host: "h.example.com"),
                sender: { "a@example.com": "A" },
                cc_recipients: { "not an address": "" },
            )"#,
        );

        assert_eq!(
            request.into_message(),
            Err(ValidationError::InvalidAddress {
                field: AddressField::Cc,
                address: "not an address".to_string(),
            })
        );
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let error = find_config_file(Some(PathBuf::from("/nonexistent/postbox.ron"))).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/postbox.ron"));
    }
}
