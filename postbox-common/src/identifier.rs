//! `Date` and `Message-ID` header values.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Domain used when an address has nothing after its `@`.
///
/// Validated addresses always have a domain, so this only shows up if an
/// unvalidated string slips through.
pub const FALLBACK_DOMAIN: &str = "invalid-domain.com";

const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// The current UTC time formatted for a `Date` header,
/// e.g. `Sun, 29 Jun 2025 03:26:13 GMT`.
#[must_use]
pub fn current_date_header() -> String {
    date_header(Utc::now())
}

/// Formats `instant` for a `Date` header.
#[must_use]
pub fn date_header(instant: DateTime<Utc>) -> String {
    instant.format(DATE_FORMAT).to_string()
}

/// Returns everything after the first `@` in `address`.
///
/// Falls back to [`FALLBACK_DOMAIN`] when there is no `@` or nothing follows it.
#[must_use]
pub fn domain_of(address: &str) -> &str {
    match address.split_once('@') {
        Some((_, domain)) if !domain.is_empty() => domain,
        _ => FALLBACK_DOMAIN,
    }
}

/// Generates a `Message-ID` of the form `<seconds.random@domain>`.
///
/// Uniqueness comes from the timestamp plus a six digit random number. That
/// is good enough to tell messages apart; it is not a security token.
#[must_use]
pub fn generate_message_id(domain: &str) -> String {
    message_id_at(Utc::now(), domain)
}

fn message_id_at(instant: DateTime<Utc>, domain: &str) -> String {
    let random: u32 = rand::rng().random_range(100_000..=999_999);
    format!("<{}.{random}@{domain}>", instant.timestamp())
}
