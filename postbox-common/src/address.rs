//! Email address validation and rendering.

use std::{
    fmt::{self, Display},
    ops::Deref,
    sync::LazyLock,
};

use regex::Regex;

use crate::{
    error::{AddressField, ValidationError},
    line_ending::header_safe,
};

/// A deliberately conservative `local@domain` pattern.
///
/// It rejects a lot that RFC 5322 permits (quoted local parts, address
/// literals, anything non-ASCII) and accepts a few odd things (`a@b..cc`),
/// which is the trade-off submission servers generally expect.
static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(
        clippy::expect_used,
        reason = "compile-time constant regex should be valid"
    )]
    let regex = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("address regex should be valid");
    regex
});

/// Returns `true` if `address` is syntactically acceptable.
#[must_use]
pub fn is_valid(address: &str) -> bool {
    ADDRESS_PATTERN.is_match(address)
}

/// Wraps `address` in angle brackets unless it already has them.
///
/// An empty address stays empty.
#[must_use]
pub fn normalize(address: &str) -> String {
    if address.is_empty() || (address.starts_with('<') && address.ends_with('>')) {
        address.to_string()
    } else {
        format!("<{address}>")
    }
}

/// Renders an address for a header, e.g. `"Joe Doe" <joe@example.com>`.
///
/// The name is quoted as-is: embedded `"` characters are *not* escaped.
/// Line breaks in the name are collapsed so they cannot start a new header.
#[must_use]
pub fn display(address: &str, name: &str) -> String {
    if address.is_empty() {
        return String::new();
    }

    if name.is_empty() {
        normalize(address)
    } else {
        format!("\"{}\" {}", header_safe(name), normalize(address))
    }
}

/// An address that has passed [`is_valid`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// Validates `address` for use in `field`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAddress`] naming `field` when the
    /// address does not match the accepted syntax.
    pub fn parse(address: impl Into<String>, field: AddressField) -> Result<Self, ValidationError> {
        let address = address.into();
        if is_valid(&address) {
            Ok(Self(address))
        } else {
            Err(ValidationError::InvalidAddress { field, address })
        }
    }

    /// The bracketed form used on the SMTP envelope.
    #[must_use]
    pub fn normalized(&self) -> String {
        normalize(&self.0)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for Address {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// An address paired with an optional display name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NamedAddress {
    pub address: Address,
    pub name: String,
}

impl NamedAddress {
    #[must_use]
    pub fn new(address: Address, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
        }
    }
}

impl Display for NamedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display(&self.address, &self.name))
    }
}
