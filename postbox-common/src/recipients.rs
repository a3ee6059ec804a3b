//! Recipient sets and the header lists rendered from them.

use ahash::AHashMap;

use crate::{
    address::{self, Address},
    error::{AddressField, ValidationError},
};

/// Addresses mapped to display names.
///
/// Adding an address twice keeps only the latest name. Iteration order is
/// unspecified, so neither [`RecipientSet::header_value`] nor
/// [`RecipientSet::envelope`] promise any particular ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientSet(AHashMap<Address, String>);

impl RecipientSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates each address and collects the pairs into a set.
    ///
    /// # Errors
    ///
    /// Returns the first address that fails validation, tagged with `field`.
    pub fn try_from_pairs<I, A, N>(pairs: I, field: AddressField) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (A, N)>,
        A: Into<String>,
        N: Into<String>,
    {
        let mut set = Self::new();
        for (address, name) in pairs {
            set.insert(Address::parse(address, field)?, name);
        }
        Ok(set)
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, address: Address, name: impl Into<String>) {
        self.0.insert(address, name.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &str)> {
        self.0.iter().map(|(address, name)| (address, name.as_str()))
    }

    /// Renders every entry for a `To`/`Cc` header, joined by `", "`.
    #[must_use]
    pub fn header_value(&self) -> String {
        self.iter()
            .map(|(address, name)| address::display(address, name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The bracketed addresses, for use as envelope recipients.
    pub fn envelope(&self) -> impl Iterator<Item = String> + '_ {
        self.0.keys().map(Address::normalized)
    }
}

impl Extend<(Address, String)> for RecipientSet {
    fn extend<T: IntoIterator<Item = (Address, String)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for RecipientSet {
    type Item = (Address, String);
    type IntoIter = std::collections::hash_map::IntoIter<Address, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(Address, String)> for RecipientSet {
    fn from_iter<T: IntoIterator<Item = (Address, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
