//! Building blocks shared by the postbox crates.
//!
//! Everything here is pure and synchronous: address validation and
//! rendering, recipient sets, line ending normalisation, message identifiers,
//! connection configuration and logging setup.

pub mod address;
pub mod config;
pub mod error;
pub mod identifier;
pub mod line_ending;
pub mod logging;
pub mod recipients;

pub use address::{Address, NamedAddress};
pub use error::{AddressField, ValidationError};
pub use recipients::RecipientSet;
pub use tracing;
