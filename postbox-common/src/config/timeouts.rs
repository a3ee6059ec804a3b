//! Timeout configuration for a submission session.
//!
//! Two independent bounds apply to every send:
//! - **connect**: establishing the TCP connection
//! - **total**: the whole session, from connect through QUIT

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeouts applied by the transport to a single send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// Timeout for establishing the TCP connection.
    ///
    /// Default: 10 seconds
    #[serde(default = "defaults::connect_secs")]
    pub connect_secs: u64,

    /// Upper bound on the entire session.
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::total_secs")]
    pub total_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub const fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    #[must_use]
    pub const fn total(&self) -> Duration {
        Duration::from_secs(self.total_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect_secs: defaults::connect_secs(),
            total_secs: defaults::total_secs(),
        }
    }
}

mod defaults {
    pub const fn connect_secs() -> u64 {
        10
    }

    pub const fn total_secs() -> u64 {
        30
    }
}
