//! Command-line front end for postbox: request files and their discovery.

pub mod request;

pub use request::{SendRequest, find_config_file};
