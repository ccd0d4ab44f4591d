//! Application configuration module
//!
//! Handles environment variables, the optional JSON override file and
//! application-wide constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::{Config, ConfigError, DatabaseSettings};
