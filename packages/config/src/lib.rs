// ABOUTME: Configuration and environment variable management
// ABOUTME: Provides the typed Config loaded from the process environment

pub mod config;
pub mod constants;

pub use config::{Config, ConfigError};
