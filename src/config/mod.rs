//! Layered configuration for planet-service
//!
//! # Priority (lowest to highest)
//! 1. `default.toml`
//! 2. `{environment}.toml`
//! 3. `local.toml` (not committed)
//! 4. `PLANET_*` environment variables
//! 5. Command-line overrides (see [`crate::cli`])

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, ConsoleSettings, DatabaseConfig, FileSettings, LoggerSettings,
    ServerConfig, Settings,
};
