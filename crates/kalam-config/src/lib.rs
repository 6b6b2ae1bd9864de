// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Kalam chatbot.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), environment variable overrides, and
//! diagnostic error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use kalam_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("serving algorithm: {}", config.chatbot.algorithm);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::KalamConfig;

/// Load configuration from `kalam.toml` + environment and validate it.
///
/// Returns either a valid [`KalamConfig`] or a list of diagnostic
/// errors ready for [`render_errors`].
pub fn load_and_validate() -> Result<KalamConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<KalamConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}
