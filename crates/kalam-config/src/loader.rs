// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order: compiled defaults < `./kalam.toml` < `KALAM_*`
//! environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::KalamConfig;

/// Load configuration from `./kalam.toml` with env var overrides.
pub fn load_config() -> Result<KalamConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KalamConfig::default()))
        .merge(Toml::file("kalam.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<KalamConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KalamConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KalamConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KalamConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Recognized section names for environment key mapping.
const SECTIONS: &[&str] = &[
    "data", "pipeline", "training", "chatbot", "gateway", "gemini",
];

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-heavy
/// keys stay unambiguous: `KALAM_PIPELINE_AUTO_CLEAN_DATA` must map to
/// `pipeline.auto_clean_data`, not `pipeline.auto.clean.data`. Only the
/// leading section name is rewritten; `KALAM_DATA_TRAINING_DIR` maps to
/// `data.training_dir` even though `training` is itself a section.
fn env_provider() -> Env {
    Env::prefixed("KALAM_").map(|key| {
        let key_str = key.as_str();
        for section in SECTIONS {
            if let Some(rest) = key_str.strip_prefix(&format!("{section}_")) {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.into()
    })
}
