// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation rules.
//!
//! Figment guarantees shape; this module checks cross-field rules that
//! serde cannot express.

use crate::diagnostic::{suggest_key, ConfigError};
use crate::model::KalamConfig;

/// Algorithm names the trainer understands.
const KNOWN_ALGORITHMS: &[&str] = &[
    "random_forest",
    "naive_bayes",
    "logistic_regression",
    "lstm",
];

/// Validate a deserialized config, returning every violation at once.
pub fn validate_config(config: &KalamConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !KNOWN_ALGORITHMS.contains(&config.chatbot.algorithm.as_str()) {
        let suggestion = suggest_key(&config.chatbot.algorithm, KNOWN_ALGORITHMS);
        let hint = match suggestion {
            Some(s) => format!(" (did you mean `{s}`?)"),
            None => String::new(),
        };
        errors.push(ConfigError::Validation {
            message: format!(
                "chatbot.algorithm `{}` is not one of {}{hint}",
                config.chatbot.algorithm,
                KNOWN_ALGORITHMS.join(", ")
            ),
        });
    }

    let generation_enabled = config.pipeline.auto_generate_synthetic_data
        || config.pipeline.auto_augment_synthetic_data
        || config.pipeline.auto_clean_training_data;
    if generation_enabled && config.gemini.api_key.is_none() {
        errors.push(ConfigError::Validation {
            message: "a generation-backed pipeline stage is enabled but gemini.api_key is unset"
                .to_string(),
        });
    }

    if config.gemini.augment_batch_size == 0 || config.gemini.clean_batch_size == 0 {
        errors.push(ConfigError::Validation {
            message: "gemini batch sizes must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&KalamConfig::default()).is_ok());
    }

    #[test]
    fn unknown_chatbot_algorithm_is_rejected_with_suggestion() {
        let mut config = KalamConfig::default();
        config.chatbot.algorithm = "logistic_regresion".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        let rendered = errors[0].to_string();
        assert!(rendered.contains("logistic_regresion"), "got: {rendered}");
    }

    #[test]
    fn generation_stage_without_api_key_is_rejected() {
        let mut config = KalamConfig::default();
        config.pipeline.auto_augment_synthetic_data = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("gemini.api_key"));
    }

    #[test]
    fn generation_stage_with_api_key_is_accepted() {
        let mut config = KalamConfig::default();
        config.pipeline.auto_augment_synthetic_data = true;
        config.gemini.api_key = Some("key".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = KalamConfig::default();
        config.gemini.clean_batch_size = 0;
        assert!(validate_config(&config).is_err());
    }
}
