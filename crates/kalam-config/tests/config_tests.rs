// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Kalam configuration system.

use std::path::PathBuf;

use kalam_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_kalam_config() {
    let toml = r#"
log_level = "debug"

[data]
raw_dir = "exports/raw"
processed_dir = "exports/processed"
training_dir = "exports/training"
models_dir = "exports/models"

[pipeline]
auto_clean_data = true
auto_merge_data = true
auto_prepare_training_dataset = true

[training]
auto_train_naive_bayes = true

[chatbot]
algorithm = "naive_bayes"

[gateway]
host = "127.0.0.1"
port = 8080

[gemini]
api_key = "test-key"
model = "gemini-2.5-flash"
augment_target = 50
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.data.raw_dir, PathBuf::from("exports/raw"));
    assert_eq!(
        config.data.contacts_csv(),
        PathBuf::from("exports/raw/contacts.csv")
    );
    assert!(config.pipeline.auto_clean_data);
    assert!(config.pipeline.auto_merge_data);
    assert!(config.pipeline.auto_prepare_training_dataset);
    assert!(!config.pipeline.auto_generate_synthetic_data);
    assert!(config.training.auto_train_naive_bayes);
    assert!(!config.training.auto_train_lstm);
    assert_eq!(config.chatbot.algorithm, "naive_bayes");
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.gemini.api_key.as_deref(), Some("test-key"));
    assert_eq!(config.gemini.augment_target, 50);
}

/// Unknown field in a section produces an error.
#[test]
fn unknown_field_in_pipeline_produces_error() {
    let toml = r#"
[pipeline]
auto_clean_dta = true
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("auto_clean_dta"),
        "error should mention the bad key, got: {err_str}"
    );
}

/// Missing sections use defaults without error.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.log_level, "info");
    assert_eq!(config.data.raw_dir, PathBuf::from("data/raw"));
    assert_eq!(config.chatbot.algorithm, "logistic_regression");
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 5000);
    assert!(config.gemini.api_key.is_none());
    assert_eq!(config.gemini.augment_target, 200);
    assert_eq!(config.gemini.augment_batch_size, 10);
    assert_eq!(config.gemini.augment_sample_size, 20);
    assert_eq!(config.gemini.clean_batch_size, 5);
}

/// Environment variable KALAM_CHATBOT_ALGORITHM overrides the TOML value.
#[test]
fn env_var_overrides_chatbot_algorithm() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "kalam.toml",
            r#"
[chatbot]
algorithm = "naive_bayes"
"#,
        )?;
        jail.set_env("KALAM_CHATBOT_ALGORITHM", "random_forest");

        let config = kalam_config::load_config().expect("config should load");
        assert_eq!(config.chatbot.algorithm, "random_forest");
        Ok(())
    });
}

/// KALAM_DATA_TRAINING_DIR maps into the data section even though
/// `training` is itself a section name.
#[test]
fn env_var_data_training_dir_maps_to_data_section() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("KALAM_DATA_TRAINING_DIR", "/tmp/training");

        let config = kalam_config::load_config().expect("config should load");
        assert_eq!(config.data.training_dir, PathBuf::from("/tmp/training"));
        Ok(())
    });
}

/// Validation failures come back as diagnostics, not panics.
#[test]
fn invalid_algorithm_fails_validation() {
    let toml = r#"
[chatbot]
algorithm = "transformer"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("transformer"));
}
