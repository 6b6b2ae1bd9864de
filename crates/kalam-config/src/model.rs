// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Kalam chatbot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject
//! unrecognized config keys at startup. The `[pipeline]` and
//! `[training]` sections replace the original deployment's global
//! mutable flag constants; `[data]` replaces its global path constants.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Kalam configuration.
///
/// Loaded from `kalam.toml` with `KALAM_*` environment overrides. All
/// sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KalamConfig {
    /// Data directory layout for raw, processed, and training artifacts.
    #[serde(default)]
    pub data: DataConfig,

    /// Startup data-preparation stages, each independently toggled.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Startup training runs, each independently toggled.
    #[serde(default)]
    pub training: TrainingConfig,

    /// Served chatbot settings.
    #[serde(default)]
    pub chatbot: ChatbotConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Generation service (Gemini) settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Data directory layout. Every pipeline artifact path derives from
/// these four roots, so tests can point the whole system at a tempdir.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Directory holding the raw CSV exports.
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    /// Directory for normalized and merged JSON artifacts.
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,

    /// Directory for training corpora.
    #[serde(default = "default_training_dir")]
    pub training_dir: PathBuf,

    /// Root directory for persisted model bundles (one subdirectory
    /// per algorithm).
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
            training_dir: default_training_dir(),
            models_dir: default_models_dir(),
        }
    }
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

fn default_training_dir() -> PathBuf {
    PathBuf::from("data/training")
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models/saved")
}

impl DataConfig {
    pub fn contacts_csv(&self) -> PathBuf {
        self.raw_dir.join("contacts.csv")
    }

    pub fn conversations_csv(&self) -> PathBuf {
        self.raw_dir.join("conversations-csv.csv")
    }

    pub fn messages_csv(&self) -> PathBuf {
        self.raw_dir.join("messages-csv.csv")
    }

    pub fn contacts_clean(&self) -> PathBuf {
        self.processed_dir.join("contacts_clean.json")
    }

    pub fn conversations_clean(&self) -> PathBuf {
        self.processed_dir.join("conversations_clean.json")
    }

    pub fn messages_clean(&self) -> PathBuf {
        self.processed_dir.join("messages_clean.json")
    }

    pub fn merged_data(&self) -> PathBuf {
        self.processed_dir.join("merged_data.json")
    }

    pub fn training_dataset(&self) -> PathBuf {
        self.training_dir.join("training_dataset.json")
    }

    pub fn cleaned_training_data(&self) -> PathBuf {
        self.training_dir.join("cleaned_training_data.json")
    }

    /// The synthetic corpus doubles as the canonical training and
    /// response-retrieval corpus once generation has run.
    pub fn synthetic_conversations(&self) -> PathBuf {
        self.training_dir.join("synthetic_conversations.json")
    }
}

/// Startup data-preparation flags. Stages run in declaration order;
/// one stage failing never blocks the next.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Re-derive clean JSON from the raw CSV exports.
    #[serde(default)]
    pub auto_clean_data: bool,

    /// Rebuild the merged conversations+messages artifact.
    #[serde(default)]
    pub auto_merge_data: bool,

    /// Rebuild the text-filtered training corpus.
    #[serde(default)]
    pub auto_prepare_training_dataset: bool,

    /// Generate an initial synthetic corpus from scratch.
    #[serde(default)]
    pub auto_generate_synthetic_data: bool,

    /// Incrementally enlarge the synthetic corpus.
    #[serde(default)]
    pub auto_augment_synthetic_data: bool,

    /// Run the LLM-backed corpus cleaner over the training corpus.
    #[serde(default)]
    pub auto_clean_training_data: bool,
}

/// Startup training flags, one per algorithm.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    #[serde(default)]
    pub auto_train_random_forest: bool,

    #[serde(default)]
    pub auto_train_naive_bayes: bool,

    #[serde(default)]
    pub auto_train_logistic_regression: bool,

    #[serde(default)]
    pub auto_train_lstm: bool,
}

/// Served chatbot settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatbotConfig {
    /// Algorithm whose bundle backs the live chatbot.
    #[serde(default = "default_chatbot_algorithm")]
    pub algorithm: String,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            algorithm: default_chatbot_algorithm(),
        }
    }
}

fn default_chatbot_algorithm() -> String {
    "logistic_regression".to_string()
}

/// HTTP gateway settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_port() -> u16 {
    5000
}

/// Generation service (Gemini) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` disables every generation-backed stage.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier for generateContent requests.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL. Overridable for tests.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Total synthetic conversations the augmentor aims for.
    #[serde(default = "default_augment_target")]
    pub augment_target: usize,

    /// Conversations requested per generation batch.
    #[serde(default = "default_augment_batch_size")]
    pub augment_batch_size: usize,

    /// Real conversations sampled as examples for each batch prompt.
    #[serde(default = "default_augment_sample_size")]
    pub augment_sample_size: usize,

    /// Conversations sent per corpus-cleaning batch.
    #[serde(default = "default_clean_batch_size")]
    pub clean_batch_size: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            augment_target: default_augment_target(),
            augment_batch_size: default_augment_batch_size(),
            augment_sample_size: default_augment_sample_size(),
            clean_batch_size: default_clean_batch_size(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_augment_target() -> usize {
    200
}

fn default_augment_batch_size() -> usize {
    10
}

fn default_augment_sample_size() -> usize {
    20
}

fn default_clean_batch_size() -> usize {
    5
}
