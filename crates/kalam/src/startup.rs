// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup stage orchestration.
//!
//! Every auto flag runs its stage in declaration order, and every
//! stage is isolated: a failure is logged and the next stage still
//! runs. A missing raw export therefore never prevents training, and a
//! failed training run never prevents serving.

use tracing::{error, info, warn};

use kalam_config::KalamConfig;
use kalam_core::KalamError;
use kalam_gemini::GeminiClient;
use kalam_model::Algorithm;
use kalam_pipeline::{
    clean_contacts, clean_conversations, clean_messages, merge_files, prepare_training_dataset,
};

/// Log one stage's outcome without propagating it.
fn log_stage(stage: &str, result: Result<usize, KalamError>) {
    match result {
        Ok(count) => info!(stage, count, "stage finished"),
        Err(e) => error!(stage, error = %e, "stage failed, continuing"),
    }
}

/// Run the flag-gated preparation stages (clean, merge, prepare).
///
/// With `force` the flags are ignored and all three stages run; the
/// `kalam pipeline` subcommand uses that path.
pub fn run_preparation_stages(config: &KalamConfig, force: bool) {
    let data = &config.data;

    if force || config.pipeline.auto_clean_data {
        info!("cleaning raw exports");
        log_stage(
            "clean contacts",
            clean_contacts(&data.contacts_csv(), &data.contacts_clean()),
        );
        log_stage(
            "clean conversations",
            clean_conversations(&data.conversations_csv(), &data.conversations_clean()),
        );
        log_stage(
            "clean messages",
            clean_messages(&data.messages_csv(), &data.messages_clean()),
        );
    }

    if force || config.pipeline.auto_merge_data {
        log_stage(
            "merge data",
            merge_files(
                &data.conversations_clean(),
                &data.messages_clean(),
                &data.merged_data(),
            ),
        );
    }

    if force || config.pipeline.auto_prepare_training_dataset {
        log_stage(
            "prepare training dataset",
            prepare_training_dataset(&data.merged_data(), &data.training_dataset()),
        );
    }
}

/// Run the flag-gated generation stages against the Gemini service.
async fn run_generation_stages(config: &KalamConfig) {
    let pipeline = &config.pipeline;
    if !(pipeline.auto_generate_synthetic_data
        || pipeline.auto_augment_synthetic_data
        || pipeline.auto_clean_training_data)
    {
        return;
    }

    let Some(api_key) = config.gemini.api_key.as_deref() else {
        warn!("generation stages enabled but gemini.api_key is unset, skipping");
        return;
    };
    let client = match GeminiClient::new(api_key, &config.gemini.model, &config.gemini.base_url) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "could not construct the generation client, skipping");
            return;
        }
    };

    let data = &config.data;
    if pipeline.auto_generate_synthetic_data {
        log_stage(
            "generate synthetic data",
            kalam_gemini::generate_synthetic_data(
                &client,
                &data.training_dataset(),
                &data.synthetic_conversations(),
            )
            .await,
        );
    }

    if pipeline.auto_augment_synthetic_data {
        log_stage(
            "augment synthetic data",
            kalam_gemini::augment_synthetic_data(
                &client,
                &data.cleaned_training_data(),
                &data.synthetic_conversations(),
                config.gemini.augment_target,
                config.gemini.augment_batch_size,
                config.gemini.augment_sample_size,
            )
            .await,
        );
    }

    if pipeline.auto_clean_training_data {
        log_stage(
            "clean training data",
            kalam_gemini::clean_training_data(
                &client,
                &data.training_dataset(),
                &data.cleaned_training_data(),
                config.gemini.clean_batch_size,
            )
            .await,
        );
    }
}

/// Train one algorithm, logging the outcome instead of propagating it.
pub fn train_algorithm(config: &KalamConfig, algorithm: Algorithm) {
    info!(algorithm = %algorithm, "training");
    match kalam_model::train(
        &config.data.synthetic_conversations(),
        &config.data.models_dir,
        algorithm,
    ) {
        Ok(report) => info!(
            algorithm = %algorithm,
            accuracy = report.accuracy,
            f1_score = report.f1_score,
            "training finished"
        ),
        Err(e) => error!(algorithm = %algorithm, error = %e, "training failed, continuing"),
    }
}

/// Run the flag-gated training stages.
fn run_training_stages(config: &KalamConfig) {
    let training = &config.training;
    let flags = [
        (training.auto_train_random_forest, Algorithm::RandomForest),
        (training.auto_train_naive_bayes, Algorithm::NaiveBayes),
        (
            training.auto_train_logistic_regression,
            Algorithm::LogisticRegression,
        ),
        (training.auto_train_lstm, Algorithm::Lstm),
    ];
    for (enabled, algorithm) in flags {
        if enabled {
            train_algorithm(config, algorithm);
        }
    }
}

/// Run every enabled startup stage in order: preparation, generation,
/// training.
pub async fn run_startup_stages(config: &KalamConfig) {
    run_preparation_stages(config, false);
    run_generation_stages(config).await;
    run_training_stages(config);
}
