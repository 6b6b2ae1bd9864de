// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kalam - CRM intent chatbot.
//!
//! Binary entry point: loads configuration, then dispatches to the
//! data pipeline, the trainers, or the serving gateway.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing::error;

use kalam_chatbot::Chatbot;
use kalam_config::KalamConfig;
use kalam_core::KalamError;
use kalam_model::{Algorithm, ModelBundle};

mod serve;
mod startup;

/// Kalam - CRM intent chatbot.
#[derive(Parser, Debug)]
#[command(name = "kalam", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the configured startup stages, then serve the chatbot over HTTP.
    Serve,
    /// Run the data-preparation stages: clean, merge, prepare.
    Pipeline,
    /// Train one algorithm, or all of them.
    Train {
        /// random_forest, naive_bayes, logistic_regression, lstm, or "all".
        #[arg(long, default_value = "all")]
        algorithm: String,
    },
    /// Print the persisted evaluation reports side by side.
    Compare,
    /// Classify a message and print the predicted intent.
    Predict {
        message: String,
        /// Algorithm whose bundle performs the prediction.
        #[arg(long)]
        algorithm: Option<String>,
    },
    /// Print the chatbot's reply to a message.
    Respond {
        message: String,
        /// Algorithm whose bundle backs the reply.
        #[arg(long)]
        algorithm: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match kalam_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            kalam_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(&config).await,
        Some(Commands::Pipeline) => run_pipeline(&config),
        Some(Commands::Train { algorithm }) => run_train(&config, &algorithm),
        Some(Commands::Compare) => run_compare(&config),
        Some(Commands::Predict { message, algorithm }) => {
            run_predict(&config, &message, algorithm.as_deref())
        }
        Some(Commands::Respond { message, algorithm }) => {
            run_respond(&config, &message, algorithm.as_deref())
        }
        None => {
            println!("kalam: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

/// Run the three preparation stages unconditionally, each isolated.
fn run_pipeline(config: &KalamConfig) -> Result<(), KalamError> {
    startup::run_preparation_stages(config, true);
    Ok(())
}

/// Train one named algorithm, or every algorithm with failures isolated.
fn run_train(config: &KalamConfig, algorithm: &str) -> Result<(), KalamError> {
    if algorithm == "all" {
        for algorithm in Algorithm::ALL {
            startup::train_algorithm(config, algorithm);
        }
        return Ok(());
    }
    let algorithm = Algorithm::from_str(algorithm).map_err(|_| KalamError::InvalidAlgorithm {
        name: algorithm.to_string(),
    })?;
    let report = kalam_model::train(
        &config.data.synthetic_conversations(),
        &config.data.models_dir,
        algorithm,
    )?;
    println!(
        "{algorithm}: accuracy={:.4} precision={:.4} recall={:.4} f1_score={:.4}",
        report.accuracy, report.precision, report.recall, report.f1_score
    );
    Ok(())
}

/// Print every persisted metrics report as a table.
fn run_compare(config: &KalamConfig) -> Result<(), KalamError> {
    let results = kalam_model::compare(&config.data.models_dir);
    if results.is_empty() {
        println!("no trained models found under {}", config.data.models_dir.display());
        return Ok(());
    }
    println!(
        "{:<22} {:>9} {:>10} {:>8} {:>9}",
        "model", "accuracy", "precision", "recall", "f1_score"
    );
    for (algorithm, report) in results {
        println!(
            "{:<22} {:>9.4} {:>10.4} {:>8.4} {:>9.4}",
            algorithm.to_string(),
            report.accuracy,
            report.precision,
            report.recall,
            report.f1_score
        );
    }
    Ok(())
}

/// Classify a message with one algorithm's bundle and print the label.
fn run_predict(
    config: &KalamConfig,
    message: &str,
    algorithm: Option<&str>,
) -> Result<(), KalamError> {
    let name = algorithm.unwrap_or(&config.chatbot.algorithm);
    let algorithm = Algorithm::from_str(name).map_err(|_| KalamError::InvalidAlgorithm {
        name: name.to_string(),
    })?;
    let bundle = ModelBundle::load(&config.data.models_dir, algorithm)?;

    let row = bundle.vectorizer.transform(message);
    let label = bundle
        .label_encoder
        .decode(bundle.classifier.predict(&row))
        .unwrap_or("unknown");
    println!("{label}");
    Ok(())
}

/// Answer a message through the full retrieval engine and print the reply.
fn run_respond(
    config: &KalamConfig,
    message: &str,
    algorithm: Option<&str>,
) -> Result<(), KalamError> {
    let name = algorithm.unwrap_or(&config.chatbot.algorithm);
    let chatbot = Chatbot::load(
        &config.data.models_dir,
        &config.data.synthetic_conversations(),
        name,
    )?;
    println!("{}", chatbot.respond(message));
    Ok(())
}

/// Initializes the tracing subscriber with the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kalam={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
