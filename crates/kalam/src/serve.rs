// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kalam serve` command implementation.
//!
//! Runs the configured startup stages, loads the chatbot once, and
//! hands the resulting state to the gateway. A failed load is not
//! fatal: the gateway starts anyway and serves the fixed maintenance
//! response until the process is restarted with working artifacts.

use std::sync::Arc;

use tracing::{error, info};

use kalam_chatbot::Chatbot;
use kalam_config::KalamConfig;
use kalam_core::KalamError;
use kalam_gateway::{start_server, AppState};

use crate::startup;

/// Runs the `kalam serve` command.
pub async fn run_serve(config: &KalamConfig) -> Result<(), KalamError> {
    startup::run_startup_stages(config).await;

    let state = match Chatbot::load(
        &config.data.models_dir,
        &config.data.synthetic_conversations(),
        &config.chatbot.algorithm,
    ) {
        Ok(chatbot) => {
            info!(algorithm = %config.chatbot.algorithm, "chatbot loaded");
            AppState {
                chatbot: Some(Arc::new(chatbot)),
            }
        }
        Err(e) => {
            error!(error = %e, "chatbot unavailable, serving maintenance responses");
            AppState { chatbot: None }
        }
    };

    start_server(&config.gateway.host, config.gateway.port, state).await
}
