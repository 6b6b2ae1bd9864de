// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Kalam chatbot.
//!
//! One business endpoint, `POST /chatbot_response`, forwarding a
//! message to the loaded [`kalam_chatbot::Chatbot`] and returning its
//! reply, plus an unauthenticated `GET /health`. The engine state is
//! injected into handlers through axum state, not a hidden global: a
//! failed chatbot load is represented as `AppState { chatbot: None }`
//! and every request then receives the fixed maintenance response with
//! status 503.

pub mod handlers;
pub mod server;

pub use handlers::{INVALID_MESSAGE_RESPONSE, MAINTENANCE_RESPONSE};
pub use server::{router, start_server, AppState};
