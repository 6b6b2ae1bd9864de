// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classification and response retrieval engine.
//!
//! The runtime core of Kalam: load a persisted model bundle plus the
//! labeled corpus once, then answer any number of concurrent requests
//! from that immutable state. See [`Chatbot`].

pub mod engine;

pub use engine::{Chatbot, FALLBACK_RESPONSE, NO_MATCH_RESPONSE};
