// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Kalam intent chatbot.
//!
//! This crate provides the shared data model (conversations, messages,
//! decoded payloads), the error taxonomy, and corpus file I/O used by
//! the pipeline, trainer, and chatbot crates.

pub mod conversation;
pub mod corpus;
pub mod error;
pub mod payload;

// Re-export key items at crate root for ergonomic imports.
pub use conversation::{Conversation, Message, SenderType};
pub use error::KalamError;
pub use payload::MessagePayload;
