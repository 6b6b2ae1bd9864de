// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Training-data preparation pipeline for the Kalam chatbot.
//!
//! Three stages, each reading one artifact and writing the next:
//!
//! 1. [`clean`] — raw CSV exports -> normalized JSON records
//! 2. [`merge`] — conversation records + message records -> merged
//!    conversations (joined on the message `sender_id` / conversation
//!    `contact_id` pair)
//! 3. [`prepare`] — merged conversations -> text-only training corpus

pub mod clean;
pub mod merge;
pub mod normalize;
pub mod prepare;

pub use clean::{clean_contacts, clean_conversations, clean_messages};
pub use merge::{assemble, merge_files, MergedConversation};
pub use normalize::{coerce_date, normalize, NormalizedRecord, TableSchema, DATE_FORMAT};
pub use prepare::{filter_to_training_text, prepare_training_dataset};
