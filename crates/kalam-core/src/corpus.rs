// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON artifact I/O shared by every pipeline stage.
//!
//! Each stage reads one artifact and writes the next; nothing is
//! mutated in place, so a crashed stage leaves its input intact.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::conversation::Conversation;
use crate::error::KalamError;

/// Read any JSON artifact. Missing file maps to
/// [`KalamError::SourceNotFound`]; malformed content to
/// [`KalamError::Json`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, KalamError> {
    let raw = std::fs::read_to_string(path).map_err(|e| KalamError::from_io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| KalamError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write a JSON artifact, creating parent directories as needed.
///
/// Output is pretty-printed UTF-8 with non-ASCII characters kept
/// verbatim, so the Arabic and French corpus text stays readable.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), KalamError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| KalamError::from_io(parent, e))?;
    }
    let rendered = serde_json::to_string_pretty(value).map_err(|e| KalamError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, rendered).map_err(|e| KalamError::from_io(path, e))
}

/// Read a training corpus (a JSON array of [`Conversation`]).
pub fn read_corpus(path: &Path) -> Result<Vec<Conversation>, KalamError> {
    read_json(path)
}

/// Read a training corpus, failing with [`KalamError::CorpusEmpty`]
/// when it holds no conversations. Used by stages that cannot proceed
/// on an empty corpus (training, augmentation seeding).
pub fn read_non_empty_corpus(path: &Path) -> Result<Vec<Conversation>, KalamError> {
    let corpus = read_corpus(path)?;
    if corpus.is_empty() {
        return Err(KalamError::CorpusEmpty {
            path: path.to_path_buf(),
        });
    }
    Ok(corpus)
}

/// Write a training corpus.
pub fn write_corpus(path: &Path, corpus: &[Conversation]) -> Result<(), KalamError> {
    write_json(path, &corpus)
}
