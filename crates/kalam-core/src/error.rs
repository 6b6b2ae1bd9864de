// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for the Kalam pipeline, trainers, and chatbot engine.
//!
//! Malformed dates and payloads are deliberately absent from this enum:
//! they are recovered locally with sentinel values inside the pipeline
//! and never propagate as errors.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across all Kalam crates.
#[derive(Debug, Error)]
pub enum KalamError {
    /// A raw or intermediate data file is absent. The owning stage is
    /// skipped; sibling stages keep running.
    #[error("source not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// No usable rows remain after filtering. Dependent training aborts.
    #[error("corpus is empty: {path}")]
    CorpusEmpty { path: PathBuf },

    /// The external generation service failed after bounded retries.
    #[error("external service error: {message}")]
    ExternalService { message: String },

    /// A model bundle artifact or the retrieval corpus could not be
    /// loaded at inference time.
    #[error("model load error: {message}")]
    ModelLoad { message: String },

    /// Inference was requested for an algorithm with no servable bundle.
    /// Rejected before any file I/O.
    #[error("invalid algorithm name: {name}")]
    InvalidAlgorithm { name: String },

    /// Configuration errors surfaced outside the config crate's own
    /// diagnostic path.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors, with the offending path attached.
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON artifact exists but does not parse.
    #[error("malformed json at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl KalamError {
    /// Wrap an I/O error, mapping `NotFound` to [`KalamError::SourceNotFound`]
    /// so callers can skip missing-source stages without string matching.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            KalamError::SourceNotFound { path }
        } else {
            KalamError::Io { path, source }
        }
    }
}
