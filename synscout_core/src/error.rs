/*============================================================
  Synavera Project: Syn-Scout
  Module: synscout_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Syn-Scout error types to provide consistent
    diagnostics and exit semantics for fetch, extraction and
    persistence failures.

  Security / Safety Notes:
    Error contexts expose URLs and high-level paths only; page
    bodies are never embedded in diagnostics.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate recoverable failures and
    consolidate exit codes for the binary entry point.

  Revision History:
    2024-11-04 COD  Established shared error definitions.
    2025-11-12 COD  Split fetch/extraction/persistence taxonomy.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Syn-Scout operations.
pub type Result<T> = std::result::Result<T, SynscoutError>;

/// Failures raised while loading the vendor page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Browser launch failed: {0}")]
    Launch(String),
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("Page load of {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },
    #[error("Page {url} appears blocked ({marker})")]
    Blocked { url: String, marker: String },
    #[error("Failed to read page snapshot {path}: {reason}")]
    Source { path: String, reason: String },
}

/// Failures raised while turning page markup into a release record.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("No `Version 8 Update N` marker found in page")]
    MissingVersion,
    #[error("No recognised platform download links found in page")]
    NoDownloadsFound,
}

/// Existing archive could not be used; the run continues with a fresh document.
#[derive(Debug, Error)]
#[error("Archive {path} unusable: {reason}")]
pub struct PersistenceError {
    pub path: String,
    pub reason: String,
}

/// Enumerates high-level error domains surfaced by Syn-Scout.
#[derive(Debug, Error)]
pub enum SynscoutError {
    #[error("Fetch: {0}")]
    Fetch(#[from] FetchError),
    #[error("Extraction: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SynscoutError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    pub(crate) fn code(&self) -> u8 {
        match self {
            SynscoutError::Config(_) => 20,
            SynscoutError::Fetch(_) => 30,
            SynscoutError::Serialization(_) => 31,
            SynscoutError::Extraction(_) => 35,
            SynscoutError::Filesystem(_) => 40,
            SynscoutError::Io(_) => 41,
        }
    }
}
