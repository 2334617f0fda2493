//! Typed failures that callers may want to match on. Everything else travels as
//! `anyhow::Error` with context attached at the I/O boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems with the input location. Never raised for individual lines.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("input is neither a regular file nor a directory: {}", path.display())]
    Unsupported { path: PathBuf },
}

/// Selection failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RankError {
    /// A non-empty ranking was required but nothing was observed.
    #[error("no keys observed; cannot select top {k}")]
    EmptyInput { k: usize },

    /// A date was selected without any author observed under it.
    #[error("no author observed for date {date}")]
    NoAuthorForDate { date: String },
}
