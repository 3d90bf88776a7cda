use crate::detail::ExtractError;
use crate::repository::GitError;
use thiserror::Error;

/// Everything that can abort a sync run. None of these are retried internally;
/// re-running the tool is safe because already-recorded submissions are skipped.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("Unknown problem: {0}")]
    UnknownProblem(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Submission page has an unexpected format: {0}")]
    MalformedPage(#[from] ExtractError),

    #[error("Submission page is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Submission {0} carries no source code")]
    MissingSourceCode(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
