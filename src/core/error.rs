use std::path::PathBuf;

use thiserror::Error;

use crate::ports::{http_client::HttpClientError, prompt::PromptError};

/// Selection level a resolution step operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionLevel {
    Ingress,
    Rule,
    Path,
    Method,
}

impl std::fmt::Display for SelectionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SelectionLevel::Ingress => "ingress",
            SelectionLevel::Rule => "rule",
            SelectionLevel::Path => "path",
            SelectionLevel::Method => "method",
        };
        f.write_str(name)
    }
}

/// Errors that stop a resolve / execute run.
///
/// None of these are retried; the binary reports them and exits non-zero.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProbeError {
    /// A named selection criterion matched nothing.
    #[error("{level} '{name}' not found")]
    NotFound { level: SelectionLevel, name: String },

    /// A level had nothing to choose from.
    #[error("no {level} candidates to choose from")]
    NoCandidates { level: SelectionLevel },

    /// Input ended before a valid selection was made.
    #[error("input ended before a selection was made")]
    InputExhausted,

    /// The terminal could not be read or written.
    #[error("prompt I/O error: {0}")]
    PromptIo(#[source] std::io::Error),

    /// A body token named a recognized file that could not be read.
    #[error("failed to read body file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request could not be built from the resolved target.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network-level failure while executing a request.
    #[error("transport error: {0}")]
    Transport(#[from] HttpClientError),
}

impl From<PromptError> for ProbeError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::InputExhausted => ProbeError::InputExhausted,
            PromptError::Io(e) => ProbeError::PromptIo(e),
        }
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;
