//! Error types for building and sending robot messages

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid message: {0}")]
    Validation(String),

    #[error("malformed news document {path}: {source}")]
    NewsDocument {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook rejected message (HTTP {status}, errcode {}, errmsg {})",
        errcode.map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
        errmsg.as_deref().unwrap_or("-"))]
    Rejected {
        status: u16,
        errcode: Option<i64>,
        errmsg: Option<String>,
    },

    #[error("fetching image {url} failed with HTTP {status}")]
    ImageFetch { url: String, status: u16 },
}

/// Coarse classification used for reporting and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Transport,
    Input,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Configuration,
            Error::Validation(_) | Error::NewsDocument { .. } => ErrorKind::Validation,
            Error::Http(_) | Error::Rejected { .. } | Error::ImageFetch { .. } => {
                ErrorKind::Transport
            }
            Error::Io { .. } => ErrorKind::Input,
        }
    }

    /// Process exit status for this error. 2 matches clap's usage errors.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Configuration => 2,
            ErrorKind::Validation => 3,
            ErrorKind::Transport => 4,
            ErrorKind::Input => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
