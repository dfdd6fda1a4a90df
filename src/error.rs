//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A structural pattern could not be compiled into a CSS selector.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// The page target could not be identified or loaded.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("no page target given")]
    Empty,
    #[error("`{0}` is neither an http(s) URL nor an existing file")]
    Unsupported(String),
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The round trip to the page worker failed.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error("extractor could not be loaded: {0}")]
    Inject(#[from] PatternError),
    #[error("malformed message: {0}")]
    Protocol(#[from] serde_json::Error),
    #[error("page worker closed without answering")]
    NoResponse,
    #[error("failed to start page worker: {0}")]
    Spawn(#[source] io::Error),
}

/// Writing to the system clipboard failed.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    Write(String),
}
