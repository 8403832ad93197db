// src/errors.rs

//! Crate-wide error taxonomy and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CycleflowError {
    /// Unparsable ISO8601 duration specification.
    #[error("malformed duration: {0}")]
    MalformedDuration(String),

    /// Unparsable cycle point string.
    #[error("malformed cycle point: {0}")]
    MalformedCyclePoint(String),

    /// A graph template could not be resolved at definition-load time.
    ///
    /// Fatal to loading that workflow version; never raised on a live
    /// task instance.
    #[error("graph definition error: {0}")]
    GraphDefinition(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CycleflowError>;
