//! Error types for the extraction pipeline.
//!
//! Only stream-fatal conditions show up here. Templates that fail to parse
//! are not errors: the parser returns an empty template and the locator
//! drops it.

use thiserror::Error;

/// Errors that abort an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Reading the input or writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tokenizer hit markup it cannot continue past.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A text node contained an entity that could not be resolved. Other
    /// text decoding failures are reported as [`ExtractError::Xml`].
    #[error("invalid escape in text node: {0}")]
    Escape(String),

    /// Serializing an entry to the output failed.
    #[error("failed to write entry: {0}")]
    Json(#[from] serde_json::Error),

    /// The YAML configuration file could not be parsed.
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration parsed but holds values the pipeline cannot run with.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A pipeline thread panicked before finishing its work.
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
