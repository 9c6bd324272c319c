//! Error types for parsing, execution and persistence

use thiserror::Error;

use crate::template::TemplateError;

/// Error produced by a transport implementation
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to turn request text into a [`crate::Request`]
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid request, provide a valid method (GET, POST, PUT, DELETE), got '{0}'")]
    InvalidMethod(String),

    #[error("invalid request, provide at least a method and the url")]
    MissingMethodOrUrl,

    #[error("template rendering failed for '{text}': {source}")]
    TemplateRender {
        text: String,
        #[source]
        source: TemplateError,
    },
}

/// Failure before or during the transport call.
///
/// A failure to record the outcome is not an `ExecutionError`; it is reported
/// next to the response in [`crate::engine::Execution`].
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("request execution error: {0}")]
    Transport(#[source] TransportError),

    #[error("request body error: {0}")]
    BodyConstruction(#[source] std::io::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Failure to load, write or mutate a persisted collection
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("writing error: {0}")]
    Write(#[source] std::io::Error),

    #[error("reading error: {0}")]
    Read(#[source] std::io::Error),

    #[error("entry {index} could not be parsed again ('{raw}'): {source}")]
    ReParseOnLoad {
        index: usize,
        raw: String,
        #[source]
        source: ParseError,
    },

    #[error("invalid index {index}, collection holds {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
}
