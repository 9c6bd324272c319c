//! # reqline
//!
//! Single-line HTTP requests with history and saved requests.
//!
//! A request is written as one line of text:
//!
//! ```text
//! POST https://api.example.com/users Authorization=:"Bearer {{token}}" page=?2 name=ada {"admin": true}
//! ```
//!
//! - `key=:value` sets a header
//! - `key=?value` sets a search param
//! - `key=value` adds a multipart form field
//! - a trailing `{...}` or `[...]` is sent as the JSON body
//! - `{{path.to.value}}` is filled in from JSON data before parsing
//!
//! ## Architecture
//! - Parsing: `template` -> `lexer` -> `parser`, producing a [`Request`]
//! - Engine: a value-semantics [`Engine`] executing requests through a
//!   [`Transport`] and persisting history/saved requests through [`Persist`]
//! - App: CLI command handlers on top of the engine

pub mod app;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod models;
pub mod network;
pub mod parser;
pub mod storage;
pub mod template;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Engine, Execution};
pub use error::{ExecutionError, ParseError, PersistenceError, TransportError};
pub use lexer::{tokenize, Token, TokenKind};
pub use models::{History, HttpMethod, ListEntry, Request, RequestAndResponse, SavedRequests};
pub use network::{ReqwestTransport, ResponseBody, Transport, WireRequest, WireResponse};
pub use parser::{parse_request, parse_request_with};
pub use storage::{FileStore, Persist};
