//! Execution engine - owns history and saved requests, runs requests
//!
//! `Engine` is a plain value. Every operation that changes it consumes the
//! current engine and hands back the next one alongside its result, so a
//! single owner (an event loop, a command handler) threads it through
//! without locks.
//!
//! ```ignore
//! let engine = Engine::new(transport)
//!     .with_history(&history_bytes[..], Some(Box::new(history_file)))?
//!     .with_saved_requests(&saved_bytes[..], None)?;
//! let (engine, result) = engine.execute(parse_request("GET https://x")?);
//! ```

pub mod history;
pub mod saved;
pub mod wire;

use std::fmt;

use crate::error::{ExecutionError, PersistenceError};
use crate::models::{History, ListEntry, Request, RequestAndResponse, SavedRequests};
use crate::network::{Transport, WireResponse};
use crate::storage::Persist;

pub use wire::build_wire_request;

/// Outcome of a request that reached the server
#[derive(Debug)]
pub struct Execution {
    pub entry: RequestAndResponse,
    /// Response with its body still unread
    pub response: WireResponse,
    /// Set when the response arrived but could not be written to history
    pub record_error: Option<PersistenceError>,
}

pub struct Engine<T> {
    transport: T,
    history: History,
    history_writer: Option<Box<dyn Persist>>,
    saved_requests: SavedRequests,
    saved_requests_writer: Option<Box<dyn Persist>>,
}

impl<T: Transport> Engine<T> {
    /// In-memory engine with empty history and no saved requests
    pub fn new(transport: T) -> Self {
        Engine {
            transport,
            history: History::new(),
            history_writer: None,
            saved_requests: SavedRequests::new(),
            saved_requests_writer: None,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn saved_requests(&self) -> &SavedRequests {
        &self.saved_requests
    }

    /// History as list entries, most recent first
    pub fn history_list(&self) -> Vec<ListEntry<'_>> {
        self.history.iter().rev().map(ListEntry::History).collect()
    }

    pub fn saved_list(&self) -> Vec<ListEntry<'_>> {
        self.saved_requests.iter().map(ListEntry::Saved).collect()
    }

    /// Send `request` and record the status code in history.
    ///
    /// Any status code counts as executed. If recording fails, the response
    /// is still returned and the failure is carried in
    /// [`Execution::record_error`].
    pub fn execute(self, request: Request) -> (Self, Result<Execution, ExecutionError>) {
        let wire = match build_wire_request(&request) {
            Ok(wire) => wire,
            Err(e) => return (self, Err(e)),
        };

        tracing::info!(method = %request.method, url = %wire.uri(), "Executing request");
        let response = match self.transport.execute(wire) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(method = %request.method, url = %request.url, error = %e, "Request failed");
                return (self, Err(ExecutionError::Transport(e)));
            }
        };

        let status = response.status().as_u16();
        tracing::info!(method = %request.method, url = %request.url, status, "Request completed");

        let entry = RequestAndResponse::new(request, status);
        let (engine, recorded) = self.append_to_history(entry.clone());
        let execution = Execution {
            entry,
            response,
            record_error: recorded.err(),
        };
        (engine, Ok(execution))
    }
}

impl<T> fmt::Debug for Engine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("history", &self.history.len())
            .field("history_persisted", &self.history_writer.is_some())
            .field("saved_requests", &self.saved_requests.len())
            .field("saved_requests_persisted", &self.saved_requests_writer.is_some())
            .finish_non_exhaustive()
    }
}

fn write_collection(
    writer: Option<&mut Box<dyn Persist>>,
    bytes: impl FnOnce() -> Result<Vec<u8>, PersistenceError>,
) -> Result<(), PersistenceError> {
    let Some(writer) = writer else {
        return Ok(());
    };
    let bytes = bytes()?;
    writer.write_all(&bytes).map_err(PersistenceError::Write)
}
