//! Saved requests - reusable requests persisted as `["<raw>", ...]`

use std::io::Read;

use crate::engine::{write_collection, Engine};
use crate::error::PersistenceError;
use crate::models::{Request, SavedRequests};
use crate::network::Transport;
use crate::parser::parse_request;
use crate::storage::Persist;

impl<T: Transport> Engine<T> {
    /// Replace saved requests with the ones stored in `previous` and persist
    /// future changes through `writer` (in memory only when `None`).
    pub fn with_saved_requests(
        mut self,
        previous: impl Read,
        writer: Option<Box<dyn Persist>>,
    ) -> Result<Self, PersistenceError> {
        self.saved_requests = load_saved_requests(previous)?;
        self.saved_requests_writer = writer;
        tracing::info!(
            entries = self.saved_requests.len(),
            persisted = self.saved_requests_writer.is_some(),
            "Saved requests loaded"
        );
        Ok(self)
    }

    /// Add `request` at the end and rewrite the persisted collection
    pub fn save_request(mut self, request: Request) -> (Self, Result<(), PersistenceError>) {
        tracing::info!(request = %request, "Saving request");
        self.saved_requests.push(request);
        let result = self.write_saved_requests();
        (self, result)
    }

    /// Remove the request at `index` and rewrite the persisted collection.
    /// Out of range leaves everything untouched.
    pub fn remove_saved_request(mut self, index: usize) -> (Self, Result<(), PersistenceError>) {
        let len = self.saved_requests.len();
        if index >= len {
            return (self, Err(PersistenceError::IndexOutOfRange { index, len }));
        }

        let removed = self.saved_requests.remove(index);
        tracing::info!(index, request = %removed, "Removed saved request");
        let result = self.write_saved_requests();
        (self, result)
    }

    fn write_saved_requests(&mut self) -> Result<(), PersistenceError> {
        let saved = &self.saved_requests;
        let result = write_collection(self.saved_requests_writer.as_mut(), || {
            encode_saved_requests(saved)
        });
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Unable to write saved requests");
        }
        result
    }
}

/// Serialize saved requests to their persisted form
pub fn encode_saved_requests(requests: &[Request]) -> Result<Vec<u8>, PersistenceError> {
    let raws: Vec<&str> = requests.iter().map(|r| r.raw.as_str()).collect();
    Ok(serde_json::to_vec(&raws)?)
}

/// Read persisted saved requests, parsing each one again
pub fn load_saved_requests(mut reader: impl Read) -> Result<SavedRequests, PersistenceError> {
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .map_err(PersistenceError::Read)?;
    if content.is_empty() {
        return Ok(SavedRequests::new());
    }

    let raws: Vec<String> = serde_json::from_slice(&content)?;
    raws.into_iter()
        .enumerate()
        .map(|(index, raw)| {
            parse_request(&raw).map_err(|source| PersistenceError::ReParseOnLoad { index, raw, source })
        })
        .collect()
}
