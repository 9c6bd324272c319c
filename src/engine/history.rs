//! History store - append-only log of executed requests
//!
//! Persisted as `[{"request": "<raw>", "responseCode": 200}, ...]`. Only the
//! raw text survives a save; the structured request is rebuilt by parsing
//! it again on load.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::engine::{write_collection, Engine};
use crate::error::PersistenceError;
use crate::models::{History, RequestAndResponse};
use crate::network::Transport;
use crate::parser::parse_request;
use crate::storage::Persist;

#[derive(Serialize, Deserialize)]
struct HistoryRecord {
    request: String,
    #[serde(rename = "responseCode")]
    response_code: u16,
}

impl<T: Transport> Engine<T> {
    /// Replace the history with the one stored in `previous` and persist
    /// future appends through `writer` (in memory only when `None`).
    pub fn with_history(
        mut self,
        previous: impl Read,
        writer: Option<Box<dyn Persist>>,
    ) -> Result<Self, PersistenceError> {
        self.history = load_history(previous)?;
        self.history_writer = writer;
        tracing::info!(
            entries = self.history.len(),
            persisted = self.history_writer.is_some(),
            "History loaded"
        );
        Ok(self)
    }

    /// Append `entry` and rewrite the whole persisted history.
    ///
    /// The entry stays in memory even when the write fails.
    pub fn append_to_history(
        mut self,
        entry: RequestAndResponse,
    ) -> (Self, Result<(), PersistenceError>) {
        self.history.push(entry);
        let history = &self.history;
        let result = write_collection(self.history_writer.as_mut(), || encode_history(history));
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Unable to append to history");
        }
        (self, result)
    }
}

/// Serialize history to its persisted form
pub fn encode_history(history: &[RequestAndResponse]) -> Result<Vec<u8>, PersistenceError> {
    let records: Vec<HistoryRecord> = history
        .iter()
        .map(|entry| HistoryRecord {
            request: entry.request.raw.clone(),
            response_code: entry.response_code,
        })
        .collect();
    Ok(serde_json::to_vec(&records)?)
}

/// Read persisted history. Empty input is an empty history; any entry that
/// no longer parses fails the whole load.
pub fn load_history(mut reader: impl Read) -> Result<History, PersistenceError> {
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .map_err(PersistenceError::Read)?;
    if content.is_empty() {
        return Ok(History::new());
    }

    let records: Vec<HistoryRecord> = serde_json::from_slice(&content)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let request = parse_request(&record.request).map_err(|source| {
                PersistenceError::ReParseOnLoad {
                    index,
                    raw: record.request.clone(),
                    source,
                }
            })?;
            Ok(RequestAndResponse::new(request, record.response_code))
        })
        .collect()
}
