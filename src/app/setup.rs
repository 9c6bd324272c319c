//! Wires an `Engine` to the files named in `Config`

use anyhow::{Context, Result};

use crate::config::Config;
use crate::engine::Engine;
use crate::network::Transport;
use crate::storage::{FileStore, Persist};

/// Build an engine whose history and saved requests are loaded from, and
/// written back to, the configured files. With `persist` off the files are
/// still read but never written.
pub fn open_engine<T: Transport>(transport: T, config: &Config) -> Result<Engine<T>> {
    let history_store = FileStore::new(&config.history_file);
    let saved_store = FileStore::new(&config.saved_requests_file);

    let history_bytes = history_store
        .read_all()
        .with_context(|| format!("reading history file {}", history_store.path().display()))?;
    let saved_bytes = saved_store.read_all().with_context(|| {
        format!("reading saved requests file {}", saved_store.path().display())
    })?;

    let (history_writer, saved_writer) = if config.persist {
        (
            Some(Box::new(history_store) as Box<dyn Persist>),
            Some(Box::new(saved_store) as Box<dyn Persist>),
        )
    } else {
        (None, None)
    };

    let engine = Engine::new(transport)
        .with_history(&history_bytes[..], history_writer)
        .with_context(|| format!("loading history from {}", config.history_file.display()))?
        .with_saved_requests(&saved_bytes[..], saved_writer)
        .with_context(|| {
            format!(
                "loading saved requests from {}",
                config.saved_requests_file.display()
            )
        })?;

    Ok(engine)
}
