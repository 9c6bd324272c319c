//! App layer - command handlers driving the engine
//!
//! `setup` opens an engine from the user's configuration; `commands` holds
//! one handler per CLI subcommand.

pub mod commands;
pub mod setup;

pub use setup::open_engine;
