//! Songstash library crate.
//!
//! Exposes the internal modules so integration tests and the binary share
//! the same code paths.

pub mod acquisition;
pub mod catalog;
pub mod cli;
pub mod cli_style;
pub mod config;
pub mod fetcher;
pub mod playback;
pub mod resolver;
pub mod sqlite_persistence;

pub use catalog::{CatalogStore, Song, SongFilter, SqliteCatalogStore, StorageError};
pub use config::AppConfig;
