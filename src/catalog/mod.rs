mod song;
mod store;

pub use song::{join_tags, split_tags, Song, SongFilter};
pub use store::{CatalogStore, SqliteCatalogStore, StorageError};
