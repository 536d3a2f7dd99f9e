//! The SQLite-backed song catalog.

use crate::catalog::song::{join_tags, split_tags, Song, SongFilter};
use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
};
use rusqlite::{params, params_from_iter, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

/// V 0
const SONGS_TABLE_V_0: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("author", &SqlType::Text, non_null = true),
        sqlite_column!("filepath", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("tags", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_songs_author", "author")],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[SONGS_TABLE_V_0],
    migration: None,
}];

/// Errors surfaced by catalog operations. There is no retry: a failure
/// aborts the current command.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("catalog database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("catalog schema error: {0}")]
    Schema(String),
}

/// Read/append access to the song catalog. Update and delete do not exist.
pub trait CatalogStore {
    /// Appends a new song and returns its assigned id.
    fn insert(
        &self,
        title: &str,
        author: &str,
        filepath: &str,
        tags: &[String],
    ) -> Result<i64, StorageError>;

    /// Returns the songs matching the filter. No predicates means every row.
    /// Results come back in insertion order but no ordering is guaranteed.
    fn query(&self, filter: &SongFilter) -> Result<Vec<Song>, StorageError>;

    fn get_by_id(&self, id: i64) -> Result<Option<Song>, StorageError>;

    /// Every stored filepath, used for random playback selection.
    fn get_all_filepaths(&self) -> Result<Vec<String>, StorageError>;
}

#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    /// Opens the catalog database, creating it with the latest schema when
    /// absent. Safe to call on every process start: an existing database is
    /// validated against its stamped version and migrated forward if needed.
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self, StorageError> {
        let conn = if db_path.as_ref().exists() {
            debug!("Opening existing catalog at {:?}", db_path.as_ref());
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            info!("Creating new catalog at {:?}", db_path.as_ref());
            let conn = Connection::open(db_path)?;
            VERSIONED_SCHEMAS
                .last()
                .expect("at least one schema version")
                .create(&conn)
                .map_err(|e| StorageError::Schema(e.to_string()))?;
            conn
        };

        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            return Err(StorageError::Schema(format!(
                "database version {} predates base version {}",
                db_version + BASE_DB_VERSION as i64,
                BASE_DB_VERSION
            )));
        }
        if db_version >= VERSIONED_SCHEMAS.len() as i64 {
            return Err(StorageError::Schema(format!(
                "database version {} is too new",
                db_version
            )));
        }
        let version = db_version as usize;

        VERSIONED_SCHEMAS[version]
            .validate(&conn)
            .map_err(|e| StorageError::Schema(e.to_string()))?;

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqliteCatalogStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<(), StorageError> {
        let mut latest_from = version;
        for schema in VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating catalog from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn).map_err(|e| StorageError::Schema(e.to_string()))?;
                latest_from = schema.version;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;
        Ok(())
    }

    fn row_to_song(row: &rusqlite::Row<'_>) -> rusqlite::Result<Song> {
        Ok(Song {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            filepath: row.get(3)?,
            tags: split_tags(&row.get::<_, String>(4)?),
        })
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn insert(
        &self,
        title: &str,
        author: &str,
        filepath: &str,
        tags: &[String],
    ) -> Result<i64, StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (title, author, filepath, tags) VALUES (?1, ?2, ?3, ?4)",
                SONGS_TABLE_V_0.name
            ),
            params![title, author, filepath, join_tags(tags)],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn query(&self, filter: &SongFilter) -> Result<Vec<Song>, StorageError> {
        let conn = self.conn.lock().unwrap();

        let mut sql = format!(
            "SELECT id, title, author, filepath, tags FROM {}",
            SONGS_TABLE_V_0.name
        );
        let mut sql_params: Vec<String> = Vec::new();

        if !filter.is_empty() {
            sql.push_str(" WHERE 1=1");
            if let Some(author) = &filter.author {
                sql.push_str(&format!(" AND author = ?{}", sql_params.len() + 1));
                sql_params.push(author.clone());
            }
            // Tag predicates are substring tests against the serialized tag
            // string, so "rock" also matches a song tagged "rocknroll".
            for tag in &filter.tags {
                sql.push_str(&format!(" AND tags LIKE ?{}", sql_params.len() + 1));
                sql_params.push(format!("%{}%", tag));
            }
        }

        let mut stmt = conn.prepare(&sql)?;
        let songs = stmt
            .query_map(params_from_iter(&sql_params), Self::row_to_song)?
            .collect::<Result<Vec<Song>, _>>()?;
        Ok(songs)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Song>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, title, author, filepath, tags FROM {} WHERE id = ?1",
            SONGS_TABLE_V_0.name
        ))?;
        match stmt.query_row(params![id], Self::row_to_song) {
            Ok(song) => Ok(Some(song)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_all_filepaths(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT filepath FROM {}",
            SONGS_TABLE_V_0.name
        ))?;
        let paths = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(paths)
    }
}
