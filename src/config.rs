//! Configuration resolution from CLI arguments and an optional TOML file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_PATH: &str = "music.db";
pub const DEFAULT_SONGS_DIR: &str = "songs";
pub const DEFAULT_EXTRACTOR_BIN: &str = "yt-dlp";
pub const DEFAULT_PLAYER_BIN: &str = "mpv";
pub const DEFAULT_AUDIO_FORMAT: &str = "mp3";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML
/// config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub songs_dir: Option<PathBuf>,
}

/// Optional TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub songs_dir: Option<String>,
    pub extractor_bin: Option<String>,
    pub player_bin: Option<String>,
    pub audio_format: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file {:?}", path))
    }
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub songs_dir: PathBuf,
    pub extractor_bin: String,
    pub player_bin: String,
    pub audio_format: String,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Self {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let songs_dir = file
            .songs_dir
            .map(PathBuf::from)
            .or_else(|| cli.songs_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SONGS_DIR));

        let extractor_bin = file
            .extractor_bin
            .unwrap_or_else(|| DEFAULT_EXTRACTOR_BIN.to_string());
        let player_bin = file
            .player_bin
            .unwrap_or_else(|| DEFAULT_PLAYER_BIN.to_string());
        let audio_format = file
            .audio_format
            .unwrap_or_else(|| DEFAULT_AUDIO_FORMAT.to_string());

        AppConfig {
            db_path,
            songs_dir,
            extractor_bin,
            player_bin,
            audio_format,
        }
    }
}
