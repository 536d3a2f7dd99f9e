//! The end-to-end song acquisition workflow: resolve, confirm, fetch, record.

use crate::catalog::CatalogStore;
use crate::fetcher::Fetcher;
use crate::resolver::Resolver;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the audio comes from. The CLI layer guarantees exactly one of the
/// two was supplied before the workflow runs.
#[derive(Debug, Clone)]
pub enum Source {
    Url(String),
    Search(String),
}

/// Metadata collected from the user for a new catalog entry.
#[derive(Debug, Clone)]
pub struct SongDetails {
    pub title: String,
    pub author: String,
    pub tags: Vec<String>,
}

/// Asks the user whether a resolved track should actually be downloaded.
/// Injected so tests (or a future non-interactive mode) can script the
/// answer.
pub trait Confirmer {
    fn confirm_download(&self, title: &str) -> bool;
}

/// Collects title/author/tags for the new entry.
pub trait SongPrompt {
    fn collect(&self) -> std::io::Result<SongDetails>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    /// The fetch succeeded and a catalog row was recorded.
    Recorded { id: i64, filepath: String },
    /// The search produced no match; nothing happened.
    NoMatch,
    /// The user declined the resolved track; nothing happened.
    Declined,
}

pub struct AcquisitionWorkflow<'a> {
    resolver: &'a dyn Resolver,
    fetcher: &'a dyn Fetcher,
    store: &'a dyn CatalogStore,
    confirmer: &'a dyn Confirmer,
    prompt: &'a dyn SongPrompt,
    songs_dir: &'a Path,
    audio_format: &'a str,
}

impl<'a> AcquisitionWorkflow<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resolver: &'a dyn Resolver,
        fetcher: &'a dyn Fetcher,
        store: &'a dyn CatalogStore,
        confirmer: &'a dyn Confirmer,
        prompt: &'a dyn SongPrompt,
        songs_dir: &'a Path,
        audio_format: &'a str,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            store,
            confirmer,
            prompt,
            songs_dir,
            audio_format,
        }
    }

    /// Runs one acquisition to completion. The catalog is only touched after
    /// the fetch tool reported success; a failed fetch surfaces as an error
    /// with no row recorded.
    pub fn run(&self, source: Source) -> Result<AcquisitionOutcome> {
        let url = match source {
            Source::Url(url) => url,
            Source::Search(query) => {
                let resolved = match self.resolver.resolve(&query)? {
                    Some(resolved) => resolved,
                    None => return Ok(AcquisitionOutcome::NoMatch),
                };
                if !self.confirmer.confirm_download(&resolved.title) {
                    return Ok(AcquisitionOutcome::Declined);
                }
                resolved.url
            }
        };

        let details = self.prompt.collect().context("Failed to read song details")?;
        let out_path = self.output_path(&details.title);

        self.fetcher
            .fetch(&url, &out_path)
            .context("Fetching the audio failed")?;

        let filepath = out_path.to_string_lossy().to_string();
        let id = self
            .store
            .insert(&details.title, &details.author, &filepath, &details.tags)
            .context("Failed to record the song in the catalog")?;
        info!("Recorded song {} at {}", id, filepath);

        Ok(AcquisitionOutcome::Recorded { id, filepath })
    }

    fn output_path(&self, title: &str) -> PathBuf {
        self.songs_dir
            .join(format!("{}.{}", derive_track_filename(title), self.audio_format))
    }
}

/// Derives a filesystem-safe file name from a title: keep alphanumerics,
/// space, `_` and `-`, drop trailing whitespace, replace spaces with `-`,
/// lowercase the result.
pub fn derive_track_filename(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_' || *c == '-')
        .collect::<String>()
        .trim_end()
        .replace(' ', "-")
        .to_lowercase()
}

/// Interactive y/N confirmation on stdin. Anything but `y` declines.
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm_download(&self, title: &str) -> bool {
        print!(
            "Found: {}\tThis song will be downloaded, do you wish to continue? [Y/n] ",
            title
        );
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        answer.trim().eq_ignore_ascii_case("y")
    }
}

/// Interactive metadata prompts on stdin, one line per field.
pub struct StdinSongPrompt;

impl StdinSongPrompt {
    fn read_field(label: &str) -> std::io::Result<String> {
        print!("{}: ", label);
        std::io::stdout().flush()?;
        let mut value = String::new();
        std::io::stdin().lock().read_line(&mut value)?;
        Ok(value.trim().to_string())
    }
}

impl SongPrompt for StdinSongPrompt {
    fn collect(&self) -> std::io::Result<SongDetails> {
        let title = Self::read_field("Title")?;
        let author = Self::read_field("Author")?;
        let tags_line = Self::read_field("Tags (comma separated)")?;
        let tags = if tags_line.is_empty() {
            Vec::new()
        } else {
            tags_line.split(',').map(|t| t.trim().to_string()).collect()
        };
        Ok(SongDetails { title, author, tags })
    }
}
