//! Audio fetch-and-transcode via the external extractor tool.

use std::path::Path;
use std::process::Command;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch tool exited with {0}")]
    ToolFailed(std::process::ExitStatus),

    #[error("failed to run fetch tool: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads the audio of `url` into `out_path`, transcoded to the
/// configured format. Blocks until the external tool finishes.
pub trait Fetcher {
    fn fetch(&self, url: &str, out_path: &Path) -> Result<(), FetchError>;
}

pub struct YtDlpFetcher {
    bin: String,
    audio_format: String,
}

impl YtDlpFetcher {
    pub fn new(bin: impl Into<String>, audio_format: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            audio_format: audio_format.into(),
        }
    }
}

impl Fetcher for YtDlpFetcher {
    fn fetch(&self, url: &str, out_path: &Path) -> Result<(), FetchError> {
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        debug!("Fetching {} into {:?}", url, out_path);
        // Stdio is inherited so the tool's own progress output reaches the
        // terminal. The command blocks until the download completes.
        let status = Command::new(&self.bin)
            .arg("-x")
            .args(["--audio-format", &self.audio_format])
            .arg("-o")
            .arg(out_path)
            .arg(url)
            .status()?;

        if !status.success() {
            return Err(FetchError::ToolFailed(status));
        }
        Ok(())
    }
}
