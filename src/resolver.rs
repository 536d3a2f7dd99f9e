//! Free-text search resolution via the external extractor tool.

use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// Best match for a free-text query: its canonical title and URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("extractor failed: {0}")]
    ToolFailed(String),

    #[error("failed to run extractor: {0}")]
    Io(#[from] std::io::Error),
}

/// Translates a free-text query into the single best matching track.
/// `Ok(None)` is the designed no-match signal, not an error.
pub trait Resolver {
    fn resolve(&self, query: &str) -> Result<Option<ResolvedTrack>, ResolveError>;
}

/// Print template asking the extractor for the top match's title and URL on
/// two separate output lines.
const SEARCH_PRINT_TEMPLATE: &str = "%(title)s\n%(webpage_url)s";

pub struct YtDlpResolver {
    bin: String,
}

impl YtDlpResolver {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Resolver for YtDlpResolver {
    fn resolve(&self, query: &str) -> Result<Option<ResolvedTrack>, ResolveError> {
        debug!("Resolving query {:?} via {}", query, self.bin);
        let output = Command::new(&self.bin)
            .arg(format!("ytsearch1:{}", query))
            .args(["--print", SEARCH_PRINT_TEMPLATE])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::ToolFailed(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_search_output(&stdout))
    }
}

/// Parses the two-line title/URL output. Fewer than two lines means the
/// search produced no match.
fn parse_search_output(stdout: &str) -> Option<ResolvedTrack> {
    let mut lines = stdout.trim().lines();
    let title = lines.next()?.trim();
    let url = lines.next()?.trim();
    if url.is_empty() {
        return None;
    }
    Some(ResolvedTrack {
        title: title.to_string(),
        url: url.to_string(),
    })
}
