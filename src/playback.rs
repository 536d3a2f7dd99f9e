//! Resolving play requests into playback targets and detached player spawns.

use crate::catalog::CatalogStore;
use crate::resolver::Resolver;
use anyhow::Result;
use rand::seq::IndexedRandom;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// A play request as it arrives from the CLI. Variants are prioritized
/// Search > Random > Queue > Single id; the first supplied one wins and the
/// rest are ignored.
#[derive(Debug, Clone, Default)]
pub struct PlayRequest {
    pub search: Option<String>,
    pub random: bool,
    pub queue: Vec<i64>,
    pub id: Option<i64>,
}

/// One thing the player can be pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayTarget {
    File(String),
    Url(String),
}

impl PlayTarget {
    pub fn as_player_arg(&self) -> &str {
        match self {
            PlayTarget::File(path) => path,
            PlayTarget::Url(url) => url,
        }
    }
}

/// Why a request resolved to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchAdvisory {
    NoSearchMatch,
    EmptyCatalog,
}

/// Result of resolving a [`PlayRequest`]: the targets to spawn, the queue
/// ids that had no catalog row, and an optional advisory. Separated from the
/// actual spawning so resolution is testable without child processes.
#[derive(Debug, Default)]
pub struct Dispatch {
    pub targets: Vec<PlayTarget>,
    pub missing_ids: Vec<i64>,
    pub advisory: Option<DispatchAdvisory>,
}

/// Resolves a request into playback targets in the fixed priority order.
pub fn resolve_targets(
    store: &dyn CatalogStore,
    resolver: &dyn Resolver,
    request: &PlayRequest,
) -> Result<Dispatch> {
    let mut dispatch = Dispatch::default();

    if let Some(query) = &request.search {
        // Streaming playback, no catalog involvement.
        match resolver.resolve(query)? {
            Some(resolved) => dispatch.targets.push(PlayTarget::Url(resolved.url)),
            None => dispatch.advisory = Some(DispatchAdvisory::NoSearchMatch),
        }
        return Ok(dispatch);
    }

    if request.random {
        let paths = store.get_all_filepaths()?;
        match paths.choose(&mut rand::rng()) {
            Some(path) => dispatch.targets.push(PlayTarget::File(path.clone())),
            None => dispatch.advisory = Some(DispatchAdvisory::EmptyCatalog),
        }
        return Ok(dispatch);
    }

    if !request.queue.is_empty() {
        // Each id resolves independently; missing ones do not abort the rest.
        for id in &request.queue {
            match store.get_by_id(*id)? {
                Some(song) => dispatch.targets.push(PlayTarget::File(song.filepath)),
                None => dispatch.missing_ids.push(*id),
            }
        }
        return Ok(dispatch);
    }

    if let Some(id) = request.id {
        match store.get_by_id(id)? {
            Some(song) => dispatch.targets.push(PlayTarget::File(song.filepath)),
            None => dispatch.missing_ids.push(id),
        }
    }

    Ok(dispatch)
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to spawn player: {0}")]
    SpawnFailed(#[from] std::io::Error),
}

/// Starts playback of one target and does not wait for it to finish.
pub trait Player {
    fn spawn(&self, target: &PlayTarget) -> Result<(), PlayerError>;
}

pub struct MpvPlayer {
    bin: String,
}

impl MpvPlayer {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Player for MpvPlayer {
    fn spawn(&self, target: &PlayTarget) -> Result<(), PlayerError> {
        debug!("Spawning {} for {:?}", self.bin, target);
        // Fire and forget: the child is dropped without being awaited so the
        // terminal is free while audio plays.
        Command::new(&self.bin)
            .arg(target.as_player_arg())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}
