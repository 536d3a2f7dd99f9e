//! End-to-end library scenarios against a real SQLite catalog in a temp
//! directory, with the external tools replaced by scripted fakes.

use songstash::acquisition::{
    AcquisitionOutcome, AcquisitionWorkflow, Confirmer, SongDetails, SongPrompt, Source,
};
use songstash::catalog::{CatalogStore, SongFilter, SqliteCatalogStore};
use songstash::fetcher::{FetchError, Fetcher};
use songstash::playback::{resolve_targets, PlayRequest, PlayTarget, Player, PlayerError};
use songstash::resolver::{ResolveError, ResolvedTrack, Resolver};
use std::cell::RefCell;
use std::path::Path;
use tempfile::TempDir;

struct FakeResolver(Option<ResolvedTrack>);

impl Resolver for FakeResolver {
    fn resolve(&self, _query: &str) -> Result<Option<ResolvedTrack>, ResolveError> {
        Ok(self.0.clone())
    }
}

struct RecordingFetcher {
    calls: RefCell<Vec<String>>,
}

impl RecordingFetcher {
    fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Fetcher for RecordingFetcher {
    fn fetch(&self, url: &str, _out_path: &Path) -> Result<(), FetchError> {
        self.calls.borrow_mut().push(url.to_string());
        Ok(())
    }
}

struct AutoConfirm;

impl Confirmer for AutoConfirm {
    fn confirm_download(&self, _title: &str) -> bool {
        true
    }
}

struct ScriptedPrompt(SongDetails);

impl SongPrompt for ScriptedPrompt {
    fn collect(&self) -> std::io::Result<SongDetails> {
        Ok(self.0.clone())
    }
}

struct CountingPlayer {
    spawned: RefCell<Vec<PlayTarget>>,
}

impl CountingPlayer {
    fn new() -> Self {
        Self {
            spawned: RefCell::new(Vec::new()),
        }
    }
}

impl Player for CountingPlayer {
    fn spawn(&self, target: &PlayTarget) -> Result<(), PlayerError> {
        self.spawned.borrow_mut().push(target.clone());
        Ok(())
    }
}

fn details(title: &str, author: &str, tags: &[&str]) -> SongDetails {
    SongDetails {
        title: title.to_string(),
        author: author.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn acquire(
    store: &SqliteCatalogStore,
    songs_dir: &Path,
    song: SongDetails,
    url: &str,
) -> AcquisitionOutcome {
    let resolver = FakeResolver(None);
    let fetcher = RecordingFetcher::new();
    let prompt = ScriptedPrompt(song);
    let workflow = AcquisitionWorkflow::new(
        &resolver,
        &fetcher,
        store,
        &AutoConfirm,
        &prompt,
        songs_dir,
        "mp3",
    );
    workflow.run(Source::Url(url.to_string())).unwrap()
}

#[test]
fn acquired_songs_are_listable_by_author_and_tags() {
    let temp_dir = TempDir::new().unwrap();
    let store = SqliteCatalogStore::new(temp_dir.path().join("music.db")).unwrap();
    let songs_dir = temp_dir.path().join("songs");

    acquire(
        &store,
        &songs_dir,
        details("Song A", "x", &["rock", "live"]),
        "https://example.com/a",
    );
    acquire(
        &store,
        &songs_dir,
        details("Song B", "y", &["rock"]),
        "https://example.com/b",
    );

    // --author x --tags rock matches exactly A
    let songs = store
        .query(&SongFilter {
            author: Some("x".to_string()),
            tags: vec!["rock".to_string()],
        })
        .unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].title, "Song A");

    // --tags live matches exactly A
    let songs = store
        .query(&SongFilter {
            author: None,
            tags: vec!["live".to_string()],
        })
        .unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].title, "Song A");

    // --author z matches nothing
    let songs = store
        .query(&SongFilter {
            author: Some("z".to_string()),
            tags: Vec::new(),
        })
        .unwrap();
    assert!(songs.is_empty());
}

#[test]
fn queue_playback_spawns_only_existing_songs() {
    let temp_dir = TempDir::new().unwrap();
    let store = SqliteCatalogStore::new(temp_dir.path().join("music.db")).unwrap();
    let songs_dir = temp_dir.path().join("songs");

    let outcome = acquire(
        &store,
        &songs_dir,
        details("Song A", "x", &[]),
        "https://example.com/a",
    );
    let filepath = match outcome {
        AcquisitionOutcome::Recorded { id, filepath } => {
            assert_eq!(id, 1);
            filepath
        }
        other => panic!("unexpected outcome {:?}", other),
    };

    let request = PlayRequest {
        queue: vec![1, 2],
        ..Default::default()
    };
    let dispatch = resolve_targets(&store, &FakeResolver(None), &request).unwrap();
    assert_eq!(dispatch.missing_ids, vec![2]);

    let player = CountingPlayer::new();
    for target in &dispatch.targets {
        player.spawn(target).unwrap();
    }
    assert_eq!(*player.spawned.borrow(), vec![PlayTarget::File(filepath)]);
}

#[test]
fn random_play_on_empty_catalog_spawns_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let store = SqliteCatalogStore::new(temp_dir.path().join("music.db")).unwrap();

    let request = PlayRequest {
        random: true,
        ..Default::default()
    };
    let dispatch = resolve_targets(&store, &FakeResolver(None), &request).unwrap();
    assert!(dispatch.targets.is_empty());

    let player = CountingPlayer::new();
    for target in &dispatch.targets {
        player.spawn(target).unwrap();
    }
    assert!(player.spawned.borrow().is_empty());
}

#[test]
fn search_playback_streams_without_touching_the_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let store = SqliteCatalogStore::new(temp_dir.path().join("music.db")).unwrap();

    let request = PlayRequest {
        search: Some("some song".to_string()),
        ..Default::default()
    };
    let resolver = FakeResolver(Some(ResolvedTrack {
        title: "Some Song".to_string(),
        url: "https://example.com/stream".to_string(),
    }));
    let dispatch = resolve_targets(&store, &resolver, &request).unwrap();

    assert_eq!(
        dispatch.targets,
        vec![PlayTarget::Url("https://example.com/stream".to_string())]
    );
    assert!(store.query(&SongFilter::default()).unwrap().is_empty());
}
