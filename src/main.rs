use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use songstash::acquisition::{
    AcquisitionOutcome, AcquisitionWorkflow, Source, StdinConfirmer, StdinSongPrompt,
};
use songstash::catalog::{CatalogStore, SongFilter, SqliteCatalogStore};
use songstash::cli::{CliArgs, Command};
use songstash::config::{AppConfig, CliConfig, FileConfig};
use songstash::fetcher::YtDlpFetcher;
use songstash::playback::{resolve_targets, DispatchAdvisory, MpvPlayer, PlayRequest, Player};
use songstash::resolver::YtDlpResolver;

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_path: cli_args.db.clone(),
        songs_dir: cli_args.songs_dir.clone(),
    };
    let config = AppConfig::resolve(&cli_config, file_config);
    debug!("Resolved config: {:?}", config);

    std::fs::create_dir_all(&config.songs_dir)
        .with_context(|| format!("Failed to create songs directory {:?}", config.songs_dir))?;
    let store = SqliteCatalogStore::new(&config.db_path)
        .with_context(|| format!("Failed to open catalog at {:?}", config.db_path))?;

    match cli_args.command {
        Command::Download { url, name } => run_download(&config, &store, url, name),
        Command::Ls { author, tags } => run_ls(&store, author, tags),
        Command::Play {
            id,
            random,
            search,
            queue,
        } => run_play(&config, &store, id, random, search, queue),
    }
}

fn run_download(
    config: &AppConfig,
    store: &dyn CatalogStore,
    url: Option<String>,
    name: Vec<String>,
) -> Result<()> {
    // clap's source group guarantees exactly one of the two is present.
    let source = match url {
        Some(url) => Source::Url(url),
        None => {
            println!("Searching...");
            Source::Search(name.join(" "))
        }
    };

    let resolver = YtDlpResolver::new(&config.extractor_bin);
    let fetcher = YtDlpFetcher::new(&config.extractor_bin, &config.audio_format);
    let workflow = AcquisitionWorkflow::new(
        &resolver,
        &fetcher,
        store,
        &StdinConfirmer,
        &StdinSongPrompt,
        &config.songs_dir,
        &config.audio_format,
    );

    match workflow.run(source)? {
        AcquisitionOutcome::Recorded { id, filepath } => {
            println!("Recorded song {} at {}", id, filepath);
        }
        AcquisitionOutcome::NoMatch => println!("No matching video found."),
        AcquisitionOutcome::Declined => println!("Download cancelled."),
    }
    Ok(())
}

fn run_ls(store: &dyn CatalogStore, author: Option<String>, tags: Vec<String>) -> Result<()> {
    let filter = SongFilter { author, tags };
    let songs = store.query(&filter)?;

    if songs.is_empty() {
        println!("No matching songs found.");
        return Ok(());
    }
    for song in songs {
        println!(
            "{:>4}  {} - {}  [{}]",
            song.id,
            song.title,
            song.author,
            song.tags_joined()
        );
    }
    Ok(())
}

fn run_play(
    config: &AppConfig,
    store: &dyn CatalogStore,
    id: Option<i64>,
    random: bool,
    search: Vec<String>,
    queue: Vec<i64>,
) -> Result<()> {
    let searching = !search.is_empty();
    let request = PlayRequest {
        search: searching.then(|| search.join(" ")),
        random,
        queue,
        id,
    };
    if searching {
        println!("Searching...");
    }

    let resolver = YtDlpResolver::new(&config.extractor_bin);
    let dispatch = resolve_targets(store, &resolver, &request)?;

    match dispatch.advisory {
        Some(DispatchAdvisory::NoSearchMatch) => println!("No matching video found."),
        Some(DispatchAdvisory::EmptyCatalog) => println!("No songs found in the database."),
        None => {}
    }
    for missing_id in &dispatch.missing_ids {
        if request.id == Some(*missing_id) && request.queue.is_empty() {
            println!("No song found with the specified ID.");
        } else {
            println!("ID {} not found.", missing_id);
        }
    }

    let player = MpvPlayer::new(&config.player_bin);
    for target in &dispatch.targets {
        player
            .spawn(target)
            .with_context(|| format!("Failed to start playback of {}", target.as_player_arg()))?;
    }
    Ok(())
}
