//! The CLI surface. Lives in the library so argument validation (notably the
//! exactly-one-of `--url`/`--name` rule, which must reject bad input before
//! any side effect) can be tested directly.

use crate::cli_style::get_styles;
use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "songstash", version, about = "Personal command-line music manager", styles = get_styles())]
pub struct CliArgs {
    /// Path to the SQLite catalog database file.
    #[clap(long, value_parser = parse_path)]
    pub db: Option<PathBuf>,

    /// Directory where downloaded audio files are stored.
    #[clap(long, value_parser = parse_path)]
    pub songs_dir: Option<PathBuf>,

    /// Path to an optional TOML config file; its values override the flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download a song from a URL or search by name, one or the other.
    #[command(group(ArgGroup::new("source").required(true).args(["url", "name"])))]
    Download {
        /// Download audio from this URL.
        #[clap(long)]
        url: Option<String>,

        /// Search by name; multiple words form one query.
        #[clap(long, num_args = 1..)]
        name: Vec<String>,
    },

    /// List songs in the catalog, filtered by author and/or tags.
    Ls {
        /// Filter by author name (exact match).
        #[clap(long)]
        author: Option<String>,

        /// Filter by tag, repeatable; tags match by substring.
        #[clap(long)]
        tags: Vec<String>,
    },

    /// Play music from the catalog or stream a search result.
    Play {
        /// Id of the song to play.
        id: Option<i64>,

        /// Play a random song from the catalog.
        #[clap(short, long)]
        random: bool,

        /// Search and stream directly without downloading.
        #[clap(short, long, num_args = 1..)]
        search: Vec<String>,

        /// Queue multiple songs by id.
        #[clap(short, long, num_args = 1..)]
        queue: Vec<i64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn download_requires_exactly_one_source() {
        assert!(CliArgs::try_parse_from(["songstash", "download"]).is_err());
        assert!(CliArgs::try_parse_from([
            "songstash",
            "download",
            "--url",
            "https://example.com",
            "--name",
            "some song",
        ])
        .is_err());

        assert!(
            CliArgs::try_parse_from(["songstash", "download", "--url", "https://example.com"])
                .is_ok()
        );
        assert!(CliArgs::try_parse_from(["songstash", "download", "--name", "some", "song"]).is_ok());
    }

    #[test]
    fn ls_accepts_repeated_tags() {
        let args =
            CliArgs::try_parse_from(["songstash", "ls", "--author", "x", "--tags", "rock", "--tags", "live"])
                .unwrap();
        match args.command {
            Command::Ls { author, tags } => {
                assert_eq!(author.as_deref(), Some("x"));
                assert_eq!(tags, vec!["rock".to_string(), "live".to_string()]);
            }
            _ => panic!("expected ls"),
        }
    }

    #[test]
    fn play_parses_all_variants() {
        let args = CliArgs::try_parse_from(["songstash", "play", "3"]).unwrap();
        match args.command {
            Command::Play { id, random, search, queue } => {
                assert_eq!(id, Some(3));
                assert!(!random);
                assert!(search.is_empty());
                assert!(queue.is_empty());
            }
            _ => panic!("expected play"),
        }

        let args = CliArgs::try_parse_from(["songstash", "play", "-q", "1", "2"]).unwrap();
        match args.command {
            Command::Play { queue, .. } => assert_eq!(queue, vec![1, 2]),
            _ => panic!("expected play"),
        }

        let args = CliArgs::try_parse_from(["songstash", "play", "-s", "some", "song"]).unwrap();
        match args.command {
            Command::Play { search, .. } => assert_eq!(search, vec!["some", "song"]),
            _ => panic!("expected play"),
        }

        let args = CliArgs::try_parse_from(["songstash", "play", "--random"]).unwrap();
        match args.command {
            Command::Play { random, .. } => assert!(random),
            _ => panic!("expected play"),
        }
    }
}
