//! Fetch album genres from MusicBrainz and store them in the library.
//!
//! Usage:
//!     mbgenres [--force] [--nowrite] [--config PATH] [--library PATH] [QUERY]...
//!
//! Albums whose genre was fetched within the last `updatefrequency` days are
//! skipped unless `--force` is given.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error};

use mbgenres::{Config, GenreFetcher, GenreTagger, JsonLibrary, UreqTransport, Whitelist};

#[derive(Parser)]
#[command(name = "mbgenres", version, about = "Fetch genres from MusicBrainz")]
struct Args {
    /// Force genre updates, ignoring when they were last fetched
    #[arg(short = 'F', long)]
    force: bool,

    /// Don't write the new genres into the albums' audio files
    #[arg(short = 'W', long)]
    nowrite: bool,

    /// Config file (default: ~/.state/mbgenres/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Library file, overriding the `library` option
    #[arg(long)]
    library: Option<PathBuf>,

    /// Print the effective settings and exit
    #[arg(long)]
    show_config: bool,

    /// Log lookups and skipped albums
    #[arg(short, long)]
    verbose: bool,

    /// Album query, e.g. `artist:slowdive` or `souvlaki`
    query: Vec<String>,
}

fn configure_logging(verbose: bool) {
    use tracing_subscriber::prelude::*;

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn main() {
    let args = Args::parse();
    configure_logging(args.verbose);

    let loaded = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let mut config = match loaded {
        Ok(c) => c,
        Err(e) => {
            error!("Could not load config: {}", e);
            process::exit(1);
        }
    };
    if let Some(library) = args.library {
        config.library = Some(library);
    }

    let settings = match config.resolve() {
        Ok(s) => s,
        Err(e) => {
            error!("Invalid config: {}", e);
            process::exit(1);
        }
    };

    if args.show_config {
        settings.print("Effective settings");
        return;
    }

    let whitelist = Arc::new(Whitelist::load(&settings.whitelist));

    let mut library = match JsonLibrary::open(&settings.library) {
        Ok(l) => l,
        Err(e) => {
            error!("Could not open library {}: {}", settings.library.display(), e);
            process::exit(1);
        }
    };

    debug!("Using library {}", library.path().display());

    let write = settings.write && !args.nowrite;
    let fetcher = GenreFetcher::new(UreqTransport, whitelist);
    let mut tagger = GenreTagger::new(settings, fetcher);

    match tagger.run(&mut library, &args.query, args.force, write) {
        Ok(summary) => debug!(
            "{} album(s): {} updated, {} unchanged, {} without genres, {} up to date, {} failed",
            summary.albums,
            summary.updated,
            summary.unchanged,
            summary.no_data,
            summary.not_stale,
            summary.failed
        ),
        Err(e) => {
            error!("Could not list albums: {}", e);
            process::exit(1);
        }
    }
}
