//! Per-album genre refresh.
//!
//! [`GenreTagger`] ties the pieces together for one album at a time:
//!
//! 1. skip albums whose genre was refreshed recently (unless forced),
//! 2. fetch votes for the release and release group, and for the album
//!    artist when those have none and the artist fallback is enabled,
//! 3. select the genres and build the new genre string,
//! 4. store it through the [`Library`] and re-tag the album's files.
//!
//! Albums are processed sequentially and a failing album never stops a batch.

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::aggregator::{select_genres, VoteSources};
use crate::config::GenreSettings;
use crate::library::{AlbumRecord, Library, LibraryError};
use crate::musicbrainz::{EntityType, GenreFetcher, Transport};
use crate::refresh::{format_stamp, should_refresh};
use crate::writer::compose_genre_string;

/// What happened to one album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Refreshed recently; nothing fetched.
    NotStale,
    /// No genres found and no fallback applies; album left untouched.
    NoData,
    /// The computed genre equals the stored one; nothing stored.
    Unchanged,
    /// The album now has this genre.
    Updated(String),
}

/// Counters for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub albums: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub no_data: usize,
    pub not_stale: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &RefreshOutcome) {
        match outcome {
            RefreshOutcome::NotStale => self.not_stale += 1,
            RefreshOutcome::NoData => self.no_data += 1,
            RefreshOutcome::Unchanged => self.unchanged += 1,
            RefreshOutcome::Updated(_) => self.updated += 1,
        }
    }
}

pub struct GenreTagger<T> {
    settings: GenreSettings,
    fetcher: GenreFetcher<T>,
}

impl<T: Transport> GenreTagger<T> {
    pub fn new(settings: GenreSettings, fetcher: GenreFetcher<T>) -> Self {
        GenreTagger { settings, fetcher }
    }

    pub fn settings(&self) -> &GenreSettings {
        &self.settings
    }

    pub fn fetcher(&self) -> &GenreFetcher<T> {
        &self.fetcher
    }

    /// Fetch the votes of an album's release and release group, falling back
    /// to the album artist when both are empty.
    pub fn collect_votes(&mut self, album: &AlbumRecord) -> VoteSources {
        let min_votes = self.settings.min_votes;

        let mut sources = VoteSources {
            release: self
                .fetcher
                .fetch_votes(EntityType::Release, album.mb_albumid.as_deref(), min_votes),
            release_group: self.fetcher.fetch_votes(
                EntityType::ReleaseGroup,
                album.mb_releasegroupid.as_deref(),
                min_votes,
            ),
            artist: Vec::new(),
        };

        if sources.release_is_empty() && self.settings.artist_fallback {
            debug!("No release genres for \"{}\", trying the artist", album.album);
            sources.artist = self.fetcher.fetch_votes(
                EntityType::Artist,
                album.mb_albumartistid.as_deref(),
                min_votes,
            );
        }

        sources
    }

    /// Refresh the genre of one album.
    ///
    /// `album` is updated in place once the new genre has been stored, and left
    /// as it was when storing fails.  Only storing the album can fail; failing
    /// to re-tag its files is logged.
    pub fn refresh_album<L: Library + ?Sized>(
        &mut self,
        library: &mut L,
        album: &mut AlbumRecord,
        force: bool,
        write: bool,
        now: NaiveDateTime,
    ) -> Result<RefreshOutcome, LibraryError> {
        if !should_refresh(
            album.genreupdated.as_deref(),
            force,
            self.settings.update_frequency,
            now,
        ) {
            debug!("Genre of \"{}\" is up to date, skipping", album.album);
            return Ok(RefreshOutcome::NotStale);
        }

        let sources = self.collect_votes(album);
        let selected = select_genres(&sources, self.settings.artist_fallback, &self.settings.policy());

        let genre = match compose_genre_string(
            &selected,
            album.existing_genre(),
            self.settings.replace,
            self.settings.fallback.as_deref(),
            &self.settings.format(),
        ) {
            Some(genre) => genre,
            None => {
                debug!("No genres found for \"{}\" by \"{}\"", album.album, album.albumartist);
                return Ok(RefreshOutcome::NoData);
            }
        };

        if genre == album.genre {
            debug!("Genre of \"{}\" unchanged", album.album);
            return Ok(RefreshOutcome::Unchanged);
        }

        let mut updated = album.clone();
        updated.genre = genre.clone();
        updated.genreupdated = Some(format_stamp(now));
        library.persist(&updated)?;
        *album = updated;
        info!(
            "Added genre(s) [{}] to \"{}\" by \"{}\"",
            album.genre, album.album, album.albumartist
        );

        if write {
            if let Err(e) = library.write_tags(album) {
                warn!("Could not write tags for \"{}\": {}", album.album, e);
            }
        }

        Ok(RefreshOutcome::Updated(genre))
    }

    /// Refresh every album matching `query`.
    ///
    /// Only listing the albums can fail; per-album errors are logged and
    /// counted in the summary.
    pub fn run<L: Library + ?Sized>(
        &mut self,
        library: &mut L,
        query: &[String],
        force: bool,
        write: bool,
    ) -> Result<RunSummary, LibraryError> {
        let albums = library.albums(query)?;
        let mut summary = RunSummary {
            albums: albums.len(),
            ..Default::default()
        };

        for mut album in albums {
            let now = Local::now().naive_local();
            match self.refresh_album(library, &mut album, force, write, now) {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    warn!("Could not store genre for \"{}\": {}", album.album, e);
                    summary.failed += 1;
                }
            }
        }

        debug!("{:?}", summary);
        Ok(summary)
    }

    /// Import hook: when `auto` is enabled, refresh a freshly imported album
    /// regardless of its stamp and re-tag its files.  Returns `None` when the
    /// hook is disabled.
    pub fn on_album_imported<L: Library + ?Sized>(
        &mut self,
        library: &mut L,
        album: &mut AlbumRecord,
    ) -> Result<Option<RefreshOutcome>, LibraryError> {
        if !self.settings.auto {
            return Ok(None);
        }
        let now = Local::now().naive_local();
        self.refresh_album(library, album, true, true, now).map(Some)
    }
}
