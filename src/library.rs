//! The music library the tagger works on.
//!
//! The tagger never touches storage itself.  It lists albums, stores an
//! updated album and asks for the album's files to be re-tagged through the
//! [`Library`] trait, so any library manager can host it.  A file-backed
//! implementation lives in [`json_library`](crate::json_library).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Album record ─────────────────────────────────────────────────────────────

/// The fields of a library album the tagger reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlbumRecord {
    /// Library-assigned identifier
    pub id: u64,
    /// Album title
    #[serde(default)]
    pub album: String,
    /// Album artist
    #[serde(default)]
    pub albumartist: String,
    /// MusicBrainz release id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mb_albumid: Option<String>,
    /// MusicBrainz release group id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mb_releasegroupid: Option<String>,
    /// MusicBrainz id of the album artist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mb_albumartistid: Option<String>,
    /// Separator-joined genre list, empty when unknown
    #[serde(default)]
    pub genre: String,
    /// Date of the last successful refresh, `DD/MM/YYYY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genreupdated: Option<String>,
    /// Audio files belonging to the album
    #[serde(default)]
    pub items: Vec<PathBuf>,
}

impl AlbumRecord {
    pub fn existing_genre(&self) -> Option<&str> {
        if self.genre.is_empty() {
            None
        } else {
            Some(&self.genre)
        }
    }
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("library file error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tag error: {0}")]
    Tag(String),
    #[error("album {0} is not in the library")]
    UnknownAlbum(u64),
    #[error("failed to write tags to {failed} of {total} file(s)")]
    TagWrite { failed: usize, total: usize },
}

// ── Trait ────────────────────────────────────────────────────────────────────

/// Storage operations the tagger needs from its host.
pub trait Library {
    /// Albums matching the selector arguments (all albums when empty).
    fn albums(&self, query: &[String]) -> Result<Vec<AlbumRecord>, LibraryError>;

    /// Store the album's `genre` and `genreupdated` fields.
    fn persist(&mut self, album: &AlbumRecord) -> Result<(), LibraryError>;

    /// Write the album's genre into the tags of its files.
    fn write_tags(&mut self, album: &AlbumRecord) -> Result<(), LibraryError>;
}

// ── Query ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    Album,
    AlbumArtist,
    Genre,
    MbAlbumId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Field(Field, String),
    Any(String),
}

/// Album selector built from command line arguments.
///
/// Each argument is either `field:value` (`album`, `albumartist` or `artist`,
/// `genre`, `mb_albumid`) or a bare word matched against album title and album
/// artist.  Matching is a case-insensitive substring test and every term must
/// match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumQuery {
    terms: Vec<Term>,
}

impl AlbumQuery {
    pub fn parse(args: &[String]) -> Self {
        let terms = args
            .iter()
            .filter(|a| !a.trim().is_empty())
            .map(|arg| {
                if let Some((key, value)) = arg.split_once(':') {
                    let field = match key.to_lowercase().as_str() {
                        "album" => Some(Field::Album),
                        "albumartist" | "artist" => Some(Field::AlbumArtist),
                        "genre" => Some(Field::Genre),
                        "mb_albumid" => Some(Field::MbAlbumId),
                        _ => None,
                    };
                    if let Some(field) = field {
                        return Term::Field(field, value.to_lowercase());
                    }
                }
                Term::Any(arg.to_lowercase())
            })
            .collect();
        AlbumQuery { terms }
    }

    pub fn matches(&self, album: &AlbumRecord) -> bool {
        let contains = |haystack: &str, needle: &str| haystack.to_lowercase().contains(needle);

        self.terms.iter().all(|term| match term {
            Term::Field(Field::Album, v) => contains(&album.album, v),
            Term::Field(Field::AlbumArtist, v) => contains(&album.albumartist, v),
            Term::Field(Field::Genre, v) => contains(&album.genre, v),
            Term::Field(Field::MbAlbumId, v) => {
                album.mb_albumid.as_deref().map_or(false, |id| contains(id, v))
            }
            Term::Any(v) => contains(&album.album, v) || contains(&album.albumartist, v),
        })
    }
}
