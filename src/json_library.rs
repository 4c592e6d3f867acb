//! A [`Library`] kept in a single JSON file.
//!
//! The file holds `{"albums": [...]}` with one [`AlbumRecord`] per album.  It is
//! read when opened and rewritten in full on every store.  Genre tags are
//! written into the album's audio files with `lofty`.

use std::fs;
use std::path::{Path, PathBuf};

use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::prelude::Accessor;
use lofty::read_from_path;
use lofty::tag::Tag;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::library::{AlbumQuery, AlbumRecord, Library, LibraryError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryFile {
    #[serde(default)]
    albums: Vec<AlbumRecord>,
}

pub struct JsonLibrary {
    path: PathBuf,
    albums: Vec<AlbumRecord>,
}

impl JsonLibrary {
    /// Open the library at `path`.  A missing file is an empty library; it is
    /// created on the first store.
    pub fn open(path: &Path) -> Result<Self, LibraryError> {
        let albums = if path.exists() {
            let content = fs::read_to_string(path)?;
            let file: LibraryFile = serde_json::from_str(&content)?;
            file.albums
        } else {
            debug!("Library file {} does not exist, starting empty", path.display());
            Vec::new()
        };

        Ok(JsonLibrary {
            path: path.to_path_buf(),
            albums,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, id: u64) -> Option<&AlbumRecord> {
        self.albums.iter().find(|a| a.id == id)
    }

    /// Add an album, replacing any album with the same id.  Not saved until
    /// [`save`](Self::save) or the next store.
    pub fn insert(&mut self, album: AlbumRecord) {
        match self.albums.iter_mut().find(|a| a.id == album.id) {
            Some(existing) => *existing = album,
            None => self.albums.push(album),
        }
    }

    pub fn save(&self) -> Result<(), LibraryError> {
        self.write_file(&self.albums)
    }

    fn write_file(&self, albums: &[AlbumRecord]) -> Result<(), LibraryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = LibraryFile {
            albums: albums.to_vec(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl Library for JsonLibrary {
    fn albums(&self, query: &[String]) -> Result<Vec<AlbumRecord>, LibraryError> {
        let query = AlbumQuery::parse(query);
        Ok(self
            .albums
            .iter()
            .filter(|a| query.matches(a))
            .cloned()
            .collect())
    }

    /// Store the album's genre fields.  The in-memory library only changes
    /// once the file has been written.
    fn persist(&mut self, album: &AlbumRecord) -> Result<(), LibraryError> {
        let mut albums = self.albums.clone();
        let stored = albums
            .iter_mut()
            .find(|a| a.id == album.id)
            .ok_or(LibraryError::UnknownAlbum(album.id))?;
        stored.genre = album.genre.clone();
        stored.genreupdated = album.genreupdated.clone();

        self.write_file(&albums)?;
        self.albums = albums;
        Ok(())
    }

    fn write_tags(&mut self, album: &AlbumRecord) -> Result<(), LibraryError> {
        let mut failed = 0;
        for item in &album.items {
            if let Err(e) = write_genre_tag(item, &album.genre) {
                warn!("Could not write tags to {}: {}", item.display(), e);
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(LibraryError::TagWrite {
                failed,
                total: album.items.len(),
            });
        }
        Ok(())
    }
}

/// Set (or clear, when empty) the genre of one audio file.
pub fn write_genre_tag(path: &Path, genre: &str) -> Result<(), LibraryError> {
    let mut tagged_file =
        read_from_path(path).map_err(|e| LibraryError::Tag(format!("failed to read tags: {e}")))?;
    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }

    let tag = tagged_file
        .tag_mut(tag_type)
        .ok_or_else(|| LibraryError::Tag(format!("no writable tag available for {:?}", tag_type)))?;

    if genre.is_empty() {
        tag.remove_genre();
    } else {
        tag.set_genre(genre.to_string());
    }

    tagged_file
        .save_to_path(path, WriteOptions::default())
        .map_err(|e| LibraryError::Tag(format!("failed to write tags: {e}")))?;
    debug!("Wrote genre {:?} to {}", genre, path.display());
    Ok(())
}
