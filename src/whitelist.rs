//! Whitelist of free-text MusicBrainz tags that may count as genres.
//!
//! The whitelist is a plain text file with one tag name per line.  It is read
//! once at startup and never written back, except that a missing file is
//! created empty so users have somewhere to put their tags.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

/// Accepted tag names, matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    names: HashSet<String>,
}

impl Whitelist {
    /// Build a whitelist from an iterator of names.  Surrounding whitespace is
    /// trimmed and blank names are ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        Whitelist { names }
    }

    /// Load the whitelist from `path`.
    ///
    /// Never fails: if the file cannot be read an empty file is created in its
    /// place (best effort) and an empty whitelist is returned.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => {
                let whitelist = Self::from_names(content.lines());
                debug!(
                    "Loaded {} whitelisted tag(s) from {}",
                    whitelist.len(),
                    path.display()
                );
                whitelist
            }
            Err(e) => {
                debug!("Whitelist file {} does not exist ({})", path.display(), e);
                create_empty(path);
                Whitelist::default()
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn create_empty(path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                debug!("Could not create directory {}: {}", parent.display(), e);
            }
        }
    }
    if let Err(e) = fs::OpenOptions::new().create(true).append(true).open(path) {
        debug!("Could not create whitelist file {}: {}", path.display(), e);
    }
}
