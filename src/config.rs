use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::aggregator::SelectionPolicy;
use crate::writer::GenreFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HOME environment variable not set")]
    NoHome,
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Options as written in the config file; unset options take their defaults
/// in [`Config::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genrecount: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minvotes: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamiccount: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamicdivider: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artistfallback: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub titlecase: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updatefrequency: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub write: Option<bool>,
}

impl Config {
    /// State directory (~/.state/mbgenres)
    pub fn get_state_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::NoHome)?;
        Ok(Path::new(&home).join(".state").join("mbgenres"))
    }

    /// Get the config file path (~/.state/mbgenres/config.toml)
    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::get_state_dir()?.join("config.toml"))
    }

    /// Load config from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load config from `path`; a missing file yields an empty config
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Fill in defaults for every unset option
    pub fn resolve(&self) -> Result<GenreSettings, ConfigError> {
        let whitelist = match &self.whitelist {
            Some(path) => path.clone(),
            None => Self::get_state_dir()?.join("tagwhitelist.txt"),
        };

        let library = match &self.library {
            Some(path) => path.clone(),
            None => Self::get_state_dir()?.join("library.json"),
        };

        Ok(GenreSettings {
            genre_count: self.genrecount.unwrap_or(5),
            min_votes: self.minvotes.unwrap_or(1),
            fallback: self.fallback.clone(),
            dynamic_count: self.dynamiccount.unwrap_or(true),
            dynamic_divider: self.dynamicdivider.unwrap_or(2),
            artist_fallback: self.artistfallback.unwrap_or(true),
            replace: self.replace.unwrap_or(false),
            auto: self.auto.unwrap_or(false),
            separator: self.separator.clone().unwrap_or_else(|| ";".to_string()),
            title_case: self.titlecase.unwrap_or(false),
            update_frequency: self.updatefrequency.unwrap_or(7),
            whitelist,
            library,
            write: self.write.unwrap_or(true),
        })
    }
}

/// Effective settings, fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreSettings {
    pub genre_count: usize,
    pub min_votes: u32,
    pub fallback: Option<String>,
    pub dynamic_count: bool,
    pub dynamic_divider: u32,
    pub artist_fallback: bool,
    pub replace: bool,
    pub auto: bool,
    pub separator: String,
    pub title_case: bool,
    /// Days before a fetched genre is considered stale
    pub update_frequency: u32,
    pub whitelist: PathBuf,
    pub library: PathBuf,
    pub write: bool,
}

impl Default for GenreSettings {
    fn default() -> Self {
        GenreSettings {
            genre_count: 5,
            min_votes: 1,
            fallback: None,
            dynamic_count: true,
            dynamic_divider: 2,
            artist_fallback: true,
            replace: false,
            auto: false,
            separator: ";".to_string(),
            title_case: false,
            update_frequency: 7,
            whitelist: PathBuf::from("tagwhitelist.txt"),
            library: PathBuf::from("library.json"),
            write: true,
        }
    }
}

impl GenreSettings {
    pub fn policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            genre_count: self.genre_count,
            dynamic_count: self.dynamic_count,
            dynamic_divider: self.dynamic_divider,
        }
    }

    pub fn format(&self) -> GenreFormat {
        GenreFormat {
            separator: self.separator.clone(),
            title_case: self.title_case,
        }
    }

    /// Print the settings in a human-readable format
    pub fn print(&self, title: &str) {
        println!("{}:", title);
        println!("  Genre count:        {}", self.genre_count);
        println!("  Minimum votes:      {}", self.min_votes);
        println!("  Fallback genre:     {}", self.fallback.as_deref().unwrap_or("(none)"));
        println!("  Dynamic count:      {}", if self.dynamic_count { "enabled" } else { "disabled" });
        println!("  Dynamic divider:    {}", self.dynamic_divider);
        println!("  Artist fallback:    {}", if self.artist_fallback { "enabled" } else { "disabled" });
        println!("  Replace genres:     {}", if self.replace { "yes" } else { "no (merge)" });
        println!("  Run on import:      {}", if self.auto { "yes" } else { "no" });
        println!("  Separator:          {:?}", self.separator);
        println!("  Title case:         {}", if self.title_case { "yes" } else { "no" });
        println!("  Update frequency:   {} days", self.update_frequency);
        println!("  Tag whitelist:      {}", self.whitelist.display());
        println!("  Library:            {}", self.library.display());
        println!("  Write tags:         {}", if self.write { "yes" } else { "no" });
    }
}
