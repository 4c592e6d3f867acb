//! MusicBrainz genre and tag lookups.
//!
//! Each lookup asks the web service for the curated genres and free-text tags
//! of one entity (release, release group or artist), together with their vote
//! counts.  Lookups are rate limited and retried; a lookup that keeps failing
//! simply yields no votes so the remaining entities can still be used.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::rate_limiter::RateLimiter;
use crate::whitelist::Whitelist;

pub const MUSICBRAINZ_API: &str = "https://musicbrainz.org/ws/2";

pub const USER_AGENT: &str = concat!(
    "mbgenres/",
    env!("CARGO_PKG_VERSION"),
    " ( https://github.com/mbgenres/mbgenres )"
);

/// Attempts per entity lookup, including the first one.
pub const MAX_ATTEMPTS: u32 = 5;

/// The MusicBrainz entity a set of votes was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Release,
    ReleaseGroup,
    Artist,
}

impl EntityType {
    /// Path segment used by the web service.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Release => "release",
            EntityType::ReleaseGroup => "release-group",
            EntityType::Artist => "artist",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One genre (or whitelisted tag) and the number of votes it received on one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenreVote {
    pub name: String,
    pub count: u32,
}

impl GenreVote {
    pub fn new(name: &str, count: u32) -> Self {
        GenreVote {
            name: name.to_string(),
            count,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    /// Short classification used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Status(_) => "http",
            FetchError::Parse(_) => "parse",
        }
    }
}

// ── API response types ───────────────────────────────────────────────────────

/// Genres and tags of one entity as returned by `?inc=genres+tags`.
/// Both arrays must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityTags {
    pub genres: Vec<TagCount>,
    pub tags: Vec<TagCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub count: u32,
}

pub fn parse_entity_tags(body: &str) -> Result<EntityTags, FetchError> {
    Ok(serde_json::from_str(body)?)
}

/// Turn a response into votes: genres with at least `min_votes` votes, plus
/// tags with at least `min_votes` votes whose name is whitelisted.
///
/// A name reported both as genre and as tag is kept once with its higher
/// count.  The result is ordered by name.
pub fn admit_votes(entity: &EntityTags, whitelist: &Whitelist, min_votes: u32) -> Vec<GenreVote> {
    let genres = entity.genres.iter().filter(|g| g.count >= min_votes);
    let tags = entity
        .tags
        .iter()
        .filter(|t| t.count >= min_votes && whitelist.contains(&t.name));

    let mut best: BTreeMap<&str, u32> = BTreeMap::new();
    for tag in genres.chain(tags) {
        let count = best.entry(tag.name.as_str()).or_insert(tag.count);
        *count = (*count).max(tag.count);
    }

    best.into_iter()
        .map(|(name, count)| GenreVote::new(name, count))
        .collect()
}

// ── Transport ────────────────────────────────────────────────────────────────

/// Performs the HTTP GET of a lookup and returns the response body.
pub trait Transport {
    fn get(&self, url: &str, user_agent: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP transport backed by `ureq`.
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn get(&self, url: &str, user_agent: &str) -> Result<String, FetchError> {
        let response = ureq::get(url)
            .set("User-Agent", user_agent)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => FetchError::Status(code),
                ureq::Error::Transport(t) => FetchError::Network(t.to_string()),
            })?;

        response
            .into_string()
            .map_err(|e| FetchError::Network(e.to_string()))
    }
}

// ── Fetcher ──────────────────────────────────────────────────────────────────

/// Fetches genre votes for MusicBrainz entities.
///
/// Owns the process-wide rate limiter, so all albums should share one fetcher.
pub struct GenreFetcher<T> {
    transport: T,
    whitelist: Arc<Whitelist>,
    limiter: RateLimiter,
    base_url: String,
    max_attempts: u32,
}

impl<T: Transport> GenreFetcher<T> {
    pub fn new(transport: T, whitelist: Arc<Whitelist>) -> Self {
        GenreFetcher {
            transport,
            whitelist,
            limiter: RateLimiter::musicbrainz(),
            base_url: MUSICBRAINZ_API.to_string(),
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn lookup_url(&self, entity: EntityType, id: &str) -> String {
        format!(
            "{}/{}/{}?inc=genres+tags&fmt=json",
            self.base_url, entity, id
        )
    }

    /// Fetch the admitted votes of one entity.
    ///
    /// Returns an empty list when `id` is missing or when every attempt failed;
    /// errors are logged, never returned.
    pub fn fetch_votes(&mut self, entity: EntityType, id: Option<&str>, min_votes: u32) -> Vec<GenreVote> {
        let id = match id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => {
                debug!("No MusicBrainz {} id, skipping lookup", entity);
                return Vec::new();
            }
        };

        let url = self.lookup_url(entity, id);

        for attempt in 1..=self.max_attempts {
            self.limiter.wait_if_needed();
            debug!("MusicBrainz request: {}", url);

            let result = self
                .transport
                .get(&url, USER_AGENT)
                .and_then(|body| parse_entity_tags(&body));

            match result {
                Ok(tags) => return admit_votes(&tags, &self.whitelist, min_votes),
                Err(e) => {
                    debug!(
                        "Attempt {}/{}: {} error fetching genres for {} {}: {}",
                        attempt,
                        self.max_attempts,
                        e.kind(),
                        entity,
                        id,
                        e
                    );
                }
            }
        }

        debug!(
            "Unable to fetch genres for {} {} after {} tries, skipping",
            entity, id, self.max_attempts
        );
        Vec::new()
    }
}
