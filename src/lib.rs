pub mod aggregator;
pub mod config;
pub mod json_library;
pub mod library;
pub mod musicbrainz;
pub mod rate_limiter;
pub mod refresh;
pub mod tagger;
pub mod whitelist;
pub mod writer;

pub use aggregator::{select_genres, SelectionPolicy, VoteSources};
pub use config::{Config, GenreSettings};
pub use json_library::JsonLibrary;
pub use library::{AlbumQuery, AlbumRecord, Library, LibraryError};
pub use musicbrainz::{EntityType, FetchError, GenreFetcher, GenreVote, Transport, UreqTransport};
pub use refresh::should_refresh;
pub use tagger::{GenreTagger, RefreshOutcome, RunSummary};
pub use whitelist::Whitelist;
pub use writer::compose_genre_string;
