pub mod app;
pub mod catalog;
pub mod config;
pub mod detail;
mod fetch;
pub mod metrics;
pub mod search;
pub mod store;
pub mod summary;
pub mod testing;
pub mod title;
pub mod watched;

pub use app::{
    create_app, AppController, AppError, AppHandle, AppRuntime, AppSnapshot, Key, KeyOutcome,
    ResultsPane, Selection, SidePane, View, WatchedView,
};
pub use catalog::{Catalog, CatalogError, MovieDetail, OmdbClient, SearchResult};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use detail::{DetailError, DetailFetcher, DetailPhase, DetailSnapshot};
pub use search::{SearchPipeline, SearchState};
pub use store::{KeyValueStore, MemoryKvStore, PersistentStore, SqliteKvStore, StorageError};
pub use summary::{summarize, WatchlistSummary};
pub use title::{SharedTitle, TitleGuard, TitleSink};
pub use watched::{WatchedEntry, WatchedList};
