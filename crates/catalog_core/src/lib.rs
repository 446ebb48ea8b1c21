//! Core data-lifecycle logic for the catalog detail view.
//! This crate owns the fetch/cancel protocol and favorites persistence.

pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;

pub use config::{CatalogConfig, ConfigError};
pub use controller::activity::{ActivityScope, ActivityToken};
pub use controller::detail::{DetailController, ToggleError};
pub use controller::favorite::{
    FavoriteController, FavoriteLookupFailure, PersistenceFailure, PersistenceOp,
};
pub use controller::fetch::{FetchController, FetchOutcome};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{
    Genre, ItemId, ItemRecord, ItemValidationError, PosterSource, StarBreakdown,
    OVERVIEW_FALLBACK,
};
pub use model::view_state::{DetailPhase, DetailViewState, FavoriteState};
pub use remote::{normalize_item_key, CatalogClient, FetchFailure, HttpCatalogClient};
pub use repo::favorite_repo::{
    FavoritesNamespace, FavoritesStore, SqliteFavoritesStore, StoreError, StoreResult,
    DEFAULT_FAVORITES_NAMESPACE,
};

/// Detail controller wired to the production collaborators.
pub type HttpDetailController = DetailController<HttpCatalogClient, SqliteFavoritesStore>;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
