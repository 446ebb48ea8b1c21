//! FFI use-case API for the Flutter detail screen.
//!
//! # Responsibility
//! - Expose the detail view lifecycle (open, toggle, link modal, close) to
//!   Dart via FRB.
//! - Flatten core state into render-ready envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - At most one detail view is active; opening another retires it.
//! - Core errors are reported through envelope fields, never thrown.

use catalog_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CatalogConfig, DetailController, DetailPhase, DetailViewState, FetchOutcome,
    HttpCatalogClient, HttpDetailController, ItemRecord, PosterSource, SqliteFavoritesStore,
    ToggleError,
};
use log::info;
use once_cell::sync::{Lazy, OnceCell};
use std::sync::{Arc, Mutex, PoisonError};

static CONTEXT: OnceCell<FfiContext> = OnceCell::new();
static ACTIVE_DETAIL: Lazy<Mutex<Option<Arc<HttpDetailController>>>> =
    Lazy::new(|| Mutex::new(None));

/// Process-wide collaborators shared by every detail view.
struct FfiContext {
    config: CatalogConfig,
    client: Arc<HttpCatalogClient>,
    store: Arc<SqliteFavoritesStore>,
}

impl FfiContext {
    fn from_config(config: CatalogConfig) -> Result<Self, String> {
        let client = HttpCatalogClient::new(&config)
            .map_err(|err| format!("catalog client init failed: {err}"))?;
        let store = SqliteFavoritesStore::open(&config.db_path)
            .map_err(|err| format!("favorites store open failed: {err}"))?;
        Ok(Self {
            config,
            client: Arc::new(client),
            store: Arc::new(store),
        })
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Render-ready projection of one item record.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailItemView {
    pub id: u64,
    pub title: String,
    /// Overview text with placeholder already applied.
    pub overview: String,
    pub vote_average: f64,
    /// One-decimal rating label, e.g. `7.5/10`.
    pub rating_label: String,
    /// Remote poster URL; `None` means use the bundled fallback image.
    pub poster_url: Option<String>,
    /// Homepage link; `None` disables the link button.
    pub homepage: Option<String>,
    pub genres: Vec<String>,
    pub stars_full: u8,
    pub stars_half: u8,
    pub stars_empty: u8,
}

/// Detail view state envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailViewResponse {
    /// `loading|loaded|failed|closed`.
    pub phase: String,
    pub is_loading: bool,
    pub is_favorite: bool,
    pub is_link_modal_open: bool,
    pub item: Option<DetailItemView>,
    /// Machine-readable failure code when `phase == "failed"`.
    pub error_code: Option<String>,
    /// Human-readable message for diagnostics.
    pub message: String,
}

impl DetailViewResponse {
    fn closed(message: impl Into<String>) -> Self {
        Self {
            phase: "closed".to_string(),
            is_loading: false,
            is_favorite: false,
            is_link_modal_open: false,
            item: None,
            error_code: None,
            message: message.into(),
        }
    }
}

/// Action envelope for toggle and link operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailActionResponse {
    pub ok: bool,
    /// Favorite flag after the action (unchanged on failure).
    pub is_favorite: bool,
    pub message: String,
}

/// Opens the detail view for `item_id` and waits for the first load.
///
/// # FFI contract
/// - Async call; performs one network request and one DB read.
/// - Retires any previously open detail view first.
/// - Never panics; failures surface as `phase == "failed"`.
pub async fn detail_open(item_id: String) -> DetailViewResponse {
    let ctx = match context() {
        Ok(ctx) => ctx,
        Err(message) => return DetailViewResponse::closed(message),
    };

    let controller = Arc::new(DetailController::new(
        Arc::clone(&ctx.client),
        Arc::clone(&ctx.store),
        ctx.config.favorites_namespace.clone(),
    ));
    if let Some(previous) = replace_active(Some(Arc::clone(&controller))) {
        previous.retire();
    }
    info!(
        "event=ffi_detail_open module=ffi status=start session={}",
        controller.session_id()
    );

    let outcome = controller.start(item_id.as_str()).await;
    finish_open(&controller, outcome, ctx.config.image_base_url.as_str())
}

// A view closed or replaced while loading reports `closed`, even if its
// fetch completed.
fn finish_open(
    controller: &Arc<HttpDetailController>,
    outcome: FetchOutcome,
    image_base_url: &str,
) -> DetailViewResponse {
    if !is_active(controller) {
        controller.retire();
        return DetailViewResponse::closed("Detail view closed before load finished.");
    }
    let message = match &outcome {
        FetchOutcome::Loaded => "Loaded.".to_string(),
        FetchOutcome::Failed(failure) => failure.to_string(),
        FetchOutcome::Suppressed => "Detail view closed before load finished.".to_string(),
        FetchOutcome::AlreadyActive => "Detail view already active.".to_string(),
    };
    if outcome == FetchOutcome::Suppressed {
        return DetailViewResponse::closed(message);
    }
    to_view_response(&controller.snapshot(), image_base_url, message)
}

/// Returns the current state of the open detail view.
#[flutter_rust_bridge::frb(sync)]
pub fn detail_snapshot() -> DetailViewResponse {
    let Some(controller) = active() else {
        return DetailViewResponse::closed("No detail view is open.");
    };
    let image_base_url = CONTEXT
        .get()
        .map(|ctx| ctx.config.image_base_url.as_str())
        .unwrap_or_default();
    to_view_response(&controller.snapshot(), image_base_url, String::new())
}

/// Toggles the favorite flag of the open item.
///
/// # FFI contract
/// - Async call, DB-backed execution.
/// - `is_favorite` reflects persisted state; it is unchanged when `ok == false`.
pub async fn detail_toggle_favorite() -> DetailActionResponse {
    let Some(controller) = active() else {
        return DetailActionResponse {
            ok: false,
            is_favorite: false,
            message: "No detail view is open.".to_string(),
        };
    };

    match controller.toggle_favorite().await {
        Ok(is_favorite) => DetailActionResponse {
            ok: true,
            is_favorite,
            message: if is_favorite {
                "Saved to favorites.".to_string()
            } else {
                "Removed from favorites.".to_string()
            },
        },
        Err(err) => DetailActionResponse {
            ok: false,
            is_favorite: controller.snapshot().is_favorite(),
            message: toggle_error_message(&err),
        },
    }
}

/// Opens the homepage modal if the item has a homepage.
#[flutter_rust_bridge::frb(sync)]
pub fn detail_open_link() -> bool {
    active().is_some_and(|controller| controller.open_link())
}

/// Closes the homepage modal.
#[flutter_rust_bridge::frb(sync)]
pub fn detail_close_link() {
    if let Some(controller) = active() {
        controller.close_link();
    }
}

/// Retires and discards the open detail view (unmount).
///
/// Returns `false` when no view was open.
#[flutter_rust_bridge::frb(sync)]
pub fn detail_close() -> bool {
    match replace_active(None) {
        Some(controller) => {
            controller.retire();
            true
        }
        None => false,
    }
}

fn context() -> Result<&'static FfiContext, String> {
    CONTEXT.get_or_try_init(|| {
        let config =
            CatalogConfig::from_env().map_err(|err| format!("invalid configuration: {err}"))?;
        FfiContext::from_config(config)
    })
}

fn active() -> Option<Arc<HttpDetailController>> {
    ACTIVE_DETAIL
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn is_active(controller: &Arc<HttpDetailController>) -> bool {
    active().is_some_and(|current| Arc::ptr_eq(&current, controller))
}

fn replace_active(next: Option<Arc<HttpDetailController>>) -> Option<Arc<HttpDetailController>> {
    let mut slot = ACTIVE_DETAIL.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, next)
}

fn toggle_error_message(err: &ToggleError) -> String {
    match err {
        ToggleError::ItemNotLoaded => "Item is not loaded yet.".to_string(),
        ToggleError::Retired => "Detail view is closed.".to_string(),
        ToggleError::Persistence(failure) => format!("Could not update favorites: {failure}"),
    }
}

fn to_view_response(
    state: &DetailViewState,
    image_base_url: &str,
    message: String,
) -> DetailViewResponse {
    let phase = match state.phase() {
        DetailPhase::Loading => "loading",
        DetailPhase::Loaded => "loaded",
        DetailPhase::Failed => "failed",
    };
    DetailViewResponse {
        phase: phase.to_string(),
        is_loading: state.is_loading(),
        is_favorite: state.is_favorite(),
        is_link_modal_open: state.is_link_modal_open,
        item: state
            .item
            .as_ref()
            .map(|item| to_item_view(item, image_base_url)),
        error_code: state
            .failure
            .as_ref()
            .map(|failure| failure.code().to_string()),
        message,
    }
}

fn to_item_view(item: &ItemRecord, image_base_url: &str) -> DetailItemView {
    let stars = item.star_breakdown();
    DetailItemView {
        id: item.id,
        title: item.title.clone(),
        overview: item.overview_or_fallback().to_string(),
        vote_average: item.vote_average,
        rating_label: item.rating_label(),
        poster_url: match item.poster_source(image_base_url) {
            PosterSource::Remote(url) => Some(url),
            PosterSource::Fallback => None,
        },
        homepage: item.homepage_link().map(str::to_string),
        genres: item.genres.iter().map(|genre| genre.name.clone()).collect(),
        stars_full: stars.full,
        stars_half: stars.half,
        stars_empty: stars.empty,
    }
}
