//! Detail view controller.
//!
//! # Responsibility
//! - Compose the fetch and favorite controllers around one view state.
//! - Expose the operations the presentation layer calls: activate, retire,
//!   toggle, link modal, snapshot.
//!
//! # Invariants
//! - Toggles are serialized and require a loaded item with known favorite
//!   status.
//! - The in-memory favorite flag changes only after a confirmed store write.
//! - A view retired mid-toggle keeps its state untouched.

use crate::controller::favorite::{FavoriteController, PersistenceFailure};
use crate::controller::fetch::{FetchController, FetchOutcome};
use crate::controller::with_state;
use crate::model::view_state::{DetailViewState, FavoriteState};
use crate::remote::CatalogClient;
use crate::repo::favorite_repo::{FavoritesNamespace, FavoritesStore};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Why a toggle request could not be applied.
#[derive(Debug)]
pub enum ToggleError {
    /// No item is loaded, or its favorite status is still unknown.
    ItemNotLoaded,
    /// View was retired; nothing was attempted.
    Retired,
    Persistence(PersistenceFailure),
}

impl Display for ToggleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotLoaded => write!(f, "no loaded item to toggle"),
            Self::Retired => write!(f, "detail view is retired"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ToggleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersistenceFailure> for ToggleError {
    fn from(value: PersistenceFailure) -> Self {
        Self::Persistence(value)
    }
}

/// Data-lifecycle controller behind one detail view instance.
pub struct DetailController<C: CatalogClient, S: FavoritesStore> {
    session_id: Uuid,
    fetch: FetchController<C>,
    favorites: FavoriteController<S>,
    state: Mutex<DetailViewState>,
    toggle_gate: tokio::sync::Mutex<()>,
}

impl<C: CatalogClient, S: FavoritesStore> DetailController<C, S> {
    pub fn new(client: Arc<C>, store: Arc<S>, namespace: FavoritesNamespace) -> Self {
        let session_id = Uuid::new_v4();
        Self {
            session_id,
            fetch: FetchController::new(session_id, client),
            favorites: FavoriteController::new(store, namespace),
            state: Mutex::new(DetailViewState::new()),
            toggle_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Per-view identifier used to correlate log lines.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Activates the view for `raw_id`; see `FetchController::start`.
    pub async fn start(&self, raw_id: &str) -> FetchOutcome {
        self.fetch
            .start(raw_id, &self.favorites, &self.state)
            .await
    }

    /// Retires the view (unmount). Late results are discarded afterwards.
    pub fn retire(&self) -> bool {
        self.fetch.retire(&self.state)
    }

    /// Switches to another identifier: retire, reset, fetch again.
    pub async fn change_item(&self, raw_id: &str) -> FetchOutcome {
        self.fetch.retire(&self.state);
        self.start(raw_id).await
    }

    pub fn is_active(&self) -> bool {
        self.fetch.is_active()
    }

    /// Copy of the current render-ready state.
    pub fn snapshot(&self) -> DetailViewState {
        with_state(&self.state, |view| view.clone())
    }

    /// Flips the saved flag of the loaded item and returns the new value.
    ///
    /// # Errors
    /// - `Retired` when the view is no longer active.
    /// - `ItemNotLoaded` before the fetch flow resolved an item.
    /// - `Persistence` when the store write fails; state is unchanged.
    pub async fn toggle_favorite(&self) -> Result<bool, ToggleError> {
        let _serialized = self.toggle_gate.lock().await;
        let token = self.fetch.current_token().ok_or(ToggleError::Retired)?;
        let (item, current) = with_state(&self.state, |view| match (&view.item, view.favorite) {
            (Some(item), favorite) if favorite.is_known() => {
                Some((item.clone(), favorite.is_favorite()))
            }
            _ => None,
        })
        .ok_or(ToggleError::ItemNotLoaded)?;

        let next = self.favorites.toggle_favorite(&item, current).await?;
        let applied = with_state(&self.state, |view| {
            if token.is_active() {
                view.favorite = FavoriteState::from_saved(next);
                true
            } else {
                false
            }
        });
        if !applied {
            debug!(
                "event=stale_update_suppressed module=controller session={} stage=toggle",
                self.session_id
            );
        }
        Ok(next)
    }

    /// Opens the homepage modal when the loaded item has a homepage.
    pub fn open_link(&self) -> bool {
        with_state(&self.state, |view| {
            let enabled = view.item.as_ref().is_some_and(|item| item.has_homepage());
            view.is_link_modal_open = enabled;
            enabled
        })
    }

    pub fn close_link(&self) {
        with_state(&self.state, |view| view.is_link_modal_open = false);
    }
}
