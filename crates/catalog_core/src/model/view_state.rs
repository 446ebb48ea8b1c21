//! Detail view state model.
//!
//! # Responsibility
//! - Hold the render-ready state owned by one active detail view.
//! - Model favorite status as an explicit `Unknown` / known state machine.
//!
//! # Invariants
//! - `favorite` leaves `Unknown` only after `item` is set.
//! - `is_loading` clears once the favorite lookup resolved or a failure was
//!   recorded; a loaded view always has `item` set.
//! - `failure` and `item` are never both set.
//! - State is never shared between view instances.

use crate::model::item::ItemRecord;
use crate::remote::FetchFailure;

/// Favorite status of the loaded item, as observed by this view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FavoriteState {
    /// No lookup has completed for the current item.
    #[default]
    Unknown,
    Favorited,
    NotFavorited,
}

impl FavoriteState {
    /// Builds a known state from a store membership answer.
    pub fn from_saved(saved: bool) -> Self {
        if saved {
            Self::Favorited
        } else {
            Self::NotFavorited
        }
    }

    /// Returns the membership flag; `Unknown` reads as not saved.
    pub fn is_favorite(self) -> bool {
        matches!(self, Self::Favorited)
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Coarse lifecycle phase derived from the view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPhase {
    Loading,
    Loaded,
    Failed,
}

/// Render-ready state for one detail view instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailViewState {
    /// Fetched record; `None` until the first successful fetch.
    pub item: Option<ItemRecord>,
    /// Favorite machine for `item.id`.
    pub favorite: FavoriteState,
    /// Last fetch failure, kept so "failed" is distinct from "loaded".
    pub failure: Option<FetchFailure>,
    /// Presentation-only flag for the homepage modal.
    pub is_link_modal_open: bool,
    loading_resolved: bool,
}

impl DetailViewState {
    /// Fresh state for a newly activated view.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        !self.loading_resolved
    }

    /// Favorite flag safe for rendering; false while the item is unknown.
    pub fn is_favorite(&self) -> bool {
        self.item.is_some() && self.favorite.is_favorite()
    }

    pub fn phase(&self) -> DetailPhase {
        if self.failure.is_some() {
            DetailPhase::Failed
        } else if self.item.is_some() && self.loading_resolved {
            DetailPhase::Loaded
        } else {
            DetailPhase::Loading
        }
    }

    /// Stores the fetched record and re-initializes the favorite machine.
    ///
    /// Loading stays set until `resolve_favorite` runs.
    pub(crate) fn store_item(&mut self, item: ItemRecord) {
        self.item = Some(item);
        self.favorite = FavoriteState::Unknown;
        self.failure = None;
    }

    /// Applies the initial favorite lookup and clears loading.
    pub(crate) fn resolve_favorite(&mut self, saved: bool) {
        self.favorite = FavoriteState::from_saved(saved);
        self.loading_resolved = true;
    }

    /// Records a fetch failure and clears loading.
    ///
    /// Any previously stored item is dropped so `Failed` never carries data.
    pub(crate) fn record_failure(&mut self, failure: FetchFailure) {
        self.item = None;
        self.favorite = FavoriteState::Unknown;
        self.failure = Some(failure);
        self.loading_resolved = true;
    }
}
