//! Favorite toggle controller.
//!
//! # Responsibility
//! - Answer "is this item saved" against the favorites store.
//! - Flip saved state through confirmed store writes only.
//!
//! # Invariants
//! - Only this controller mutates the favorites store.
//! - A toggle reports the new state only after the store write succeeded.
//! - All keys live under one configured `FavoritesNamespace`.

use crate::model::item::{ItemId, ItemRecord};
use crate::repo::favorite_repo::{FavoritesNamespace, FavoritesStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Store read failure during the initial favorite lookup.
#[derive(Debug)]
pub struct FavoriteLookupFailure {
    pub item_id: ItemId,
    pub source: StoreError,
}

impl Display for FavoriteLookupFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "favorite lookup failed for item {}: {}",
            self.item_id, self.source
        )
    }
}

impl Error for FavoriteLookupFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Store mutation attempted by a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceOp {
    Insert,
    Delete,
}

impl PersistenceOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Delete => "delete",
        }
    }
}

/// Store write/delete failure during a toggle.
#[derive(Debug)]
pub struct PersistenceFailure {
    pub item_id: ItemId,
    pub operation: PersistenceOp,
    pub source: StoreError,
}

impl Display for PersistenceFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "favorite {} failed for item {}: {}",
            self.operation.as_str(),
            self.item_id,
            self.source
        )
    }
}

impl Error for PersistenceFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Keeps the saved flag consistent with the favorites store.
pub struct FavoriteController<S: FavoritesStore> {
    store: Arc<S>,
    namespace: FavoritesNamespace,
}

impl<S: FavoritesStore> FavoriteController<S> {
    pub fn new(store: Arc<S>, namespace: FavoritesNamespace) -> Self {
        Self { store, namespace }
    }

    pub fn namespace(&self) -> &FavoritesNamespace {
        &self.namespace
    }

    /// Queries store membership for `item.id` without masking errors.
    pub async fn lookup_favorite(&self, item: &ItemRecord) -> Result<bool, FavoriteLookupFailure> {
        self.store
            .exists(&self.namespace, item.id)
            .await
            .map_err(|source| FavoriteLookupFailure {
                item_id: item.id,
                source,
            })
    }

    /// Queries store membership for `item.id`.
    ///
    /// A store error is logged and read as "not saved" so item display is
    /// never blocked by the favorites store.
    pub async fn check_favorite(&self, item: &ItemRecord) -> bool {
        match self.lookup_favorite(item).await {
            Ok(saved) => saved,
            Err(err) => {
                warn!(
                    "event=favorite_lookup module=controller status=error item_id={} namespace={} error={}",
                    item.id, self.namespace, err.source
                );
                false
            }
        }
    }

    /// Flips saved state for `item` and returns the new state.
    ///
    /// `current == true` deletes the entry; otherwise the full record is
    /// saved under the namespace.
    ///
    /// # Errors
    /// Returns `PersistenceFailure` when the store mutation fails; callers
    /// must keep their in-memory flag at `current` in that case.
    pub async fn toggle_favorite(
        &self,
        item: &ItemRecord,
        current: bool,
    ) -> Result<bool, PersistenceFailure> {
        let (operation, result) = if current {
            (
                PersistenceOp::Delete,
                self.store.delete(&self.namespace, item.id).await,
            )
        } else {
            (
                PersistenceOp::Insert,
                self.store.put(&self.namespace, item).await,
            )
        };

        match result {
            Ok(()) => {
                info!(
                    "event=favorite_toggle module=controller status=ok item_id={} op={} namespace={}",
                    item.id,
                    operation.as_str(),
                    self.namespace
                );
                Ok(!current)
            }
            Err(source) => {
                warn!(
                    "event=favorite_toggle module=controller status=error item_id={} op={} error={}",
                    item.id,
                    operation.as_str(),
                    source
                );
                Err(PersistenceFailure {
                    item_id: item.id,
                    operation,
                    source,
                })
            }
        }
    }
}
