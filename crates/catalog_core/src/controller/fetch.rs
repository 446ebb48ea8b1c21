//! Fetch controller bound to the view's mounted lifetime.
//!
//! # Responsibility
//! - Issue exactly one catalog request per activation.
//! - Store the fetched record, then resolve its favorite status.
//! - Drop every late result once the view was retired.
//!
//! # Invariants
//! - The favorite lookup runs only after the item was stored.
//! - No view-state mutation happens through an inactive token.
//! - Loading always resolves on success or failure of a live activation.

use crate::controller::activity::{ActivityScope, ActivityToken};
use crate::controller::favorite::FavoriteController;
use crate::controller::with_state;
use crate::model::view_state::DetailViewState;
use crate::remote::{normalize_item_key, CatalogClient, FetchFailure};
use crate::repo::favorite_repo::FavoritesStore;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use uuid::Uuid;

/// Result of one `start` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Item stored and favorite status resolved.
    Loaded,
    /// Remote call failed; the failure is recorded in view state.
    Failed(FetchFailure),
    /// View was retired before the result arrived; nothing was applied.
    Suppressed,
    /// An activation is already live; no request was issued.
    AlreadyActive,
}

/// Drives one activation's fetch against the remote catalog.
pub struct FetchController<C: CatalogClient> {
    session_id: Uuid,
    client: Arc<C>,
    scope: ActivityScope,
}

impl<C: CatalogClient> FetchController<C> {
    pub fn new(session_id: Uuid, client: Arc<C>) -> Self {
        Self {
            session_id,
            client,
            scope: ActivityScope::new(),
        }
    }

    /// Activates the view for `raw_id` and runs the fetch flow.
    ///
    /// View state is reset on activation. Invalid identifiers fail without a
    /// request being issued.
    pub async fn start<S: FavoritesStore>(
        &self,
        raw_id: &str,
        favorites: &FavoriteController<S>,
        state: &Mutex<DetailViewState>,
    ) -> FetchOutcome {
        let activated = with_state(state, |view| {
            let token = self.scope.activate()?;
            *view = DetailViewState::new();
            Some(token)
        });
        let Some(token) = activated else {
            debug!(
                "event=detail_fetch module=controller status=skipped session={} reason=already_active",
                self.session_id
            );
            return FetchOutcome::AlreadyActive;
        };

        let item_key = match normalize_item_key(raw_id) {
            Ok(item_key) => item_key,
            Err(failure) => return self.fail(state, failure),
        };

        let started_at = Instant::now();
        info!(
            "event=detail_fetch module=controller status=start session={} item_key={}",
            self.session_id, item_key
        );
        let result = self.client.fetch_item(item_key.as_str()).await;
        let item = match result {
            Ok(item) => item,
            Err(failure) => return self.fail_if_active(&token, state, failure),
        };
        if !self.apply_if_active(&token, state, "fetch", |view| view.store_item(item.clone())) {
            return FetchOutcome::Suppressed;
        }

        let saved = favorites.check_favorite(&item).await;
        if !self.apply_if_active(&token, state, "favorite_lookup", |view| {
            view.resolve_favorite(saved)
        }) {
            return FetchOutcome::Suppressed;
        }

        info!(
            "event=detail_fetch module=controller status=ok session={} item_id={} favorite={} duration_ms={}",
            self.session_id,
            item.id,
            saved,
            started_at.elapsed().as_millis()
        );
        FetchOutcome::Loaded
    }

    /// Retires the live activation; pending results will be discarded.
    ///
    /// Taking the state lock orders retirement against in-flight updates.
    pub fn retire(&self, state: &Mutex<DetailViewState>) -> bool {
        let retired = with_state(state, |_| self.scope.retire());
        if retired {
            debug!(
                "event=detail_retire module=controller status=ok session={}",
                self.session_id
            );
        }
        retired
    }

    /// Token of the live activation, used to guard later mutations.
    pub fn current_token(&self) -> Option<ActivityToken> {
        self.scope.current()
    }

    pub fn is_active(&self) -> bool {
        self.scope.is_live()
    }

    fn fail(&self, state: &Mutex<DetailViewState>, failure: FetchFailure) -> FetchOutcome {
        self.log_failure(&failure);
        with_state(state, |view| view.record_failure(failure.clone()));
        FetchOutcome::Failed(failure)
    }

    fn fail_if_active(
        &self,
        token: &ActivityToken,
        state: &Mutex<DetailViewState>,
        failure: FetchFailure,
    ) -> FetchOutcome {
        if !self.apply_if_active(token, state, "fetch", |view| {
            view.record_failure(failure.clone())
        }) {
            return FetchOutcome::Suppressed;
        }
        self.log_failure(&failure);
        FetchOutcome::Failed(failure)
    }

    fn log_failure(&self, failure: &FetchFailure) {
        warn!(
            "event=detail_fetch module=controller status=error session={} error_code={} error={}",
            self.session_id,
            failure.code(),
            failure
        );
    }

    // Token check and update share one state-lock critical section.
    fn apply_if_active(
        &self,
        token: &ActivityToken,
        state: &Mutex<DetailViewState>,
        stage: &'static str,
        update: impl FnOnce(&mut DetailViewState),
    ) -> bool {
        let applied = with_state(state, |view| {
            if token.is_active() {
                update(view);
                true
            } else {
                false
            }
        });
        if !applied {
            debug!(
                "event=stale_update_suppressed module=controller session={} stage={}",
                self.session_id, stage
            );
        }
        applied
    }
}
