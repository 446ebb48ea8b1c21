//! Data-lifecycle controllers for the detail view.
//!
//! # Responsibility
//! - Bind remote fetches to the view activation lifetime.
//! - Keep the favorite flag consistent with the favorites store.
//!
//! # Invariants
//! - View state locks are never held across an `.await`.

use crate::model::view_state::DetailViewState;
use std::sync::{Mutex, PoisonError};

pub mod activity;
pub mod detail;
pub mod favorite;
pub mod fetch;

// Poison is ignored: callers only apply whole-field updates under the lock.
pub(crate) fn with_state<R>(
    state: &Mutex<DetailViewState>,
    f: impl FnOnce(&mut DetailViewState) -> R,
) -> R {
    let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}
