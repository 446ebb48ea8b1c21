//! View activity scope and cancellation tokens.
//!
//! # Responsibility
//! - Issue one token per view activation.
//! - Invalidate outstanding tokens when the view is retired.
//!
//! # Invariants
//! - The generation counter is odd while an activation is live, even otherwise.
//! - A token is active iff the counter still equals the generation it was
//!   issued at; once invalidated it never becomes active again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Owner of the activation lifecycle for one view instance.
#[derive(Debug, Default)]
pub struct ActivityScope {
    generation: Arc<AtomicU64>,
}

/// Cancellation token checked at every resumption point.
#[derive(Debug, Clone)]
pub struct ActivityToken {
    generation: Arc<AtomicU64>,
    issued: u64,
}

impl ActivityScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new activation.
    ///
    /// Returns `None` when an activation is already live.
    pub fn activate(&self) -> Option<ActivityToken> {
        let current = self.generation.load(Ordering::Acquire);
        if is_live(current) {
            return None;
        }
        let issued = current + 1;
        self.generation
            .compare_exchange(current, issued, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(ActivityToken {
            generation: Arc::clone(&self.generation),
            issued,
        })
    }

    /// Retires the live activation, invalidating its tokens.
    ///
    /// Returns `false` when nothing was live.
    pub fn retire(&self) -> bool {
        let current = self.generation.load(Ordering::Acquire);
        if !is_live(current) {
            return false;
        }
        self.generation
            .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Token for the live activation, if any.
    pub fn current(&self) -> Option<ActivityToken> {
        let current = self.generation.load(Ordering::Acquire);
        is_live(current).then(|| ActivityToken {
            generation: Arc::clone(&self.generation),
            issued: current,
        })
    }

    pub fn is_live(&self) -> bool {
        is_live(self.generation.load(Ordering::Acquire))
    }
}

impl ActivityToken {
    pub fn is_active(&self) -> bool {
        self.generation.load(Ordering::Acquire) == self.issued
    }
}

fn is_live(generation: u64) -> bool {
    generation % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::ActivityScope;

    #[test]
    fn activation_is_exclusive_until_retired() {
        let scope = ActivityScope::new();
        let token = scope.activate().expect("first activation");
        assert!(token.is_active());
        assert!(scope.activate().is_none());

        assert!(scope.retire());
        assert!(!token.is_active());
        assert!(!scope.retire());
    }

    #[test]
    fn retired_token_stays_inactive_after_reactivation() {
        let scope = ActivityScope::new();
        let first = scope.activate().unwrap();
        scope.retire();
        let second = scope.activate().unwrap();

        assert!(!first.is_active());
        assert!(second.is_active());
        assert!(scope.current().unwrap().is_active());
    }

    #[test]
    fn current_is_none_without_live_activation() {
        let scope = ActivityScope::new();
        assert!(scope.current().is_none());
        assert!(!scope.is_live());
    }
}
