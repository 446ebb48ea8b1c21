//! Domain model for the catalog detail view.
//!
//! # Responsibility
//! - Define the remote-sourced item record and its display helpers.
//! - Define the per-view render state and favorite state machine.
//!
//! # Invariants
//! - Every item is identified by a stable `ItemId`.
//! - View state is owned by exactly one view instance.

pub mod item;
pub mod view_state;
