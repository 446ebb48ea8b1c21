//! Persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the favorites store contract consumed by controllers.
//! - Isolate SQLite query details from controller orchestration.
//!
//! # Invariants
//! - Store errors are surfaced as `StoreError`; controllers decide whether
//!   to mask or report them.

pub mod favorite_repo;
