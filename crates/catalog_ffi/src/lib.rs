//! Flutter-facing bindings for the catalog detail core.

pub mod api;
