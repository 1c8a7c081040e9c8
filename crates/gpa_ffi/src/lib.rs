//! Flutter-facing bindings for the GPA tracker core.

pub mod api;
