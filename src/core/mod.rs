//! In-memory instrument store and index helpers.

/// Helper index aliases.
pub mod indices;
/// Instrument store with search, lookup, insert, and update.
pub mod store;
/// Fixed dataset loaded at session start.
pub mod seed;
