// --- File: crates/lashdiary_store/src/lib.rs ---
//! File-backed JSON data store.
//!
//! Collections live as one JSON file per key under a data directory. The
//! store offers three primitives: `read` (with a fallback for missing
//! collections), `write` (whole-file rewrite via temp file + atomic
//! rename), and `update` (read-modify-write under a per-key async lock).
//! The per-key lock is what turns check-then-act booking commits into an
//! atomic step; see `JsonStore::update` and `JsonStore::lock`.

pub mod client;
pub mod error;

pub use client::JsonStore;
pub use error::StoreError;
