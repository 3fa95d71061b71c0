//! # KG Store
//!
//! Saved-layout snapshots for the graph explorer, persisted through an
//! injected key-value capability so the core never touches a concrete storage
//! backend (a browser store, a file, an in-memory fake for tests).
//!
//! All snapshots live inside one outer JSON map stored under a single
//! well-known key; each entry is keyed by an opaque "view key" identifying
//! which graph instance the layout belongs to. Loading is deliberately
//! permissive: malformed or out-of-range data degrades to "no snapshot",
//! never to an error visible to the caller.

mod kv;
mod viewport;
mod layout_store;

pub use kv::{KeyValueStore, MemoryStore};
pub use viewport::{sanitize_viewport, Viewport, ViewportBounds};
pub use layout_store::{
    delete_layout, load_saved_layout, save_layout, SavedLayout, LAYOUT_STORAGE_KEY,
    SAVED_LAYOUT_VERSION,
};
