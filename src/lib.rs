//! Catalog browser core: catalog loading, search with debounce, favorites, theme, and
//! responsive sidebar state.
//!
//! [`app::AppState`] is the entry point; the other modules are its building blocks.

pub mod app;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod prefs;
pub mod viewport;

pub use app::{AppState, Selection};
pub use catalog::{CatalogEntry, CatalogSource, CatalogState, EntryId, HttpCatalog};
pub use error::{FetchError, StorageError};
pub use prefs::{FavoriteSet, Preferences, Theme};
pub use viewport::{LayoutMode, ViewportClassifier};
