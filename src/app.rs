use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info};

use crate::catalog::{CatalogEntry, CatalogSource, CatalogState, EntryId};
use crate::constants::constants;
use crate::debounce::Debouncer;
use crate::error::FetchError;
use crate::filter::filter_entries;
use crate::prefs::{FavoriteSet, Preferences, Theme};
use crate::viewport::{LayoutChange, LayoutMode, ViewportClassifier};

// --- Types ---

pub type FetchResult = Result<Vec<CatalogEntry>, FetchError>;

/// What the player should be showing. Only the title and the opaque media reference are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
  pub title: String,
  pub media_ref: String,
}

impl From<&CatalogEntry> for Selection {
  fn from(entry: &CatalogEntry) -> Self {
    Self { title: entry.title.clone(), media_ref: entry.media_ref.clone() }
  }
}

/// Inputs the visible list was last derived from. Revisions stand in for the catalog and the
/// favorite set so comparing keys stays cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterKey {
  catalog_rev: u64,
  favorites_rev: u64,
  show_only_favorites: bool,
  query: String,
}

/// Application state container.
///
/// Owns every piece of browser state and keeps the derived pieces consistent: the visible list
/// follows the catalog, favorites, favorites-only flag and debounced search; sidebar visibility
/// follows breakpoint crossings; favorites and theme are written through to storage on every
/// change. Readers get shared references, writers go through the intent-named methods below.
///
/// Background work (the catalog fetch, the search debounce timer, the resize feed) reports back
/// through channels that [`check_pending`](Self::check_pending) drains from the owner's event
/// loop. Dropping the state releases all of them; a fetch that completes afterwards is discarded.
pub struct AppState {
  source: Arc<dyn CatalogSource>,
  catalog: CatalogState,
  catalog_rev: u64,
  catalog_rx: Option<oneshot::Receiver<FetchResult>>,
  selection: Option<Selection>,
  search_raw: String,
  search: Debouncer<String>,
  favorites: FavoriteSet,
  favorites_rev: u64,
  show_only_favorites: bool,
  theme: Theme,
  viewport: ViewportClassifier,
  sidebar_visible: bool,
  prefs: Preferences,
  visible: Vec<CatalogEntry>,
  visible_key: Option<FilterKey>,
}

impl AppState {
  /// Load preferences and start the catalog fetch. Must be called inside a tokio runtime.
  pub fn new(
    source: Arc<dyn CatalogSource>,
    prefs: Preferences,
    viewport: ViewportClassifier,
    system_theme: Option<Theme>,
  ) -> Self {
    let favorites = prefs.load_favorites();
    let theme = prefs.load_theme(system_theme);
    let sidebar_visible = viewport.mode() == LayoutMode::Full;
    info!(
      favorites = favorites.len(),
      theme = theme.as_str(),
      layout = viewport.mode().label(),
      "app: state initialised"
    );

    let mut app = Self {
      source,
      catalog: CatalogState::Loading,
      catalog_rev: 0,
      catalog_rx: None,
      selection: None,
      search_raw: String::new(),
      search: Debouncer::new(String::new(), constants().search_debounce()),
      favorites,
      favorites_rev: 0,
      show_only_favorites: false,
      theme,
      viewport,
      sidebar_visible,
      prefs,
      visible: Vec::new(),
      visible_key: None,
    };
    app.refresh();
    app
  }

  // --- Read access ---

  pub fn catalog(&self) -> &CatalogState {
    &self.catalog
  }

  /// The filtered list the sidebar shows. Empty while the catalog is loading or failed.
  pub fn visible_entries(&self) -> &[CatalogEntry] {
    &self.visible
  }

  pub fn selection(&self) -> Option<&Selection> {
    self.selection.as_ref()
  }

  /// Whether `entry` is the one currently playing. Compared by media reference.
  pub fn is_selected(&self, entry: &CatalogEntry) -> bool {
    self.selection.as_ref().is_some_and(|s| s.media_ref == entry.media_ref)
  }

  /// Search text exactly as typed.
  pub fn search_query(&self) -> &str {
    &self.search_raw
  }

  /// Search text the visible list is filtered by.
  pub fn debounced_query(&self) -> &str {
    self.search.value()
  }

  pub fn favorites(&self) -> &FavoriteSet {
    &self.favorites
  }

  pub fn is_favorite(&self, id: &EntryId) -> bool {
    self.favorites.contains(id)
  }

  pub fn show_only_favorites(&self) -> bool {
    self.show_only_favorites
  }

  pub fn theme(&self) -> Theme {
    self.theme
  }

  pub fn layout(&self) -> LayoutMode {
    self.viewport.mode()
  }

  pub fn viewport(&self) -> &ViewportClassifier {
    &self.viewport
  }

  pub fn sidebar_visible(&self) -> bool {
    self.sidebar_visible
  }

  // --- Catalog ---

  /// Fetch the catalog again. The state goes back to `Loading`; a response to an earlier
  /// request that is still in flight is ignored.
  pub fn refresh(&mut self) {
    info!("app: loading catalog");
    self.set_catalog(CatalogState::Loading);

    let source = Arc::clone(&self.source);
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(source.fetch().await);
    });
    self.catalog_rx = Some(rx);
  }

  fn set_catalog(&mut self, state: CatalogState) {
    self.catalog = state;
    self.catalog_rev = self.catalog_rev.wrapping_add(1);
    self.refilter();
  }

  // --- Interaction ---

  /// Make `entry` the playback target. On a compact layout this also closes the sidebar.
  pub fn select_entry(&mut self, entry: &CatalogEntry) {
    debug!(id = %entry.id, media_ref = %entry.media_ref, "app: select");
    self.selection = Some(Selection::from(entry));
    if self.viewport.mode() == LayoutMode::Compact {
      self.sidebar_visible = false;
    }
  }

  /// Add or remove `id` from the favorites and persist. Returns whether it is a favorite now.
  pub fn toggle_favorite(&mut self, id: &EntryId) -> bool {
    let now_favorite = self.favorites.toggle(id);
    self.favorites_rev = self.favorites_rev.wrapping_add(1);
    debug!(id = %id, favorite = now_favorite, "app: toggle favorite");
    self.prefs.save_favorites(&self.favorites);
    self.refilter();
    now_favorite
  }

  /// Update the search box. Filtering catches up once typing pauses for the debounce window.
  pub fn set_search_query(&mut self, text: impl Into<String>) {
    self.search_raw = text.into();
    self.search.set(self.search_raw.clone());
  }

  pub fn toggle_show_only_favorites(&mut self, only_favorites: bool) {
    self.show_only_favorites = only_favorites;
    self.refilter();
  }

  /// Switch between light and dark, and persist.
  pub fn toggle_theme(&mut self) {
    self.theme = self.theme.toggled();
    info!(theme = self.theme.as_str(), "app: theme changed");
    self.prefs.save_theme(self.theme);
  }

  /// Open or close the sidebar. The full layout always shows it, so requests there are ignored.
  pub fn toggle_sidebar(&mut self, visible: bool) {
    if self.viewport.mode() == LayoutMode::Full {
      debug!(visible, "app: sidebar is pinned open in full layout");
      return;
    }
    self.sidebar_visible = visible;
  }

  // --- Viewport ---

  /// Follow a width feed; see [`ViewportClassifier::subscribe`].
  pub fn subscribe_viewport(&mut self, resizes: watch::Receiver<u32>) {
    if let Some(change) = self.viewport.subscribe(resizes) {
      self.apply_layout_change(change);
    }
  }

  /// Apply a width reading directly, bypassing the feed.
  pub fn resize(&mut self, width: u32) {
    if let Some(change) = self.viewport.resize(width) {
      self.apply_layout_change(change);
    }
  }

  fn apply_layout_change(&mut self, change: LayoutChange) {
    self.sidebar_visible = change.sidebar_visible();
    debug!(layout = change.mode().label(), sidebar = self.sidebar_visible, "app: layout change");
  }

  // --- Event loop integration ---

  /// Drain background results: catalog response, debounced search text, resize feed.
  /// Returns whether anything observable changed.
  pub fn check_pending(&mut self) -> bool {
    let mut changed = false;

    if let Some(mut rx) = self.catalog_rx.take() {
      match rx.try_recv() {
        Ok(Ok(entries)) => {
          info!(count = entries.len(), "app: catalog loaded");
          self.set_catalog(CatalogState::Ready(Arc::from(entries)));
          changed = true;
        }
        Ok(Err(e)) => {
          error!(err = %e, "app: catalog load failed");
          self.set_catalog(CatalogState::Failed(e.to_string()));
          changed = true;
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.catalog_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          error!("app: catalog task ended without a result");
          self.set_catalog(CatalogState::Failed("catalog task failed".to_string()));
          changed = true;
        }
      }
    }

    if let Some(query) = self.search.poll() {
      debug!(query = %query, "app: search settled");
      self.refilter();
      changed = true;
    }

    if let Some(change) = self.viewport.poll() {
      self.apply_layout_change(change);
      changed = true;
    }

    changed
  }

  /// Re-derive the visible list if any filter input moved since the last derivation.
  fn refilter(&mut self) {
    let key = FilterKey {
      catalog_rev: self.catalog_rev,
      favorites_rev: self.favorites_rev,
      show_only_favorites: self.show_only_favorites,
      query: self.search.value().clone(),
    };
    if self.visible_key.as_ref() == Some(&key) {
      return;
    }
    self.visible = filter_entries(self.catalog.entries(), &self.favorites, key.show_only_favorites, &key.query);
    self.visible_key = Some(key);
  }
}
