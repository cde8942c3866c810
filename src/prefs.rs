//! Durable user preferences: the favorite set and the colour theme.
//!
//! Storage is a flat string key/value space ([`PreferenceStore`]), the same shape a browser's
//! local storage has. [`Preferences`] owns the key names and value encodings on top of it and
//! never lets a storage fault reach the caller: reads fall back to defaults, writes are logged and
//! dropped while the in-memory state carries on.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::catalog::EntryId;
use crate::error::StorageError;

pub const FAVORITES_KEY: &str = "favorites";
pub const THEME_KEY: &str = "theme";

// --- Value types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
  #[default]
  Light,
  Dark,
}

impl Theme {
  pub fn as_str(self) -> &'static str {
    match self {
      Theme::Light => "light",
      Theme::Dark => "dark",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s.trim() {
      "light" => Some(Theme::Light),
      "dark" => Some(Theme::Dark),
      _ => None,
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      Theme::Light => Theme::Dark,
      Theme::Dark => Theme::Light,
    }
  }
}

/// Ids the user marked as favorite. May name entries the current catalog no longer has.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(BTreeSet<EntryId>);

impl FavoriteSet {
  pub fn contains(&self, id: &EntryId) -> bool {
    self.0.contains(id)
  }

  /// Add `id` if absent, remove it if present. Returns whether it is a favorite afterwards.
  pub fn toggle(&mut self, id: &EntryId) -> bool {
    if self.0.remove(id) {
      false
    } else {
      self.0.insert(id.clone());
      true
    }
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &EntryId> {
    self.0.iter()
  }
}

impl FromIterator<EntryId> for FavoriteSet {
  fn from_iter<I: IntoIterator<Item = EntryId>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

// --- Raw storage ---

/// String key/value persistence. A successful `write` must be visible to the next `read`.
pub trait PreferenceStore {
  fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
  fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// All keys in one JSON object on disk. Every write rewrites the file through a temp file and a
/// rename, so a reload right after a write sees either the old or the new document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
  path: PathBuf,
}

impl JsonFileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
    let content = match std::fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
      Err(source) => return Err(StorageError::Read { path: self.path.display().to_string(), source }),
    };
    Ok(serde_json::from_str(&content)?)
  }
}

impl PreferenceStore for JsonFileStore {
  fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
    Ok(self.read_all()?.remove(key))
  }

  fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
    let mut all = match self.read_all() {
      Ok(all) => all,
      Err(StorageError::Decode(e)) => {
        warn!(err = %e, path = %self.path.display(), "prefs: discarding corrupt store before write");
        BTreeMap::new()
      }
      // The other keys may still be intact on disk; leave the file alone.
      Err(e) => return Err(e),
    };
    all.insert(key.to_string(), value.to_string());
    let content = serde_json::to_string_pretty(&all)?;

    let write_err = |source| StorageError::Write { path: self.path.display().to_string(), source };
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let tmp = self.path.with_extension("json.tmp");
    std::fs::write(&tmp, content).map_err(write_err)?;
    std::fs::rename(&tmp, &self.path).map_err(write_err)?;
    Ok(())
  }
}

/// Process-local store. Used when no data directory is available, and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryStore {
  fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
    Ok(self.values.get(key).cloned())
  }

  fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
    self.values.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

// --- Typed facade ---

pub struct Preferences {
  store: Box<dyn PreferenceStore + Send>,
}

impl Preferences {
  pub fn new(store: impl PreferenceStore + Send + 'static) -> Self {
    Self { store: Box::new(store) }
  }

  fn read(&self, key: &str) -> Option<String> {
    match self.store.read(key) {
      Ok(value) => value,
      Err(e) => {
        warn!(key, err = %e, "prefs: read failed, using default");
        None
      }
    }
  }

  fn write(&mut self, key: &str, value: &str) {
    if let Err(e) = self.store.write(key, value) {
      warn!(key, err = %e, "prefs: write failed, change kept in memory only");
    }
  }

  /// Stored favorites, or the empty set when missing or corrupt.
  pub fn load_favorites(&self) -> FavoriteSet {
    let Some(raw) = self.read(FAVORITES_KEY) else { return FavoriteSet::default() };
    match serde_json::from_str(&raw) {
      Ok(favorites) => favorites,
      Err(e) => {
        warn!(err = %e, "prefs: corrupt favorites, starting empty");
        FavoriteSet::default()
      }
    }
  }

  pub fn save_favorites(&mut self, favorites: &FavoriteSet) {
    match serde_json::to_string(favorites) {
      Ok(raw) => {
        debug!(count = favorites.len(), "prefs: saving favorites");
        self.write(FAVORITES_KEY, &raw);
      }
      Err(e) => warn!(err = %e, "prefs: could not encode favorites"),
    }
  }

  /// Stored theme, else the system's preference, else light.
  pub fn load_theme(&self, system: Option<Theme>) -> Theme {
    let stored = self.read(THEME_KEY);
    if let Some(ref raw) = stored
      && let Some(theme) = Theme::parse(raw)
    {
      return theme;
    }
    if stored.is_some() {
      warn!("prefs: unrecognised theme value, ignoring");
    }
    system.unwrap_or_default()
  }

  pub fn save_theme(&mut self, theme: Theme) {
    debug!(theme = theme.as_str(), "prefs: saving theme");
    self.write(THEME_KEY, theme.as_str());
  }
}
