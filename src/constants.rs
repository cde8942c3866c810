//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available, with
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Catalog service
  pub default_base_url: String,
  pub catalog_path: String,

  // Layout
  pub default_breakpoint: u32,
  pub fallback_cell_width: u32,

  // Timing
  pub search_debounce_ms: u64,
  pub event_poll_ms: u64,

  // Playback hand-off
  pub watch_url_prefix: String,

  // Storage
  pub prefs_file_name: String,
  pub log_file_name: String,
}

impl Constants {
  pub fn search_debounce(&self) -> Duration {
    Duration::from_millis(self.search_debounce_ms)
  }

  pub fn event_poll(&self) -> Duration {
    Duration::from_millis(self.event_poll_ms)
  }
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn embedded_constants_parse() {
    let c = constants();
    assert_eq!(c.catalog_path, "/music");
    assert_eq!(c.default_breakpoint, 768);
    assert_eq!(c.search_debounce(), Duration::from_millis(300));
  }
}
