use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::constants;

/// User settings from `config.toml`. Every field is optional; unset fields fall back to the
/// embedded constants.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
  pub base_url: Option<String>,
  pub breakpoint: Option<u32>,
  pub log_level: Option<String>,
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = project_dirs() {
      return Self::load_from(&proj_dirs.config_dir().join("config.toml"));
    }
    Self::default()
  }

  /// Read `path`, or the defaults if it is missing or not valid TOML.
  pub fn load_from(path: &Path) -> Self {
    if let Ok(content) = std::fs::read_to_string(path)
      && let Ok(config) = toml::from_str(&content)
    {
      return config;
    }
    Self::default()
  }

  pub fn base_url(&self) -> &str {
    self.base_url.as_deref().unwrap_or(&constants().default_base_url)
  }

  pub fn breakpoint(&self) -> u32 {
    self.breakpoint.unwrap_or(constants().default_breakpoint)
  }
}

pub fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "vibetube")
}

/// Where preferences live unless overridden: `<data dir>/storage.json`.
pub fn default_prefs_path() -> Option<PathBuf> {
  project_dirs().map(|dirs| dirs.data_dir().join(&constants().prefs_file_name))
}

pub fn log_dir() -> Option<PathBuf> {
  project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}
