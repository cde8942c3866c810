mod display;
mod input;
mod logging;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
  widgets::ListState,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use vibetube::config::{self, Config};
use vibetube::constants::constants;
use vibetube::prefs::{JsonFileStore, MemoryStore};
use vibetube::{AppState, HttpCatalog, Preferences, ViewportClassifier};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Catalog service base URL (default: config file, else http://localhost:8080)
  #[arg(long, value_name = "URL")]
  base_url: Option<String>,

  /// Viewport width in pixels below which the compact layout is used (default: 768)
  #[arg(long, value_name = "PX")]
  breakpoint: Option<u32>,

  /// Preference file to use instead of the one in the data directory
  #[arg(long, value_name = "FILE")]
  prefs: Option<PathBuf>,

  /// Print a shell completion script and exit
  #[arg(long, value_name = "SHELL")]
  completions: Option<clap_complete::Shell>,
}

// --- Front-end state ---

/// Terminal-side state wrapped around the core: list cursor, search cursor, transient errors.
pub struct Tui {
  pub app: AppState,
  pub list_state: ListState,
  /// Cursor position within the search input (char index).
  pub cursor_position: usize,
  pub last_error: Option<String>,
  pub should_quit: bool,
}

impl Tui {
  fn new(app: AppState) -> Self {
    Self { app, list_state: ListState::default(), cursor_position: 0, last_error: None, should_quit: false }
  }

  /// Keep the list cursor inside the visible list after it was re-derived.
  pub fn clamp_highlight(&mut self) {
    let count = self.app.visible_entries().len();
    if count == 0 {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      self.list_state.select(Some(sel.min(count - 1)));
    }
  }
}

fn open_preferences(path: Option<PathBuf>) -> Preferences {
  match path.or_else(config::default_prefs_path) {
    Some(path) => {
      info!(path = %path.display(), "prefs: using file store");
      Preferences::new(JsonFileStore::new(path))
    }
    None => {
      warn!("prefs: no data directory, preferences last for this session only");
      Preferences::new(MemoryStore::default())
    }
  }
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), "vibetube", &mut std::io::stdout());
    return Ok(());
  }

  let config = Config::load();
  let _log_guard = logging::init_logging(&config);
  info!(version = env!("CARGO_PKG_VERSION"), "starting");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args, config).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args, config: Config) -> Result<()> {
  let base_url = args.base_url.unwrap_or_else(|| config.base_url().to_string());
  let breakpoint = args.breakpoint.unwrap_or_else(|| config.breakpoint());
  let prefs = open_preferences(args.prefs);

  let size = terminal.size().context("Failed to read terminal size")?;
  let width = display::viewport_width(size.width);
  let (resize_tx, resize_rx) = watch::channel(width);

  let catalog = HttpCatalog::new(&base_url);
  info!(url = catalog.url(), breakpoint, width, "catalog source configured");
  let mut app =
    AppState::new(Arc::new(catalog), prefs, ViewportClassifier::new(width, breakpoint), display::detect_system_theme());
  app.subscribe_viewport(resize_rx);
  let mut tui = Tui::new(app);

  loop {
    tui.app.check_pending();
    tui.clamp_highlight();

    terminal.draw(|frame| ui::ui(frame, &mut tui))?;

    if event::poll(constants().event_poll())? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut tui, key);
        }
        Event::Resize(columns, _) => {
          let _ = resize_tx.send(display::viewport_width(columns));
        }
        _ => {}
      }
    }

    if tui.should_quit {
      break;
    }
  }

  info!("exiting");
  Ok(())
}
