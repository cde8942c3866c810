use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::{debug, warn};

use vibetube::constants::constants;

use crate::Tui;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Hand the current selection to the platform's default opener.
fn open_selection(tui: &mut Tui) {
  let Some(selection) = tui.app.selection() else { return };
  let url = format!("{}{}", constants().watch_url_prefix, selection.media_ref);
  debug!(url = %url, "opening selection");

  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(not(target_os = "macos"))]
  let cmd = "xdg-open";
  match std::process::Command::new(cmd)
    .arg(&url)
    .stdin(std::process::Stdio::null())
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .spawn()
  {
    Ok(mut child) => {
      // Reap the child in a background thread to avoid zombie processes.
      std::thread::spawn(move || {
        let _ = child.wait();
      });
    }
    Err(e) => {
      warn!(err = %e, "failed to launch opener");
      tui.last_error = Some(format!("Failed to open player: {}", e));
    }
  }
}

// --- Event Handling ---

pub fn handle_key_event(tui: &mut Tui, key: event::KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) {
    match key.code {
      KeyCode::Char('c') => tui.should_quit = true,
      KeyCode::Char('t') => tui.app.toggle_theme(),
      KeyCode::Char('l') => {
        let only = !tui.app.show_only_favorites();
        tui.app.toggle_show_only_favorites(only);
      }
      KeyCode::Char('b') => {
        let visible = !tui.app.sidebar_visible();
        tui.app.toggle_sidebar(visible);
      }
      KeyCode::Char('f') => {
        if let Some(id) = highlighted(tui).map(|e| e.id.clone()) {
          tui.app.toggle_favorite(&id);
        }
      }
      KeyCode::Char('o') => open_selection(tui),
      KeyCode::Char('r') => tui.app.refresh(),
      _ => {}
    }
    return;
  }

  tui.last_error = None;
  match key.code {
    KeyCode::Enter => {
      if let Some(entry) = highlighted(tui).cloned() {
        tui.app.select_entry(&entry);
      }
    }
    KeyCode::Down => {
      let count = tui.app.visible_entries().len();
      if count > 0 {
        let i = tui.list_state.selected().map_or(0, |i| (i + 1) % count);
        tui.list_state.select(Some(i));
      }
    }
    KeyCode::Up => {
      let count = tui.app.visible_entries().len();
      if count > 0 {
        let i = tui.list_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
        tui.list_state.select(Some(i));
      }
    }
    KeyCode::Char(c) => {
      let mut text = tui.app.search_query().to_string();
      let byte_idx = char_to_byte_index(&text, tui.cursor_position);
      text.insert(byte_idx, c);
      tui.cursor_position += 1;
      tui.app.set_search_query(text);
    }
    KeyCode::Backspace => {
      if tui.cursor_position > 0 {
        let mut text = tui.app.search_query().to_string();
        tui.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&text, tui.cursor_position);
        text.remove(byte_idx);
        tui.app.set_search_query(text);
      }
    }
    KeyCode::Delete => {
      let mut text = tui.app.search_query().to_string();
      if tui.cursor_position < text.chars().count() {
        let byte_idx = char_to_byte_index(&text, tui.cursor_position);
        text.remove(byte_idx);
        tui.app.set_search_query(text);
      }
    }
    KeyCode::Left => {
      tui.cursor_position = tui.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if tui.cursor_position < tui.app.search_query().chars().count() {
        tui.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      tui.cursor_position = 0;
    }
    KeyCode::End => {
      tui.cursor_position = tui.app.search_query().chars().count();
    }
    KeyCode::Esc => {
      if !tui.app.search_query().is_empty() {
        tui.app.set_search_query(String::new());
        tui.cursor_position = 0;
      } else {
        tui.should_quit = true;
      }
    }
    _ => {}
  }
}

fn highlighted(tui: &Tui) -> Option<&vibetube::CatalogEntry> {
  tui.list_state.selected().and_then(|i| tui.app.visible_entries().get(i))
}
