use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, BorderType, List, ListItem, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use vibetube::{CatalogState, LayoutMode, Theme};

use crate::Tui;

/// Sidebar width in columns on the full layout.
const SIDEBAR_WIDTH: u16 = 40;

struct Palette {
  bg: Color,
  sidebar_bg: Color,
  fg: Color,
  muted: Color,
  border: Color,
  accent: Color,
  favorite: Color,
  highlight_bg: Color,
  error: Color,
}

fn palette(theme: Theme) -> Palette {
  match theme {
    Theme::Light => Palette {
      bg: Color::Rgb(0xff, 0xff, 0xff),
      sidebar_bg: Color::Rgb(0xf9, 0xf9, 0xf9),
      fg: Color::Rgb(0x20, 0x20, 0x20),
      muted: Color::Rgb(0x88, 0x88, 0x88),
      border: Color::Rgb(0xdd, 0xdd, 0xdd),
      accent: Color::Rgb(0x1a, 0x73, 0xe8),
      favorite: Color::Rgb(0xea, 0x43, 0x35),
      highlight_bg: Color::Rgb(0xe3, 0xf2, 0xfd),
      error: Color::Rgb(0xd9, 0x30, 0x25),
    },
    Theme::Dark => Palette {
      bg: Color::Rgb(0x18, 0x18, 0x18),
      sidebar_bg: Color::Rgb(0x20, 0x20, 0x20),
      fg: Color::Rgb(0xe8, 0xe8, 0xe8),
      muted: Color::Rgb(0x99, 0x99, 0x99),
      border: Color::Rgb(0x33, 0x33, 0x33),
      accent: Color::Rgb(0x8a, 0xb4, 0xf8),
      favorite: Color::Rgb(0xf2, 0x8b, 0x82),
      highlight_bg: Color::Rgb(0x31, 0x31, 0x31),
      error: Color::Rgb(0xf2, 0x8b, 0x82),
    },
  }
}

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` columns, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.width() <= max_width {
    return s.to_string();
  }
  let budget = max_width.saturating_sub(1);
  let mut out = String::new();
  let mut used = 0;
  for c in s.chars() {
    let w = c.width().unwrap_or(0);
    if used + w > budget {
      break;
    }
    used += w;
    out.push(c);
  }
  out.push('…');
  out
}

/// What an empty entry list says. The compact sidebar hides the player pane, so load state and
/// fetch errors are reported here too. The flag marks error text.
fn empty_list_message(catalog: &CatalogState) -> (String, bool) {
  match catalog {
    CatalogState::Loading => ("Loading songs…".to_string(), false),
    CatalogState::Failed(reason) => (format!("Error: {}", reason), true),
    CatalogState::Ready(_) => ("No songs found".to_string(), false),
  }
}

fn bordered(title: &str, p: &Palette) -> Block<'static> {
  Block::bordered()
    .title(format!(" {} ", title))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(p.border))
    .style(Style::default().fg(p.fg))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, tui: &mut Tui) {
  let p = palette(tui.app.theme());
  frame.render_widget(Block::default().style(Style::default().bg(p.bg)), frame.area());

  let [header_area, body_area, footer_area] =
    Layout::vertical([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

  render_header(frame, tui, &p, header_area);

  match (tui.app.layout(), tui.app.sidebar_visible()) {
    (LayoutMode::Full, _) => {
      let [side, main] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)]).areas(body_area);
      render_sidebar(frame, tui, &p, side);
      render_main(frame, tui, &p, main);
    }
    // The compact sidebar covers the player while open.
    (LayoutMode::Compact, true) => render_sidebar(frame, tui, &p, body_area),
    (LayoutMode::Compact, false) => render_main(frame, tui, &p, body_area),
  }

  render_footer(frame, tui, &p, footer_area);
}

fn render_header(frame: &mut Frame, tui: &Tui, p: &Palette, area: Rect) {
  let left = Line::from(Span::styled(" ▶ VibeTube ", Style::default().fg(p.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let right_text = format!("{} · {} · v{} ", tui.app.layout().label(), tui.app.theme().as_str(), env!("CARGO_PKG_VERSION"));
  let width = right_text.width() as u16;
  let right = Line::from(Span::styled(right_text, Style::default().fg(p.muted)));
  let right_area = Rect { x: area.x + area.width.saturating_sub(width), width: width.min(area.width), ..area };
  frame.render_widget(right, right_area);
}

fn render_sidebar(frame: &mut Frame, tui: &mut Tui, p: &Palette, area: Rect) {
  frame.render_widget(Block::default().style(Style::default().bg(p.sidebar_bg)), area);

  let [search_area, toggle_area, list_area] =
    Layout::vertical([Constraint::Length(3), Constraint::Length(1), Constraint::Min(1)]).areas(area);

  // Search box
  let query = tui.app.search_query();
  let search = Paragraph::new(Span::styled(query.to_string(), Style::default().fg(p.fg))).block(bordered("Search", p));
  frame.render_widget(search, search_area);
  let cursor_x = search_area.x + 1 + display_width(query, tui.cursor_position) as u16;
  if cursor_x < search_area.right().saturating_sub(1) {
    frame.set_cursor_position((cursor_x, search_area.y + 1));
  }

  // Favorites-only toggle
  let mark = if tui.app.show_only_favorites() { "[x]" } else { "[ ]" };
  let toggle = Line::from(vec![
    Span::styled(format!(" {} ", mark), Style::default().fg(p.accent)),
    Span::styled("Show only favorites", Style::default().fg(p.fg)),
  ]);
  frame.render_widget(toggle, toggle_area);

  // Entries
  if tui.app.visible_entries().is_empty() {
    let (msg, is_error) = empty_list_message(tui.app.catalog());
    let color = if is_error { p.error } else { p.muted };
    let empty = Paragraph::new(Span::styled(msg, Style::default().fg(color)))
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true });
    frame.render_widget(empty, list_area);
    return;
  }

  let title_width = (list_area.width as usize).saturating_sub(6);
  let items: Vec<ListItem> = tui
    .app
    .visible_entries()
    .iter()
    .map(|entry| {
      let (heart, heart_color) =
        if tui.app.is_favorite(&entry.id) { ("♥", p.favorite) } else { ("♡", p.muted) };
      let playing = if tui.app.is_selected(entry) { "▶" } else { " " };
      ListItem::new(Line::from(vec![
        Span::styled(format!(" {} ", playing), Style::default().fg(p.accent)),
        Span::styled(truncate_str(&entry.title, title_width), Style::default().fg(p.fg)),
        Span::raw(" "),
        Span::styled(heart, Style::default().fg(heart_color)),
      ]))
    })
    .collect();

  let list = List::new(items).highlight_style(Style::default().bg(p.highlight_bg).add_modifier(Modifier::BOLD));
  frame.render_stateful_widget(list, list_area, &mut tui.list_state);
}

fn render_main(frame: &mut Frame, tui: &Tui, p: &Palette, area: Rect) {
  let text = match tui.app.catalog() {
    CatalogState::Loading => vec![Line::from(""), Line::from(Span::styled("Loading songs…", Style::default().fg(p.fg)))],
    CatalogState::Failed(reason) => {
      vec![Line::from(""), Line::from(Span::styled(format!("Error: {}", reason), Style::default().fg(p.error)))]
    }
    CatalogState::Ready(_) => match tui.app.selection() {
      Some(selection) => vec![
        Line::from(""),
        Line::from(Span::styled("Now playing", Style::default().fg(p.muted))),
        Line::from(Span::styled(selection.title.clone(), Style::default().fg(p.fg).add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(selection.media_ref.clone(), Style::default().fg(p.muted))),
        Line::from(""),
        Line::from(Span::styled("Ctrl+O to open in your player", Style::default().fg(p.muted))),
      ],
      None => vec![
        Line::from(""),
        Line::from(Span::styled("▶  VibeTube", Style::default().fg(p.accent).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Pick a song from the list and press Enter.", Style::default().fg(p.muted))),
      ],
    },
  };
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(bordered("Player", p));
  frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, tui: &Tui, p: &Palette, area: Rect) {
  let line = if let Some(ref err) = tui.last_error {
    Line::from(Span::styled(format!(" ✗ {}", err), Style::default().fg(p.error)))
  } else {
    let mut hints = vec!["⏎ play", "^F fav", "^L favorites only", "^T theme", "^O open", "^R reload"];
    if tui.app.layout() == LayoutMode::Compact {
      hints.push("^B sidebar");
    }
    hints.push("esc quit");
    Line::from(Span::styled(format!(" {}", hints.join("  ")), Style::default().fg(p.muted)))
  };
  frame.render_widget(line, area);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_width_counts_wide_chars() {
    assert_eq!(display_width("abc", 2), 2);
    assert_eq!(display_width("日本", 2), 4);
    assert_eq!(display_width("日本", 1), 2);
  }

  #[test]
  fn truncate_keeps_short_strings() {
    assert_eq!(truncate_str("Alpha", 10), "Alpha");
    assert_eq!(truncate_str("Alpha", 5), "Alpha");
  }

  #[test]
  fn empty_list_reports_load_state() {
    assert_eq!(empty_list_message(&CatalogState::Loading), ("Loading songs…".to_string(), false));
    assert_eq!(
      empty_list_message(&CatalogState::Failed("HTTP status 503".into())),
      ("Error: HTTP status 503".to_string(), true)
    );
    assert_eq!(empty_list_message(&CatalogState::Ready(Vec::new().into())), ("No songs found".to_string(), false));
  }

  #[test]
  fn truncate_adds_ellipsis() {
    assert_eq!(truncate_str("Alphabet Soup", 6), "Alpha…");
    assert_eq!(truncate_str("日本語の歌", 5), "日本…");
  }
}
