use ratatui::crossterm::terminal::window_size;

use vibetube::constants::constants;
use vibetube::prefs::Theme;

/// The terminal's light/dark preference, if it advertises one.
///
/// Reads `COLORFGBG` (`"fg;bg"` or `"fg;default;bg"`, set by rxvt, Konsole, iTerm2 and others).
/// Background indices 0-6 and 8 are the dark ANSI colours.
pub fn detect_system_theme() -> Option<Theme> {
  parse_colorfgbg(&std::env::var("COLORFGBG").ok()?)
}

fn parse_colorfgbg(value: &str) -> Option<Theme> {
  let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
  Some(if bg <= 6 || bg == 8 { Theme::Dark } else { Theme::Light })
}

/// Viewport width in pixels for a terminal `columns` wide.
///
/// Uses the pixel size the terminal reports when it has one, otherwise assumes a fixed cell width.
pub fn viewport_width(columns: u16) -> u32 {
  let reported = window_size().ok().filter(|size| size.columns == columns).map(|size| size.width);
  width_from(reported, columns)
}

fn width_from(reported_px: Option<u16>, columns: u16) -> u32 {
  match reported_px {
    Some(px) if px > 0 => u32::from(px),
    _ => u32::from(columns) * constants().fallback_cell_width,
  }
}
