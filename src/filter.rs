use crate::catalog::CatalogEntry;
use crate::prefs::FavoriteSet;

/// Check if a catalog entry matches the given search text.
/// Matches case-insensitively as a substring of either the title or the media reference.
/// `needle` must already be lowercase.
fn matches_query(entry: &CatalogEntry, needle: &str) -> bool {
  entry.title.to_lowercase().contains(needle) || entry.media_ref.to_lowercase().contains(needle)
}

/// Derive the visible list from the catalog.
///
/// Applies the favorites-only restriction first, then the search text. An empty query keeps
/// everything the first step kept. Relative order of `entries` is preserved and the result
/// depends on nothing but the arguments.
pub fn filter_entries(
  entries: &[CatalogEntry],
  favorites: &FavoriteSet,
  show_only_favorites: bool,
  query: &str,
) -> Vec<CatalogEntry> {
  let needle = query.to_lowercase();
  entries
    .iter()
    .filter(|entry| !show_only_favorites || favorites.contains(&entry.id))
    .filter(|entry| needle.is_empty() || matches_query(entry, &needle))
    .cloned()
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::EntryId;

  fn entry(id: &str, title: &str, media_ref: &str) -> CatalogEntry {
    CatalogEntry {
      id: EntryId::from(id),
      title: title.to_string(),
      media_ref: media_ref.to_string(),
      thumbnail_url: String::new(),
    }
  }

  fn catalog() -> Vec<CatalogEntry> {
    vec![entry("1", "Alpha", "vid-one"), entry("2", "Beta", "vid-two"), entry("3", "Gamma Ray", "ALxyz")]
  }

  fn ids(entries: &[CatalogEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.id.as_str()).collect()
  }

  fn favs(list: &[&str]) -> FavoriteSet {
    list.iter().map(|s| EntryId::from(*s)).collect()
  }

  #[test]
  fn empty_query_keeps_everything() {
    let all = catalog();
    assert_eq!(filter_entries(&all, &FavoriteSet::default(), false, ""), all);
  }

  #[test]
  fn query_matches_title_case_insensitively() {
    let two = vec![entry("1", "Alpha", "a"), entry("2", "Beta", "b")];
    let visible = filter_entries(&two, &FavoriteSet::default(), false, "al");
    assert_eq!(ids(&visible), vec!["1"]);
    let visible = filter_entries(&two, &FavoriteSet::default(), false, "BET");
    assert_eq!(ids(&visible), vec!["2"]);
  }

  #[test]
  fn query_matches_media_ref() {
    let visible = filter_entries(&catalog(), &FavoriteSet::default(), false, "vid-t");
    assert_eq!(ids(&visible), vec!["2"]);
    // "al" hits Alpha by title and Gamma Ray by media ref.
    let visible = filter_entries(&catalog(), &FavoriteSet::default(), false, "al");
    assert_eq!(ids(&visible), vec!["1", "3"]);
  }

  #[test]
  fn substring_not_fuzzy() {
    let visible = filter_entries(&catalog(), &FavoriteSet::default(), false, "gmr");
    assert!(visible.is_empty());
  }

  #[test]
  fn favorites_only_restricts_before_search() {
    let visible = filter_entries(&catalog(), &favs(&["2"]), true, "");
    assert_eq!(ids(&visible), vec!["2"]);

    let visible = filter_entries(&catalog(), &favs(&["2", "3"]), true, "al");
    assert_eq!(ids(&visible), vec!["3"]);
  }

  #[test]
  fn favorites_ignored_when_toggle_off() {
    let visible = filter_entries(&catalog(), &favs(&["2"]), false, "");
    assert_eq!(visible.len(), 3);
  }

  #[test]
  fn unknown_favorite_ids_are_inert() {
    let visible = filter_entries(&catalog(), &favs(&["404", "1"]), true, "");
    assert_eq!(ids(&visible), vec!["1"]);
  }

  #[test]
  fn preserves_order_and_is_idempotent() {
    let all = vec![entry("9", "zeta mix", "z"), entry("4", "alpha mix", "a"), entry("7", "beta", "b")];
    let f = favs(&["9", "4"]);
    let once = filter_entries(&all, &f, true, "mix");
    assert_eq!(ids(&once), vec!["9", "4"]);
    let twice = filter_entries(&once, &f, true, "mix");
    assert_eq!(once, twice);
  }
}
