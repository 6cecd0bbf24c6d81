//! User verse annotations: highlights, favorites and underlines
//!
//! Three independent collections keyed by verse id, each rewritten in
//! full to its own settings key after every toggle.

use crate::store::{SettingsStore, KEY_FAVORITES, KEY_HIGHLIGHTS, KEY_UNDERLINES};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub highlights: HashMap<String, String>,
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub underlines: Vec<String>,
}

impl Annotations {
    pub fn load(store: &SettingsStore) -> Self {
        Self {
            highlights: load_key(store, KEY_HIGHLIGHTS),
            favorites: load_key(store, KEY_FAVORITES),
            underlines: load_key(store, KEY_UNDERLINES),
        }
    }

    /// Toggling the same color clears the highlight; a different color
    /// replaces it.
    pub fn toggle_highlight(&mut self, verse_id: &str, color: &str) {
        if self.highlights.get(verse_id).map(String::as_str) == Some(color) {
            self.highlights.remove(verse_id);
        } else {
            self.highlights.insert(verse_id.to_string(), color.to_string());
        }
    }

    pub fn toggle_favorite(&mut self, verse_id: &str) {
        toggle_membership(&mut self.favorites, verse_id);
    }

    pub fn toggle_underline(&mut self, verse_id: &str) {
        toggle_membership(&mut self.underlines, verse_id);
    }

    pub fn persist_highlights(&self, store: &SettingsStore) {
        persist_key(store, KEY_HIGHLIGHTS, &self.highlights);
    }

    pub fn persist_favorites(&self, store: &SettingsStore) {
        persist_key(store, KEY_FAVORITES, &self.favorites);
    }

    pub fn persist_underlines(&self, store: &SettingsStore) {
        persist_key(store, KEY_UNDERLINES, &self.underlines);
    }
}

fn toggle_membership(ids: &mut Vec<String>, verse_id: &str) {
    if let Some(pos) = ids.iter().position(|id| id == verse_id) {
        ids.remove(pos);
    } else {
        ids.push(verse_id.to_string());
    }
}

fn load_key<T: serde::de::DeserializeOwned + Default>(store: &SettingsStore, key: &str) -> T {
    match store.get_json(key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!("Could not restore {}: {:#}", key, e);
            T::default()
        }
    }
}

fn persist_key<T: Serialize>(store: &SettingsStore, key: &str, value: &T) {
    if let Err(e) = store.set_json(key, value) {
        tracing::warn!("Could not persist {}: {:#}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_toggles_off_on_same_color_and_replaces_on_new() {
        let mut ann = Annotations::default();
        ann.toggle_highlight("1001", "yellow");
        assert_eq!(ann.highlights.get("1001").map(String::as_str), Some("yellow"));

        ann.toggle_highlight("1001", "green");
        assert_eq!(ann.highlights.get("1001").map(String::as_str), Some("green"));

        ann.toggle_highlight("1001", "green");
        assert!(ann.highlights.is_empty());
    }

    #[test]
    fn favorites_keep_insertion_order_and_toggle_membership() {
        let mut ann = Annotations::default();
        ann.toggle_favorite("10");
        ann.toggle_favorite("20");
        ann.toggle_favorite("30");
        ann.toggle_favorite("20");
        assert_eq!(ann.favorites, vec!["10", "30"]);
    }

    #[test]
    fn underlines_toggle_independently_of_favorites() {
        let mut ann = Annotations::default();
        ann.toggle_underline("10");
        ann.toggle_favorite("10");
        ann.toggle_underline("10");
        assert!(ann.underlines.is_empty());
        assert_eq!(ann.favorites, vec!["10"]);
    }

    #[test]
    fn annotations_round_trip_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(&dir.path().join("settings.db")).unwrap();

        let mut ann = Annotations::default();
        ann.toggle_highlight("1001", "yellow");
        ann.toggle_favorite("1002");
        ann.toggle_underline("1003");
        ann.persist_highlights(&store);
        ann.persist_favorites(&store);
        ann.persist_underlines(&store);

        let restored = Annotations::load(&store);
        assert_eq!(restored.highlights, ann.highlights);
        assert_eq!(restored.favorites, ann.favorites);
        assert_eq!(restored.underlines, ann.underlines);
    }
}
