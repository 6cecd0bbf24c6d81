//! Cross-reference resolution
//!
//! Entries form a directed graph over verse locators. Resolution combines
//! the forward edges stored on the queried verse with backward edges found
//! by scanning every entry's reference list, then dedups by locator.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerseRef {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossReferenceEntry {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    #[serde(default)]
    pub references: Vec<VerseRef>,
}

#[derive(Debug, Clone, Default)]
pub struct CrossReferenceStore {
    entries: Vec<CrossReferenceEntry>,
}

impl CrossReferenceStore {
    pub fn new(entries: Vec<CrossReferenceEntry>) -> Self {
        Self { entries }
    }

    /// Load from `cross_references.json`; an unreadable file degrades to an
    /// empty store.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("cross_references.json");
        match read_entries(&path) {
            Ok(entries) => Self { entries },
            Err(e) => {
                tracing::warn!("Could not load cross references from {:?}: {:#}", path, e);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All references related to a verse: the references its own entry
    /// lists (forward), then synthetic entries for every verse that cites
    /// it (backward), deduplicated by locator with forward winning.
    pub fn resolve(&self, book: &str, chapter: u32, verse: u32) -> Vec<VerseRef> {
        let forward = self
            .entries
            .iter()
            .find(|e| e.book == book && e.chapter == chapter && e.verse == verse)
            .map(|e| e.references.clone())
            .unwrap_or_default();

        let backward = self.entries.iter().filter_map(|e| {
            let cites_input = e
                .references
                .iter()
                .any(|r| r.book == book && r.chapter == chapter && r.verse == verse);
            cites_input.then(|| VerseRef {
                book: e.book.clone(),
                chapter: e.chapter,
                verse: e.verse,
                text: Some(format!(
                    "Cross-referenced from {} {}:{}",
                    e.book, e.chapter, e.verse
                )),
            })
        });

        let mut seen = HashSet::new();
        forward
            .into_iter()
            .chain(backward)
            .filter(|r| seen.insert((r.book.clone(), r.chapter, r.verse)))
            .collect()
    }
}

fn read_entries(path: &Path) -> Result<Vec<CrossReferenceEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read cross references {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cross references {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(book: &str, chapter: u32, verse: u32, refs: &[(&str, u32, u32)]) -> CrossReferenceEntry {
        CrossReferenceEntry {
            book: book.to_string(),
            chapter,
            verse,
            references: refs
                .iter()
                .map(|(b, c, v)| VerseRef {
                    book: b.to_string(),
                    chapter: *c,
                    verse: *v,
                    text: None,
                })
                .collect(),
        }
    }

    #[test]
    fn forward_references_keep_list_order() {
        let store = CrossReferenceStore::new(vec![entry(
            "Genesis",
            1,
            1,
            &[("John", 1, 1), ("Hebrews", 11, 3)],
        )]);
        let refs = store.resolve("Genesis", 1, 1);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].book, "John");
        assert_eq!(refs[1].book, "Hebrews");
    }

    #[test]
    fn backward_reference_is_synthesized_when_no_entry_exists() {
        let store = CrossReferenceStore::new(vec![entry("Romans", 5, 8, &[("John", 3, 16)])]);
        let refs = store.resolve("John", 3, 16);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].book, "Romans");
        assert_eq!(refs[0].chapter, 5);
        assert_eq!(refs[0].verse, 8);
        assert_eq!(refs[0].text.as_deref(), Some("Cross-referenced from Romans 5:8"));
    }

    #[test]
    fn forward_precedes_backward_and_dedups_by_locator() {
        let store = CrossReferenceStore::new(vec![
            // Forward entry already points at Romans 5:8.
            entry("John", 3, 16, &[("Romans", 5, 8)]),
            // Romans 5:8 also cites John 3:16 back, so the backward scan
            // would produce the same locator again.
            entry("Romans", 5, 8, &[("John", 3, 16)]),
            entry("1 Peter", 2, 24, &[("John", 3, 16)]),
        ]);
        let refs = store.resolve("John", 3, 16);

        let locators: Vec<(String, u32, u32)> = refs
            .iter()
            .map(|r| (r.book.clone(), r.chapter, r.verse))
            .collect();
        let unique: HashSet<_> = locators.iter().collect();
        assert_eq!(unique.len(), locators.len());

        assert_eq!(refs.len(), 2);
        // Forward occurrence wins: no synthetic description on Romans 5:8.
        assert_eq!(refs[0].book, "Romans");
        assert!(refs[0].text.is_none());
        assert_eq!(refs[1].book, "1 Peter");
        assert!(refs[1].text.is_some());
    }

    #[test]
    fn unknown_verse_resolves_to_nothing() {
        let store = CrossReferenceStore::new(vec![entry("Romans", 5, 8, &[("John", 3, 16)])]);
        assert!(store.resolve("Jude", 1, 1).is_empty());
    }
}
