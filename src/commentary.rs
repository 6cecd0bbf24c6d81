//! Verse commentary: bundled annotations and the remote commentary API
//!
//! The bundled list answers per-verse lookups by exact match on
//! {book, chapter, verse}. The remote client wraps the public commentary
//! API; chapter documents are cached in an LRU since readers revisit the
//! same chapter repeatedly. Every remote failure degrades to an empty
//! list or `None`.

use anyhow::{Context, Result};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, Mutex};

const DEFAULT_BASE_URL: &str = "https://bible.helloao.org";

/// Number of chapter documents kept in memory.
const CHAPTER_CACHE_CAPACITY: usize = 200;

// === Bundled commentary ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentaryEntry {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    #[serde(alias = "commentary")]
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct CommentaryStore {
    entries: Vec<CommentaryEntry>,
}

impl CommentaryStore {
    pub fn new(entries: Vec<CommentaryEntry>) -> Self {
        Self { entries }
    }

    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("commentary.json");
        match read_entries(&path) {
            Ok(entries) => Self { entries },
            Err(e) => {
                tracing::warn!("Could not load commentary from {:?}: {:#}", path, e);
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

    /// First entry matching the locator exactly. Book names compare as
    /// stored, no normalization.
    pub fn lookup(&self, book: &str, chapter: u32, verse: u32) -> Option<&CommentaryEntry> {
        self.entries
            .iter()
            .find(|e| e.book == book && e.chapter == chapter && e.verse == verse)
    }
}

fn read_entries(path: &Path) -> Result<Vec<CommentaryEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read commentary {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse commentary {:?}", path))
}

// === Remote commentary API ===

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Commentary {
    pub id: String,
    pub name: Option<String>,
    pub english_name: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentaryBook {
    pub id: String,
    pub name: Option<String>,
    pub common_name: Option<String>,
    pub number_of_chapters: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterContentBlock {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChapterCommentary {
    #[serde(default)]
    pub content: Vec<ChapterContentBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct AvailableCommentaries {
    #[serde(default)]
    commentaries: Vec<Commentary>,
}

#[derive(Debug, Default, Deserialize)]
struct CommentaryBooks {
    #[serde(default)]
    books: Vec<CommentaryBook>,
}

type ChapterKey = (String, String, u32);

pub struct CommentaryClient {
    client: reqwest::Client,
    base_url: String,
    chapter_cache: Mutex<LruCache<ChapterKey, Arc<ChapterCommentary>>>,
}

impl CommentaryClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let capacity = NonZeroUsize::new(CHAPTER_CACHE_CAPACITY)
            .unwrap_or_else(|| NonZeroUsize::new(1).unwrap());
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            chapter_cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn available_commentaries(&self) -> Vec<Commentary> {
        let url = format!("{}/api/available_commentaries.json", self.base_url);
        match self.fetch_json::<AvailableCommentaries>(&url).await {
            Ok(body) => body.commentaries,
            Err(e) => {
                tracing::warn!("Error fetching available commentaries: {:#}", e);
                Vec::new()
            }
        }
    }

    pub async fn commentary_books(&self, commentary_id: &str) -> Vec<CommentaryBook> {
        let url = format!("{}/api/c/{}/books.json", self.base_url, commentary_id);
        match self.fetch_json::<CommentaryBooks>(&url).await {
            Ok(body) => body.books,
            Err(e) => {
                tracing::warn!("Error fetching commentary books: {:#}", e);
                Vec::new()
            }
        }
    }

    pub async fn chapter_commentary(
        &self,
        commentary_id: &str,
        book_id: &str,
        chapter_number: u32,
    ) -> Option<Arc<ChapterCommentary>> {
        let key = (commentary_id.to_string(), book_id.to_string(), chapter_number);
        {
            let mut cache = self.chapter_cache.lock().unwrap();
            if let Some(doc) = cache.get(&key) {
                return Some(Arc::clone(doc));
            }
        }

        let url = format!(
            "{}/api/c/{}/{}/{}.json",
            self.base_url, commentary_id, book_id, chapter_number
        );
        match self.fetch_json::<ChapterCommentary>(&url).await {
            Ok(doc) => {
                let doc = Arc::new(doc);
                let mut cache = self.chapter_cache.lock().unwrap();
                cache.put(key, Arc::clone(&doc));
                Some(doc)
            }
            Err(e) => {
                tracing::warn!("Error fetching chapter commentary: {:#}", e);
                None
            }
        }
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Request to {} rejected", url))?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("Response from {} did not parse", url))
    }
}

impl Default for CommentaryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CommentaryStore {
        CommentaryStore::new(vec![
            CommentaryEntry {
                book: "Genesis".to_string(),
                chapter: 1,
                verse: 1,
                text: "The creation of all things.".to_string(),
            },
            CommentaryEntry {
                book: "John".to_string(),
                chapter: 3,
                verse: 16,
                text: "The gospel in miniature.".to_string(),
            },
        ])
    }

    #[test]
    fn lookup_matches_all_three_fields_exactly() {
        let store = store();
        let entry = store.lookup("John", 3, 16).unwrap();
        assert_eq!(entry.text, "The gospel in miniature.");

        assert!(store.lookup("John", 3, 17).is_none());
        assert!(store.lookup("John", 4, 16).is_none());
        // No normalization: book names must match as stored.
        assert!(store.lookup("john", 3, 16).is_none());
    }

    #[test]
    fn entry_accepts_commentary_field_name() {
        let entry: CommentaryEntry = serde_json::from_str(
            r#"{"book":"Psalms","chapter":23,"verse":1,"commentary":"The shepherd psalm."}"#,
        )
        .unwrap();
        assert_eq!(entry.text, "The shepherd psalm.");
    }

    #[test]
    fn chapter_document_parses_wire_shape() {
        let doc: ChapterCommentary = serde_json::from_str(
            r#"{"content":[{"type":"verse","number":1,"content":["Commentary on verse one."]}]}"#,
        )
        .unwrap();
        assert_eq!(doc.content.len(), 1);
        assert_eq!(doc.content[0].kind, "verse");
        assert_eq!(doc.content[0].number, Some(1));
        assert_eq!(doc.content[0].content, vec!["Commentary on verse one."]);
    }

    #[test]
    fn unknown_chapter_fields_are_ignored() {
        let doc: ChapterCommentary =
            serde_json::from_str(r#"{"commentary":"abc","book":{},"content":[]}"#).unwrap();
        assert!(doc.content.is_empty());
    }
}
