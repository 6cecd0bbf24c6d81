//! Full-text verse search
//!
//! A deliberate linear scan over the in-memory corpus: case-insensitive
//! substring match in traversal order (book, chapter, verse ascending).
//! Result order is corpus order, not relevance. The whole corpus fits in
//! memory and the scan runs off the render path, so no index is kept.

use crate::books;
use crate::corpus::{Corpus, Language};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Queries shorter than this (after trimming) return no results.
const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// 0-based book index.
    pub book_index: usize,
    pub book_name: String,
    /// 0-based chapter index.
    pub chapter_index: usize,
    /// 1-based verse number.
    pub verse_number: usize,
    pub text: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub lang: Language,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
    pub elapsed_ms: u64,
}

pub struct SearchEngine {
    corpus: Arc<Corpus>,
}

impl SearchEngine {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }

    /// Scan one language edition for verses containing `query`,
    /// case-insensitively. Every match is returned; callers paginate if
    /// they care.
    pub fn search(&self, query: &str, lang: Language) -> SearchResults {
        let start = std::time::Instant::now();

        let trimmed = query.trim();
        let mut results = Vec::new();

        if trimmed.len() >= MIN_QUERY_LEN {
            let needle = trimmed.to_lowercase();

            if let Some(edition) = self.corpus.edition(lang) {
                for (book_index, book) in edition.books.iter().enumerate() {
                    let book_name = books::book_name(book_index, lang).unwrap_or_default();
                    for (chapter_index, chapter) in book.chapters.iter().enumerate() {
                        for (verse_index, verse) in chapter.verses.iter().enumerate() {
                            if verse.text.to_lowercase().contains(&needle) {
                                results.push(SearchHit {
                                    book_index,
                                    book_name: book_name.to_string(),
                                    chapter_index,
                                    verse_number: verse_index + 1,
                                    text: verse.text.clone(),
                                    id: verse.id.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;

        SearchResults {
            query: query.to_string(),
            lang,
            total_hits: results.len(),
            results,
            elapsed_ms,
        }
    }
}
