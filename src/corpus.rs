//! Scripture corpus model and read-only accessors
//!
//! Both language editions are loaded once from bundled JSON and are
//! immutable for the process lifetime. Accessors never fail: an edition
//! that has not finished loading, or an out-of-range index, yields an
//! empty view so callers can treat missing data as "not yet loaded".

use crate::books;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Te,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verse {
    #[serde(rename = "Verseid")]
    pub id: String,
    #[serde(rename = "Verse")]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(rename = "Verse", default)]
    pub verses: Vec<Verse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "Chapter", default)]
    pub chapters: Vec<Chapter>,
}

/// One full scripture text in a single language, as bundled on disk:
/// `{"Book": [{"Chapter": [{"Verse": [{"Verseid": ..., "Verse": ...}]}]}]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Edition {
    #[serde(rename = "Book", default)]
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub en: Option<Edition>,
    pub te: Option<Edition>,
}

impl Corpus {
    /// Load both editions from the data directory. A missing or unreadable
    /// edition is logged and left empty rather than failing the whole load.
    pub fn load(data_dir: &Path) -> Self {
        Self {
            en: load_edition(&data_dir.join("english_bible.json")),
            te: load_edition(&data_dir.join("telugu_bible.json")),
        }
    }

    pub fn edition(&self, lang: Language) -> Option<&Edition> {
        match lang {
            Language::En => self.en.as_ref(),
            Language::Te => self.te.as_ref(),
        }
    }

    pub fn get_book(&self, book_index: usize, lang: Language) -> Option<&Book> {
        self.edition(lang)?.books.get(book_index)
    }

    /// Verses of one chapter, empty when the edition is not loaded or an
    /// index is out of range.
    pub fn chapter_verses(&self, book_index: usize, chapter_index: usize, lang: Language) -> &[Verse] {
        self.get_book(book_index, lang)
            .and_then(|book| book.chapters.get(chapter_index))
            .map(|chapter| chapter.verses.as_slice())
            .unwrap_or(&[])
    }

    pub fn book_count(&self, lang: Language) -> usize {
        self.edition(lang).map(|e| e.books.len()).unwrap_or(0)
    }

    pub fn verse_count(&self, lang: Language) -> usize {
        self.edition(lang)
            .map(|e| {
                e.books
                    .iter()
                    .flat_map(|b| &b.chapters)
                    .map(|c| c.verses.len())
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Editions must share one structural shape: same book, chapter and
    /// verse counts, so indices align across languages. Only the text
    /// differs. A mismatch is reported but not fatal.
    pub fn editions_aligned(&self) -> bool {
        let (Some(en), Some(te)) = (&self.en, &self.te) else {
            return true;
        };
        if en.books.len() != te.books.len() {
            return false;
        }
        en.books.iter().zip(&te.books).all(|(a, b)| {
            a.chapters.len() == b.chapters.len()
                && a.chapters
                    .iter()
                    .zip(&b.chapters)
                    .all(|(ca, cb)| ca.verses.len() == cb.verses.len())
        })
    }

    pub fn book_name(&self, book_index: usize, lang: Language) -> Option<&'static str> {
        books::book_name(book_index, lang)
    }
}

fn load_edition(path: &Path) -> Option<Edition> {
    match read_edition(path) {
        Ok(edition) => Some(edition),
        Err(e) => {
            tracing::warn!("Could not load edition from {:?}: {:#}", path, e);
            None
        }
    }
}

fn read_edition(path: &Path) -> Result<Edition> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read edition file {:?}", path))?;
    let edition: Edition = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse edition file {:?}", path))?;
    Ok(edition)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub fn verse(id: &str, text: &str) -> Verse {
        Verse { id: id.to_string(), text: text.to_string() }
    }

    /// Build an edition from nested verse texts: books -> chapters -> verses.
    pub fn edition(books: &[&[&[&str]]]) -> Edition {
        let mut verse_id = 0;
        Edition {
            books: books
                .iter()
                .map(|chapters| Book {
                    chapters: chapters
                        .iter()
                        .map(|verses| Chapter {
                            verses: verses
                                .iter()
                                .map(|text| {
                                    verse_id += 1;
                                    verse(&verse_id.to_string(), text)
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
