//! Hymns and children's stories
//!
//! Static browse lists bundled alongside the corpus. Both carry their
//! English and Telugu renderings in one record.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Song {
    pub id: String,
    pub title_en: String,
    pub title_te: String,
    pub lyrics_en: String,
    pub lyrics_te: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Story {
    pub title_en: String,
    pub title_te: String,
    pub content_en: String,
    pub content_te: String,
}

#[derive(Debug, Clone, Default)]
pub struct Library {
    songs: Vec<Song>,
    stories: Vec<Story>,
}

impl Library {
    pub fn new(songs: Vec<Song>, stories: Vec<Story>) -> Self {
        Self { songs, stories }
    }

    /// Either file may be absent; the corresponding list stays empty.
    pub fn load(data_dir: &Path) -> Self {
        Self {
            songs: load_list(&data_dir.join("songs.json")),
            stories: load_list(&data_dir.join("children_stories.json")),
        }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn song(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    pub fn story(&self, index: usize) -> Option<&Story> {
        self.stories.get(index)
    }
}

fn load_list<T: serde::de::DeserializeOwned>(path: &Path) -> Vec<T> {
    match read_list(path) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("Could not load {:?}: {:#}", path, e);
            Vec::new()
        }
    }
}

fn read_list<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}
