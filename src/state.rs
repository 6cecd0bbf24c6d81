//! Application state management

use crate::annotations::Annotations;
use crate::assistant::Assistant;
use crate::commentary::{CommentaryClient, CommentaryStore};
use crate::corpus::Corpus;
use crate::cross_references::CrossReferenceStore;
use crate::library::Library;
use crate::search::SearchEngine;
use crate::store::SettingsStore;
use crate::streak::StreakEngine;
use crate::update::UpdateChecker;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

/// Shared handle the server hands to every request. `None` until the
/// background load finishes, so handlers can answer the not-ready window
/// with empty payloads instead of blocking startup.
pub type ManagedAppState = Arc<RwLock<Option<Arc<AppState>>>>;

/// Everything loaded once at startup plus the mutable user state.
pub struct AppState {
    pub corpus: Arc<Corpus>,
    pub search_engine: Arc<SearchEngine>,
    pub commentary: Arc<CommentaryStore>,
    pub cross_references: Arc<CrossReferenceStore>,
    pub library: Arc<Library>,
    pub store: Arc<SettingsStore>,
    pub streak: Mutex<StreakEngine>,
    pub annotations: Mutex<Annotations>,
    pub commentary_client: CommentaryClient,
    pub assistant: Assistant,
    pub update_checker: UpdateChecker,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize application state. Missing bundled data degrades to
    /// empty stores; only an unusable settings database is an error.
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        let corpus = Arc::new(Corpus::load(&data_dir));
        if !corpus.editions_aligned() {
            tracing::warn!(
                "Editions are structurally misaligned; verse indices will not line up across languages"
            );
        }

        let search_engine = Arc::new(SearchEngine::new(Arc::clone(&corpus)));
        let commentary = Arc::new(CommentaryStore::load(&data_dir));
        let cross_references = Arc::new(CrossReferenceStore::load(&data_dir));
        let library = Arc::new(Library::load(&data_dir));

        let store = Arc::new(SettingsStore::open(&data_dir.join("settings.db"))?);
        let streak = Mutex::new(StreakEngine::load(&store));
        let annotations = Mutex::new(Annotations::load(&store));

        Ok(Self {
            corpus,
            search_engine,
            commentary,
            cross_references,
            library,
            store,
            streak,
            annotations,
            commentary_client: CommentaryClient::new(),
            assistant: Assistant::new(),
            update_checker: UpdateChecker::new(),
            data_dir,
        })
    }
}

/// Resolve the bundled-data directory.
///
/// - Development: `assets/data` relative to the working directory
/// - Production: platform data dir (e.g. ~/.local/share/Berean)
pub fn get_data_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        let dev_paths = [PathBuf::from("assets/data"), PathBuf::from("../assets/data")];
        for path in &dev_paths {
            if path.join("english_bible.json").exists() {
                return path.canonicalize().unwrap_or_else(|_| path.clone());
            }
        }
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("Berean");
    }

    PathBuf::from("assets/data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Language;

    #[test]
    fn state_opens_with_no_bundled_data() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().to_path_buf()).unwrap();

        assert_eq!(state.corpus.book_count(Language::En), 0);
        assert!(state.commentary.is_empty());
        assert!(state.cross_references.is_empty());
        assert_eq!(state.streak.lock().unwrap().state().count, 0);
        // The settings store is usable immediately.
        state.store.set("language", "te").unwrap();
        assert_eq!(state.store.get("language").unwrap().as_deref(), Some("te"));
    }
}
