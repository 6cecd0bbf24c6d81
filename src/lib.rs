//! Berean - Devotional Bible Reading Backend
//!
//! Backend library for a scripture reading app: corpus access, verse
//! search, cross references, commentary, reading streaks and annotations.

pub mod books;
pub mod corpus;
pub mod search;
pub mod cross_references;
pub mod commentary;
pub mod streak;
pub mod annotations;
pub mod store;
pub mod update;
pub mod assistant;
pub mod library;
pub mod error;
pub mod state;

pub use annotations::Annotations;
pub use assistant::{Assistant, ChatReply, ChatStatus};
pub use commentary::{
    ChapterCommentary, Commentary, CommentaryBook, CommentaryClient, CommentaryEntry,
    CommentaryStore,
};
pub use corpus::{Book, Chapter, Corpus, Edition, Language, Verse};
pub use cross_references::{CrossReferenceEntry, CrossReferenceStore, VerseRef};
pub use error::BereanError;
pub use library::{Library, Song, Story};
pub use search::{SearchEngine, SearchHit, SearchResults};
pub use state::{get_data_dir, AppState, ManagedAppState};
pub use store::SettingsStore;
pub use streak::{compute_badges, ReadingState, StreakEngine};
pub use update::{is_version_higher, UpdateChecker, UpdateInfo};
