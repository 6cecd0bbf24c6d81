//! Berean - Devotional Bible Reading Backend
//! HTTP server consumed by the mobile frontend

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use berean_lib::annotations::Annotations;
use berean_lib::assistant::{ChatReply, ChatStatus};
use berean_lib::commentary::{ChapterCommentary, Commentary, CommentaryBook, CommentaryEntry};
use berean_lib::corpus::{Language, Verse};
use berean_lib::cross_references::VerseRef;
use berean_lib::library::{Song, Story};
use berean_lib::search::SearchResults;
use berean_lib::state::{get_data_dir, AppState, ManagedAppState};
use berean_lib::store::{KEY_LANGUAGE, KEY_THEME};
use berean_lib::streak::{self, ReadingState};
use berean_lib::update::UpdateInfo;
use berean_lib::{books, BereanError};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// Keys the generic settings endpoint may touch; everything else has a
/// dedicated route.
const SETTINGS_KEYS: &[&str] = &[KEY_LANGUAGE, KEY_THEME];

// === Request/Response types ===

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    lang: Option<Language>,
}

#[derive(Deserialize)]
struct ChapterQuery {
    book: usize,
    chapter: usize,
    lang: Option<Language>,
}

#[derive(Deserialize)]
struct LocatorQuery {
    book: String,
    chapter: u32,
    verse: u32,
}

#[derive(Deserialize)]
struct HighlightRequest {
    verse_id: String,
    color: String,
}

#[derive(Deserialize)]
struct VerseIdRequest {
    verse_id: String,
}

#[derive(Deserialize)]
struct ChatRequest {
    prompt: String,
    lang: Option<Language>,
}

#[derive(Deserialize)]
struct SettingUpdate {
    value: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    corpus_ready: bool,
    verse_count: usize,
}

#[derive(Serialize)]
struct BookSummary {
    index: usize,
    name: String,
    telugu_name: String,
    chapters: usize,
}

#[derive(Serialize)]
struct DailyBreadStatus {
    read: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: BereanError,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn database_error(e: anyhow::Error) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: BereanError::Database(e.to_string()) }),
    )
}

fn invalid_key(key: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: BereanError::InvalidQuery(format!("Unknown settings key: {}", key)) }),
    )
}

/// The state is `None` while the background load is still running;
/// handlers treat that window as an empty corpus, not an error.
fn current_state(state: &ManagedAppState) -> Option<Arc<AppState>> {
    state.read().ok().and_then(|guard| guard.clone())
}

// === Handlers ===

async fn health(State(state): State<ManagedAppState>) -> Json<HealthResponse> {
    let loaded = current_state(&state);
    let verse_count = loaded
        .as_ref()
        .map(|s| s.corpus.verse_count(Language::En))
        .unwrap_or(0);
    Json(HealthResponse {
        status: "ok".to_string(),
        corpus_ready: loaded.is_some(),
        verse_count,
    })
}

async fn search(
    State(state): State<ManagedAppState>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchResults> {
    let lang = params.lang.unwrap_or_default();
    let Some(app_state) = current_state(&state) else {
        return Json(SearchResults {
            query: params.q,
            lang,
            total_hits: 0,
            results: Vec::new(),
            elapsed_ms: 0,
        });
    };

    // The scan is linear over the whole corpus; keep it off the runtime's
    // I/O threads.
    let engine = Arc::clone(&app_state.search_engine);
    let results = tokio::task::spawn_blocking(move || engine.search(&params.q, lang)).await;
    match results {
        Ok(results) => Json(results),
        Err(e) => {
            tracing::warn!("Search task failed: {}", e);
            Json(SearchResults {
                query: String::new(),
                lang,
                total_hits: 0,
                results: Vec::new(),
                elapsed_ms: 0,
            })
        }
    }
}

async fn list_books(State(state): State<ManagedAppState>) -> Json<Vec<BookSummary>> {
    let Some(app_state) = current_state(&state) else {
        return Json(Vec::new());
    };

    let summaries = (0..app_state.corpus.book_count(Language::En))
        .filter_map(|index| {
            let book = app_state.corpus.get_book(index, Language::En)?;
            Some(BookSummary {
                index,
                name: books::book_name(index, Language::En).unwrap_or_default().to_string(),
                telugu_name: books::book_name(index, Language::Te).unwrap_or_default().to_string(),
                chapters: book.chapters.len(),
            })
        })
        .collect();
    Json(summaries)
}

async fn chapter_verses(
    State(state): State<ManagedAppState>,
    Query(params): Query<ChapterQuery>,
) -> Json<Vec<Verse>> {
    let Some(app_state) = current_state(&state) else {
        return Json(Vec::new());
    };
    let lang = params.lang.unwrap_or_default();
    Json(app_state.corpus.chapter_verses(params.book, params.chapter, lang).to_vec())
}

async fn verse_commentary(
    State(state): State<ManagedAppState>,
    Query(params): Query<LocatorQuery>,
) -> Json<Option<CommentaryEntry>> {
    let Some(app_state) = current_state(&state) else {
        return Json(None);
    };
    Json(app_state.commentary.lookup(&params.book, params.chapter, params.verse).cloned())
}

async fn cross_references(
    State(state): State<ManagedAppState>,
    Query(params): Query<LocatorQuery>,
) -> Json<Vec<VerseRef>> {
    let Some(app_state) = current_state(&state) else {
        return Json(Vec::new());
    };
    Json(app_state.cross_references.resolve(&params.book, params.chapter, params.verse))
}

async fn available_commentaries(State(state): State<ManagedAppState>) -> Json<Vec<Commentary>> {
    let Some(app_state) = current_state(&state) else {
        return Json(Vec::new());
    };
    Json(app_state.commentary_client.available_commentaries().await)
}

async fn commentary_books(
    State(state): State<ManagedAppState>,
    Path(commentary_id): Path<String>,
) -> Json<Vec<CommentaryBook>> {
    let Some(app_state) = current_state(&state) else {
        return Json(Vec::new());
    };
    Json(app_state.commentary_client.commentary_books(&commentary_id).await)
}

async fn chapter_commentary(
    State(state): State<ManagedAppState>,
    Path((commentary_id, book_id, chapter_number)): Path<(String, String, u32)>,
) -> Json<Option<ChapterCommentary>> {
    let Some(app_state) = current_state(&state) else {
        return Json(None);
    };
    let doc = app_state
        .commentary_client
        .chapter_commentary(&commentary_id, &book_id, chapter_number)
        .await;
    Json(doc.map(|doc| (*doc).clone()))
}

async fn streak_state(State(state): State<ManagedAppState>) -> Json<ReadingState> {
    let Some(app_state) = current_state(&state) else {
        return Json(ReadingState::default());
    };
    let streak = app_state.streak.lock().unwrap();
    Json(streak.state().clone())
}

async fn record_activity(State(state): State<ManagedAppState>) -> Json<ReadingState> {
    let Some(app_state) = current_state(&state) else {
        return Json(ReadingState::default());
    };
    let mut streak = app_state.streak.lock().unwrap();
    streak.record_activity();
    streak.persist(&app_state.store);
    Json(streak.state().clone())
}

async fn daily_bread_status(State(state): State<ManagedAppState>) -> Json<DailyBreadStatus> {
    let Some(app_state) = current_state(&state) else {
        return Json(DailyBreadStatus { read: false });
    };
    let read = streak::daily_bread_read(&app_state.store, Local::now().date_naive());
    Json(DailyBreadStatus { read })
}

async fn mark_daily_bread(State(state): State<ManagedAppState>) -> Json<DailyBreadStatus> {
    let Some(app_state) = current_state(&state) else {
        return Json(DailyBreadStatus { read: false });
    };
    streak::mark_daily_bread(&app_state.store, Local::now().date_naive());
    Json(DailyBreadStatus { read: true })
}

async fn annotations(State(state): State<ManagedAppState>) -> Json<Annotations> {
    let Some(app_state) = current_state(&state) else {
        return Json(Annotations::default());
    };
    let annotations = app_state.annotations.lock().unwrap().clone();
    Json(annotations)
}

async fn toggle_highlight(
    State(state): State<ManagedAppState>,
    Json(req): Json<HighlightRequest>,
) -> Json<Annotations> {
    let Some(app_state) = current_state(&state) else {
        return Json(Annotations::default());
    };
    let mut annotations = app_state.annotations.lock().unwrap();
    annotations.toggle_highlight(&req.verse_id, &req.color);
    annotations.persist_highlights(&app_state.store);
    Json(annotations.clone())
}

async fn toggle_favorite(
    State(state): State<ManagedAppState>,
    Json(req): Json<VerseIdRequest>,
) -> Json<Annotations> {
    let Some(app_state) = current_state(&state) else {
        return Json(Annotations::default());
    };
    let mut annotations = app_state.annotations.lock().unwrap();
    annotations.toggle_favorite(&req.verse_id);
    annotations.persist_favorites(&app_state.store);
    Json(annotations.clone())
}

async fn toggle_underline(
    State(state): State<ManagedAppState>,
    Json(req): Json<VerseIdRequest>,
) -> Json<Annotations> {
    let Some(app_state) = current_state(&state) else {
        return Json(Annotations::default());
    };
    let mut annotations = app_state.annotations.lock().unwrap();
    annotations.toggle_underline(&req.verse_id);
    annotations.persist_underlines(&app_state.store);
    Json(annotations.clone())
}

async fn get_setting(
    State(state): State<ManagedAppState>,
    Path(key): Path<String>,
) -> Result<Json<Option<String>>, ApiError> {
    if !SETTINGS_KEYS.contains(&key.as_str()) {
        return Err(invalid_key(&key));
    }
    let Some(app_state) = current_state(&state) else {
        return Ok(Json(None));
    };
    app_state.store.get(&key).map(Json).map_err(database_error)
}

async fn set_setting(
    State(state): State<ManagedAppState>,
    Path(key): Path<String>,
    Json(req): Json<SettingUpdate>,
) -> Result<Json<Option<String>>, ApiError> {
    if !SETTINGS_KEYS.contains(&key.as_str()) {
        return Err(invalid_key(&key));
    }
    let Some(app_state) = current_state(&state) else {
        return Ok(Json(None));
    };
    app_state.store.set(&key, &req.value).map_err(database_error)?;
    Ok(Json(Some(req.value)))
}

async fn check_update(State(state): State<ManagedAppState>) -> Json<Option<UpdateInfo>> {
    let Some(app_state) = current_state(&state) else {
        return Json(None);
    };
    Json(app_state.update_checker.check().await)
}

async fn chat(
    State(state): State<ManagedAppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatReply> {
    let lang = req.lang.unwrap_or_default();
    let Some(app_state) = current_state(&state) else {
        return Json(ChatReply {
            text: "The Word is still loading. Please try again in a moment.".to_string(),
            status: ChatStatus::Error,
        });
    };
    Json(app_state.assistant.respond(&req.prompt, lang).await)
}

async fn songs(State(state): State<ManagedAppState>) -> Json<Vec<Song>> {
    let Some(app_state) = current_state(&state) else {
        return Json(Vec::new());
    };
    Json(app_state.library.songs().to_vec())
}

async fn stories(State(state): State<ManagedAppState>) -> Json<Vec<Story>> {
    let Some(app_state) = current_state(&state) else {
        return Json(Vec::new());
    };
    Json(app_state.library.stories().to_vec())
}

// === Startup ===

/// Load bundled data off the startup path; the server answers with empty
/// payloads until the swap-in.
fn spawn_corpus_load(state: ManagedAppState, data_dir: std::path::PathBuf) {
    tokio::spawn(async move {
        let loaded = tokio::task::spawn_blocking(move || AppState::new(data_dir)).await;
        match loaded {
            Ok(Ok(app_state)) => {
                tracing::info!(
                    "Background load complete: {} books, {} verses",
                    app_state.corpus.book_count(Language::En),
                    app_state.corpus.verse_count(Language::En)
                );
                if let Ok(mut guard) = state.write() {
                    *guard = Some(Arc::new(app_state));
                }
            }
            Ok(Err(e)) => tracing::warn!("Data not ready: {:#}", e),
            Err(e) => tracing::warn!("Background load task failed: {}", e),
        }
    });
}

/// One tick per foregrounded minute; aborted when the server stops.
fn spawn_minute_tick(state: ManagedAppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        // The first tick completes immediately; skip it so a minute means
        // a minute.
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Some(app_state) = current_state(&state) {
                let mut streak = app_state.streak.lock().unwrap();
                streak.tick_minute();
                streak.persist(&app_state.store);
            }
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let data_dir = get_data_dir();
    tracing::info!("Using data directory: {:?}", data_dir);

    let app_state: ManagedAppState = Arc::new(RwLock::new(None));
    spawn_corpus_load(Arc::clone(&app_state), data_dir);
    let tick_task = spawn_minute_tick(Arc::clone(&app_state));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/books", get(list_books))
        .route("/chapter", get(chapter_verses))
        .route("/commentary", get(verse_commentary))
        .route("/commentary/available", get(available_commentaries))
        .route("/commentary/:id/books", get(commentary_books))
        .route("/commentary/:id/:book_id/:chapter", get(chapter_commentary))
        .route("/crossrefs", get(cross_references))
        .route("/streak", get(streak_state))
        .route("/streak/activity", post(record_activity))
        .route("/dailybread", get(daily_bread_status).post(mark_daily_bread))
        .route("/annotations", get(annotations))
        .route("/annotations/highlight", post(toggle_highlight))
        .route("/annotations/favorite", post(toggle_favorite))
        .route("/annotations/underline", post(toggle_underline))
        .route("/settings/:key", get(get_setting).put(set_setting))
        .route("/update/check", get(check_update))
        .route("/chat", post(chat))
        .route("/songs", get(songs))
        .route("/stories", get(stories))
        .layer(cors)
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("Listening on http://127.0.0.1:3000");
    let served = axum::serve(listener, app).await;
    tick_task.abort();
    served?;

    Ok(())
}
