//! Integration tests for the drill tracker API
//!
//! Every test drives `build_router` with `oneshot`, mostly against a fresh
//! in-memory database; concurrency tests use a file database in a temp dir.
//! Translation and speech backends are in-process fakes.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method
use vocab_common::db::{init_database, init_memory_database};
use vocab_server::speech::{SpeechError, SpeechSynth, VoiceConfig};
use vocab_server::translation::{Meaning, MeaningChain, MeaningProvider, ProviderError};
use vocab_server::{build_router, AppState};

/// Provider answering from a fixed table, counting calls
struct FakeProvider {
    answer: Option<&'static str>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl MeaningProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn lookup(&self, _word: &str) -> Result<Option<Meaning>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answer {
            Some(answer) => Ok(Some(Meaning::plain(answer))),
            None => Err(ProviderError::NetworkError("offline".into())),
        }
    }
}

struct FakeSpeech;

#[async_trait]
impl SpeechSynth for FakeSpeech {
    async fn synthesize(&self, text: &str, voice: VoiceConfig) -> Result<Vec<u8>, SpeechError> {
        if text == "fail" {
            return Err(SpeechError::ApiError(503, "unavailable".into()));
        }
        Ok(format!("{}:{}", voice.name, text).into_bytes())
    }
}

struct TestApp {
    router: Router,
    lookups: Arc<AtomicUsize>,
}

/// Test helper: app over an in-memory database
async fn setup_app_with(answer: Option<&'static str>, speech: bool) -> TestApp {
    let db = init_memory_database().await.expect("Should create database");
    let lookups = Arc::new(AtomicUsize::new(0));
    let chain = MeaningChain::new(vec![Box::new(FakeProvider {
        answer,
        calls: lookups.clone(),
    })]);
    let speech: Option<Arc<dyn SpeechSynth>> = if speech { Some(Arc::new(FakeSpeech)) } else { None };

    TestApp {
        router: build_router(AppState::new(db, chain, speech)),
        lookups,
    }
}

async fn setup_app() -> TestApp {
    setup_app_with(Some("사과"), true).await
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

async fn add_word(app: &Router, text: &str) -> String {
    let (status, body) = send(app, json_request("POST", "/words", json!({ "text": text }))).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

async fn open_session(app: &Router) -> Value {
    let (status, body) = send(app, test_request("POST", "/sessions")).await;
    assert_eq!(status, StatusCode::OK);
    body
}

async fn toggle(app: &Router, word_id: &str, session_id: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/records/toggle",
            json!({ "wordId": word_id, "sessionId": session_id }),
        ),
    )
    .await
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let (status, body) = send(&app.router, test_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "vocab-server");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let app = setup_app().await;

    let (status, body) = send(&app.router, test_request("GET", "/api/buildinfo")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = setup_app().await;

    let (status, body) = send(&app.router, test_request("GET", "/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_ui_is_served() {
    let app = setup_app().await;

    let response = app.router.clone().oneshot(test_request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(test_request("GET", "/static/app.js"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/javascript"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let script = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(script.contains("api('DELETE', `/words/${word.word_id}`)"));
    assert!(script.contains("/active"));
}

// =============================================================================
// Words
// =============================================================================

#[tokio::test]
async fn test_create_word_normalizes_fields() {
    let app = setup_app().await;

    let (status, body) = send(
        &app.router,
        json_request("POST", "/words", json!({ "text": "  Apple ", "alphabet": "a", "level": "two" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "apple");
    assert_eq!(body["alphabet"], "A");
    assert_eq!(body["level"], "two");
    assert_eq!(body["priority"], 0);
    assert_eq!(body["active"], true);
}

#[tokio::test]
async fn test_create_word_requires_text() {
    let app = setup_app().await;

    let (status, body) = send(&app.router, json_request("POST", "/words", json!({ "text": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text");

    let (status, _) = send(&app.router, json_request("POST", "/words", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_word() {
    let app = setup_app().await;
    let id = add_word(&app.router, "apple").await;

    let (status, body) = send(&app.router, test_request("DELETE", &format!("/words/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app.router, test_request("DELETE", &format!("/words/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, words) = send(&app.router, test_request("GET", "/words")).await;
    assert_eq!(words.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_bulk_import_skips_duplicates() {
    let app = setup_app().await;
    add_word(&app.router, "abaft").await;

    let text = "A | abaft | one bee\nB | badger | two bee\n\nB | badger | one\nC | cobble | anything\nbroken line";
    let (status, body) = send(&app.router, json_request("POST", "/words/bulk", json!({ "text": text }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 2);
    assert_eq!(body["skipped"], 3);

    let (_, words) = send(&app.router, test_request("GET", "/words")).await;
    let words = words.as_array().unwrap();
    assert_eq!(words.len(), 3);
    assert_eq!(words[1]["text"], "badger");
    assert_eq!(words[1]["level"], "two");
    assert_eq!(words[2]["level"], "three");
    assert_eq!(words[2]["source"], "bulk");
}

#[tokio::test]
async fn test_bulk_import_larger_than_sqlite_variable_limit() {
    let app = setup_app().await;
    add_word(&app.router, "word7").await;

    let text: String = (0..33_000)
        .map(|n| format!("A | word{} | one\n", n))
        .collect();
    let (status, body) = send(&app.router, json_request("POST", "/words/bulk", json!({ "text": text }))).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["inserted"], 32_999);
    assert_eq!(body["skipped"], 1);

    let (_, words) = send(&app.router, test_request("GET", "/words")).await;
    assert_eq!(words.as_array().unwrap().len(), 33_000);
}

#[tokio::test]
async fn test_bulk_import_requires_text() {
    let app = setup_app().await;

    let (status, body) = send(&app.router, json_request("POST", "/words/bulk", json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text");
}

#[tokio::test]
async fn test_priority_is_clamped() {
    let app = setup_app().await;
    let id = add_word(&app.router, "apple").await;
    let uri = format!("/words/{}/priority", id);

    let (status, body) = send(&app.router, json_request("PATCH", &uri, json!({ "delta": 5 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["priority"], 2);

    let (_, body) = send(&app.router, json_request("PATCH", &uri, json!({ "delta": -9 }))).await;
    assert_eq!(body["priority"], 0);

    let (status, body) = send(&app.router, json_request("PATCH", &uri, json!({ "delta": "up" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "delta must be a number");

    let (status, _) = send(
        &app.router,
        json_request("PATCH", "/words/missing/priority", json!({ "delta": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bookmark_and_hide() {
    let app = setup_app().await;
    let id = add_word(&app.router, "apple").await;
    add_word(&app.router, "banana").await;

    let (_, body) = send(&app.router, test_request("PATCH", &format!("/words/{}/bookmark", id))).await;
    assert_eq!(body["bookmarked"], true);

    let (_, view) = send(&app.router, test_request("GET", "/table/view?bookmarked=true")).await;
    assert_eq!(view["total_rows"], 1);
    assert_eq!(view["rows"][0]["text"], "apple");

    let (_, body) = send(
        &app.router,
        json_request("PATCH", &format!("/words/{}/active", id), json!({ "active": false })),
    )
    .await;
    assert_eq!(body["active"], false);

    let (_, table) = send(&app.router, test_request("GET", "/table")).await;
    let words = table["words"].as_array().unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0]["text"], "banana");

    // Hidden words are still listed by /words
    let (_, all) = send(&app.router, test_request("GET", "/words")).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_open_session_posts_previous() {
    let app = setup_app().await;

    let first = open_session(&app.router).await;
    assert_eq!(first["status"], "open");
    assert_eq!(first["sequence"], 1);
    assert!(first["label"].as_str().unwrap().ends_with("-1"));

    let second = open_session(&app.router).await;
    assert_eq!(second["sequence"], 2);

    let (_, sessions) = send(&app.router, test_request("GET", "/sessions")).await;
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0]["id"], second["id"]);
    assert_eq!(sessions[0]["status"], "open");
    assert_eq!(sessions[1]["status"], "posted");
}

#[tokio::test]
async fn test_delete_current_session_reopens_previous() {
    let app = setup_app().await;
    let word = add_word(&app.router, "apple").await;
    let first = open_session(&app.router).await;
    let second = open_session(&app.router).await;
    toggle(&app.router, &word, second["id"].as_str().unwrap()).await;

    let (status, body) = send(&app.router, test_request("DELETE", "/sessions/current")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], second["label"]);
    assert_eq!(body["reopened"], first["label"]);
    assert!(body.get("created").is_none());

    let (_, table) = send(&app.router, test_request("GET", "/table")).await;
    assert_eq!(table["sessions"].as_array().unwrap().len(), 1);
    assert_eq!(table["sessions"][0]["status"], "open");
    assert_eq!(table["records"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_delete_last_session_creates_fresh_one() {
    let app = setup_app().await;
    let only = open_session(&app.router).await;

    let (status, body) = send(&app.router, test_request("DELETE", "/sessions/current")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], only["label"]);
    assert!(body["created"].is_string());
    assert!(body.get("reopened").is_none());
}

#[tokio::test]
async fn test_delete_without_open_session() {
    let app = setup_app().await;

    let (status, body) = send(&app.router, test_request("DELETE", "/sessions/current")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No open session");
}

// =============================================================================
// Record toggle
// =============================================================================

#[tokio::test]
async fn test_toggle_cycle_adjusts_priority() {
    let app = setup_app().await;
    let word = add_word(&app.router, "apple").await;
    let session = open_session(&app.router).await;
    let session_id = session["id"].as_str().unwrap();

    let (status, body) = toggle(&app.router, &word, session_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "success");
    assert_eq!(body["priority"], 0);

    let (_, body) = toggle(&app.router, &word, session_id).await;
    assert_eq!(body["result"], "fail");
    assert_eq!(body["priority"], 1);

    let (_, stats) = send(&app.router, test_request("GET", "/stats/words")).await;
    assert_eq!(stats[&word]["success"], 0);
    assert_eq!(stats[&word]["attempts"], 1);

    let (_, body) = toggle(&app.router, &word, session_id).await;
    assert_eq!(body["deleted"], true);
    assert_eq!(body["priority"], 0);

    let (_, table) = send(&app.router, test_request("GET", "/table")).await;
    assert_eq!(table["records"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_toggle_posted_session_is_forbidden() {
    let app = setup_app().await;
    let word = add_word(&app.router, "apple").await;
    let posted = open_session(&app.router).await;
    open_session(&app.router).await;

    let (status, body) = toggle(&app.router, &word, posted["id"].as_str().unwrap()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Session is not editable");

    let (status, _) = toggle(&app.router, &word, "no-such-session").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_toggle_validation() {
    let app = setup_app().await;
    let session = open_session(&app.router).await;

    let (status, body) = send(
        &app.router,
        json_request("POST", "/records/toggle", json!({ "wordId": "w" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "wordId and sessionId required");

    let (status, _) = toggle(&app.router, "missing", session["id"].as_str().unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Table view
// =============================================================================

#[tokio::test]
async fn test_table_view_marks_and_sorting() {
    let app = setup_app().await;
    let cherry = add_word(&app.router, "cherry").await;
    add_word(&app.router, "apple").await;
    let session = open_session(&app.router).await;
    toggle(&app.router, &cherry, session["id"].as_str().unwrap()).await;

    let (status, view) = send(&app.router, test_request("GET", "/table/view?sort=text")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["total_rows"], 2);
    assert_eq!(view["page"], 1);
    assert_eq!(view["columns"][0]["editable"], true);
    assert_eq!(view["rows"][0]["text"], "apple");
    assert_eq!(view["rows"][1]["text"], "cherry");
    assert_eq!(view["rows"][1]["cells"][0]["mark"], "success");
    assert_eq!(view["rows"][1]["rate"], 1.0);
    assert!(view["rows"][0]["cells"][0]["mark"].is_null());

    let (_, view) = send(&app.router, test_request("GET", "/table/view?search=ERR&page=7")).await;
    assert_eq!(view["total_rows"], 1);
    assert_eq!(view["page"], 1);
}

#[tokio::test]
async fn test_table_view_rejects_unknown_sort() {
    let app = setup_app().await;

    let response = app
        .router
        .clone()
        .oneshot(test_request("GET", "/table/view?sort=colour"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("colour"));

    let (status, body) = send(&app.router, test_request("GET", "/table/view?page=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// =============================================================================
// Meaning lookup
// =============================================================================

#[tokio::test]
async fn test_translation_is_cached() {
    let app = setup_app().await;
    let id = add_word(&app.router, "apple").await;
    let uri = format!("/translation/{}", id);

    let (status, body) = send(&app.router, test_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meaning"], "사과");

    let (_, body) = send(&app.router, test_request("GET", &uri)).await;
    assert_eq!(body["meaning"], "사과");
    assert_eq!(app.lookups.load(Ordering::SeqCst), 1);

    let (_, words) = send(&app.router, test_request("GET", "/words")).await;
    assert_eq!(words[0]["meaning"], "사과");
}

#[tokio::test]
async fn test_translation_failure_stores_nothing() {
    let app = setup_app_with(None, true).await;
    let id = add_word(&app.router, "apple").await;
    let uri = format!("/translation/{}", id);

    let (status, body) = send(&app.router, test_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meaning"], "");

    send(&app.router, test_request("GET", &uri)).await;
    assert_eq!(app.lookups.load(Ordering::SeqCst), 2);

    let (status, _) = send(&app.router, test_request("GET", "/translation/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Speech
// =============================================================================

#[tokio::test]
async fn test_tts_returns_cached_audio() {
    let app = setup_app().await;

    let response = app
        .router
        .clone()
        .oneshot(test_request("GET", "/tts?text=%EC%82%AC%EA%B3%BC&lang=kr"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=86400"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], "ko-KR-Wavenet-A:사과".as_bytes());
}

#[tokio::test]
async fn test_tts_errors() {
    let app = setup_app().await;

    let (status, body) = send(&app.router, test_request("GET", "/tts?text=%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text");

    let (status, body) = send(&app.router, test_request("GET", "/tts?text=fail")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "TTS error");

    let unconfigured = setup_app_with(Some("사과"), false).await;
    let (status, body) = send(&unconfigured.router, test_request("GET", "/tts?text=apple")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "TTS error");
}

// =============================================================================
// On-disk database
// =============================================================================

#[tokio::test]
async fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("vocab.db");

    {
        let db = init_database(&db_path).await.unwrap();
        let app = build_router(AppState::new(db.clone(), MeaningChain::default(), None));
        add_word(&app, "apple").await;
        open_session(&app).await;
        db.close().await;
    }

    let db = init_database(&db_path).await.unwrap();
    let app = build_router(AppState::new(db, MeaningChain::default(), None));

    let (_, table) = send(&app, test_request("GET", "/table")).await;
    assert_eq!(table["words"].as_array().unwrap().len(), 1);
    assert_eq!(table["sessions"][0]["status"], "open");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_on_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = init_database(&dir.path().join("vocab.db")).await.unwrap();
    let app = build_router(AppState::new(db, MeaningChain::default(), None));

    let mut word_ids = Vec::new();
    for n in 0..40 {
        word_ids.push(add_word(&app, &format!("word{}", n)).await);
    }
    let session = open_session(&app).await;
    let session_id = session["id"].as_str().unwrap().to_string();

    let handles: Vec<_> = word_ids
        .iter()
        .map(|word_id| {
            let app = app.clone();
            let word_id = word_id.clone();
            let session_id = session_id.clone();
            tokio::spawn(async move { toggle(&app, &word_id, &session_id).await })
        })
        .collect();

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["result"], "success");
    }

    let (_, stats) = send(&app, test_request("GET", "/stats/words")).await;
    for word_id in &word_ids {
        assert_eq!(stats[word_id.as_str()]["success"], 1);
        assert_eq!(stats[word_id.as_str()]["attempts"], 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_session_opens_keep_one_open() {
    let dir = tempfile::tempdir().unwrap();
    let db = init_database(&dir.path().join("vocab.db")).await.unwrap();
    let app = build_router(AppState::new(db, MeaningChain::default(), None));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { send(&app, test_request("POST", "/sessions")).await })
        })
        .collect();

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    let (_, sessions) = send(&app, test_request("GET", "/sessions")).await;
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 8);
    assert_eq!(sessions.iter().filter(|s| s["status"] == "open").count(), 1);

    let mut labels: Vec<_> = sessions.iter().map(|s| s["label"].as_str().unwrap()).collect();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), 8);
}
