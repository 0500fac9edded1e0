use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use silly_api::api::rest;
use silly_api::api::AppState;
use silly_api::background::DirtyFlag;
use silly_api::generate::GenerateConfig;
use silly_api::paste::{PasteLimits, PasteService};
use silly_api::secrets::{Invalidator, SecretLog, SecretsConfig};
use silly_api::storage::{FileStore, RedbBackend};

struct TestApp {
    _dir: TempDir,
    repo: std::path::PathBuf,
    dirty: DirtyFlag,
    router: Router,
}

fn app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(RedbBackend::open(dir.path().join("pastes.redb")).unwrap());
    let files = FileStore::new(dir.path().join("files")).unwrap();
    let pastes = Arc::new(PasteService::new(
        backend,
        files,
        PasteLimits {
            max_text_bytes: 1024 * 1024,
            max_file_bytes: 10 * 1024 * 1024,
        },
    ));

    let repo = dir.path().join("repo");
    let secrets = SecretsConfig {
        repo_path: repo.clone(),
        ..SecretsConfig::default()
    };
    let dirty = DirtyFlag::default();
    let invalidator = Invalidator::new(
        SecretLog::new(repo.clone(), secrets.max_file_bytes),
        dirty.clone(),
    );

    let state = AppState::new(pastes, invalidator, &secrets, GenerateConfig::default());
    TestApp {
        _dir: dir,
        repo,
        dirty,
        router: rest::router(state),
    }
}

async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

async fn send_json(app: &TestApp, req: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn text_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn long_id(tag: &str) -> String {
    format!("{}-{}", tag, "a".repeat(40))
}

#[tokio::test]
async fn test_public_paste_roundtrip() {
    let app = app();

    let (status, body) = send_json(&app, text_request("POST", "/paste/public", "hello")).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let (status, body) = send_json(&app, get(&format!("/paste/public/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["content"], "hello");

    let (_, listing) = send_json(&app, get("/paste")).await;
    assert_eq!(listing[id.as_str()], "hello");
}

#[tokio::test]
async fn test_json_bodies_are_unwrapped() {
    let app = app();

    let req = Request::builder()
        .method("POST")
        .uri("/paste")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"content":"from json"}"#))
        .unwrap();
    let (_, body) = send_json(&app, req).await;
    let id = body["id"].as_str().unwrap().to_string();

    let (_, body) = send_json(&app, get(&format!("/paste/{}", id))).await;
    assert_eq!(body["content"], "from json");
}

#[tokio::test]
async fn test_create_with_taken_id_is_rejected() {
    let app = app();

    let (status, _) = send_json(&app, text_request("POST", "/paste/my-note", "original")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, text_request("POST", "/paste/my-note", "replacement")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Paste ID already exists");

    let (_, body) = send_json(&app, get("/paste/my-note")).await;
    assert_eq!(body["content"], "original");
}

#[tokio::test]
async fn test_invalid_id_is_rejected() {
    let app = app();

    let (status, body) = send_json(&app, text_request("POST", "/paste/bad_id!", "x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("id"));

    // Update and delete need at least 32 characters.
    let (status, _) = send_json(&app, text_request("PUT", "/paste/short", "x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_requires_existing_paste() {
    let app = app();
    let id = long_id("upd");

    let (status, body) = send_json(&app, text_request("PUT", &format!("/paste/{}", id), "x")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Paste not found");

    send_json(&app, text_request("POST", &format!("/paste/public/{}", id), "v1")).await;
    let (status, body) = send_json(&app, text_request("PUT", &format!("/paste/{}", id), "v2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());

    let (_, body) = send_json(&app, get(&format!("/paste/public/{}", id))).await;
    assert_eq!(body["content"], "v2");
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let app = app();
    let id = long_id("del");

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri(format!("/paste/{}", id))
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = send_json(&app, delete()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send_json(&app, text_request("POST", &format!("/paste/{}", id), "bye")).await;
    let (status, body) = send_json(&app, delete()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send_json(&app, get(&format!("/paste/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_file_upload_and_download() {
    let app = app();
    let boundary = "XBOUNDARYX";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\nContent-Type: text/plain\r\n\r\nfile body\r\n--{b}--\r\n",
        b = boundary
    );
    let req = Request::builder()
        .method("POST")
        .uri("/paste/public")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, json) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let id = json["id"].as_str().unwrap().to_string();

    let (status, headers, bytes) = send(&app, get(&format!("/paste/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"file body");
    assert_eq!(headers[header::CONTENT_TYPE], "application/octet-stream");
    assert_eq!(headers[header::CONTENT_LENGTH], "9");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"notes.txt\""
    );
}

#[tokio::test]
async fn test_file_blob_name_collision_is_rejected() {
    let app = app();

    let upload = |uri: &str, filename: &str, content: &str| {
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\r\n{c}\r\n--{b}--\r\n",
            b = boundary,
            f = filename,
            c = content
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    };

    let (status, _) = send_json(&app, upload("/paste/a", "b-c.txt", "AAAA")).await;
    assert_eq!(status, StatusCode::OK);

    // Same blob name on disk: `a-b-c.txt`.
    let (status, body) = send_json(&app, upload("/paste/a-b", "c.txt", "BB")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "File name already in use");

    let (status, _, bytes) = send(&app, get("/paste/a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"AAAA");
}

#[tokio::test]
async fn test_oversized_text_is_413() {
    let app = app();
    let big = "a".repeat(1024 * 1024 + 1);

    let (status, _, _) = send(&app, text_request("POST", "/paste", &big)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_secret_invalidation_marks_dirty() {
    let app = app();
    assert!(!app.dirty.is_dirty());

    let (status, body) = send_json(&app, get("/secret/invalidate?secret=abc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Secret queued for invalidation");
    assert!(app.dirty.is_dirty());
    assert!(app.repo.join("secrets").is_dir());

    let req = Request::builder()
        .method("POST")
        .uri("/secret/invalidate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"secret":"def"}"#))
        .unwrap();
    let (status, _) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_secret_query_limit() {
    let app = app();
    let secret = "s".repeat(4 * 1024 + 1);

    let (status, _) = send_json(&app, get(&format!("/secret/invalidate?secret={}", secret))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!app.dirty.is_dirty());
}

#[tokio::test]
async fn test_generate_routes() {
    let app = app();

    let (status, _, body) = send(&app, get("/generate/uuid/v4")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(uuid::Uuid::parse_str(std::str::from_utf8(&body).unwrap()).is_ok());

    let (status, body) = send_json(&app, get("/generate/number/bulk?amount=5&min=1&max=3")).await;
    assert_eq!(status, StatusCode::OK);
    let numbers = body.as_array().unwrap();
    assert_eq!(numbers.len(), 5);
    assert!(numbers.iter().all(|n| (1..=3).contains(&n.as_i64().unwrap())));

    let (status, _) = send_json(&app, get("/generate/uuid/v4/bulk?amount=1000001")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, get("/generate/bytes/bulk?amount=100&length=1048576")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, body) = send(&app, get("/generate/string?length=12&charset=numeric")).await;
    let s = String::from_utf8(body).unwrap();
    assert_eq!(s.len(), 12);
    assert!(s.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_bad_query_renders_json_error() {
    let app = app();

    let (status, body) = send_json(&app, get("/generate/color?format=cmyk")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));

    let (status, body) = send_json(&app, get("/secret/invalidate")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(!app.dirty.is_dirty());
}

#[tokio::test]
async fn test_lookup_order_differs_by_route() {
    let app = app();

    // A generated private id can be reused on the public route, which only
    // checks the public store.
    let (_, body) = send_json(&app, text_request("POST", "/paste", "private body")).await;
    let id = body["id"].as_str().unwrap().to_string();
    let (status, _) = send_json(&app, text_request("POST", &format!("/paste/public/{}", id), "public body")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&app, get(&format!("/paste/{}", id))).await;
    assert_eq!(body["content"], "private body");
    let (_, body) = send_json(&app, get(&format!("/paste/public/{}", id))).await;
    assert_eq!(body["content"], "public body");
}

#[tokio::test]
async fn test_ip_and_health() {
    let app = app();

    let req = Request::builder()
        .uri("/ip/json")
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send_json(&app, req).await;
    assert_eq!(body["ip"], "203.0.113.9");

    let (_, _, body) = send(&app, get("/")).await;
    assert_eq!(body, b"Hello from silly-api");

    let (status, body) = send_json(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
