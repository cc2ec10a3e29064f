use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;
use vitrin::api::AppState;
use vitrin::config::Config;

/// Admin seeded by the initial migration
const ADMIN_EMAIL: &str = "admin@vitrin.local";
const ADMIN_PASSWORD: &str = "password";

const BOUNDARY: &str = "vitrin-test-boundary";

/// Minimal payload with a valid PNG signature
const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-pixels";

async fn spawn_app() -> (Router, Arc<AppState>, tempfile::TempDir) {
    let uploads = tempfile::tempdir().expect("Failed to create temp uploads dir");

    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.uploads_path = uploads.path().to_string_lossy().into_owned();
    // A pooled in-memory sqlite gives every connection its own database;
    // pin the pool to a single connection so migrations are visible.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = vitrin::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    let app = vitrin::api::router(state.clone()).await;

    (app, state, uploads)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let payload = serde_json::json!({ "email": email, "password": password });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    json["token"].as_str().unwrap().to_string()
}

/// Build a multipart body; `filename: None` sends a plain text field.
fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(method: &str, uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn create_test_item(app: &Router, token: &str, title: &str, is_slider: bool) -> i64 {
    let body = multipart_body(&[
        ("image", Some("logo.png"), PNG),
        ("title", None, title.as_bytes()),
        (
            "is_slider_item",
            None,
            if is_slider { b"1" } else { b"0" },
        ),
    ]);

    let response = app
        .clone()
        .oneshot(multipart_request("POST", "/api/items", token, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_login_success_and_token_resolution() {
    let (app, _state, _uploads) = spawn_app().await;

    let payload = serde_json::json!({
        "email": ADMIN_EMAIL,
        "password": ADMIN_PASSWORD,
        "remember": true
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["user"]["email"], ADMIN_EMAIL);
    assert_eq!(json["user"]["role"], "admin");
    assert!(json["user"]["id"].is_i64());
    assert!(json["user"].get("password_hash").is_none());

    let token = json["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);

    // The token resolves back through the role gate on a protected route
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/logout")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_credentials_are_indistinguishable() {
    let (app, _state, _uploads) = spawn_app().await;

    let mut bodies = Vec::new();
    for (email, password) in [
        (ADMIN_EMAIL, "wrong-password"),
        ("nobody@vitrin.local", ADMIN_PASSWORD),
    ] {
        let payload = serde_json::json!({ "email": email, "password": password });
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        bodies.push(response.into_body().collect().await.unwrap().to_bytes());
    }

    // Wrong password and unknown email must produce identical responses
    assert_eq!(bodies[0], bodies[1]);

    let json: serde_json::Value = serde_json::from_slice(&bodies[0]).unwrap();
    assert!(json["errors"]["email"].is_array());
}

#[tokio::test]
async fn test_login_validation() {
    let (app, _state, _uploads) = spawn_app().await;

    for payload in [
        serde_json::json!({ "password": ADMIN_PASSWORD }),
        serde_json::json!({ "email": ADMIN_EMAIL, "password": "short" }),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let (app, _state, _uploads) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/logout")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The revoked token no longer authenticates
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/logout")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_gate() {
    let (app, state, _uploads) = spawn_app().await;

    // No token at all
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/items/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Authenticated but not admin
    let security = state.config.read().await.security.clone();
    state
        .store
        .create_user("viewer@vitrin.local", "secret1", "viewer", &security)
        .await
        .unwrap();

    let token = login(&app, "viewer@vitrin.local", "secret1").await;
    let body = multipart_body(&[
        ("image", Some("logo.png"), PNG),
        ("is_slider_item", None, b"1"),
    ]);
    let response = app
        .clone()
        .oneshot(multipart_request("POST", "/api/items", &token, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Public routes need no token
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/items")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_item_create_get_round_trip() {
    let (app, state, _uploads) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let body = multipart_body(&[
        ("image", Some("logo.png"), PNG),
        ("title", None, b"Welcome banner"),
        ("is_slider_item", None, b"1"),
    ]);

    let response = app
        .clone()
        .oneshot(multipart_request("POST", "/api/items", &token, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;

    let image = created["image"].as_str().unwrap();
    assert!(image.starts_with("items/"));
    assert!(image.ends_with(".png"));
    assert_eq!(created["title"], "Welcome banner");
    assert_eq!(created["is_slider_item"], true);
    assert!(state.files().contains(image));

    let id = created["id"].as_i64().unwrap();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/items/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched, created);

    // The stored reference resolves to the uploaded bytes
    let stored = tokio::fs::read(state.files().root().join(image)).await.unwrap();
    assert_eq!(stored, PNG);
}

#[tokio::test]
async fn test_item_create_rejects_bad_payloads() {
    let (app, _state, _uploads) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Not an image
    let body = multipart_body(&[
        ("image", Some("notes.txt"), b"plain text"),
        ("is_slider_item", None, b"1"),
    ]);
    let response = app
        .clone()
        .oneshot(multipart_request("POST", "/api/items", &token, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing image field
    let body = multipart_body(&[("is_slider_item", None, b"1")]);
    let response = app
        .clone()
        .oneshot(multipart_request("POST", "/api/items", &token, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Missing is_slider_item
    let body = multipart_body(&[("image", Some("logo.png"), PNG)]);
    let response = app
        .clone()
        .oneshot(multipart_request("POST", "/api/items", &token, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_item_list_filters() {
    let (app, _state, _uploads) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    create_test_item(&app, &token, "slider one", true).await;
    create_test_item(&app, &token, "slider two", true).await;
    create_test_item(&app, &token, "plain", false).await;

    for (uri, expected) in [
        ("/api/items", 3),
        ("/api/items?type=all", 3),
        ("/api/items?type=slider", 2),
        ("/api/items?type=not_slider", 1),
    ] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), expected, "uri: {uri}");
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/items?type=banner")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_item_update_noop_keeps_file() {
    let (app, state, _uploads) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let id = create_test_item(&app, &token, "banner", true).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/items/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let image = body_json(response).await["image"].as_str().unwrap().to_string();

    // Send the current reference back as a text field: no-op replace
    let body = multipart_body(&[
        ("image", None, image.as_bytes()),
        ("title", None, b"renamed"),
        ("is_slider_item", None, b"0"),
    ]);
    let response = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &format!("/api/items/{id}"),
            &token,
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["image"], image.as_str());
    assert_eq!(updated["title"], "renamed");
    assert_eq!(updated["is_slider_item"], false);
    assert!(state.files().contains(&image));
}

#[tokio::test]
async fn test_item_update_replaces_file() {
    let (app, state, _uploads) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let id = create_test_item(&app, &token, "banner", true).await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/items/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let old_image = body_json(response).await["image"].as_str().unwrap().to_string();

    let new_png = b"\x89PNG\r\n\x1a\nreplacement-pixels";
    let body = multipart_body(&[
        ("image", Some("new.png"), new_png),
        ("_method", None, b"PUT"),
        ("is_slider_item", None, b"1"),
    ]);
    // Laravel-style POST with _method override also reaches the update
    let response = app
        .clone()
        .oneshot(multipart_request(
            "POST",
            &format!("/api/items/{id}"),
            &token,
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    let new_image = updated["image"].as_str().unwrap();

    assert_ne!(new_image, old_image);
    assert!(!state.files().contains(&old_image));
    assert!(state.files().contains(new_image));
}

#[tokio::test]
async fn test_item_update_rejects_stale_reference() {
    let (app, state, _uploads) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let id = create_test_item(&app, &token, "banner", true).await;

    // A reference that is not the item's current one
    let body = multipart_body(&[
        ("image", None, b"items/someone-elses-file.png"),
        ("is_slider_item", None, b"1"),
    ]);
    let response = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &format!("/api/items/{id}"),
            &token,
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Item and its file untouched
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/items/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(state.files().contains(json["image"].as_str().unwrap()));
}

#[tokio::test]
async fn test_item_delete_removes_row_and_file() {
    let (app, state, _uploads) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let id = create_test_item(&app, &token, "banner", true).await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/items/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let image = body_json(response).await["image"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/items/{id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert!(!state.files().contains(&image));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/items/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting again: 404
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/items/{id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_unknown_item_is_404() {
    let (app, _state, _uploads) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/items/999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
