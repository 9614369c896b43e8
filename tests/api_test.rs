use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bibliolend::api;
use bibliolend::{db, server};
use bibliolend::infrastructure::AppState;
use bibliolend::models::{reservation, user};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test app state and its router
async fn setup_test_app() -> (AppState, Router) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let state = AppState::new(db);
    let app = api::api_router_with_state(state.clone());
    (state, app)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post_raw(app: &Router, uri: &str, body: &'static str) -> StatusCode {
    let req = Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(req).await.unwrap().status()
}

async fn add_book(app: &Router, copies: i32) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/books",
        Some(json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "isbn": "9780441013593",
            "num_of_copies": copies
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["book_id"].as_i64().unwrap()
}

async fn add_user(app: &Router, name: &str, role: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/users",
        Some(json!({ "name": name, "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["user_id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_root_and_ping() {
    let db = db::init_db("sqlite::memory:").await.unwrap();
    let app = api::api_router(db);

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Library Management API");

    let (status, body) = send(&app, "GET", "/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Library API running");

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_books_are_listed_with_copies() {
    let (_state, app) = setup_test_app().await;
    let book_id = add_book(&app, 2).await;

    let (status, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::OK);

    let books = body.as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["id"].as_i64().unwrap(), book_id);
    assert_eq!(books[0]["title"], "Dune");
    let copies = books[0]["copies"].as_array().unwrap();
    assert_eq!(copies.len(), 2);
    for copy in copies {
        assert_eq!(copy["status"], "available");
        assert_eq!(copy["book_id"].as_i64().unwrap(), book_id);
    }

    let (status, body) = send(&app, "GET", &format!("/books/{}", book_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["copies"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, "GET", "/books/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_requests() {
    let (_state, app) = setup_test_app().await;

    // Syntax error
    assert_eq!(post_raw(&app, "/books", "invalid json").await, StatusCode::BAD_REQUEST);
    // Missing fields
    assert_eq!(post_raw(&app, "/users", r#"{"name": "x"}"#).await, StatusCode::BAD_REQUEST);
    // Wrong types
    assert_eq!(
        post_raw(&app, "/checkout", r#"{"user_id": "one", "book_id": 1}"#).await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(post_raw(&app, "/reserve", "{}").await, StatusCode::BAD_REQUEST);
    assert_eq!(post_raw(&app, "/return", "[]").await, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/books", Some(json!({ "title": "t" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_invalid_role_creates_no_user() {
    let (state, app) = setup_test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(json!({ "name": "Eve", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Role must be student or librarian");

    let count = user::Entity::find().count(state.db()).await.unwrap();
    assert_eq!(count, 0);

    add_user(&app, "Alice", "student").await;
    let (status, body) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["role"], "student");
}

#[tokio::test]
async fn test_checkout_status_codes() {
    let (_state, app) = setup_test_app().await;
    let book_id = add_book(&app, 1).await;
    let student = add_user(&app, "Alice", "student").await;
    let librarian = add_user(&app, "Margaret", "librarian").await;

    let (status, body) = send(
        &app,
        "POST",
        "/checkout",
        Some(json!({ "user_id": 999, "book_id": book_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = send(
        &app,
        "POST",
        "/checkout",
        Some(json!({ "user_id": librarian, "book_id": book_id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Only students can checkout");

    let (status, body) = send(
        &app,
        "POST",
        "/checkout",
        Some(json!({ "user_id": student, "book_id": book_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["checkout_id"].is_i64());
    assert!(body["due_date"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/checkout",
        Some(json!({ "user_id": student, "book_id": book_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No copies available. You may reserve.");

    let (status, body) = send(&app, "GET", "/checkouts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_return_flow_over_http() {
    let (_state, app) = setup_test_app().await;
    let book_id = add_book(&app, 1).await;
    let holder = add_user(&app, "Alice", "student").await;
    let waiting = add_user(&app, "Bob", "student").await;

    let (_, body) = send(
        &app,
        "POST",
        "/checkout",
        Some(json!({ "user_id": holder, "book_id": book_id })),
    )
    .await;
    let checkout_id = body["checkout_id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/reserve",
        Some(json!({ "user_id": waiting, "book_id": book_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reservation_id = body["reservation_id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/return",
        Some(json!({ "checkout_id": checkout_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fine"], 0);
    assert_eq!(
        body["fulfilled_reservation"]["reservation_id"].as_i64().unwrap(),
        reservation_id
    );
    assert_eq!(body["fulfilled_reservation"]["user_id"].as_i64().unwrap(), waiting);

    // Copy never shows as available in between
    let (_, books) = send(&app, "GET", "/books", None).await;
    assert_eq!(books[0]["copies"][0]["status"], "checked_out");

    let (_, reservations) = send(&app, "GET", "/reservations", None).await;
    assert_eq!(reservations[0]["active"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/return",
        Some(json!({ "checkout_id": checkout_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Already returned");

    let (status, body) = send(&app, "POST", "/return", Some(json!({ "checkout_id": 4242 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Checkout not found");
}

#[tokio::test]
async fn test_full_router_serves_openapi_document() {
    let db = db::init_db("sqlite::memory:").await.unwrap();
    let app = server::build_router(AppState::new(db), &[]);

    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/checkout"].is_object());

    let (status, body) = send(&app, "GET", "/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Library API running");
}

#[tokio::test]
async fn test_blank_name_and_title_are_accepted() {
    let (_state, app) = setup_test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(json!({ "name": "", "role": "student" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user_id"].is_i64());

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({ "title": "", "author": "", "isbn": "", "num_of_copies": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let book_id = body["book_id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/books/{}", book_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "");
    assert_eq!(body["copies"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_negative_ids_are_bad_requests() {
    let (state, app) = setup_test_app().await;
    let book_id = add_book(&app, 1).await;
    let student = add_user(&app, "Alice", "student").await;

    let (status, body) = send(
        &app,
        "POST",
        "/reserve",
        Some(json!({ "user_id": -5, "book_id": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    let count = reservation::Entity::find().count(state.db()).await.unwrap();
    assert_eq!(count, 0);

    let (status, _) = send(
        &app,
        "POST",
        "/checkout",
        Some(json!({ "user_id": student, "book_id": -book_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/return", Some(json!({ "checkout_id": -1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Ids past the row id range never reach the store
    let (status, _) = send(
        &app,
        "POST",
        "/reserve",
        Some(json!({ "user_id": 4_000_000_000u32, "book_id": book_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
