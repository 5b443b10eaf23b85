use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use devnet_messenger::{
    app, conversation,
    event::service::LogNotifier,
    integration::{
        cache::Key,
        store::{MemoryStore, Store},
    },
    state::AppState,
    user,
};

fn router() -> Router {
    router_over(MemoryStore::default())
}

fn router_over(store: MemoryStore) -> Router {
    let state = AppState::new(
        Arc::new(store),
        Arc::new(LogNotifier),
        &conversation::Config::default(),
    );
    app(state)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn sign_in(app: &Router, user_id: &str) {
    let (status, _) = call(
        app,
        Method::POST,
        "/api/session",
        Some(json!({ "user_id": user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn should_report_health() {
    let app = router();

    let (status, _) = call(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn should_require_session_for_chats() {
    let app = router();

    let (status, body) = call(&app, Method::GET, "/api/chats", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "not logged in");
}

#[tokio::test]
async fn should_exchange_messages_between_two_users() {
    let app = router();

    sign_in(&app, "1").await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/chats/2/messages",
        Some(json!({ "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["persisted"], true);

    sign_in(&app, "2").await;
    call(
        &app,
        Method::POST,
        "/api/chats/1/messages",
        Some(json!({ "content": "hello" })),
    )
    .await;

    let (status, messages) = call(&app, Method::GET, "/api/chats/1/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    let contents = messages
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(contents, vec!["hi", "hello"]);
    assert_eq!(messages[0]["sender"], "1");
    assert_eq!(messages[1]["receiver"], "1");

    let (_, preview) = call(&app, Method::GET, "/api/chats/1/preview", None).await;
    assert_eq!(preview["summary"], "hello");
    assert_eq!(preview["last_timestamp"], messages[1]["timestamp"]);
}

#[tokio::test]
async fn should_send_attachment_only_message() {
    let app = router();
    sign_in(&app, "1").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/chats/2/messages",
        Some(json!({
            "file": { "name": "1.py", "type": "text/x-python", "data": "cHJpbnQoMSk=" }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let file = &body["messages"][0]["file"];
    assert_eq!(file["url"], "data:text/x-python;base64,cHJpbnQoMSk=");
    assert_eq!(file["type"], "text/x-python");

    let (_, preview) = call(&app, Method::GET, "/api/chats/2/preview", None).await;
    assert_eq!(preview["summary"], "[file]");
}

#[tokio::test]
async fn should_reject_empty_message() {
    let app = router();
    sign_in(&app, "1").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/chats/2/messages",
        Some(json!({ "content": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_reject_chat_with_oneself() {
    let app = router();
    sign_in(&app, "1").await;

    let (status, _) = call(&app, Method::GET, "/api/chats/1/messages", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_not_find_unknown_counterpart() {
    let app = router();
    sign_in(&app, "1").await;

    let (status, _) = call(&app, Method::GET, "/api/chats/77/messages", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_list_inbox() {
    let app = router();
    sign_in(&app, "2").await;
    call(
        &app,
        Method::POST,
        "/api/chats/1/messages",
        Some(json!({ "content": "Hey there!" })),
    )
    .await;

    let (status, inbox) = call(&app, Method::GET, "/api/chats", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["user"]["username"], "john_dev");
    assert_eq!(inbox[0]["preview"]["summary"], "Hey there!");
}

#[tokio::test]
async fn should_register_and_sign_out() {
    let app = router();

    let (status, user) = call(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({ "username": "radu", "email": "radu@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["id"], "3");

    let (status, current) = call(&app, Method::GET, "/api/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["username"], "radu");

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({ "username": "radu2", "email": "radu@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(&app, Method::DELETE, "/api/session", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&app, Method::GET, "/api/session", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_update_profile_everywhere() {
    let app = router();
    sign_in(&app, "1").await;

    let (status, user) = call(
        &app,
        Method::PATCH,
        "/api/session/profile",
        Some(json!({ "aboutMe": "Now writing Rust", "skills": ["Rust", "Tokio"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["aboutMe"], "Now writing Rust");
    assert_eq!(user["experience"], "3-5");

    let (_, current) = call(&app, Method::GET, "/api/session", None).await;
    assert_eq!(current["skills"], json!(["Rust", "Tokio"]));

    let (_, users) = call(&app, Method::GET, "/api/users", None).await;
    assert_eq!(users[0]["aboutMe"], "Now writing Rust");
    assert_eq!(users[1]["aboutMe"], "Backend Developer specializing in Python");
}

#[tokio::test]
async fn should_require_session_for_profile_edit() {
    let app = router();

    let (status, _) = call(
        &app,
        Method::PATCH,
        "/api/session/profile",
        Some(json!({ "aboutMe": "anyone?" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_delete_account_and_keep_conversations() {
    let store = MemoryStore::default();
    let app = router_over(store.clone());
    sign_in(&app, "1").await;
    call(
        &app,
        Method::POST,
        "/api/chats/2/messages",
        Some(json!({ "content": "bye" })),
    )
    .await;

    let (status, _) = call(&app, Method::DELETE, "/api/users/me", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&app, Method::GET, "/api/session", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, users) = call(&app, Method::GET, "/api/users", None).await;
    assert_eq!(users.as_array().unwrap().len(), 1);

    let key = conversation::Key::for_pair(&user::Id::from("1"), &user::Id::from("2")).unwrap();
    let raw = store.get(&Key::Chat(key)).await.unwrap().unwrap();
    assert!(raw.contains("bye"));

    sign_in(&app, "2").await;
    let (status, _) = call(&app, Method::GET, "/api/chats/1/messages", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
