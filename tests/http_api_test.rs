// tests/http_api_test.rs
// Router-level tests against an in-memory database and a scripted provider.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::MockProvider;
use prism::api;
use prism::state::AppState;
use prism::store::db::memory_pool;

async fn test_app() -> (Router, Arc<MockProvider>, Arc<AppState>) {
    let pool = memory_pool().await.unwrap();
    let provider = Arc::new(MockProvider::new());
    let state = Arc::new(AppState::new(pool, provider.clone()));
    (api::router(state.clone()), provider, state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _, _) = test_app().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["db"], "ok");
}

#[tokio::test]
async fn generate_personas_requires_input() {
    let (app, _, _) = test_app().await;
    let response = app
        .oneshot(post_json("/personas/generate", json!({ "input": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Input is required");
}

#[tokio::test]
async fn generate_personas_parses_persists_and_returns() {
    let (app, provider, state) = test_app().await;
    provider.push_completion(
        r#"[
            {"name": "The Realist", "style": "Practical", "prompt": "Tough love."},
            {"name": "The Dreamer", "style": "Hopeful", "prompt": "Imagine more."},
            {"name": "The Cynic", "style": "Sharp", "prompt": "Doubt everything."}
        ]"#,
    );

    let response = app
        .oneshot(post_json(
            "/personas/generate",
            json!({ "input": "Should I quit my job?", "user_id": "user-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let personas = body["personas"].as_array().unwrap();
    assert_eq!(personas.len(), 3);
    assert_eq!(personas[0]["name"], "The Realist");
    // every persona got a minted id
    assert!(personas.iter().all(|p| !p["id"].as_str().unwrap().is_empty()));

    let stored = state.personas.list(Some("user-1")).await.unwrap();
    assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn generate_personas_rejects_non_json_reply() {
    let (app, provider, _) = test_app().await;
    provider.push_completion("Sure! Here are some personas for you:");

    let response = app
        .oneshot(post_json("/personas/generate", json!({ "input": "topic" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn perspectives_requires_input_and_personas() {
    let (app, _, _) = test_app().await;
    let response = app
        .clone()
        .oneshot(post_json("/perspectives", json!({ "input": "topic" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/perspectives",
            json!({ "personas": [{ "name": "A", "prompt": "p" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn perspectives_answers_in_roster_order() {
    let (app, provider, _) = test_app().await;
    provider.push_completion("Realist take.");
    provider.push_completion("Dreamer take.");

    let response = app
        .oneshot(post_json(
            "/perspectives",
            json!({
                "input": "Should cities ban cars?",
                "personas": [
                    { "id": "p1", "name": "The Realist", "style": "Practical", "prompt": "Be blunt" },
                    { "id": "p2", "name": "The Dreamer", "style": "Hopeful", "prompt": "Dream big" },
                ],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let responses = body["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["name"], "The Realist");
    assert_eq!(responses[0]["response"], "Realist take.");
    assert_eq!(responses[1]["name"], "The Dreamer");
    assert_eq!(responses[1]["response"], "Dreamer take.");
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn debate_mode_perspectives_contrast_with_the_previous_reply() {
    let (app, provider, _) = test_app().await;
    provider.push_completion("First take.");
    provider.push_completion("Contrasting take.");

    let response = app
        .oneshot(post_json(
            "/perspectives",
            json!({
                "input": "topic",
                "mode": "debate",
                "personas": [
                    { "name": "A", "prompt": "p1" },
                    { "name": "B", "prompt": "p2" },
                ],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // second request carries the first persona's reply, not the topic
    let requests = provider.requests.lock().unwrap();
    let second_user_msg = requests[1]["messages"][1]["content"].as_str().unwrap();
    assert!(second_user_msg.contains("**A** said"));
    assert!(second_user_msg.contains("First take."));
    assert!(second_user_msg.contains("contrasting perspective"));
}

#[tokio::test]
async fn create_debate_and_read_empty_transcript() {
    let (app, _, _) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/debates", json!({ "topic": "X" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let debate = body_json(response).await;
    let id = debate["id"].as_str().unwrap().to_string();
    assert_eq!(debate["status"], "active");

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/debates/{id}/messages"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 0);

    let response = app
        .oneshot(
            Request::get("/debates/nope/messages")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_debate_requires_topic() {
    let (app, _, _) = test_app().await;
    let response = app
        .oneshot(post_json("/debates", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn debate_turn_requires_debate_id_and_roster() {
    let (app, _, _) = test_app().await;
    let response = app
        .clone()
        .oneshot(post_json(
            "/debates/turn",
            json!({ "debate_id": "", "personas": [{ "name": "A", "prompt": "p" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/debates/turn",
            json!({ "debate_id": "d1", "personas": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing or invalid debateId or personas.");
}

#[tokio::test]
async fn debate_turn_streams_text_and_persists_the_reply() {
    let (app, provider, state) = test_app().await;
    provider.push_streamed_text("Cars should go.");

    let debate = state.debates.create("d1", "X", None).await.unwrap();

    let response = app
        .oneshot(post_json(
            "/debates/turn",
            json!({
                "debate_id": debate.id,
                "user_input": "X",
                "personas": [{ "id": "a-id", "name": "A", "prompt": "Argue hard." }],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );

    let streamed = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(std::str::from_utf8(&streamed).unwrap(), "Cars should go.");

    // transcript now holds the seeded user opener plus the persona reply
    let transcript = state.messages.transcript("d1").await.unwrap();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].name, "You");
    assert_eq!(transcript[0].content, "X");
    assert_eq!(transcript[1].name, "A");
    assert_eq!(transcript[1].content, "Cars should go.");
    assert_eq!(transcript[1].persona_id.as_deref(), Some("a-id"));

    // the system prompt named the speaker and quoted the topic
    let requests = provider.requests.lock().unwrap();
    let system = requests[0]["messages"][0]["content"].as_str().unwrap();
    assert!(system.contains("You are A"));
    assert!(system.contains("\"X\""));
    assert_eq!(requests[0]["stream"], true);
}

#[tokio::test]
async fn models_endpoint_filters_to_configured_families() {
    let (app, provider, _) = test_app().await;
    provider.set_models(&[
        "llama-3.3-70b-versatile",
        "whisper-large-v3",
        "gemma2-9b-it",
    ]);

    let response = app
        .oneshot(Request::get("/models").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let models: Vec<&str> = body["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_str().unwrap())
        .collect();
    assert_eq!(models, vec!["llama-3.3-70b-versatile", "gemma2-9b-it"]);
}
