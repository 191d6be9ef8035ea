//! End-to-end tests for the chat API over an in-memory stack.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use futureme_agent::{AgentConfig, FutureAgent};
use futureme_index::{CommitIndex, Retriever, build_index};
use futureme_ingest::CommitRecord;
use futureme_llm::{CompletionResponse, MockBackend, MockEmbedder, Usage};
use futureme_server::{Server, ServerConfig};
use futureme_session::{SessionId, SessionStore};

fn record(sha: &str, text: &str) -> CommitRecord {
    CommitRecord {
        text: text.to_string(),
        repo: "me/project".to_string(),
        sha: sha.to_string(),
        author_name: "Me".to_string(),
        author_email: String::new(),
        date: None,
        url: None,
    }
}

async fn test_server(backend: MockBackend, index_name: &str) -> (Server, Arc<FutureAgent>) {
    let embedder = Arc::new(MockEmbedder::new(8));
    let index = Arc::new(CommitIndex::open(None, index_name, 8).unwrap());
    let records = vec![
        record("a1", "implement vector search"),
        record("a2", "wire up chat endpoint"),
    ];
    build_index(index.as_ref(), embedder.as_ref(), &records)
        .await
        .unwrap();

    let agent = Arc::new(FutureAgent::new(
        Arc::new(backend),
        Retriever::new(index, embedder),
        SessionStore::new(),
        AgentConfig::default(),
    ));
    (Server::new(agent.clone(), ServerConfig::default()), agent)
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_creates_session_when_none_given() {
    let (server, _) = test_server(
        MockBackend::with_text("Future-Aziz: shipping the index"),
        "itest_new_session",
    )
    .await;

    let response = server
        .router()
        .oneshot(chat_request(json!({ "message": "what am I building?" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["reply"], "Future-Aziz: shipping the index");
    assert!(!body["session_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_continues_existing_session() {
    let backend = MockBackend::new(vec![
        Ok(CompletionResponse::new("m1", "mock", "first reply", Usage::new(1, 1))),
        Ok(CompletionResponse::new("m2", "mock", "second reply", Usage::new(1, 1))),
    ]);
    let (server, agent) = test_server(backend, "itest_continuity").await;

    let first = server
        .router()
        .oneshot(chat_request(json!({ "message": "first question" })))
        .await
        .unwrap();
    let first_body = response_json(first).await;
    let session_id = first_body["session_id"].as_str().unwrap().to_string();

    let second = server
        .router()
        .oneshot(chat_request(json!({
            "message": "second question",
            "session_id": session_id,
        })))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    let second_body = response_json(second).await;
    assert_eq!(second_body["session_id"].as_str().unwrap(), session_id);
    assert_eq!(second_body["reply"], "second reply");

    let id = SessionId::from(session_id);
    assert_eq!(agent.sessions().len(&id).await, 4);
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let (server, agent) = test_server(MockBackend::with_text("unused"), "itest_empty").await;

    let response = server
        .router()
        .oneshot(chat_request(json!({ "message": "   " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["code"], "bad_request");
    assert_eq!(agent.sessions().session_count().await, 0);
}

#[tokio::test]
async fn test_model_failure_reports_error_and_keeps_history_clean() {
    let (server, agent) = test_server(MockBackend::failing("provider down"), "itest_fail").await;

    let session_id = "pinned-session";
    let response = server
        .router()
        .oneshot(chat_request(json!({
            "message": "doomed question",
            "session_id": session_id,
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response_json(response).await;
    assert_eq!(body["code"], "agent_error");

    // The failed turn must not be recorded.
    assert_eq!(agent.sessions().len(&SessionId::from(session_id)).await, 0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _) = test_server(MockBackend::with_text("unused"), "itest_health").await;

    let response = server
        .router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
}
