use super::*;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde_json::{Value, json};
use wire::SortBy;

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn backend() -> Router {
    Router::new()
        .route(
            "/chatbot/query",
            post(|axum::Json(body): axum::Json<Value>| async move {
                axum::Json(json!({
                    "response": format!("echo: {}", body["question"].as_str().unwrap_or_default()),
                    "conversation_id": body["conversation_id"],
                }))
            }),
        )
        .route("/chatbot/health", get(|| async { axum::Json(json!({ "status": "ok", "service": "meribot-api" })) }))
        .route("/broken/query", post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
        .route("/garbage/query", post(|| async { "<html>not json</html>" }))
        .route(
            "/api/search",
            post(|axum::Json(body): axum::Json<Value>| async move {
                axum::Json(json!({
                    "results": [{ "title": body["query"], "content": "c", "score": 0.5, "docType": body["docType"] }]
                }))
            }),
        )
}

fn transport(url: String) -> HttpTransport {
    HttpTransport::new(url, Duration::from_secs(5)).expect("client")
}

fn chat_request(question: &str) -> ChatRequest {
    ChatRequest { question: question.to_owned(), conversation_id: "conv-http".to_owned(), history: None }
}

#[test]
fn health_url_replaces_query_segment() {
    assert_eq!(health_url("http://h/chatbot/query"), "http://h/chatbot/health");
    assert_eq!(health_url("http://h/chatbot/query/"), "http://h/chatbot/health");
    assert_eq!(health_url("http://h/api"), "http://h/api/health");
}

#[tokio::test]
async fn send_chat_posts_question_and_token() {
    let base = spawn(backend()).await;
    let reply = transport(format!("{base}/chatbot/query"))
        .send_chat(&chat_request("hola"))
        .await
        .expect("reply");
    assert_eq!(reply.response, "echo: hola");
    assert_eq!(reply.conversation_id.as_deref(), Some("conv-http"));
}

#[tokio::test]
async fn send_chat_maps_non_2xx_to_status_error() {
    let base = spawn(backend()).await;
    let err = transport(format!("{base}/broken/query"))
        .send_chat(&chat_request("hola"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, TransportError::Status { status: 500, ref body } if body == "boom"));
}

#[tokio::test]
async fn send_chat_maps_bad_body_to_parse_error() {
    let base = spawn(backend()).await;
    let err = transport(format!("{base}/garbage/query"))
        .send_chat(&chat_request("hola"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, TransportError::Parse(_)));
}

#[tokio::test]
async fn send_chat_maps_connection_refused_to_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let err = transport(format!("http://{addr}/chatbot/query"))
        .send_chat(&chat_request("hola"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, TransportError::Request(_)));
}

#[tokio::test]
async fn search_posts_filters() {
    let base = spawn(backend()).await;
    let request = SearchRequest { query: "invoice".to_owned(), doc_type: Some("pdf".to_owned()), sort_by: SortBy::Date };
    let resp = transport(format!("{base}/api/search")).search(&request).await.expect("results");
    assert_eq!(resp.results.len(), 1);
    assert_eq!(resp.results[0].title.as_deref(), Some("invoice"));
}

#[tokio::test]
async fn health_reads_status() {
    let base = spawn(backend()).await;
    let health = transport(format!("{base}/chatbot/query")).health().await.expect("health");
    assert_eq!(health.status, "ok");
}
