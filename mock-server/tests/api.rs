use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, FunctionResponse};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- function ---

#[tokio::test]
async fn function_echoes_call_and_url() {
    let resp = app()
        .oneshot(json_request(
            "/api/v1/function",
            r#"{"url":"github.com/acme/math","call":"Add(1, 2)"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: FunctionResponse = body_json(resp).await;
    assert_eq!(body.data, "Add(1, 2) <- github.com/acme/math");
    assert!(body.timestamp > 0);
}

#[tokio::test]
async fn function_malformed_json_returns_400() {
    let resp = app()
        .oneshot(json_request("/api/v1/function", r#"{"url":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn function_empty_call_returns_400() {
    let resp = app()
        .oneshot(json_request("/api/v1/function", r#"{"url":"x","call":""}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn function_without_json_content_type_returns_415() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/function")
                .body(r#"{"url":"x","call":"y"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn function_rejects_get() {
    let resp = app()
        .oneshot(Request::builder().uri("/api/v1/function").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn stats_count_successful_calls() {
    use tower::Service;

    let mut app = app().into_service();

    for call in ["A()", "B()"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request(
                "/api/v1/function",
                &format!(r#"{{"url":"github.com/acme/pkg","call":"{call}"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // rejected calls are not counted
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("/api/v1/function", "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri("/api/v1/admin/api-stats")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let stats: serde_json::Value = body_json(resp).await;
    assert_eq!(stats["function_calls"], 2);
}

// --- fixtures ---

#[tokio::test]
async fn fixture_empty_has_no_body() {
    let resp = app().oneshot(json_request("/fixtures/empty", "{}")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn fixture_not_json() {
    let resp = app().oneshot(json_request("/fixtures/not-json", "{}")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"not-json");
}

#[tokio::test]
async fn fixture_redirect_carries_location_and_json() {
    let resp = app().oneshot(json_request("/fixtures/redirect", "{}")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[http::header::LOCATION], "/fixtures/ok");
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["redirected"], false);
}

#[tokio::test]
async fn fixture_large_exceeds_ten_mebibytes() {
    let resp = app().oneshot(json_request("/fixtures/large", "{}")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert!(body.len() > 10 * 1024 * 1024);
}

#[tokio::test]
async fn fixture_status_uses_requested_code() {
    let resp = app().oneshot(json_request("/fixtures/status/503", "{}")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "Service Unavailable");
}

#[tokio::test]
async fn fixture_headers_echoes_request_headers() {
    let req = Request::builder()
        .method("POST")
        .uri("/fixtures/headers")
        .header("x-api-key", "secret")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["x-api-key"], "secret");
}
