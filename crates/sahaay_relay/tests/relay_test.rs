use std::net::SocketAddr;

use httpmock::{Method::POST, MockServer};
use pretty_assertions::assert_eq;
use sahaay_relay::{AppState, Upstream, serve};
use sahaay_wire::{ErrorBody, Language, RelayRequest, Turn};
use tokio::net::TcpListener;

const UPSTREAM_PATH: &str = "/v1/chat/completions";

/// Start a relay in the background and return its address.
async fn start_relay(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, state, std::future::pending()));
    addr
}

fn state_for(upstream: &MockServer) -> AppState {
    AppState::new(Upstream::new(Some("upstream-key".to_owned())).with_url(upstream.url(UPSTREAM_PATH)))
}

async fn post_chat(addr: SocketAddr, body: &RelayRequest) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/chat"))
        .json(body)
        .send()
        .await
        .unwrap()
}

fn chest_pain_request() -> RelayRequest {
    RelayRequest::new(vec![Turn::user("I have chest pain")], Language::Hindi)
}

#[test_log::test(tokio::test)]
async fn passes_the_upstream_stream_through_unchanged() {
    let upstream_body = concat!(
        ": OPENROUTER PROCESSING\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"🚨 \"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"Seek help\"}}]}\n\n",
        "data: [DONE]\n\n",
    );

    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.method(POST)
                .path(UPSTREAM_PATH)
                .header("authorization", "Bearer upstream-key")
                .body_contains("\"stream\":true")
                .body_contains("\"role\":\"system\"")
                .body_contains("IMPORTANT: Respond fully in Hindi")
                .body_contains("{\"role\":\"user\",\"content\":\"I have chest pain\"}");
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(upstream_body);
        })
        .await;

    let addr = start_relay(state_for(&upstream)).await;
    let response = post_chat(addr, &chest_pain_request()).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/event-stream");
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(response.text().await.unwrap(), upstream_body);
    assert_eq!(mock.hits_async().await, 1);
}

#[test_log::test(tokio::test)]
async fn accepts_the_messages_field() {
    let upstream = MockServer::start_async().await;
    upstream
        .mock_async(|when, then| {
            when.method(POST)
                .path(UPSTREAM_PATH)
                .body_contains("{\"role\":\"assistant\",\"content\":\"Hello\"}");
            then.status(200).body("data: [DONE]\n\n");
        })
        .await;

    let addr = start_relay(state_for(&upstream)).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/chat"))
        .header("content-type", "application/json")
        .body(
            r#"{"messages":[{"role":"user","content":"hi"},{"role":"assistant","content":"Hello"},{"role":"user","content":"fever"}],"language":"xx"}"#,
        )
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "data: [DONE]\n\n");
}

#[test_log::test(tokio::test)]
async fn maps_upstream_failures() {
    let cases = [
        (429, 429, "Rate limit exceeded. Please try again shortly."),
        (402, 402, "AI usage limit reached."),
        (503, 500, "AI service temporarily unavailable"),
        (400, 500, "AI service temporarily unavailable"),
    ];

    for (upstream_status, relay_status, message) in cases {
        let upstream = MockServer::start_async().await;
        upstream
            .mock_async(|when, then| {
                when.method(POST).path(UPSTREAM_PATH);
                then.status(upstream_status)
                    .body("{\"error\":\"internal provider detail\"}");
            })
            .await;

        let addr = start_relay(state_for(&upstream)).await;
        let response = post_chat(addr, &chest_pain_request()).await;

        assert_eq!(response.status(), relay_status, "upstream {upstream_status}");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(
            response.json::<ErrorBody>().await.unwrap(),
            ErrorBody::new(message)
        );
    }
}

#[test_log::test(tokio::test)]
async fn missing_credential_never_reaches_upstream() {
    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.any_request();
            then.status(200);
        })
        .await;

    let state = AppState::new(Upstream::new(None).with_url(upstream.url(UPSTREAM_PATH)));
    let addr = start_relay(state).await;
    let response = post_chat(addr, &chest_pain_request()).await;

    assert_eq!(response.status(), 500);
    assert_eq!(
        response.json::<ErrorBody>().await.unwrap(),
        ErrorBody::new("upstream credential is not configured")
    );
    assert_eq!(mock.hits_async().await, 0);
}

#[test_log::test(tokio::test)]
async fn unreachable_upstream_is_unavailable() {
    // Bind and drop to get a port nothing listens on.
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}{UPSTREAM_PATH}", closed.local_addr().unwrap());
    drop(closed);

    let state = AppState::new(Upstream::new(Some("key".to_owned())).with_url(url));
    let addr = start_relay(state).await;
    let response = post_chat(addr, &chest_pain_request()).await;

    assert_eq!(response.status(), 500);
    assert_eq!(
        response.json::<ErrorBody>().await.unwrap(),
        ErrorBody::new("AI service temporarily unavailable")
    );
}

#[test_log::test(tokio::test)]
async fn client_key_is_enforced_when_configured() {
    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.method(POST).path(UPSTREAM_PATH);
            then.status(200).body("data: [DONE]\n\n");
        })
        .await;

    let state = state_for(&upstream).with_client_key(Some("client-secret".to_owned()));
    let addr = start_relay(state).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/chat");

    let response = client
        .post(&url)
        .json(&chest_pain_request())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    assert_eq!(
        response.json::<ErrorBody>().await.unwrap(),
        ErrorBody::new("unauthorized")
    );

    let response = client
        .post(&url)
        .bearer_auth("wrong")
        .json(&chest_pain_request())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    assert_eq!(mock.hits_async().await, 0);

    let response = client
        .post(&url)
        .bearer_auth("client-secret")
        .json(&chest_pain_request())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(mock.hits_async().await, 1);
}

#[test_log::test(tokio::test)]
async fn invalid_body_is_rejected_with_json_error() {
    let upstream = MockServer::start_async().await;
    let addr = start_relay(state_for(&upstream)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/chat"))
        .body("not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body = response.json::<ErrorBody>().await.unwrap();
    assert!(body.error.starts_with("invalid request body"), "{}", body.error);
}

#[test_log::test(tokio::test)]
async fn answers_preflight_with_cors_headers() {
    let upstream = MockServer::start_async().await;
    let addr = start_relay(state_for(&upstream)).await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/chat"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        response.headers()["access-control-allow-headers"],
        "authorization, x-client-info, apikey, content-type"
    );
}
