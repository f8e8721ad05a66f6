use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use fixtura_api::{
    ApiClient, ApiError, DeleteOutcome, ResourceKind, RetryPolicy, RetryStrategy, Session,
    MERCHANT_HEADER,
};

fn fast_retry(max_attempts: usize) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(10),
        max_jitter: Duration::from_millis(0),
        strategy: RetryStrategy::IdempotentOnly,
    }
}

fn session() -> Session {
    Session {
        token: "tok-123".to_string(),
        merchant_id: "merchant-9".to_string(),
    }
}

async fn authorized_client(server: &MockServer) -> ApiClient {
    ApiClient::builder(server.uri())
        .with_retry_policy(fast_retry(3))
        .build()
        .expect("client")
        .authorized(&session())
        .expect("authorized client")
}

/// Responds 500 to the first request and 200 to the rest.
struct FailOnceResponder {
    counter: Arc<AtomicUsize>,
    body: serde_json::Value,
}

impl Respond for FailOnceResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let attempt = self.counter.fetch_add(1, Ordering::SeqCst);
        if attempt == 0 {
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "boom"}))
        } else {
            ResponseTemplate::new(200).set_body_json(self.body.clone())
        }
    }
}

#[tokio::test]
async fn login_returns_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(serde_json::json!({
            "email": "qa@example.com",
            "password": "hunter2",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": {"token": "tok-123"}})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::builder(server.uri()).build().expect("client");
    let token = client
        .login("qa@example.com", "hunter2")
        .await
        .expect("login should succeed");

    assert_eq!(token, "tok-123");
}

#[tokio::test]
async fn login_rejects_bad_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"error": "invalid credentials"})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::builder(server.uri()).build().expect("client");
    let err = client
        .login("qa@example.com", "wrong")
        .await
        .expect_err("login should fail");

    assert!(matches!(err, ApiError::Status { status, .. } if status.as_u16() == 401));
}

#[tokio::test]
async fn login_rejects_body_without_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {}})))
        .mount(&server)
        .await;

    let client = ApiClient::builder(server.uri()).build().expect("client");
    let err = client
        .login("qa@example.com", "hunter2")
        .await
        .expect_err("login should fail");

    assert!(matches!(err, ApiError::MissingField { field: "data.token" }));
}

#[tokio::test]
async fn create_sends_auth_headers_and_returns_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/contacts"))
        .and(header("authorization", "Bearer tok-123"))
        .and(header(MERCHANT_HEADER, "merchant-9"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({"data": {"id": "c-77"}})),
        )
        .mount(&server)
        .await;

    let client = authorized_client(&server).await;
    let id = client
        .create(
            ResourceKind::Contacts,
            &serde_json::json!({"name": "Test Contact"}),
        )
        .await
        .expect("create should succeed");

    assert_eq!(id, "c-77");
}

#[tokio::test]
async fn create_failure_is_not_retried() {
    let server = MockServer::start().await;
    let counter = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/catalog"))
        .respond_with(FailOnceResponder {
            counter: counter.clone(),
            body: serde_json::json!({"data": {"id": "unused"}}),
        })
        .mount(&server)
        .await;

    let client = authorized_client(&server).await;
    let err = client
        .create(ResourceKind::Catalog, &serde_json::json!({"name": "P"}))
        .await
        .expect_err("create should fail");

    assert!(matches!(err, ApiError::Status { status, .. } if status.as_u16() == 500));
    assert_eq!(counter.load(Ordering::SeqCst), 1, "create must not retry");
}

#[tokio::test]
async fn get_found_and_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contacts/c-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": {"id": "c-1", "name": "Ana"}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contacts/c-2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = authorized_client(&server).await;

    let found = client
        .get(ResourceKind::Contacts, "c-1")
        .await
        .expect("get should succeed");
    assert_eq!(found.expect("record").id, "c-1");

    let missing = client
        .get(ResourceKind::Contacts, "c-2")
        .await
        .expect("get should succeed");
    assert!(missing.is_none());
}

#[tokio::test]
async fn get_retries_transient_server_error() {
    let server = MockServer::start().await;
    let counter = Arc::new(AtomicUsize::new(0));

    Mock::given(method("GET"))
        .and(path("/invoices/inv-5"))
        .respond_with(FailOnceResponder {
            counter: counter.clone(),
            body: serde_json::json!({"data": {"id": "inv-5"}}),
        })
        .mount(&server)
        .await;

    let client = authorized_client(&server).await;
    let record = client
        .get(ResourceKind::Invoices, "inv-5")
        .await
        .expect("get should succeed after retry")
        .expect("record");

    assert_eq!(record.id, "inv-5");
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn delete_distinguishes_deleted_and_already_gone() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/catalog/p-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/catalog/p-2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/catalog/p-3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = authorized_client(&server).await;

    assert_eq!(
        client
            .delete(ResourceKind::Catalog, "p-1")
            .await
            .expect("delete"),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        client
            .delete(ResourceKind::Catalog, "p-2")
            .await
            .expect("delete"),
        DeleteOutcome::AlreadyGone
    );
    let err = client
        .delete(ResourceKind::Catalog, "p-3")
        .await
        .expect_err("delete should fail");
    assert!(matches!(err, ApiError::Status { status, .. } if status.as_u16() == 500));
}

#[tokio::test]
async fn list_parses_pagination_meta() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contacts"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": "c-1"}, {"id": "c-2"}],
            "meta": {"pagination": {"hasNextPage": true, "total": 5}}
        })))
        .mount(&server)
        .await;

    let client = authorized_client(&server).await;
    let page = client
        .list(ResourceKind::Contacts, 0, 2)
        .await
        .expect("list should succeed");

    assert_eq!(page.items.len(), 2);
    assert!(page.has_next_page);
    assert_eq!(page.total, Some(5));
}

#[tokio::test]
async fn metrics_count_requests_and_retries() {
    let server = MockServer::start().await;
    let counter = Arc::new(AtomicUsize::new(0));

    Mock::given(method("GET"))
        .and(path("/contacts/c-1"))
        .respond_with(FailOnceResponder {
            counter,
            body: serde_json::json!({"data": {"id": "c-1"}}),
        })
        .mount(&server)
        .await;

    let client = authorized_client(&server).await;
    client
        .get(ResourceKind::Contacts, "c-1")
        .await
        .expect("get should succeed after retry");

    let metrics = client.metrics();
    assert_eq!(metrics.requests_total, 2);
    assert_eq!(metrics.requests_retried, 1);
    assert_eq!(metrics.requests_failed, 1);
}
