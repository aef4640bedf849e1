//! Integration tests for the refresh relay.
//!
//! Both upstreams (the Supabase table and the WHOOP token endpoint) are
//! simulated with `wiremock`, so these run without network access or secrets.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use time::macros::datetime;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use whoop_refresh::api::{create_router, AppState};
use whoop_refresh::config::Config;
use whoop_refresh::error::RefreshError;
use whoop_refresh::refresh::RefreshWorkflow;

const TABLE_PATH: &str = "/rest/v1/whoop_tokens";
const TOKEN_PATH: &str = "/oauth/oauth2/token";

/// Both simulated upstreams.
struct Upstreams {
    store: MockServer,
    auth: MockServer,
}

impl Upstreams {
    async fn start() -> Self {
        Self {
            store: MockServer::start().await,
            auth: MockServer::start().await,
        }
    }

    fn config(&self) -> Config {
        Config {
            supabase_url: self.store.uri(),
            supabase_key: "service-key".to_string(),
            whoop_client_id: "client-id".to_string(),
            whoop_client_secret: "client-secret".to_string(),
            whoop_token_url: format!("{}{}", self.auth.uri(), TOKEN_PATH),
            http_timeout_ms: 5_000,
            port: 0,
        }
    }

    fn workflow(&self) -> RefreshWorkflow {
        RefreshWorkflow::from_config(&self.config()).unwrap()
    }

    async fn get_refresh(&self) -> (StatusCode, Value) {
        let app = create_router(AppState::new(self.workflow()));
        let response = app
            .oneshot(Request::builder().uri("/auto-refresh").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn mount_record(&self) {
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("user_id", "eq.20260404"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "user_id": "20260404",
                "access_token": "old-access",
                "refresh_token": "old-refresh",
                "expires_at": "2026-10-19T11:00:00.000Z"
            }])))
            .expect(1)
            .mount(&self.store)
            .await;
    }

    async fn mount_exchange(&self, expires_in: Value) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "new-access",
                "refresh_token": "new-refresh",
                "expires_in": expires_in,
                "scope": "offline",
                "token_type": "bearer"
            })))
            .expect(1)
            .mount(&self.auth)
            .await;
    }

    async fn mount_update(&self, status: u16, calls: u64) {
        Mock::given(method("PATCH"))
            .and(path(TABLE_PATH))
            .and(query_param("user_id", "eq.20260404"))
            .respond_with(ResponseTemplate::new(status))
            .expect(calls)
            .mount(&self.store)
            .await;
    }

    /// JSON body of the single PATCH the store received.
    async fn patched_body(&self) -> Value {
        let requests = self.store.received_requests().await.unwrap();
        let patch = requests
            .iter()
            .find(|r| r.method.as_str() == "PATCH")
            .expect("store received no PATCH");
        serde_json::from_slice(&patch.body).unwrap()
    }
}

#[tokio::test]
async fn empty_store_returns_fetch_error_without_exchange() {
    let up = Upstreams::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&up.store)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&up.auth)
        .await;

    let (status, body) = up.get_refresh().await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch token from database" }));
}

#[tokio::test]
async fn store_error_status_returns_fetch_error() {
    let up = Upstreams::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&up.store)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&up.auth)
        .await;

    let (status, body) = up.get_refresh().await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch token from database" }));
}

#[tokio::test]
async fn rejected_exchange_forwards_status_and_body_without_update() {
    let up = Upstreams::start().await;
    up.mount_record().await;
    let upstream = json!({
        "error": "invalid_grant",
        "error_description": "The refresh token is invalid"
    });
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(upstream.clone()))
        .expect(1)
        .mount(&up.auth)
        .await;
    up.mount_update(204, 0).await;

    let (status, body) = up.get_refresh().await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, upstream);
}

#[tokio::test]
async fn failing_update_returns_persist_error() {
    let up = Upstreams::start().await;
    up.mount_record().await;
    up.mount_exchange(json!(3600)).await;
    up.mount_update(500, 1).await;

    let (status, body) = up.get_refresh().await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to update database" }));
}

#[tokio::test]
async fn successful_refresh_reports_the_expiry_it_stored() {
    let up = Upstreams::start().await;
    up.mount_record().await;
    up.mount_exchange(json!(3600)).await;
    up.mount_update(204, 1).await;

    let (status, body) = up.get_refresh().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Tokens refreshed successfully"));

    let patched = up.patched_body().await;
    assert_eq!(patched["expires_at"], body["expires_at"]);
    assert_eq!(patched["access_token"], json!("new-access"));
    assert_eq!(patched["refresh_token"], json!("new-refresh"));
}

#[tokio::test]
async fn expiry_is_issue_time_plus_lifetime() {
    let up = Upstreams::start().await;
    up.mount_record().await;
    up.mount_exchange(json!(3600)).await;
    up.mount_update(204, 1).await;

    let outcome = up
        .workflow()
        .run_at(datetime!(2026-10-19 12:00:00 UTC))
        .await
        .unwrap();

    assert_eq!(outcome.expires_at, "2026-10-19T13:00:00.000Z");

    let patched = up.patched_body().await;
    assert_eq!(patched["expires_at"], json!("2026-10-19T13:00:00.000Z"));
    assert_eq!(patched["updated_at"], json!("2026-10-19T12:00:00.000Z"));
}

#[tokio::test]
async fn float_lifetime_is_accepted_and_stored() {
    let up = Upstreams::start().await;
    up.mount_record().await;
    up.mount_exchange(json!(3600.0)).await;
    up.mount_update(204, 1).await;

    let outcome = up
        .workflow()
        .run_at(datetime!(2026-10-19 12:00:00 UTC))
        .await
        .unwrap();

    assert_eq!(outcome.expires_at, "2026-10-19T13:00:00.000Z");
    let patched = up.patched_body().await;
    assert_eq!(patched["refresh_token"], json!("new-refresh"));
    assert_eq!(patched["expires_at"], json!("2026-10-19T13:00:00.000Z"));
}

#[tokio::test]
async fn exchange_sends_stored_refresh_token() {
    let up = Upstreams::start().await;
    up.mount_record().await;
    up.mount_exchange(json!(60)).await;
    up.mount_update(204, 1).await;

    up.workflow().run().await.unwrap();

    let requests = up.auth.received_requests().await.unwrap();
    let form = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(form.contains("refresh_token=old-refresh"));
    assert!(form.contains("grant_type=refresh_token"));
}

#[tokio::test]
async fn unreachable_token_endpoint_is_internal_error() {
    let up = Upstreams::start().await;
    up.mount_record().await;
    up.mount_update(204, 0).await;

    let config = Config {
        whoop_token_url: "http://127.0.0.1:9/oauth/oauth2/token".to_string(),
        ..up.config()
    };
    let workflow = RefreshWorkflow::from_config(&config).unwrap();

    let err = workflow.run().await.unwrap_err();
    assert!(matches!(err, RefreshError::Internal(_)));
}

#[tokio::test]
async fn health_ignores_configuration() {
    let config = Config {
        supabase_url: String::new(),
        supabase_key: String::new(),
        whoop_client_id: String::new(),
        whoop_client_secret: String::new(),
        whoop_token_url: String::new(),
        http_timeout_ms: 1,
        port: 0,
    };
    let workflow = RefreshWorkflow::from_config(&config).unwrap();

    let response = create_router(AppState::new(workflow))
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "status": "ok", "service": "whoop-refresh" }));
}
