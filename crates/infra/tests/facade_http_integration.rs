//! End-to-end tests: façade → client policy → reqwest transport → HTTP
//!
//! **Coverage:**
//! - Base URL joining and default headers on the wire
//! - Stored bearer token injection
//! - 401 handling on primary and secondary clients
//! - Form, multipart and basic-auth encodings
//! - ServiceNow sign-in persisting the session in a file store
//!
//! **Infrastructure:**
//! - WireMock HTTP server standing in for both backends and ServiceNow
//! - Real `ReqwestTransport`, `FileTokenStore` (tempdir)

use std::sync::Arc;

use opsassist_core::testing::RecordingNavigator;
use opsassist_core::{LoginError, MemoryTokenStore, TokenStore};
use opsassist_domain::{AppConfig, BasicAuth, ClientConfig, MultipartForm, RequestOptions};
use opsassist_infra::{AppContext, FileTokenStore};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{
    body_json, body_string_contains, header, header_exists, method, path, query_param,
};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

struct Fixture {
    server: MockServer,
    context: AppContext,
    store: Arc<dyn TokenStore>,
    navigator: Arc<RecordingNavigator>,
}

fn app_config(server: &MockServer) -> AppConfig {
    let mut config = AppConfig {
        primary: ClientConfig::primary().with_base_url(format!("{}/api/", server.uri())),
        secondary: ClientConfig::secondary().with_base_url(format!("{}/finops", server.uri())),
        ..AppConfig::default()
    };
    config.service_now.verify_url =
        Some(format!("{}/api/now/table/incident?sysparm_limit=1", server.uri()));
    config
}

async fn fixture_with(store: Arc<dyn TokenStore>) -> Fixture {
    let server = MockServer::start().await;
    let navigator = Arc::new(RecordingNavigator::new());
    let context = AppContext::new(&app_config(&server), store.clone(), navigator.clone())
        .expect("app context");
    Fixture { server, context, store, navigator }
}

async fn fixture() -> Fixture {
    fixture_with(Arc::new(MemoryTokenStore::new())).await
}

#[tokio::test]
async fn get_data_unwraps_payload_over_http() {
    let f = fixture().await;
    Mock::given(method("GET"))
        .and(path("/api/tickets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "ok", "data": [{"number": "INC001"}]})),
        )
        .expect(1)
        .mount(&f.server)
        .await;

    let data = f.context.api.get_data("/tickets").await.expect("get_data");

    assert_eq!(data, json!([{"number": "INC001"}]));
    let received = f.server.received_requests().await.expect("recorded requests");
    assert!(received[0].headers.get("content-type").is_none());
}

#[tokio::test]
async fn stored_token_is_sent_as_bearer() {
    let f = fixture_with(Arc::new(MemoryTokenStore::with_entries([("authToken", "jwt-1")]))).await;
    Mock::given(method("POST"))
        .and(path("/api/articles"))
        .and(header("authorization", "Bearer jwt-1"))
        .and(body_json(json!({"title": "Reset VPN"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 5})))
        .expect(1)
        .mount(&f.server)
        .await;

    let response =
        f.context.api.post_data("/articles", &json!({"title": "Reset VPN"})).await.expect("post");

    assert_eq!(response.status.as_u16(), 201);
    assert_eq!(response.data["id"], 5);
}

#[tokio::test]
async fn primary_unauthorized_clears_token_and_redirects() {
    let f = fixture_with(Arc::new(MemoryTokenStore::with_entries([
        ("authToken", "expired"),
        ("finopsToken", "fin"),
    ])))
    .await;
    Mock::given(method("GET"))
        .and(path("/api/tickets/42"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(1)
        .mount(&f.server)
        .await;

    let err = f.context.api.get_data_by_id("/tickets/", 42).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(f.store.get("authToken").is_none());
    assert_eq!(f.store.get("finopsToken").as_deref(), Some("fin"));
    assert_eq!(f.navigator.visits(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn secondary_form_post_and_unauthorized() {
    let f = fixture_with(Arc::new(MemoryTokenStore::with_entries([
        ("authToken", "main"),
        ("finopsToken", "stale"),
    ])))
    .await;
    Mock::given(method("POST"))
        .and(path("/finops/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(header("accept", "application/json"))
        .and(header("authorization", "Bearer stale"))
        .and(body_string_contains("username=ops"))
        .and(body_string_contains("password=pw"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&f.server)
        .await;

    let err = f
        .context
        .api
        .post_auth_data("/token", &json!({"username": "ops", "password": "pw"}))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(f.store.get("finopsToken").is_none());
    assert_eq!(f.store.get("authToken").as_deref(), Some("main"));
    assert_eq!(f.navigator.count(), 0);
}

#[tokio::test]
async fn secondary_shares_primary_backend_when_unconfigured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let config = opsassist_infra::config::load_from_lookup(|key| {
        (key == opsassist_infra::config::loader::ENV_API_URL).then(|| uri.clone())
    })
    .expect("config");
    let context = AppContext::new(
        &config,
        Arc::new(MemoryTokenStore::new()),
        Arc::new(RecordingNavigator::new()),
    )
    .expect("app context");

    let response =
        context.api.post_auth_data("/token", &json!({"username": "ops"})).await.expect("post");

    assert_eq!(response.data["access_token"], "t");
}

#[tokio::test]
async fn post_image_sends_multipart_with_boundary() {
    let f = fixture().await;
    Mock::given(method("POST"))
        .and(path("/api/visual/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"labels": ["router"]})))
        .expect(1)
        .mount(&f.server)
        .await;

    let form =
        MultipartForm::new().file("file", "rack.jpg", vec![0xFF, 0xD8], Some("image/jpeg".into()));
    let response = f.context.api.post_image("/visual/analyze", form).await.expect("post_image");

    assert_eq!(response.data["labels"][0], "router");
    let received = f.server.received_requests().await.expect("recorded requests");
    let content_type = received[0].headers.get("content-type").expect("content type");
    assert!(content_type.to_str().unwrap().starts_with("multipart/form-data; boundary="));
}

#[tokio::test]
async fn post_call_options_merges_caller_headers() {
    let f = fixture().await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(header("x", "1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"q": "printer"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&f.server)
        .await;

    let options = RequestOptions::new().header("X", "1");
    f.context
        .api
        .post_call_options("/search", options, &json!({"q": "printer"}))
        .await
        .expect("post");
}

#[tokio::test]
async fn absolute_url_bypasses_base_and_uses_basic_auth() {
    let f = fixture().await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/incident"))
        .and(query_param("sysparm_limit", "5"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
        .expect(1)
        .mount(&f.server)
        .await;

    let url = format!("{}/api/now/table/incident?sysparm_limit=5", f.server.uri());
    let options = RequestOptions::new().basic_auth(BasicAuth::new("user", "pass"));
    let response = f.context.api.get_call_options(&url, options).await.expect("get_call_options");

    assert_eq!(response.data, json!({"result": []}));
}

#[tokio::test]
async fn login_restore_logout_with_file_store() {
    let dir = TempDir::new().expect("tempdir");
    let state = dir.path().join("state.json");
    let store = Arc::new(FileTokenStore::open(&state).expect("file store"));
    let f = fixture_with(store).await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/incident"))
        .and(header("authorization", "Basic amRvZTpzM2NyZXQ="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
        .mount(&f.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/incident"))
        .and(header_exists("authorization"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "User Not Authenticated"}})),
        )
        .mount(&f.server)
        .await;

    let err = f.context.session.login("jdoe", "wrong").await.unwrap_err();
    assert!(matches!(err, LoginError::InvalidCredentials));
    assert!(f.store.get("authToken").is_none());

    let user = f.context.session.login("jdoe", "s3cret").await.expect("login");
    assert_eq!(user.name, "jdoe");
    assert_eq!(f.store.get("authToken").as_deref(), Some("servicenow-authenticated"));

    let reopened = FileTokenStore::open(&state).expect("reopen");
    assert!(reopened.get("userData").is_some());
    assert!(reopened.get("serviceNowAuth").is_some());

    assert_eq!(f.context.session.restore(), Some(user));
    assert_eq!(f.context.session.stored_credentials(), Some(BasicAuth::new("jdoe", "s3cret")));

    f.context.session.logout().expect("logout");
    assert!(f.context.session.restore().is_none());
    assert!(FileTokenStore::open(&state).expect("reopen").get("authToken").is_none());

    let verify_calls = f
        .server
        .received_requests()
        .await
        .expect("recorded requests")
        .iter()
        .filter(|request: &&Request| request.url.path() == "/api/now/table/incident")
        .count();
    assert_eq!(verify_calls, 2);
}
