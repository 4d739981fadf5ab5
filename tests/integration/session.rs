//! Integration tests for the session store

use super::*;
use courserate_auth::{
    require_admin, require_auth, AuthClient, Credentials, FileTokenPersistence, GuardDecision,
    HttpRequest, HttpTransport, RecordingNavigator, Registration, ReqwestHttpTransport,
    SessionStore,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn create_store(
    base_url: &str,
    dir: &std::path::Path,
) -> SessionStore<ReqwestHttpTransport, FileTokenPersistence> {
    SessionStore::new(
        config_for(base_url),
        Arc::new(ReqwestHttpTransport::new().unwrap()),
        Arc::new(FileTokenPersistence::new(dir)),
    )
}

#[tokio::test]
async fn test_login_persists_and_restores() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"username": "erin", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt-erin",
            "user": user_json("erin", "user")
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer jwt-erin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("erin", "user")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = create_store(&server.uri(), dir.path());
    let data = assert_ok!(store.login(Credentials::new("erin", "s3cret")).await.into_result());
    assert_eq!(data.user.username, "erin");
    assert!(store.is_authenticated());

    let restored = create_store(&server.uri(), dir.path());
    assert_eq!(restored.token().unwrap().expose_secret(), "jwt-erin");
    assert!(!restored.is_authenticated());

    let user = assert_ok!(restored.get_current_user().await);
    assert_eq!(user.map(|u| u.username).as_deref(), Some("erin"));
    assert!(restored.is_authenticated());
}

#[tokio::test]
async fn test_login_failure_message() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid username or password"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = create_store(&server.uri(), dir.path());
    let outcome = store.login(Credentials::new("erin", "wrong")).await;

    assert_eq!(outcome.error(), Some("Invalid username or password"));
    assert_eq!(store.error().as_deref(), Some("Invalid username or password"));
    assert!(store.token().is_none());
}

#[tokio::test]
async fn test_register_network_failure_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let store = create_store("http://127.0.0.1:1", dir.path());

    let outcome = store
        .register(Registration::new("frank", "pw", "frank@example.com", "Frank"))
        .await;

    assert_eq!(outcome.error(), Some("Registration failed"));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_expired_token_tears_down_session() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "token expired"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = create_store(&server.uri(), dir.path());
    store.set_token(Some("stale"));

    let err = assert_err!(store.get_current_user().await);
    assert!(err.is_auth_expiry());
    assert!(store.token().is_none());
    assert!(!dir.path().join("token").exists());
}

#[tokio::test]
async fn test_api_transport_attaches_credentials_and_guards_follow() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/courses"))
        .and(header("authorization", "Bearer jwt-admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/reports"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "revoked"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = AuthClient::with_components(
        config_for(&server.uri()),
        ReqwestHttpTransport::new().unwrap(),
        FileTokenPersistence::new(dir.path()),
        RecordingNavigator::new(),
    );
    let routes = client.config().routes.clone();
    assert_eq!(
        require_auth(client.session(), &routes),
        GuardDecision::Redirect("/auth".to_string())
    );

    let admin = serde_json::from_value(user_json("root", "admin")).unwrap();
    client.session().oauth2_login("jwt-admin", admin);
    assert!(require_admin(client.session(), &routes).is_allowed());

    let api = client.api_transport();
    let courses = api
        .send(HttpRequest::get(client.config().endpoint_url("/courses")))
        .await
        .unwrap();
    assert_eq!(courses.status, 200);

    let reports = api
        .send(HttpRequest::get(client.config().endpoint_url("/admin/reports")))
        .await
        .unwrap();
    assert_eq!(reports.status, 401);
    assert_eq!(
        require_admin(client.session(), &routes),
        GuardDecision::Redirect("/auth".to_string())
    );
}
