//! Integration tests for the authorization code flow

use super::*;
use courserate_auth::{
    AuthError, AuthorizationFlow, AuthorizationFlowCoordinator, FlowPhase,
    InMemoryTokenPersistence, NavigationTarget, RecordingNavigator, ReqwestHttpTransport,
    SessionStore,
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

type Flow = AuthorizationFlowCoordinator<ReqwestHttpTransport, RecordingNavigator>;

fn create_flow(base_url: &str) -> (Arc<RecordingNavigator>, Flow) {
    let transport = Arc::new(ReqwestHttpTransport::new().expect("http client"));
    let navigator = Arc::new(RecordingNavigator::new());
    let flow = AuthorizationFlowCoordinator::new(config_for(base_url), transport, navigator.clone());
    (navigator, flow)
}

async fn mount_state(server: &wiremock::MockServer, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/auth/oauth2/state"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "state": STATE }))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_start_login_redirects_to_provider() {
    let server = setup_mock_server().await;
    mount_state(&server, Duration::ZERO).await;
    let (navigator, flow) = create_flow(&server.uri());

    flow.start_login().await.expect("login should start");

    let Some(NavigationTarget::External(target)) = navigator.last() else {
        panic!("expected a hard navigation, got {:?}", navigator.history());
    };
    let url = Url::parse(&target).unwrap();
    assert_eq!(url.host_str(), Some("market.example.com"));
    assert_eq!(url.path(), "/new/connect/");

    let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
    assert_eq!(keys, ["appid", "redirect_uri", "response_type", "scope", "state"]);
    let state = url.query_pairs().find(|(k, _)| k == "state").unwrap().1;
    assert_eq!(state, STATE);
    assert_eq!(flow.phase(), FlowPhase::Redirecting);
}

#[tokio::test]
async fn test_start_login_observes_loading_while_in_flight() {
    let server = setup_mock_server().await;
    mount_state(&server, Duration::from_millis(300)).await;
    let (_, flow) = create_flow(&server.uri());

    let (result, observed) = futures::join!(flow.start_login(), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        flow.is_loading()
    });

    assert!(result.is_ok());
    assert!(observed);
    assert!(!flow.is_loading());
}

#[tokio::test]
async fn test_start_login_network_failure() {
    let (navigator, flow) = create_flow("http://127.0.0.1:1");

    let err = flow.start_login().await.unwrap_err();

    assert!(matches!(err, AuthError::Transport(_)));
    assert!(!flow.is_loading());
    assert!(flow.error().unwrap().contains("network error"));
    assert!(navigator.history().is_empty());
}

#[tokio::test]
async fn test_overlapping_attempts_both_complete() {
    let server = setup_mock_server().await;
    mount_state(&server, Duration::from_millis(50)).await;
    let (navigator, flow) = create_flow(&server.uri());

    let (first, second) = futures::join!(flow.start_login(), flow.start_login());

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(navigator.history().len(), 2);
    assert!(!flow.is_loading());
}

#[tokio::test]
async fn test_empty_code_makes_no_request() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/auth/oauth2/callback"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let (_, flow) = create_flow(&server.uri());

    let err = flow.handle_callback("", STATE).await.unwrap_err();

    assert!(matches!(err, AuthError::Validation(_)));
    assert!(!flow.is_loading());
}

#[tokio::test]
async fn test_admin_callback_establishes_admin_session() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/auth/oauth2/callback"))
        .and(query_param("code", "auth-code"))
        .and(query_param("state", STATE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt-admin",
            "user": user_json("root", "admin"),
            "message": "login ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (navigator, flow) = create_flow(&server.uri());
    let session = SessionStore::new(
        config_for(&server.uri()),
        Arc::new(ReqwestHttpTransport::new().unwrap()),
        Arc::new(InMemoryTokenPersistence::new()),
    );

    let callback = format!(
        "http://localhost:5173/auth/callback?code=auth-code&state={}",
        STATE
    );
    let user = flow.complete_login(&callback, &session).await.unwrap();

    assert_eq!(user.username, "root");
    assert!(session.is_authenticated());
    assert!(session.is_admin());
    assert_eq!(navigator.last(), Some(NavigationTarget::Route("/".to_string())));
}

#[tokio::test]
async fn test_rejected_callback_routes_to_login() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/auth/oauth2/callback"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_state",
            "message": "state expired"
        })))
        .mount(&server)
        .await;

    let (navigator, flow) = create_flow(&server.uri());
    let session = SessionStore::new(
        config_for(&server.uri()),
        Arc::new(ReqwestHttpTransport::new().unwrap()),
        Arc::new(InMemoryTokenPersistence::new()),
    );

    let callback = format!("http://localhost:5173/auth/callback?code=c&state={}", STATE);
    assert!(flow.complete_login(&callback, &session).await.is_err());

    assert!(!session.is_authenticated());
    assert_eq!(
        flow.error().as_deref(),
        Some("invalid_state: state expired (error code: 400)")
    );
    assert_eq!(
        navigator.last(),
        Some(NavigationTarget::Route("/auth?error=oauth2_failed".to_string()))
    );
}
