//! Integration tests for interactive token acquisition.

mod common;

use std::sync::Arc;

use rstest::rstest;
use serde_json::json;

use common::{MockHttp, MockPrompt, MockSelector, TestEnv};
use ph::application::services::{LoginService, POLL_INTERVAL};
use ph::application::{ApiClient, ApplicationError};
use ph::config::LoginMethod;
use ph::infrastructure::traits::HttpMethod;

fn login_service(env: &TestEnv) -> LoginService {
    let api = ApiClient::new(env.http.clone(), Arc::new(env.settings.clone()));
    LoginService::new(
        api,
        env.prompt.clone(),
        env.browser.clone(),
        env.sleeper.clone(),
        env.reporter.clone(),
    )
}

fn started() -> serde_json::Value {
    json!({"code": "c0de"})
}

fn confirm() -> serde_json::Value {
    json!({"confirm": "http://test.local/cli/confirm?code=c0de"})
}

#[test]
fn given_pending_then_authenticated_when_device_flow_then_returns_token() {
    let http = MockHttp::new()
        .reply(200, started())
        .reply(200, confirm())
        .reply(200, json!({"status": "pending"}))
        .reply(200, json!({"status": "authenticated", "access_token": "phx_tok"}));
    let env = TestEnv::new(http);

    let token = login_service(&env).acquire(LoginMethod::Browser).unwrap();

    assert_eq!(token, "phx_tok");
    assert_eq!(
        env.browser.opened(),
        vec!["http://test.local/cli/confirm?code=c0de".to_string()]
    );
    assert_eq!(env.sleeper.slept(), vec![POLL_INTERVAL]);
    assert!(env.prompt.asked().is_empty());

    let requests = env.http.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].url, "http://test.local/api/login/cli/start");
    assert_eq!(requests[1].url, "http://test.local/api/login/cli");
    assert_eq!(requests[3].url, "http://test.local/api/login/cli/check");
    let code = vec![("code".to_string(), "c0de".to_string())];
    assert!(requests[1..].iter().all(|r| r.query == code));

    let info = env.reporter.messages("info");
    assert!(info[0].contains("http://test.local/cli/confirm?code=c0de"));
}

#[test]
fn given_authenticated_immediately_when_device_flow_then_never_sleeps() {
    let http = MockHttp::new()
        .reply(200, started())
        .reply(200, confirm())
        .reply(200, json!({"status": "authenticated", "access_token": "t"}));
    let env = TestEnv::new(http);

    login_service(&env).device_flow().unwrap();

    assert!(env.sleeper.slept().is_empty());
}

#[test]
fn given_authenticated_without_token_when_acquiring_then_no_token() {
    let http = MockHttp::new()
        .reply(200, started())
        .reply(200, confirm())
        .reply(200, json!({"status": "authenticated"}));
    let env = TestEnv::new(http);

    let result = login_service(&env).acquire(LoginMethod::Browser);

    assert!(matches!(result, Err(ApplicationError::NoToken)));
}

#[rstest]
#[case::start_fails(MockHttp::new().reply(500, json!({})), 1)]
#[case::confirm_fails(MockHttp::new().reply(200, started()).reply(404, json!({})), 2)]
#[case::check_fails(
    MockHttp::new()
        .reply(200, started())
        .reply(200, confirm())
        .reply(503, json!({})),
    3
)]
fn given_non_200_step_when_device_flow_then_aborts(
    #[case] http: MockHttp,
    #[case] expected_requests: usize,
) {
    let env = TestEnv::new(http);

    let result = login_service(&env).device_flow();

    assert!(matches!(result, Err(ApplicationError::Remote { .. })));
    assert_eq!(env.http.requests().len(), expected_requests);
}

#[rstest]
#[case::missing(json!({}))]
#[case::empty(json!({"confirm": ""}))]
fn given_no_confirm_url_when_device_flow_then_aborts_before_polling(
    #[case] body: serde_json::Value,
) {
    let env = TestEnv::new(MockHttp::new().reply(200, started()).reply(200, body));

    let result = login_service(&env).device_flow();

    assert!(matches!(result, Err(ApplicationError::ConfirmUrlMissing)));
    assert!(env.browser.opened().is_empty());
    assert_eq!(env.http.requests().len(), 2);
}

#[test]
fn given_start_without_code_when_device_flow_then_invalid_response() {
    let env = TestEnv::new(MockHttp::new().reply(200, json!({"other": 1})));

    let result = login_service(&env).device_flow();

    assert!(matches!(result, Err(ApplicationError::InvalidResponse { .. })));
}

#[test]
fn given_paste_method_when_acquiring_then_prompt_shows_web_url() {
    let env = TestEnv::with(
        MockHttp::new(),
        MockSelector::new(Some(0)),
        MockPrompt::new("phx_pasted"),
    );

    let token = login_service(&env).acquire(LoginMethod::Paste).unwrap();

    assert_eq!(token, "phx_pasted");
    assert_eq!(env.prompt.asked(), vec!["http://test.local/".to_string()]);
    assert!(env.http.requests().is_empty());
}

#[test]
fn given_empty_paste_when_acquiring_then_no_token() {
    let env = TestEnv::with(MockHttp::new(), MockSelector::new(Some(0)), MockPrompt::new(""));

    let result = login_service(&env).acquire(LoginMethod::Paste);

    assert!(matches!(result, Err(ApplicationError::NoToken)));
}
