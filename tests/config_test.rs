//! Integration tests for layered settings: defaults, config file, PH_* environment.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use ph::application::ApplicationError;
use ph::config::{LoginMethod, Settings, DEFAULT_ENDPOINT};

fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn write_config(temp: &TempDir, content: &str) -> PathBuf {
    let path = temp.path().join("ph.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn given_no_sources_when_loading_then_defaults_apply() {
    let settings = Settings::load_from(None, env(&[])).unwrap();

    assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(settings.api_protocol_web, "https");
    assert_eq!(settings.api_port_web, None);
    assert_eq!(settings.api_token, None);
    assert_eq!(settings.login_method, LoginMethod::Browser);
    assert!(settings.credentials_file.ends_with(".posthog/credentials.json"));
}

#[test]
fn given_missing_config_file_when_loading_then_defaults_apply() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("absent.toml");

    let settings = Settings::load_from(Some(&missing), env(&[])).unwrap();

    assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
}

#[test]
fn given_config_file_when_loading_then_it_overrides_defaults() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"
endpoint = "localhost"
api_protocol_web = "http"
api_port_web = 8000
login_method = "paste"
"#,
    );

    let settings = Settings::load_from(Some(&path), env(&[])).unwrap();

    assert_eq!(settings.endpoint, "localhost");
    assert_eq!(settings.api_url("api/organizations"), "http://localhost:8000/api/organizations");
    assert_eq!(settings.login_method, LoginMethod::Paste);
    // Untouched keys keep their defaults
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn given_env_and_config_file_when_loading_then_env_wins() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "endpoint = \"from-file\"\napi_port_web = 8000\n");

    let settings = Settings::load_from(
        Some(&path),
        env(&[
            ("PH_ENDPOINT", "from-env"),
            ("PH_API_TOKEN", "phx_123"),
            ("PH_LOGIN_METHOD", "paste"),
        ]),
    )
    .unwrap();

    assert_eq!(settings.endpoint, "from-env");
    assert_eq!(settings.api_port_web, Some(8000));
    assert_eq!(settings.api_token.as_deref(), Some("phx_123"));
    assert_eq!(settings.login_method, LoginMethod::Paste);
}

#[test]
fn given_empty_env_values_when_loading_then_they_are_ignored() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "api_port_web = 8000\n");

    let settings = Settings::load_from(
        Some(&path),
        env(&[("PH_API_PORT_WEB", ""), ("PH_API_TOKEN", "")]),
    )
    .unwrap();

    assert_eq!(settings.api_port_web, Some(8000));
    assert_eq!(settings.api_token, None);
}

#[test]
fn given_invalid_port_when_loading_then_config_error() {
    let result = Settings::load_from(None, env(&[("PH_API_PORT_WEB", "eighty")]));

    match result {
        Err(ApplicationError::Config { message }) => assert!(message.contains("PH_API_PORT_WEB")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn given_unknown_login_method_when_loading_then_config_error() {
    let result = Settings::load_from(None, env(&[("PH_LOGIN_METHOD", "sso")]));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_malformed_config_file_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "endpoint = [unterminated\n");

    let result = Settings::load_from(Some(&path), env(&[]));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_tilde_credentials_path_when_loading_then_expanded() {
    let settings = Settings::load_from(
        None,
        env(&[("PH_CREDENTIALS_FILE", "~/custom/creds.json")]),
    )
    .unwrap();

    let path = settings.credentials_file.to_string_lossy().to_string();
    assert!(!path.starts_with('~'), "not expanded: {path}");
    assert!(path.ends_with("custom/creds.json"));
}

#[test]
fn given_loaded_settings_when_rendering_then_round_trips_through_toml() {
    let settings = Settings::load_from(None, env(&[("PH_ENDPOINT", "eu.example")])).unwrap();

    let rendered = settings.to_toml().unwrap();

    assert!(rendered.contains("endpoint = \"eu.example\""));
    assert!(rendered.contains("login_method = \"browser\""));
}
