//! Thin API client over the HTTP boundary
//!
//! Builds URLs from settings, sends one request per call and maps the status
//! code. Nothing here retries.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::infrastructure::traits::{HttpClient, HttpMethod, HttpRequest, HttpResponse};

/// Statuses treated as success for reads and patches.
pub const OK: &[u16] = &[200];
/// Statuses treated as success for creation.
pub const CREATED: &[u16] = &[201];

#[derive(Clone)]
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    settings: Arc<Settings>,
}

impl ApiClient {
    pub fn new(http: Arc<dyn HttpClient>, settings: Arc<Settings>) -> Self {
        Self { http, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Send a request and require one of the `accepted` statuses.
    pub fn send(
        &self,
        method: HttpMethod,
        path: &str,
        headers: Vec<(String, String)>,
        query: Vec<(String, String)>,
        body: Option<Value>,
        accepted: &[u16],
    ) -> ApplicationResult<HttpResponse> {
        let url = self.settings.api_url(path);
        debug!("{:?} {}", method, url);

        let request = HttpRequest {
            method,
            url: url.clone(),
            headers,
            query,
            body,
        };
        let response = self
            .http
            .send(&request)
            .with_context(format!("{:?} {}", method, url))?;
        debug!("{:?} {} -> {}", method, url, response.status);
        trace!("response body: {} bytes", response.body.len());

        check_status(response, accepted)
    }

    pub fn get(
        &self,
        path: &str,
        headers: Vec<(String, String)>,
    ) -> ApplicationResult<HttpResponse> {
        self.send(HttpMethod::Get, path, headers, vec![], None, OK)
    }

    pub fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: Vec<(String, String)>,
    ) -> ApplicationResult<T> {
        let response = self.get(path, headers)?;
        parse_json(&response, path)
    }

    pub fn patch(
        &self,
        path: &str,
        headers: Vec<(String, String)>,
        body: Value,
    ) -> ApplicationResult<HttpResponse> {
        self.send(HttpMethod::Patch, path, headers, vec![], Some(body), OK)
    }
}

/// Map a response status onto the error taxonomy.
///
/// 401 is an invalid token, 302 is reported with its target and never
/// followed, anything else outside `accepted` is a plain remote error.
pub fn check_status(response: HttpResponse, accepted: &[u16]) -> ApplicationResult<HttpResponse> {
    if accepted.contains(&response.status) {
        return Ok(response);
    }
    match response.status {
        401 => Err(ApplicationError::Unauthenticated),
        302 => Err(ApplicationError::Redirected {
            location: response.location.unwrap_or_default(),
        }),
        status => Err(ApplicationError::Remote { status }),
    }
}

/// Deserialize a response body, naming `context` on failure.
pub fn parse_json<T: DeserializeOwned>(
    response: &HttpResponse,
    context: &str,
) -> ApplicationResult<T> {
    serde_json::from_str(&response.body).map_err(|e| ApplicationError::InvalidResponse {
        context: context.to_string(),
        message: e.to_string(),
    })
}
