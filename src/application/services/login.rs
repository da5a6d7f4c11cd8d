//! Interactive token acquisition
//!
//! Two ways to get a token when none is stored: paste one obtained from the
//! web UI, or the device flow (confirm in the browser, poll until done).

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::application::api::{parse_json, ApiClient, OK};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::LoginMethod;
use crate::infrastructure::traits::{
    Browser, HttpMethod, HttpResponse, Reporter, Sleeper, TokenPrompt,
};

/// Delay between device-flow status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

const START_PATH: &str = "api/login/cli/start";
const CONFIRM_PATH: &str = "api/login/cli";
const CHECK_PATH: &str = "api/login/cli/check";

#[derive(Debug, Deserialize)]
struct StartResponse {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfirmResponse {
    confirm: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    status: Option<String>,
    access_token: Option<String>,
}

pub struct LoginService {
    api: ApiClient,
    prompt: Arc<dyn TokenPrompt>,
    browser: Arc<dyn Browser>,
    sleeper: Arc<dyn Sleeper>,
    reporter: Arc<dyn Reporter>,
}

impl LoginService {
    pub fn new(
        api: ApiClient,
        prompt: Arc<dyn TokenPrompt>,
        browser: Arc<dyn Browser>,
        sleeper: Arc<dyn Sleeper>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            api,
            prompt,
            browser,
            sleeper,
            reporter,
        }
    }

    /// Obtain a token with `method`. An empty token is `NoToken`.
    pub fn acquire(&self, method: LoginMethod) -> ApplicationResult<String> {
        debug!("acquire: method={}", method);
        let token = match method {
            LoginMethod::Browser => self.device_flow()?,
            LoginMethod::Paste => self.paste()?,
        };
        if token.is_empty() {
            return Err(ApplicationError::NoToken);
        }
        Ok(token)
    }

    /// Show the web URL and read a token line from the console.
    pub fn paste(&self) -> ApplicationResult<String> {
        let auth_url = self.api.settings().api_url("");
        self.prompt
            .ask_token(&auth_url)
            .with_context("read token from console")
    }

    /// Device flow: start, fetch the confirm URL, open it, poll until authenticated.
    ///
    /// Any non-200 aborts the flow. There is no iteration cap.
    pub fn device_flow(&self) -> ApplicationResult<String> {
        let start = self
            .step(HttpMethod::Post, START_PATH, vec![])
            .and_then(|r| parse_json::<StartResponse>(&r, START_PATH))?;
        let code = start.code.ok_or_else(|| ApplicationError::InvalidResponse {
            context: START_PATH.to_string(),
            message: "missing code".to_string(),
        })?;
        debug!("device flow started");

        let query = vec![("code".to_string(), code)];
        let confirm = self
            .step(HttpMethod::Get, CONFIRM_PATH, query.clone())
            .and_then(|r| parse_json::<ConfirmResponse>(&r, CONFIRM_PATH))?
            .confirm
            .filter(|url| !url.is_empty())
            .ok_or(ApplicationError::ConfirmUrlMissing)
            .inspect_err(|e| warn!("device login aborted: {}", e))?;

        self.reporter
            .info(&format!("Confirm the login in your browser: {confirm}"));
        if let Err(e) = self.browser.open(&confirm) {
            self.reporter
                .warning(&format!("could not open a browser ({e}), open the URL above manually"));
        }

        loop {
            let check = self
                .step(HttpMethod::Get, CHECK_PATH, query.clone())
                .and_then(|r| parse_json::<CheckResponse>(&r, CHECK_PATH))?;

            if check.status.as_deref() == Some("authenticated") {
                info!("device login authenticated");
                return Ok(check.access_token.unwrap_or_default());
            }
            debug!("device login status: {:?}", check.status);
            self.sleeper.sleep(POLL_INTERVAL);
        }
    }

    fn step(
        &self,
        method: HttpMethod,
        path: &str,
        query: Vec<(String, String)>,
    ) -> ApplicationResult<HttpResponse> {
        self.api
            .send(method, path, vec![], query, None, OK)
            .inspect_err(|e| warn!("device login aborted at {}: {}", path, e))
    }
}
