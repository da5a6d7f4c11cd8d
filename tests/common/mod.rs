//! Test doubles for the I/O boundaries and a wired-up test environment
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;

use ph::application::services::CredentialStore;
use ph::config::{LoginMethod, Settings};
use ph::domain::SessionRecord;
use ph::infrastructure::di::{Boundaries, ServiceContainer};
use ph::infrastructure::traits::{
    Browser, HttpClient, HttpMethod, HttpRequest, HttpResponse, RealFileSystem, Reporter,
    SelectionItem, Selector, Sleeper, TokenPrompt,
};

pub const ENDPOINT: &str = "test.local";

/// Mock transport: replays queued responses in order and records every request.
#[derive(Default)]
pub struct MockHttp {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: Value) -> Self {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            location: None,
            body: body.to_string(),
        });
        self
    }

    pub fn reply_redirect(self, location: &str) -> Self {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status: 302,
            location: Some(location.to_string()),
            body: String::new(),
        });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: HttpMethod) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }
}

impl HttpClient for MockHttp {
    fn send(&self, request: &HttpRequest) -> io::Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| io::Error::other(format!("no response queued for {}", request.url)))
    }
}

/// Mock selector that returns a predetermined selection
pub struct MockSelector {
    selection_index: Option<usize>,
    prompts: Mutex<Vec<(String, Vec<SelectionItem>)>>,
}

impl MockSelector {
    pub fn new(selection_index: Option<usize>) -> Self {
        Self {
            selection_index,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far, with the items offered.
    pub fn prompts(&self) -> Vec<(String, Vec<SelectionItem>)> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Selector for MockSelector {
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), items.to_vec()));
        match self.selection_index {
            Some(idx) if idx < items.len() => Ok(Some(items[idx].clone())),
            Some(_) => Err("Index out of bounds".to_string()),
            None => Ok(None), // User cancelled
        }
    }
}

/// Mock prompt answering with a fixed token
pub struct MockPrompt {
    answer: String,
    asked: Mutex<Vec<String>>,
}

impl MockPrompt {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl TokenPrompt for MockPrompt {
    fn ask_token(&self, auth_url: &str) -> io::Result<String> {
        self.asked.lock().unwrap().push(auth_url.to_string());
        Ok(self.answer.clone())
    }
}

/// Mock browser that records opened URLs
#[derive(Default)]
pub struct MockBrowser {
    opened: Mutex<Vec<String>>,
}

impl MockBrowser {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl Browser for MockBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Sleeper that only counts
#[derive(Default)]
pub struct CountingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl CountingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Sleeper for CountingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

/// Reporter capturing messages by kind
#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
    pub fn messages(&self, kind: &str) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, kind: &'static str, msg: &str) {
        self.messages.lock().unwrap().push((kind, msg.to_string()));
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }

    fn success(&self, msg: &str) {
        self.push("success", msg);
    }

    fn warning(&self, msg: &str) {
        self.push("warning", msg);
    }

    fn error(&self, msg: &str) {
        self.push("error", msg);
    }

    fn data(&self, text: &str) {
        self.push("data", text);
    }
}

/// Temp credential file plus every boundary double, wired like production.
pub struct TestEnv {
    pub temp: TempDir,
    pub settings: Settings,
    pub http: Arc<MockHttp>,
    pub selector: Arc<MockSelector>,
    pub prompt: Arc<MockPrompt>,
    pub browser: Arc<MockBrowser>,
    pub sleeper: Arc<CountingSleeper>,
    pub reporter: Arc<RecordingReporter>,
}

impl TestEnv {
    pub fn new(http: MockHttp) -> Self {
        Self::with(http, MockSelector::new(Some(0)), MockPrompt::new("pasted-token"))
    }

    pub fn with(http: MockHttp, selector: MockSelector, prompt: MockPrompt) -> Self {
        ph::util::testing::init_test_setup();
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            endpoint: ENDPOINT.to_string(),
            api_protocol_web: "http".to_string(),
            api_port_web: None,
            api_token: None,
            log: None,
            credentials_file: temp.path().join("posthog").join("credentials.json"),
            login_method: LoginMethod::Paste,
            request_timeout_secs: 5,
        };
        Self {
            temp,
            settings,
            http: Arc::new(http),
            selector: Arc::new(selector),
            prompt: Arc::new(prompt),
            browser: Arc::new(MockBrowser::default()),
            sleeper: Arc::new(CountingSleeper::default()),
            reporter: Arc::new(RecordingReporter::default()),
        }
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.settings.credentials_file.clone()
    }

    pub fn store(&self) -> CredentialStore {
        CredentialStore::new(Arc::new(RealFileSystem), self.credentials_path())
    }

    pub fn seed(&self, token: &str, organization: &str, project: &str) {
        let record = SessionRecord {
            token: token.to_string(),
            organization: organization.to_string(),
            project: project.to_string(),
        };
        self.store().write(ENDPOINT, &record).unwrap();
    }

    pub fn stored(&self) -> Option<SessionRecord> {
        self.store().read(ENDPOINT)
    }

    pub fn container(&self) -> ServiceContainer {
        let boundaries = Boundaries {
            fs: Arc::new(RealFileSystem),
            http: self.http.clone(),
            selector: self.selector.clone(),
            prompt: self.prompt.clone(),
            browser: self.browser.clone(),
            sleeper: self.sleeper.clone(),
            reporter: self.reporter.clone(),
        };
        ServiceContainer::with_deps(self.settings.clone(), boundaries)
    }
}
