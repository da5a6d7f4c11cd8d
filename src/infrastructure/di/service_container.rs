//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{CredentialStore, FlagService, LoginService, SessionService};
use crate::application::ApiClient;
use crate::config::Settings;
use crate::infrastructure::traits::{
    Browser, ConsolePrompt, FileSystem, HttpClient, RealFileSystem, Reporter, ReqwestHttpClient,
    Selector, SkimSelector, Sleeper, SystemBrowser, ThreadSleeper, TokenPrompt,
};
use crate::infrastructure::InfraResult;

/// I/O boundaries the services are built on.
#[derive(Clone)]
pub struct Boundaries {
    pub fs: Arc<dyn FileSystem>,
    pub http: Arc<dyn HttpClient>,
    pub selector: Arc<dyn Selector>,
    pub prompt: Arc<dyn TokenPrompt>,
    pub browser: Arc<dyn Browser>,
    pub sleeper: Arc<dyn Sleeper>,
    pub reporter: Arc<dyn Reporter>,
}

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// User-facing output
    pub reporter: Arc<dyn Reporter>,

    /// Token, organization and project resolution
    pub session: Arc<SessionService>,

    /// Flag CRUD for the selected project
    pub flags: FlagService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings, reporter: Arc<dyn Reporter>) -> InfraResult<Self> {
        let http = ReqwestHttpClient::new(settings.request_timeout())?;
        let boundaries = Boundaries {
            fs: Arc::new(RealFileSystem),
            http: Arc::new(http),
            selector: Arc::new(SkimSelector),
            prompt: Arc::new(ConsolePrompt),
            browser: Arc::new(SystemBrowser),
            sleeper: Arc::new(ThreadSleeper),
            reporter,
        };
        Ok(Self::with_deps(settings, boundaries))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, deps: Boundaries) -> Self {
        let settings = Arc::new(settings);
        let api = ApiClient::new(deps.http.clone(), settings.clone());

        let store = CredentialStore::new(deps.fs.clone(), settings.credentials_file.clone());
        let login = LoginService::new(
            api.clone(),
            deps.prompt.clone(),
            deps.browser.clone(),
            deps.sleeper.clone(),
            deps.reporter.clone(),
        );
        let session = Arc::new(SessionService::new(
            settings.clone(),
            store,
            api.clone(),
            login,
            deps.selector.clone(),
            deps.reporter.clone(),
        ));
        let flags = FlagService::new(
            session.clone(),
            api,
            deps.selector.clone(),
            deps.reporter.clone(),
        );

        Self {
            settings,
            reporter: deps.reporter,
            session,
            flags,
        }
    }
}
