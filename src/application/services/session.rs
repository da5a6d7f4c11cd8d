//! Session resolution: token, organization and project
//!
//! State is derived from the credential file on every call:
//! no token -> interactive login; no organization -> choose one;
//! no project -> choose one; otherwise ready.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, instrument};

use crate::application::api::ApiClient;
use crate::application::services::chooser::choose_one;
use crate::application::services::{CredentialStore, LoginService};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::{LoginMethod, Settings};
use crate::domain::{bearer_headers, NamedResource, ResultsPage, Session, SessionRecord};
use crate::infrastructure::traits::{Reporter, SelectionItem, Selector};

const ORGANIZATIONS_PATH: &str = "api/organizations";

pub struct SessionService {
    settings: Arc<Settings>,
    store: CredentialStore,
    api: ApiClient,
    login: LoginService,
    selector: Arc<dyn Selector>,
    reporter: Arc<dyn Reporter>,
    /// Token override for this process: configured, or acquired interactively.
    token_override: Mutex<Option<String>>,
}

impl SessionService {
    pub fn new(
        settings: Arc<Settings>,
        store: CredentialStore,
        api: ApiClient,
        login: LoginService,
        selector: Arc<dyn Selector>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let token_override = Mutex::new(settings.api_token.clone().filter(|t| !t.is_empty()));
        Self {
            settings,
            store,
            api,
            login,
            selector,
            reporter,
            token_override,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.settings.endpoint
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Stored record for the current endpoint (empty if none).
    pub fn record(&self) -> SessionRecord {
        self.store.read(self.endpoint()).unwrap_or_default()
    }

    /// Resolve a token: override, then credential file, then interactive login.
    ///
    /// An interactively acquired token is persisted and becomes the override
    /// for the rest of the process.
    pub fn token(&self) -> ApplicationResult<String> {
        if let Some(token) = self.override_token() {
            return Ok(token);
        }
        if let Some(record) = self.store.read(self.endpoint()).filter(|r| r.has_token()) {
            return Ok(record.token);
        }

        debug!("no token for {}, starting interactive login", self.endpoint());
        let token = self.login.acquire(self.settings.login_method)?;
        self.remember(&token)?;
        Ok(token)
    }

    /// `Content-Type` and bearer `Authorization` headers.
    pub fn headers(&self) -> ApplicationResult<Vec<(String, String)>> {
        Ok(bearer_headers(&self.token()?))
    }

    /// Acquire a fresh token (discarding any stored session), then run the auth check.
    #[instrument(skip(self))]
    pub fn login(&self, method: LoginMethod) -> ApplicationResult<Session> {
        let token = self.login.acquire(method)?;
        self.remember(&token)?;
        self.reporter
            .success(&format!("Logged in to {}", self.endpoint()));
        self.auth(false, false)
    }

    /// Forget the stored session for the current endpoint.
    #[instrument(skip(self))]
    pub fn logout(&self) -> ApplicationResult<()> {
        self.store.delete(self.endpoint())?;
        self.set_override(None);
        self.reporter
            .success(&format!("Logged out of {}", self.endpoint()));
        Ok(())
    }

    /// Validate the token and make sure organization and project are chosen.
    ///
    /// A 401 from the account endpoints deletes the stored record. Switching
    /// the organization clears the project, so a project is chosen next.
    #[instrument(skip(self))]
    pub fn auth(&self, switch_organization: bool, switch_project: bool) -> ApplicationResult<Session> {
        let token = self.token()?;
        debug!("validating account on {}", self.endpoint());

        let organizations: ResultsPage<NamedResource> = self.account_get(ORGANIZATIONS_PATH, &token)?;

        let mut record = self.record();
        record.token = token.clone();

        if !record.has_organization() || switch_organization {
            record.organization = self.choose("organization", &organizations.results)?;
            record.project.clear();
            self.store.write(self.endpoint(), &record)?;
        }

        if !record.has_project() || switch_project {
            let path = format!("{}/{}/projects", ORGANIZATIONS_PATH, record.organization);
            let projects: ResultsPage<NamedResource> = self.account_get(&path, &token)?;
            record.project = self.choose("project", &projects.results)?;
            self.store.write(self.endpoint(), &record)?;
        }

        Ok(Session::from_record(&record)?)
    }

    /// Session for project-scoped calls; runs the auth check only when a
    /// selection is missing.
    pub fn ready(&self) -> ApplicationResult<Session> {
        let token = self.token()?;
        let record = self.record();
        if record.has_organization() && record.has_project() {
            return Ok(Session {
                token,
                organization: record.organization,
                project: record.project,
            });
        }
        debug!("session incomplete, running auth check");
        self.auth(false, false)
    }

    fn account_get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> ApplicationResult<T> {
        match self.api.get_json(path, bearer_headers(token)) {
            Err(ApplicationError::Unauthenticated) => {
                info!("token rejected by {}, removing stored session", self.endpoint());
                self.store.delete(self.endpoint())?;
                self.set_override(None);
                Err(ApplicationError::Unauthenticated)
            }
            other => other,
        }
    }

    fn choose(&self, kind: &'static str, resources: &[NamedResource]) -> ApplicationResult<String> {
        if resources.is_empty() {
            return Err(ApplicationError::NothingToChoose(kind));
        }
        let items: Vec<SelectionItem> = resources
            .iter()
            .map(|r| SelectionItem {
                display: r.name.clone(),
                value: r.id_string(),
            })
            .collect();

        let selected = choose_one(self.selector.as_ref(), &format!("Select {kind}"), &items)?;
        info!("Selected {}: {}: {}", kind, selected.display, selected.value);
        self.reporter
            .info(&format!("Selected {kind}: {}", selected.display));
        Ok(selected.value)
    }

    fn remember(&self, token: &str) -> ApplicationResult<()> {
        self.store
            .write(self.endpoint(), &SessionRecord::with_token(token))?;
        self.set_override(Some(token.to_string()));
        Ok(())
    }

    fn override_token(&self) -> Option<String> {
        self.token_override
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_override(&self, token: Option<String>) {
        *self
            .token_override
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }
}
