//! Feature flag operations for the selected project
//!
//! Every operation resolves a ready session first. Keys are resolved to ids
//! by scanning the full flag list; the first match in list order wins.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::application::api::{ApiClient, CREATED};
use crate::application::services::chooser::choose_one;
use crate::application::services::SessionService;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    DomainError, FeatureFlag, NewFeatureFlag, ResultsPage, RolloutPercentage, Session,
};
use crate::infrastructure::traits::{HttpMethod, Reporter, SelectionItem, Selector};

pub struct FlagService {
    session: Arc<SessionService>,
    api: ApiClient,
    selector: Arc<dyn Selector>,
    reporter: Arc<dyn Reporter>,
}

fn flags_path(session: &Session) -> String {
    format!("api/projects/{}/feature_flags", session.project)
}

fn flag_path(session: &Session, id: i64) -> String {
    format!("{}/{}", flags_path(session), id)
}

fn to_body<T: Serialize>(value: &T) -> ApplicationResult<Value> {
    serde_json::to_value(value).map_err(|e| ApplicationError::OperationFailed {
        context: "serialize request body".to_string(),
        source: Box::new(e),
    })
}

impl FlagService {
    pub fn new(
        session: Arc<SessionService>,
        api: ApiClient,
        selector: Arc<dyn Selector>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            session,
            api,
            selector,
            reporter,
        }
    }

    /// Choose a flag by key and show it. Returns None when the project has no flags.
    #[instrument(skip(self))]
    pub fn list(&self) -> ApplicationResult<Option<Value>> {
        let session = self.session.ready()?;
        let flags = self.fetch_flags(&session)?;
        if flags.is_empty() {
            self.reporter.info("no flags found");
            return Ok(None);
        }

        let items: Vec<SelectionItem> = flags
            .iter()
            .map(|f| SelectionItem {
                display: f.key.clone(),
                value: f.id.to_string(),
            })
            .collect();
        let selected = choose_one(self.selector.as_ref(), "Select flag", &items)?;
        let flag = flags
            .iter()
            .find(|f| f.id.to_string() == selected.value)
            .ok_or_else(|| DomainError::FlagNotFound(selected.display.clone()))?;
        debug!("Selected flag: {}: {}", flag.key, flag.id);

        self.show_in(&session, flag.id).map(Some)
    }

    /// Fetch one flag and print its full JSON body.
    #[instrument(skip(self))]
    pub fn show(&self, id: i64) -> ApplicationResult<Value> {
        let session = self.session.ready()?;
        self.show_in(&session, id)
    }

    /// Create a flag with a single release group at `rollout` percent.
    #[instrument(skip(self))]
    pub fn create(&self, key: &str, description: &str, rollout: u32) -> ApplicationResult<()> {
        let rollout = RolloutPercentage::new(rollout)?;
        let session = self.session.ready()?;

        let body = to_body(&NewFeatureFlag::new(key, description, rollout))?;
        self.api.send(
            HttpMethod::Post,
            &flags_path(&session),
            session.headers(),
            vec![],
            Some(body),
            CREATED,
        )?;

        self.reporter.success(&format!("Flag {key} created"));
        Ok(())
    }

    /// Soft-delete the flag with `key`.
    #[instrument(skip(self))]
    pub fn delete(&self, key: &str) -> ApplicationResult<()> {
        let session = self.session.ready()?;
        let flag = self.find_flag(&session, key)?;

        self.api.patch(
            &flag_path(&session, flag.id),
            session.headers(),
            json!({"name": key, "id": flag.id, "deleted": true}),
        )?;

        self.reporter.success(&format!("Flag {key} deleted"));
        Ok(())
    }

    /// Enable (`active = true`) or disable the flag with `key`.
    #[instrument(skip(self))]
    pub fn set_active(&self, key: &str, active: bool) -> ApplicationResult<()> {
        let session = self.session.ready()?;
        let flag = self.find_flag(&session, key)?;

        self.api.patch(
            &flag_path(&session, flag.id),
            session.headers(),
            json!({"active": active}),
        )?;

        let state = if active { "enabled" } else { "disabled" };
        self.reporter.success(&format!("Flag {key} {state}"));
        Ok(())
    }

    /// Change description and/or rollout, patching the whole record back.
    ///
    /// With neither given this only prints a message and makes no request.
    #[instrument(skip(self))]
    pub fn update(
        &self,
        key: &str,
        description: Option<&str>,
        rollout: Option<u32>,
    ) -> ApplicationResult<()> {
        if description.is_none() && rollout.is_none() {
            self.reporter
                .info("nothing to update: pass a description or a rollout percentage");
            return Ok(());
        }
        let rollout = rollout.map(RolloutPercentage::new).transpose()?;

        let session = self.session.ready()?;
        let mut flag = self.find_flag(&session, key)?;
        if let Some(description) = description {
            flag.name = Some(description.to_string());
        }
        if let Some(rollout) = rollout {
            flag.set_rollout(rollout);
        }

        self.api
            .patch(&flag_path(&session, flag.id), session.headers(), to_body(&flag)?)?;

        self.reporter.success(&format!("Flag {key} updated"));
        Ok(())
    }

    fn show_in(&self, session: &Session, id: i64) -> ApplicationResult<Value> {
        let value: Value = self
            .api
            .get_json(&flag_path(session, id), session.headers())?;
        let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
        self.reporter.data(&pretty);
        Ok(value)
    }

    fn fetch_flags(&self, session: &Session) -> ApplicationResult<Vec<FeatureFlag>> {
        let page: ResultsPage<FeatureFlag> =
            self.api.get_json(&flags_path(session), session.headers())?;
        debug!("fetched {} flags", page.results.len());
        Ok(page.results)
    }

    /// First flag whose key matches; duplicates beyond the first are ignored.
    fn find_flag(&self, session: &Session, key: &str) -> ApplicationResult<FeatureFlag> {
        self.fetch_flags(session)?
            .into_iter()
            .find(|f| f.key == key)
            .ok_or_else(|| DomainError::FlagNotFound(key.to_string()).into())
    }
}
