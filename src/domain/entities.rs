//! Domain entities: core data structures

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::domain::DomainError;

/// Token and selections stored for one backend endpoint.
///
/// Empty strings mean "not selected yet". A record with a token but no
/// organization is valid while setup is still in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRecord {
    pub token: String,
    pub organization: String,
    pub project: String,
}

impl SessionRecord {
    /// Record holding only a freshly acquired token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn has_organization(&self) -> bool {
        !self.organization.is_empty()
    }

    pub fn has_project(&self) -> bool {
        !self.project.is_empty()
    }
}

/// The credential file as a whole: endpoint host -> session record.
///
/// Top-level keys other than `credentials` are kept so a rewrite does not drop them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialDocument {
    #[serde(default)]
    pub credentials: BTreeMap<String, SessionRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A fully resolved session: everything a project-scoped call needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub organization: String,
    pub project: String,
}

impl Session {
    /// Promote a stored record, failing on the first missing piece.
    pub fn from_record(record: &SessionRecord) -> Result<Self, DomainError> {
        if !record.has_token() {
            return Err(DomainError::IncompleteSession("token"));
        }
        if !record.has_organization() {
            return Err(DomainError::IncompleteSession("organization"));
        }
        if !record.has_project() {
            return Err(DomainError::IncompleteSession("project"));
        }
        Ok(Self {
            token: record.token.clone(),
            organization: record.organization.clone(),
            project: record.project.clone(),
        })
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        bearer_headers(&self.token)
    }
}

/// JSON content type plus bearer authorization.
pub fn bearer_headers(token: &str) -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Authorization".to_string(), format!("Bearer {token}")),
    ]
}

/// List envelope returned by the API (`{"results": [...]}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Organization or project as listed by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedResource {
    /// Organizations use UUID strings, projects use integers.
    pub id: Value,
    #[serde(default)]
    pub name: String,
}

impl NamedResource {
    pub fn id_string(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Validated rollout percentage (0..=100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloutPercentage(u8);

impl RolloutPercentage {
    pub fn new(value: u32) -> Result<Self, DomainError> {
        match u8::try_from(value) {
            Ok(v) if v <= 100 => Ok(Self(v)),
            _ => Err(DomainError::InvalidRollout(value)),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<RolloutPercentage> for Number {
    fn from(rollout: RolloutPercentage) -> Self {
        Number::from(rollout.value())
    }
}

/// Deserialize an explicit `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Feature flag as returned by the API.
///
/// Only the fields the client edits are typed; everything else rides along in
/// `extra` so a patched record round-trips without losing server fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFlag {
    pub id: i64,
    pub key: String,
    /// The server allows a null name; it is sent back as received.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filters: FlagFilters,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureFlag {
    /// Set the rollout of the first release group, creating one if the flag has none.
    pub fn set_rollout(&mut self, rollout: RolloutPercentage) {
        match self.filters.groups.first_mut() {
            Some(group) => group.rollout_percentage = Some(rollout.into()),
            None => self.filters.groups.push(FlagGroup::with_rollout(rollout)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagFilters {
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<FlagGroup>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Release condition group: property filters plus a rollout percentage.
///
/// Stored percentages may be fractional (`12.5`), so they are kept as JSON
/// numbers and only the ones this client writes are whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagGroup {
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Vec<Value>,
    #[serde(default)]
    pub rollout_percentage: Option<Number>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlagGroup {
    pub fn with_rollout(rollout: RolloutPercentage) -> Self {
        Self {
            rollout_percentage: Some(rollout.into()),
            ..Self::default()
        }
    }
}

/// Creation payload for `POST .../feature_flags`.
///
/// The server expects the full shape; fields the CLI does not expose are sent
/// as null/empty/false.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFeatureFlag {
    pub key: String,
    pub name: String,
    pub filters: FlagFilters,
    pub deleted: bool,
    pub active: bool,
    pub created_by: Option<Value>,
    pub created_at: Option<String>,
    pub is_simple_flag: bool,
    pub rollout_percentage: Option<u8>,
    pub ensure_experience_continuity: bool,
    pub experiment_set: Option<Vec<Value>>,
    pub features: Option<Vec<Value>>,
    pub rollback_conditions: Option<Vec<Value>>,
    pub surveys: Option<Vec<Value>>,
    pub performed_rollback: Option<bool>,
    pub can_edit: bool,
    pub tags: Vec<String>,
    pub usage_dashboard: Option<i64>,
    pub analytics_dashboards: Vec<i64>,
    pub has_enriched_analytics: bool,
}

impl NewFeatureFlag {
    pub fn new(key: &str, description: &str, rollout: RolloutPercentage) -> Self {
        let mut filter_extra = Map::new();
        filter_extra.insert("multivariate".to_string(), Value::Null);
        filter_extra.insert("payloads".to_string(), Value::Object(Map::new()));

        Self {
            key: key.to_string(),
            name: description.to_string(),
            filters: FlagFilters {
                groups: vec![FlagGroup::with_rollout(rollout)],
                extra: filter_extra,
            },
            deleted: false,
            active: true,
            created_by: None,
            created_at: None,
            is_simple_flag: false,
            rollout_percentage: None,
            ensure_experience_continuity: false,
            experiment_set: None,
            features: None,
            rollback_conditions: None,
            surveys: None,
            performed_rollback: None,
            can_edit: true,
            tags: vec![],
            usage_dashboard: None,
            analytics_dashboards: vec![],
            has_enriched_analytics: false,
        }
    }
}
