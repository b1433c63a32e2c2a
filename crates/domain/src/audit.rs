//! Audit ledger entity types.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use panelist_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::UserId;

/// Key fragments that must never be persisted in audit extra data.
pub const SENSITIVE_KEY_FRAGMENTS: &[&str] =
    &["password", "passwd", "secret", "token", "credential"];

/// Stable audit action types recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Successful authentication.
    Login,
    /// Session ended by the principal.
    Logout,
    /// Rejected authentication attempt.
    LoginFailed,
    /// Privileged creation of a tracked resource.
    AdminCreate,
    /// Privileged update of a tracked resource.
    AdminUpdate,
    /// Privileged deletion of a tracked resource.
    AdminDelete,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::LoginFailed => "LOGIN_FAILED",
            Self::AdminCreate => "ADMIN_CREATE",
            Self::AdminUpdate => "ADMIN_UPDATE",
            Self::AdminDelete => "ADMIN_DELETE",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AuditAction] = &[
            AuditAction::Login,
            AuditAction::Logout,
            AuditAction::LoginFailed,
            AuditAction::AdminCreate,
            AuditAction::AdminUpdate,
            AuditAction::AdminDelete,
        ];

        ALL
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "LOGIN" => Ok(Self::Login),
            "LOGOUT" => Ok(Self::Logout),
            "LOGIN_FAILED" => Ok(Self::LoginFailed),
            "ADMIN_CREATE" => Ok(Self::AdminCreate),
            "ADMIN_UPDATE" => Ok(Self::AdminUpdate),
            "ADMIN_DELETE" => Ok(Self::AdminDelete),
            _ => Err(AppError::Validation(format!(
                "unknown audit action '{value}'"
            ))),
        }
    }
}

/// Scalar value allowed in audit extra data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditScalar {
    /// Explicit null.
    Null,
    /// Boolean flag.
    Boolean(bool),
    /// Signed integer.
    Integer(i64),
    /// Short text.
    Text(String),
}

impl From<&str> for AuditScalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AuditScalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AuditScalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for AuditScalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T: Into<AuditScalar>> From<Option<T>> for AuditScalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Structured string-to-scalar map stored with an audit entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtraData(BTreeMap<String, AuditScalar>);

impl ExtraData {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builds the change summary for one updated field.
    #[must_use]
    pub fn field_change(
        field: &str,
        from: impl Into<AuditScalar>,
        to: impl Into<AuditScalar>,
    ) -> Self {
        Self::new()
            .with("field", field)
            .with("from", from)
            .with("to", to)
    }

    /// Returns the map with one more entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AuditScalar>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AuditScalar>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AuditScalar> {
        self.0.get(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AuditScalar)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes entries whose key looks like secret material and returns
    /// the removed keys.
    pub fn remove_sensitive_keys(&mut self) -> Vec<String> {
        let sensitive: Vec<String> = self
            .0
            .keys()
            .filter(|key| is_sensitive_key(key))
            .cloned()
            .collect();

        for key in &sensitive {
            self.0.remove(key);
        }

        sensitive
    }

    /// Converts the map into a JSON object.
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        AuditScalar::Null => Value::Null,
                        AuditScalar::Boolean(flag) => Value::Bool(*flag),
                        AuditScalar::Integer(number) => Value::from(*number),
                        AuditScalar::Text(text) => Value::String(text.clone()),
                    };
                    (key.clone(), value)
                })
                .collect(),
        )
    }

    /// Parses a JSON object of scalars.
    pub fn from_json_value(value: Value) -> AppResult<Self> {
        let Value::Object(object) = value else {
            return Err(AppError::Validation(
                "audit extra data must be a JSON object".to_owned(),
            ));
        };

        object
            .into_iter()
            .map(|(key, value)| {
                let scalar = match value {
                    Value::Null => AuditScalar::Null,
                    Value::Bool(flag) => AuditScalar::Boolean(flag),
                    Value::Number(number) => number.as_i64().map(AuditScalar::Integer).ok_or_else(
                        || {
                            AppError::Validation(format!(
                                "audit extra data '{key}' must be an integer"
                            ))
                        },
                    )?,
                    Value::String(text) => AuditScalar::Text(text),
                    Value::Array(_) | Value::Object(_) => {
                        return Err(AppError::Validation(format!(
                            "audit extra data '{key}' must be a scalar"
                        )));
                    }
                };
                Ok((key, scalar))
            })
            .collect::<AppResult<BTreeMap<_, _>>>()
            .map(Self)
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let lowered = key.to_ascii_lowercase();
    SENSITIVE_KEY_FRAGMENTS
        .iter()
        .any(|fragment| lowered.contains(fragment))
}

/// Normalized (type, id) pair identifying an audited resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuditResource {
    resource_type: String,
    resource_id: String,
}

impl AuditResource {
    /// Creates a resource reference.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Returns the resource type tag.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.resource_type.as_str()
    }

    /// Returns the resource identifier.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        self.resource_id.as_str()
    }
}

/// Value that can be referenced from an audit entry.
pub trait Auditable {
    /// Returns the detached (type, id) reference.
    fn audit_resource(&self) -> AuditResource;
}

impl Auditable for AuditResource {
    fn audit_resource(&self) -> AuditResource {
        self.clone()
    }
}

/// Content of one audit entry before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    /// Acting principal, `None` for anonymous actors.
    pub actor_id: Option<UserId>,
    /// Action type.
    pub action: AuditAction,
    /// Resource type tag, empty when no resource applies.
    pub resource_type: String,
    /// Resource identifier, empty when no resource applies.
    pub resource_id: String,
    /// Origin IP of the request, if known.
    pub ip_address: Option<String>,
    /// Client identifier (user agent), if known.
    pub client_id: Option<String>,
    /// Structured scalar details.
    pub extra_data: ExtraData,
}

/// Persisted, immutable audit ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    id: Uuid,
    created_at: DateTime<Utc>,
    record: AuditRecord,
}

impl AuditLogEntry {
    /// Rebuilds an entry from storage.
    #[must_use]
    pub fn from_storage(id: Uuid, created_at: DateTime<Utc>, record: AuditRecord) -> Self {
        Self {
            id,
            created_at,
            record,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the server-side creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the recorded content.
    #[must_use]
    pub fn record(&self) -> &AuditRecord {
        &self.record
    }

    /// Returns the action type.
    #[must_use]
    pub fn action(&self) -> AuditAction {
        self.record.action
    }

    /// Returns the acting principal.
    #[must_use]
    pub fn actor_id(&self) -> Option<UserId> {
        self.record.actor_id
    }
}
