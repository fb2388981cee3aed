//! API key record and the payloads exchanged with the store

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::DomainError;

/// Opaque record identifier assigned by the store
///
/// Row stores hand these out either as text (uuid) or as integers, so both
/// are accepted on the wire and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "WireApiKeyId", into = "String")]
pub struct ApiKeyId(String);

impl ApiKeyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireApiKeyId {
    Text(String),
    Number(i64),
}

impl From<WireApiKeyId> for ApiKeyId {
    fn from(raw: WireApiKeyId) -> Self {
        match raw {
            WireApiKeyId::Text(s) => Self(s),
            WireApiKeyId::Number(n) => Self(n.to_string()),
        }
    }
}

impl From<ApiKeyId> for String {
    fn from(id: ApiKeyId) -> Self {
        id.0
    }
}

impl From<&str> for ApiKeyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ApiKeyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Environment a key was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    #[default]
    Dev,
    Prod,
}

impl KeyType {
    /// Tag embedded in generated key material
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Prod => "prod",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dev => "Development",
            Self::Prod => "Production",
        }
    }

    /// Advertised rate-limit tier. Display only, nothing enforces it.
    pub fn rate_limit_per_minute(&self) -> u32 {
        match self {
            Self::Dev => 100,
            Self::Prod => 1_000,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(DomainError::validation(format!(
                "Unknown key type '{}', expected 'dev' or 'prod'",
                other
            ))),
        }
    }
}

/// A persisted API key row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    id: ApiKeyId,
    name: String,
    key: String,
    #[serde(rename = "type", default)]
    key_type: KeyType,
    #[serde(default, deserialize_with = "null_as_zero")]
    usage: u64,
    #[serde(default)]
    limits: Option<u64>,
    created_at: DateTime<Utc>,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

impl ApiKeyRecord {
    pub fn new(
        id: impl Into<ApiKeyId>,
        name: impl Into<String>,
        key: impl Into<String>,
        key_type: KeyType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            key: key.into(),
            key_type,
            usage: 0,
            limits: None,
            created_at,
        }
    }

    pub fn with_usage(mut self, usage: u64) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_limits(mut self, limits: Option<u64>) -> Self {
        self.limits = limits;
        self
    }

    pub fn id(&self) -> &ApiKeyId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn usage(&self) -> u64 {
        self.usage
    }

    pub fn limits(&self) -> Option<u64> {
        self.limits
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether usage has reached the monthly limit, if one is set
    pub fn is_over_limit(&self) -> bool {
        self.limits.is_some_and(|limit| self.usage >= limit)
    }

    /// Apply a partial update the way the store would
    pub fn apply(&mut self, changes: &ApiKeyChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(key_type) = changes.key_type {
            self.key_type = key_type;
        }
        if let Some(limits) = changes.limits {
            self.limits = limits;
        }
        if let Some(usage) = changes.usage {
            self.usage = usage;
        }
    }

    /// Public view of the record that never carries the secret
    pub fn summary(&self) -> ApiKeySummary {
        ApiKeySummary {
            id: self.id.clone(),
            name: self.name.clone(),
            usage: self.usage,
            created_at: self.created_at,
        }
    }
}

/// Insert payload; `id` and `created_at` are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewApiKey {
    pub name: String,
    pub key: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub usage: u64,
    pub limits: Option<u64>,
}

/// Partial update payload
///
/// Absent fields are left untouched. `limits: Some(None)` clears the limit
/// and is sent as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiKeyChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub key_type: Option<KeyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<Option<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<u64>,
}

impl ApiKeyChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_key_type(mut self, key_type: KeyType) -> Self {
        self.key_type = Some(key_type);
        self
    }

    pub fn with_limits(mut self, limits: Option<u64>) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_usage(mut self, usage: u64) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.key_type.is_none()
            && self.limits.is_none()
            && self.usage.is_none()
    }
}

/// What a key lookup may reveal about a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiKeySummary {
    pub id: ApiKeyId,
    pub name: String,
    pub usage: u64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_accepts_owned_id() {
        let id = uuid::Uuid::new_v4().to_string();
        let record = ApiKeyRecord::new(id.clone(), "k1", "tvly-dev-abc", KeyType::Dev, Utc::now());

        assert_eq!(record.id().as_str(), id);
        assert_eq!(ApiKeyId::from(id.clone()), ApiKeyId::new(id));
    }

    #[test]
    fn test_deserialize_row_with_uuid_id() {
        let row = json!({
            "id": "6f1c0e1a-8c7e-4a9b-9d43-2f7b1f0c9a11",
            "name": "k1",
            "key": "tvly-dev-abc",
            "type": "dev",
            "usage": 12,
            "limits": null,
            "created_at": "2024-11-02T10:15:30.123456+00:00"
        });

        let record: ApiKeyRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.id().as_str(), "6f1c0e1a-8c7e-4a9b-9d43-2f7b1f0c9a11");
        assert_eq!(record.key_type(), KeyType::Dev);
        assert_eq!(record.usage(), 12);
        assert_eq!(record.limits(), None);
    }

    #[test]
    fn test_deserialize_row_with_numeric_id_and_null_usage() {
        let row = json!({
            "id": 42,
            "name": "k2",
            "key": "tvly-prod-xyz",
            "type": "prod",
            "usage": null,
            "limits": 500,
            "created_at": "2024-11-02T10:15:30Z"
        });

        let record: ApiKeyRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.id().as_str(), "42");
        assert_eq!(record.usage(), 0);
        assert_eq!(record.limits(), Some(500));
    }

    #[test]
    fn test_changes_serialize_cleared_limit_as_null() {
        let changes = ApiKeyChanges::new().with_name("k1").with_limits(None);
        let value = serde_json::to_value(&changes).unwrap();

        assert_eq!(value, json!({ "name": "k1", "limits": null }));
    }

    #[test]
    fn test_changes_skip_absent_fields() {
        let value = serde_json::to_value(ApiKeyChanges::new().with_usage(7)).unwrap();
        assert_eq!(value, json!({ "usage": 7 }));
        assert!(ApiKeyChanges::new().is_empty());
    }

    #[test]
    fn test_new_key_serializes_type_field() {
        let new_key = NewApiKey {
            name: "k1".to_string(),
            key: "tvly-prod-abc".to_string(),
            key_type: KeyType::Prod,
            usage: 0,
            limits: Some(1000),
        };
        let value = serde_json::to_value(&new_key).unwrap();
        assert_eq!(value["type"], "prod");
        assert_eq!(value["limits"], 1000);
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_key_type_parsing_and_tiers() {
        assert_eq!("prod".parse::<KeyType>().unwrap(), KeyType::Prod);
        assert_eq!("Development".parse::<KeyType>().unwrap(), KeyType::Dev);
        assert!("staging".parse::<KeyType>().is_err());

        assert_eq!(KeyType::Dev.rate_limit_per_minute(), 100);
        assert_eq!(KeyType::Prod.rate_limit_per_minute(), 1_000);
        assert_eq!(KeyType::Prod.label(), "Production");
    }

    #[test]
    fn test_apply_changes() {
        let mut record = ApiKeyRecord::new("1", "k1", "tvly-dev-abc", KeyType::Dev, Utc::now())
            .with_limits(Some(10));

        record.apply(&ApiKeyChanges::new().with_key_type(KeyType::Prod).with_limits(None));

        assert_eq!(record.key_type(), KeyType::Prod);
        assert_eq!(record.limits(), None);
        assert_eq!(record.key(), "tvly-dev-abc");
    }

    #[test]
    fn test_over_limit() {
        let record = ApiKeyRecord::new("1", "k1", "tvly-dev-abc", KeyType::Dev, Utc::now())
            .with_usage(500)
            .with_limits(Some(500));
        assert!(record.is_over_limit());
        assert!(!record.clone().with_limits(None).is_over_limit());
    }
}
