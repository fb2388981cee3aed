//! Transient create/edit form state

use super::entity::{ApiKeyChanges, ApiKeyId, ApiKeyRecord, KeyType, NewApiKey};

/// Limit pre-filled when a monthly limit is switched on
pub const DEFAULT_MONTHLY_LIMIT: u64 = 1_000;

/// Pending values of the create/edit form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftForm {
    pub name: String,
    pub key_type: KeyType,
    pub limit_enabled: bool,
    pub limits: Option<u64>,
    pub usage: u64,
}

impl DraftForm {
    /// Populate a draft from an existing record
    pub fn from_record(record: &ApiKeyRecord) -> Self {
        Self {
            name: record.name().to_string(),
            key_type: record.key_type(),
            limit_enabled: record.limits().is_some(),
            limits: record.limits(),
            usage: record.usage(),
        }
    }

    /// Toggle the monthly limit, pre-filling the default when none is set
    pub fn set_limit_enabled(&mut self, enabled: bool) {
        self.limit_enabled = enabled;
        if enabled && self.limits.is_none() {
            self.limits = Some(DEFAULT_MONTHLY_LIMIT);
        }
    }

    /// The limit that is actually persisted
    pub fn effective_limits(&self) -> Option<u64> {
        if self.limit_enabled { self.limits } else { None }
    }

    /// Insert payload for a freshly generated key
    pub fn to_new_key(&self, key: String) -> NewApiKey {
        NewApiKey {
            name: self.name.trim().to_string(),
            key,
            key_type: self.key_type,
            usage: self.usage,
            limits: self.effective_limits(),
        }
    }

    /// Editable fields as an update payload; the key itself is never included
    pub fn to_changes(&self) -> ApiKeyChanges {
        ApiKeyChanges::new()
            .with_name(self.name.trim())
            .with_key_type(self.key_type)
            .with_limits(self.effective_limits())
            .with_usage(self.usage)
    }
}

/// Which form, if any, is open
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    CreatingNew,
    Editing(ApiKeyId),
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Id of the record being edited
    pub fn editing(&self) -> Option<&ApiKeyId> {
        match self {
            Self::Editing(id) => Some(id),
            _ => None,
        }
    }
}
