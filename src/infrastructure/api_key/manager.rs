//! API key lifecycle manager
//!
//! Owns the dashboard's view of the key collection together with the
//! create/edit form, and mediates between user actions and the store. Every
//! mutation is followed by a refetch; the local collection is never patched
//! with rows the client computed itself.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::domain::api_key::{
    validate_key_name, ApiKeyId, ApiKeyRecord, ApiKeyStore, DraftForm, ModalState,
};
use crate::domain::{Clipboard, DomainError, Notifier};

use super::generator::ApiKeyGenerator;
use super::redaction::display_key;
use super::usage::{MeteredUsage, UsageSource, UsageSyncReport};

/// Snapshot-replaced state shared with the presentation layer
#[derive(Debug, Default)]
struct ManagerState {
    keys: Arc<Vec<ApiKeyRecord>>,
    visible: Arc<HashSet<ApiKeyId>>,
    draft: DraftForm,
    modal: ModalState,
    /// Bumped each time a form is opened or cancelled
    form_generation: u64,
}

impl ManagerState {
    fn reset_form(&mut self, draft: DraftForm, modal: ModalState) {
        self.draft = draft;
        self.modal = modal;
        self.form_generation = self.form_generation.wrapping_add(1);
    }
}

pub struct KeyLifecycleManager {
    store: Arc<dyn ApiKeyStore>,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn Clipboard>,
    generator: ApiKeyGenerator,
    usage_source: Arc<dyn UsageSource>,
    state: RwLock<ManagerState>,
}

impl std::fmt::Debug for KeyLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyLifecycleManager")
            .field("generator", &self.generator)
            .field("usage_source", &self.usage_source.name())
            .finish_non_exhaustive()
    }
}

impl KeyLifecycleManager {
    pub fn new(
        store: Arc<dyn ApiKeyStore>,
        notifier: Arc<dyn Notifier>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            store,
            notifier,
            clipboard,
            generator: ApiKeyGenerator::default(),
            usage_source: Arc::new(MeteredUsage),
            state: RwLock::new(ManagerState::default()),
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Create with a different usage source
    pub fn with_usage_source(mut self, usage_source: Arc<dyn UsageSource>) -> Self {
        self.usage_source = usage_source;
        self
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Current key collection
    pub async fn keys(&self) -> Arc<Vec<ApiKeyRecord>> {
        Arc::clone(&self.state.read().await.keys)
    }

    /// Ids currently shown unmasked
    pub async fn visible_ids(&self) -> Arc<HashSet<ApiKeyId>> {
        Arc::clone(&self.state.read().await.visible)
    }

    pub async fn draft(&self) -> DraftForm {
        self.state.read().await.draft.clone()
    }

    pub async fn modal(&self) -> ModalState {
        self.state.read().await.modal.clone()
    }

    pub async fn find(&self, id: &ApiKeyId) -> Option<ApiKeyRecord> {
        self.state
            .read()
            .await
            .keys
            .iter()
            .find(|k| k.id() == id)
            .cloned()
    }

    pub async fn is_visible(&self, id: &ApiKeyId) -> bool {
        self.state.read().await.visible.contains(id)
    }

    /// Key string as it should be shown right now
    pub async fn display_key(&self, record: &ApiKeyRecord) -> String {
        display_key(record.key(), self.is_visible(record.id()).await)
    }

    // ------------------------------------------------------------------
    // Collection
    // ------------------------------------------------------------------

    /// Replace the collection with the store's current rows
    ///
    /// On failure the existing collection is kept.
    pub async fn refresh(&self) -> Result<usize, DomainError> {
        match self.store.list().await {
            Ok(keys) => {
                let count = keys.len();
                self.state.write().await.keys = Arc::new(keys);
                debug!(count, "API keys refreshed");
                Ok(count)
            }
            Err(e) => {
                error!(error = %e, "Error fetching API keys");
                self.notifier
                    .error(&format!("Failed to load API keys: {}", e.message()));
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Form
    // ------------------------------------------------------------------

    /// Open an empty form for a new key
    pub async fn begin_create(&self) {
        self.state
            .write()
            .await
            .reset_form(DraftForm::default(), ModalState::CreatingNew);
    }

    /// Open the form pre-filled from an existing key
    pub async fn begin_edit(&self, record: &ApiKeyRecord) {
        self.state.write().await.reset_form(
            DraftForm::from_record(record),
            ModalState::Editing(record.id().clone()),
        );
    }

    /// Apply a change to the pending form values
    pub async fn update_draft<F>(&self, edit: F)
    where
        F: FnOnce(&mut DraftForm),
    {
        edit(&mut self.state.write().await.draft);
    }

    /// Close the form and discard its values
    pub async fn cancel(&self) {
        self.state
            .write()
            .await
            .reset_form(DraftForm::default(), ModalState::Closed);
    }

    /// Persist the open form
    ///
    /// Creates a key when the form was opened with `begin_create`, otherwise
    /// updates the key being edited. On failure the form stays open with its
    /// values intact.
    pub async fn submit(&self) -> Result<ApiKeyRecord, DomainError> {
        let (modal, draft, generation) = {
            let state = self.state.read().await;
            (state.modal.clone(), state.draft.clone(), state.form_generation)
        };

        let result = match &modal {
            ModalState::Closed => Err(DomainError::validation("No API key form is open")),
            ModalState::CreatingNew => self.create_from(&draft).await,
            ModalState::Editing(id) => self.update_from(id, &draft).await,
        };

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Error saving API key");
                self.notifier.error(e.message());
                return Err(e);
            }
        };

        self.close_if_unchanged(generation).await;

        let message = match modal {
            ModalState::Editing(_) => "API key updated successfully",
            _ => "API key created successfully",
        };
        info!(id = %record.id(), "{}", message);
        self.notifier.success(message);

        // A failed refetch notifies on its own; the write already happened
        if let Err(e) = self.refresh().await {
            debug!(error = %e, "Refresh after save failed");
        }

        Ok(record)
    }

    async fn create_from(&self, draft: &DraftForm) -> Result<ApiKeyRecord, DomainError> {
        validate_key_name(&draft.name)?;

        let key = self.generator.generate(draft.key_type);
        info!(name = %draft.name.trim(), key_type = %draft.key_type, "Creating API key");

        self.store.create(draft.to_new_key(key)).await
    }

    async fn update_from(
        &self,
        id: &ApiKeyId,
        draft: &DraftForm,
    ) -> Result<ApiKeyRecord, DomainError> {
        info!(id = %id, "Updating API key");
        self.store.update(id, draft.to_changes()).await
    }

    /// Close the form unless the user opened or cancelled one since `generation`
    async fn close_if_unchanged(&self, generation: u64) {
        let mut state = self.state.write().await;
        if state.form_generation == generation {
            state.modal = ModalState::Closed;
            state.draft = DraftForm::default();
        }
    }

    // ------------------------------------------------------------------
    // Row actions
    // ------------------------------------------------------------------

    /// Delete a key and drop it from the local view
    pub async fn remove(&self, id: &ApiKeyId) -> Result<(), DomainError> {
        if let Err(e) = self.store.delete(id).await {
            error!(id = %id, error = %e, "Error deleting API key");
            self.notifier.error("Failed to delete API key");
            return Err(e);
        }

        {
            let mut state = self.state.write().await;
            let keys: Vec<ApiKeyRecord> =
                state.keys.iter().filter(|k| k.id() != id).cloned().collect();
            state.keys = Arc::new(keys);

            if state.visible.contains(id) {
                let mut visible = (*state.visible).clone();
                visible.remove(id);
                state.visible = Arc::new(visible);
            }
        }

        info!(id = %id, "API key deleted");
        self.notifier.success("API key deleted successfully");
        Ok(())
    }

    /// Flip whether a key is shown unmasked; returns the new state
    pub async fn toggle_visibility(&self, id: &ApiKeyId) -> bool {
        let mut state = self.state.write().await;
        let mut visible = (*state.visible).clone();

        let revealed = if visible.remove(id) {
            false
        } else {
            visible.insert(id.clone());
            true
        };

        state.visible = Arc::new(visible);
        revealed
    }

    /// Copy a key to the clipboard
    pub async fn copy(&self, key: &str) -> Result<(), DomainError> {
        match self.clipboard.write_text(key).await {
            Ok(()) => {
                self.notifier.success("API key copied to clipboard");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Error copying API key");
                self.notifier
                    .error(&format!("Failed to copy API key: {}", e.message()));
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Usage
    // ------------------------------------------------------------------

    /// Push fresh usage values for every key, then refetch once
    ///
    /// Works on a snapshot of the collection. One key failing does not stop
    /// the others.
    pub async fn sync_usage(&self) -> UsageSyncReport {
        let snapshot = self.keys().await;
        let mut report = UsageSyncReport::default();

        for record in snapshot.iter() {
            let Some(usage) = self.usage_source.next_usage(record) else {
                continue;
            };

            report.attempted += 1;
            if let Err(e) = self.store.set_usage(record.id(), usage).await {
                report.failed += 1;
                warn!(id = %record.id(), error = %e, "Error updating usage");
            }
        }

        if report.failed > 0 {
            self.notifier.error(&format!(
                "Failed to update usage for {} API key(s)",
                report.failed
            ));
        }

        report.refreshed = self.refresh().await.is_ok();

        debug!(
            source = self.usage_source.name(),
            attempted = report.attempted,
            failed = report.failed,
            "Usage sync finished"
        );

        report
    }
}
