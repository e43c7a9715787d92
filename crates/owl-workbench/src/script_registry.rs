//! Script registry
//!
//! Caches the list of script files known to the server and performs
//! create/upload/rename/delete, keeping the cache in step with the server.

use owl_core::{
    EventEmitter, FileId, Notification, Notifier, ScriptApi, ScriptSummary, Subscription,
    UploadForm,
};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::{WorkbenchError, WorkbenchResult};

/// Changes published by the [`ScriptRegistry`]
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptEvent {
    /// The cache was replaced by a fresh server listing
    Loaded,
    Created(ScriptSummary),
    Uploaded(ScriptSummary),
    /// A script was deleted; open tabs bound to it must go away
    Removed(FileId),
    Renamed(ScriptSummary),
}

/// Known scripts plus the operations that change them
pub struct ScriptRegistry {
    api: Arc<dyn ScriptApi>,
    notifier: Arc<dyn Notifier>,
    scripts: RwLock<Vec<ScriptSummary>>,
    events: EventEmitter<ScriptEvent>,
}

impl ScriptRegistry {
    pub fn new(api: Arc<dyn ScriptApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            scripts: RwLock::new(Vec::new()),
            events: EventEmitter::new(),
        }
    }

    /// Snapshot of the cached scripts, in server order
    pub fn scripts(&self) -> Vec<ScriptSummary> {
        self.scripts.read().clone()
    }

    pub fn find_by_id(&self, id: FileId) -> Option<ScriptSummary> {
        self.scripts.read().iter().find(|s| s.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.scripts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.read().is_empty()
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&ScriptEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.subscribe(listener)
    }

    /// Replace the cache with the server listing
    ///
    /// This is a background refresh: failures are logged, never shown.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_scripts(&self) {
        match self.api.list().await {
            Ok(scripts) => {
                tracing::debug!(count = scripts.len(), "script list refreshed");
                *self.scripts.write() = scripts;
                self.events.emit(&ScriptEvent::Loaded);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch script files");
            }
        }
    }

    /// Create a script on the server and add it to the cache
    ///
    /// Errors are reported to the user and handed back, so a caller
    /// waiting on the new id can abort.
    #[tracing::instrument(skip(self, name, content), fields(name = %name))]
    pub async fn create(
        &self,
        name: &str,
        content: Option<&str>,
    ) -> WorkbenchResult<ScriptSummary> {
        match self.api.create(name, content).await {
            Ok(script) => {
                tracing::info!(script_id = %script.id, "script created");
                self.scripts.write().push(script.clone());
                self.events.emit(&ScriptEvent::Created(script.clone()));
                self.notifier
                    .notify(Notification::success("Script file created successfully"));
                Ok(script)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create file");
                self.notifier
                    .notify(Notification::error(format!("Failed to create file {}", e)));
                Err(WorkbenchError::Persist(e))
            }
        }
    }

    /// Upload a script file
    ///
    /// Outcome is only visible through notices and the cache.
    #[tracing::instrument(skip(self, form), fields(file_name = %form.file_name, size = form.bytes.len()))]
    pub async fn upload(&self, form: UploadForm) {
        match self.api.upload(form).await {
            Ok(script) => {
                tracing::info!(script_id = %script.id, "script uploaded");
                self.scripts.write().push(script.clone());
                self.events.emit(&ScriptEvent::Uploaded(script));
                self.notifier
                    .notify(Notification::success("Script file uploaded successfully"));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to upload file");
                self.notifier.notify(Notification::error(format!(
                    "Failed to upload script file {}",
                    e
                )));
            }
        }
    }

    /// Delete a script; subscribers close any tab bound to it
    #[tracing::instrument(skip(self, id), fields(script_id = %id))]
    pub async fn remove_script(&self, id: FileId) {
        match self.api.delete(id).await {
            Ok(()) => {
                self.scripts.write().retain(|s| s.id != id);
                self.events.emit(&ScriptEvent::Removed(id));
                tracing::info!("script deleted");
                self.notifier
                    .notify(Notification::success("Script file deleted successfully"));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to delete script");
                self.notifier.notify(Notification::error(format!(
                    "Failed to delete script file: {}",
                    e
                )));
            }
        }
    }

    /// Rename a script, replacing the cached entry with the server's copy
    ///
    /// Returns the updated summary, or `None` when the rename failed
    /// (the failure has already been reported).
    #[tracing::instrument(skip(self, id, name), fields(script_id = %id, name = %name))]
    pub async fn rename_script(&self, id: FileId, name: &str) -> Option<ScriptSummary> {
        match self.api.rename(id, name).await {
            Ok(script) => {
                {
                    let mut scripts = self.scripts.write();
                    if let Some(entry) = scripts.iter_mut().find(|s| s.id == id) {
                        *entry = script.clone();
                    }
                }
                self.events.emit(&ScriptEvent::Renamed(script.clone()));
                self.notifier
                    .notify(Notification::success("Script file renamed successfully"));
                Some(script)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to rename script");
                self.notifier.notify(Notification::error(format!(
                    "Failed to rename script file: {}",
                    e
                )));
                None
            }
        }
    }

    /// Fetch a script's content, reporting failures before handing them back
    #[tracing::instrument(skip(self, id), fields(script_id = %id))]
    pub async fn get_script_content(&self, id: FileId) -> WorkbenchResult<String> {
        self.api.fetch_content(id).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to get script content");
            self.notifier
                .notify(Notification::error("Failed to get script content"));
            WorkbenchError::Fetch(e)
        })
    }

    /// Persist a script's content
    #[tracing::instrument(skip(self, id, content), fields(script_id = %id, content_len = content.len()))]
    pub async fn save_script_content(&self, id: FileId, content: &str) -> WorkbenchResult<()> {
        self.api
            .update_content(id, content)
            .await
            .map_err(WorkbenchError::Persist)
    }
}
