//! Debounced autosave for edited files
//!
//! Each edit reschedules the save of its tab; the save only happens once
//! the tab has been quiet for the configured delay. Unsaved files are never
//! autosaved, they need a name first.

use owl_core::TabId;
use owl_settings::EditorSettings;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::tab_session::{SaveOutcome, TabSession};

pub struct Autosave {
    delay: Duration,
    pending: Mutex<HashMap<TabId, JoinHandle<()>>>,
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self::new(Duration::from_millis(settings.autosave_delay_ms))
    }

    /// (Re)start the save timer for `session`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, session: Arc<TabSession>) {
        let tab_id = session.id();
        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if session.is_closed() || session.file_id().is_none() {
                return;
            }
            tracing::debug!(tab_id = %session.id(), "autosaving");
            match session.save(None).await {
                Ok(SaveOutcome::Failed(e)) => {
                    tracing::warn!(tab_id = %session.id(), error = %e, "autosave rejected");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(tab_id = %session.id(), error = %e, "autosave failed");
                }
            }
        });

        if let Some(previous) = self.pending.lock().insert(tab_id, task) {
            previous.abort();
        }
    }

    /// Drop a pending save, e.g. because the tab was closed
    pub fn cancel(&self, tab_id: TabId) {
        if let Some(task) = self.pending.lock().remove(&tab_id) {
            task.abort();
        }
    }

    /// Number of saves still waiting to run
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        for (_, task) in self.pending.lock().drain() {
            task.abort();
        }
    }
}
