//! Data file registry

use owl_core::{DataFileApi, DataFileSummary, EventEmitter, FileId, Subscription};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub enum DataFileEvent {
    Loaded,
}

/// Cache of the data files known to the server
pub struct DataFileRegistry {
    api: Arc<dyn DataFileApi>,
    data_files: RwLock<Vec<DataFileSummary>>,
    events: EventEmitter<DataFileEvent>,
}

impl DataFileRegistry {
    pub fn new(api: Arc<dyn DataFileApi>) -> Self {
        Self {
            api,
            data_files: RwLock::new(Vec::new()),
            events: EventEmitter::new(),
        }
    }

    pub fn data_files(&self) -> Vec<DataFileSummary> {
        self.data_files.read().clone()
    }

    pub fn find_by_id(&self, id: FileId) -> Option<DataFileSummary> {
        self.data_files.read().iter().find(|f| f.id == id).cloned()
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&DataFileEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.subscribe(listener)
    }

    /// Replace the cache with the server listing; failures are only logged
    #[tracing::instrument(skip(self))]
    pub async fn fetch_data_files(&self) {
        match self.api.list().await {
            Ok(files) => {
                tracing::debug!(count = files.len(), "data file list refreshed");
                *self.data_files.write() = files;
                self.events.emit(&DataFileEvent::Loaded);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch data files");
            }
        }
    }
}
