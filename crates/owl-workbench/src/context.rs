//! Shared handles passed to every tab session

use owl_core::{Notification, Notifier, Services};
use owl_settings::EditorSettings;
use std::sync::Arc;

use crate::data_file_registry::DataFileRegistry;
use crate::script_registry::ScriptRegistry;

/// Everything a tab session needs besides its own state
pub struct WorkbenchContext {
    pub services: Services,
    pub notifier: Arc<dyn Notifier>,
    pub scripts: Arc<ScriptRegistry>,
    pub data_files: Arc<DataFileRegistry>,
    pub settings: EditorSettings,
}

impl WorkbenchContext {
    /// Build the context and the file registries it owns
    pub fn new(
        services: Services,
        notifier: Arc<dyn Notifier>,
        settings: EditorSettings,
    ) -> Arc<Self> {
        let scripts = Arc::new(ScriptRegistry::new(
            services.scripts.clone(),
            notifier.clone(),
        ));
        let data_files = Arc::new(DataFileRegistry::new(services.data_files.clone()));

        Arc::new(Self {
            services,
            notifier,
            scripts,
            data_files,
            settings,
        })
    }

    pub fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }
}
