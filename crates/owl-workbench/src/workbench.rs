//! Application-wide wiring of the registries

use owl_core::{FileType, Notifier, Services, Subscription, TabId};
use owl_settings::{EditorSettings, WorkbenchSettings};
use std::sync::Arc;

use crate::autosave::Autosave;
use crate::context::WorkbenchContext;
use crate::data_file_registry::DataFileRegistry;
use crate::editor_registry::{EditorEvent, EditorRegistry};
use crate::script_registry::{ScriptEvent, ScriptRegistry};

/// Owns the registries for the lifetime of the application
///
/// Created once at startup and handed to whatever needs it. Deleting a
/// script through the [`ScriptRegistry`] closes the tab showing it, and
/// closing a tab drops its pending autosave.
pub struct Workbench {
    ctx: Arc<WorkbenchContext>,
    editor: Arc<EditorRegistry>,
    autosave: Arc<Autosave>,
    _subscriptions: Vec<Subscription>,
}

impl Workbench {
    pub fn new(
        services: Services,
        notifier: Arc<dyn Notifier>,
        settings: &WorkbenchSettings,
    ) -> Self {
        let ctx = WorkbenchContext::new(services, notifier, settings.editor.clone());
        let editor = Arc::new(EditorRegistry::new(ctx.clone()));
        let autosave = Arc::new(Autosave::from_settings(&settings.editor));

        let removed_scripts = {
            let editor = Arc::downgrade(&editor);
            ctx.scripts.subscribe(move |event| {
                if let ScriptEvent::Removed(id) = event {
                    if let Some(editor) = editor.upgrade() {
                        let closed = editor.close_file_tabs(*id, FileType::ScriptFile);
                        tracing::debug!(script_id = %id, closed, "closed tabs of deleted script");
                    }
                }
            })
        };

        let closed_tabs = {
            let autosave = Arc::downgrade(&autosave);
            editor.subscribe(move |event| {
                if let EditorEvent::TabClosed(id) = event {
                    if let Some(autosave) = autosave.upgrade() {
                        autosave.cancel(*id);
                    }
                }
            })
        };

        tracing::info!("workbench initialized");

        Self {
            ctx,
            editor,
            autosave,
            _subscriptions: vec![removed_scripts, closed_tabs],
        }
    }

    /// Load the script and data file listings
    pub async fn initialize(&self) {
        tokio::join!(
            self.ctx.scripts.fetch_scripts(),
            self.ctx.data_files.fetch_data_files()
        );
    }

    pub fn editor(&self) -> &Arc<EditorRegistry> {
        &self.editor
    }

    pub fn scripts(&self) -> &Arc<ScriptRegistry> {
        &self.ctx.scripts
    }

    pub fn data_files(&self) -> &Arc<DataFileRegistry> {
        &self.ctx.data_files
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.ctx.settings
    }

    pub fn autosave(&self) -> &Arc<Autosave> {
        &self.autosave
    }

    /// Apply an edit to a tab and schedule its autosave
    ///
    /// Returns false when the tab is not open.
    pub fn edit(&self, tab_id: TabId, content: impl Into<String>) -> bool {
        let Some(session) = self.editor.tab(tab_id) else {
            return false;
        };
        session.set_content(content);
        if session.file_id().is_some() {
            self.autosave.schedule(session);
        }
        true
    }
}
