//! Editor session registry
//!
//! Owns every open [`TabSession`] and the active-tab pointer. Tabs keep the
//! order they were opened in. A persisted file is open in at most one tab:
//! opening it again only focuses the existing tab.

use indexmap::IndexMap;
use owl_core::{EventEmitter, FileId, FileRef, FileType, Notification, Subscription, TabId};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::context::WorkbenchContext;
use crate::tab_session::TabSession;

/// Changes published by the [`EditorRegistry`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    TabOpened(TabId),
    TabClosed(TabId),
    ActiveTabChanged(Option<TabId>),
}

#[derive(Default)]
struct EditorState {
    /// Always a key of `tabs` when set
    active_tab: Option<TabId>,
    tabs: IndexMap<TabId, Arc<TabSession>>,
}

impl EditorState {
    fn find_bound(&self, file_id: FileId, file_type: FileType) -> Option<TabId> {
        self.tabs
            .iter()
            .find(|(_, session)| session.is_bound_to(file_id, file_type))
            .map(|(id, _)| *id)
    }
}

/// The set of open tabs
pub struct EditorRegistry {
    ctx: Arc<WorkbenchContext>,
    state: RwLock<EditorState>,
    events: EventEmitter<EditorEvent>,
}

impl EditorRegistry {
    pub fn new(ctx: Arc<WorkbenchContext>) -> Self {
        Self {
            ctx,
            state: RwLock::new(EditorState::default()),
            events: EventEmitter::new(),
        }
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&EditorEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.state.read().active_tab
    }

    pub fn active_session(&self) -> Option<Arc<TabSession>> {
        let state = self.state.read();
        state.active_tab.and_then(|id| state.tabs.get(&id).cloned())
    }

    pub fn tab(&self, id: TabId) -> Option<Arc<TabSession>> {
        self.state.read().tabs.get(&id).cloned()
    }

    /// Open sessions in display order
    pub fn tabs(&self) -> Vec<Arc<TabSession>> {
        self.state.read().tabs.values().cloned().collect()
    }

    pub fn tab_ids(&self) -> Vec<TabId> {
        self.state.read().tabs.keys().copied().collect()
    }

    pub fn tab_count(&self) -> usize {
        self.state.read().tabs.len()
    }

    /// Tab currently showing the given file, if any
    pub fn find_tab_for_file(&self, file_id: FileId, file_type: FileType) -> Option<TabId> {
        self.state.read().find_bound(file_id, file_type)
    }

    /// Focus a tab; `None` clears the focus
    ///
    /// Returns false (and changes nothing) for an id that is not open.
    pub fn set_active_tab(&self, id: Option<TabId>) -> bool {
        {
            let mut state = self.state.write();
            if let Some(id) = id {
                if !state.tabs.contains_key(&id) {
                    tracing::debug!(tab_id = %id, "ignoring focus request for unknown tab");
                    return false;
                }
            }
            if state.active_tab == id {
                return true;
            }
            state.active_tab = id;
        }
        self.events.emit(&EditorEvent::ActiveTabChanged(id));
        true
    }

    /// Open a tab for a file, or focus the tab already showing it
    ///
    /// Without `file_id` a new unsaved tab of `file_type` is opened. With a
    /// `file_id` the display name is resolved from the matching registry;
    /// when that fails the problem is reported and no tab is opened.
    ///
    /// Returns the id of the opened or focused tab.
    #[tracing::instrument(skip(self))]
    pub fn add_tab(&self, file_id: Option<FileId>, file_type: FileType) -> Option<TabId> {
        if let Some(file_id) = file_id {
            if let Some(existing) = self.find_tab_for_file(file_id, file_type) {
                tracing::debug!(tab_id = %existing, "file already open, focusing tab");
                self.set_active_tab(Some(existing));
                return Some(existing);
            }
        }

        let file = match file_id {
            None => FileRef::unsaved(file_type),
            Some(file_id) => {
                let name = match file_type {
                    FileType::ScriptFile => match self.ctx.scripts.find_by_id(file_id) {
                        Some(script) => script.name,
                        None => {
                            tracing::warn!(file_id = %file_id, "script not found in registry");
                            self.ctx
                                .notify(Notification::error("File not found on scripts"));
                            return None;
                        }
                    },
                    FileType::MacroFile | FileType::DataFile => {
                        self.ctx.notify(Notification::error("Unsupported file type"));
                        return None;
                    }
                };
                FileRef::persisted(file_id, file_type, Some(name))
            }
        };

        let session = Arc::new(TabSession::new(self.ctx.clone(), file));
        let tab_id = session.id();
        {
            let mut state = self.state.write();
            // Another caller may have opened the same file meanwhile.
            if let Some(file_id) = file_id {
                if let Some(existing) = state.find_bound(file_id, file_type) {
                    state.active_tab = Some(existing);
                    drop(state);
                    self.events.emit(&EditorEvent::ActiveTabChanged(Some(existing)));
                    return Some(existing);
                }
            }
            state.tabs.insert(tab_id, session);
            state.active_tab = Some(tab_id);
        }

        tracing::info!(tab_id = %tab_id, "tab opened");
        self.events.emit(&EditorEvent::TabOpened(tab_id));
        self.events.emit(&EditorEvent::ActiveTabChanged(Some(tab_id)));
        Some(tab_id)
    }

    /// Close one tab
    ///
    /// When the closed tab was active, the first remaining tab becomes
    /// active, or nothing when no tab is left. Returns false when `id` is
    /// not open.
    #[tracing::instrument(skip(self))]
    pub fn close_tab(&self, id: TabId) -> bool {
        let (session, active_changed) = {
            let mut state = self.state.write();
            let Some(session) = state.tabs.shift_remove(&id) else {
                return false;
            };
            let active_changed = state.active_tab == Some(id);
            if active_changed {
                state.active_tab = state.tabs.keys().next().copied();
            }
            (session, active_changed.then_some(state.active_tab))
        };

        session.close();
        tracing::info!(tab_id = %id, "tab closed");
        self.events.emit(&EditorEvent::TabClosed(id));
        if let Some(active) = active_changed {
            self.events.emit(&EditorEvent::ActiveTabChanged(active));
        }
        true
    }

    /// Close every tab except `id`, which becomes active
    ///
    /// Returns false and closes nothing when `id` is not open.
    #[tracing::instrument(skip(self))]
    pub fn close_other_tabs(&self, id: TabId) -> bool {
        let (closed, active_changed) = {
            let mut state = self.state.write();
            let Some(keep) = state.tabs.get(&id).cloned() else {
                return false;
            };
            let closed: Vec<Arc<TabSession>> = state
                .tabs
                .drain(..)
                .filter(|(tab_id, _)| *tab_id != id)
                .map(|(_, session)| session)
                .collect();
            state.tabs.insert(id, keep);
            let active_changed = state.active_tab != Some(id);
            state.active_tab = Some(id);
            (closed, active_changed)
        };

        tracing::info!(kept = %id, closed = closed.len(), "closing other tabs");
        self.close_sessions(&closed);
        if active_changed {
            self.events.emit(&EditorEvent::ActiveTabChanged(Some(id)));
        }
        true
    }

    /// Close every tab
    #[tracing::instrument(skip(self))]
    pub fn close_all_tabs(&self) {
        let (closed, had_active) = {
            let mut state = self.state.write();
            let closed: Vec<Arc<TabSession>> =
                state.tabs.drain(..).map(|(_, session)| session).collect();
            (closed, state.active_tab.take().is_some())
        };

        tracing::info!(closed = closed.len(), "closing all tabs");
        self.close_sessions(&closed);
        if had_active {
            self.events.emit(&EditorEvent::ActiveTabChanged(None));
        }
    }

    /// Close the tabs bound to a file, e.g. after the file was deleted
    ///
    /// Returns how many tabs were closed.
    pub fn close_file_tabs(&self, file_id: FileId, file_type: FileType) -> usize {
        let bound: Vec<TabId> = self
            .state
            .read()
            .tabs
            .iter()
            .filter(|(_, session)| session.is_bound_to(file_id, file_type))
            .map(|(id, _)| *id)
            .collect();

        bound.into_iter().filter(|id| self.close_tab(*id)).count()
    }

    fn close_sessions(&self, sessions: &[Arc<TabSession>]) {
        for session in sessions {
            session.close();
            self.events.emit(&EditorEvent::TabClosed(session.id()));
        }
    }
}
