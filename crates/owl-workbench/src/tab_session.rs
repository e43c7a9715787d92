//! Tab session
//!
//! One open editor surface bound to at most one persisted file. A session
//! moves from unsaved (no file id) to saved the first time `save` creates
//! the file; it is busy while at least one query runs.
//!
//! Every session owns a cancellation token. Closing the tab cancels it and
//! any remote call still in flight for the session is discarded instead of
//! writing into a session nobody shows anymore.

use owl_core::{
    DatabaseId, EventEmitter, FileId, FileRef, FileType, Notification, RunRequest, RunResult,
    ScriptSummary, ServiceError, Subscription, TabId,
};
use owl_templates::MacroEngine;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::context::WorkbenchContext;
use crate::error::{WorkbenchError, WorkbenchResult};

/// Per-tab options
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabOptions {
    /// Database queries from this tab run against
    pub database_id: Option<DatabaseId>,
}

/// Changes published by a [`TabSession`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TabEvent {
    /// Id, name or content of the bound file changed
    FileChanged,
    OptionsChanged,
    BusyChanged(bool),
}

/// What `save` ended up doing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Content of an existing file was persisted
    Updated,
    /// The file was created and the tab now points at it
    Created(ScriptSummary),
    /// Nothing was sent; the reason has been reported as a notice
    Skipped,
    /// The server rejected the update; the error has been reported
    Failed(ServiceError),
}

struct TabState {
    file: FileRef,
    options: Option<TabOptions>,
    /// Number of query runs in flight
    running: usize,
}

/// State and actions of one open tab
pub struct TabSession {
    id: TabId,
    ctx: Arc<WorkbenchContext>,
    state: RwLock<TabState>,
    cancel: CancellationToken,
    events: EventEmitter<TabEvent>,
}

impl TabSession {
    pub(crate) fn new(ctx: Arc<WorkbenchContext>, file: FileRef) -> Self {
        Self {
            id: TabId::new(),
            ctx,
            state: RwLock::new(TabState {
                file,
                options: None,
                running: 0,
            }),
            cancel: CancellationToken::new(),
            events: EventEmitter::new(),
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    /// Snapshot of the bound file
    pub fn file(&self) -> FileRef {
        self.state.read().file.clone()
    }

    pub fn file_id(&self) -> Option<FileId> {
        self.state.read().file.id
    }

    pub fn file_type(&self) -> FileType {
        self.state.read().file.file_type
    }

    pub fn content(&self) -> Option<String> {
        self.state.read().file.content.clone()
    }

    pub fn options(&self) -> Option<TabOptions> {
        self.state.read().options.clone()
    }

    /// True while a query is executing
    pub fn is_busy(&self) -> bool {
        self.state.read().running > 0
    }

    /// True once the tab has been closed
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn is_bound_to(&self, id: FileId, file_type: FileType) -> bool {
        let state = self.state.read();
        state.file.id == Some(id) && state.file.file_type == file_type
    }

    pub fn subscribe(&self, listener: impl Fn(&TabEvent) + Send + Sync + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    /// Tab label: the file name, or `New {n}` for an unnamed file
    pub fn title(&self, index: usize) -> String {
        self.state
            .read()
            .file
            .name
            .clone()
            .unwrap_or_else(|| format!("New {}", index + 1))
    }

    /// Load the file content from the server
    ///
    /// Does nothing for an unsaved file. A failure is reported and handed
    /// back so the caller can retry.
    #[tracing::instrument(skip(self), fields(tab_id = %self.id))]
    pub async fn fetch_content(&self) -> WorkbenchResult<()> {
        let (id, file_type) = {
            let state = self.state.read();
            match state.file.id {
                Some(id) => (id, state.file.file_type),
                None => return Ok(()),
            }
        };

        match file_type {
            FileType::ScriptFile => {}
            FileType::MacroFile | FileType::DataFile => {
                self.ctx.notify(Notification::warning(
                    "Currently only script files are supported.",
                ));
                return Ok(());
            }
        }

        match self.race(self.ctx.services.scripts.fetch_content(id)).await? {
            Ok(content) => {
                self.update_file(|file| file.content = Some(content));
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, file_id = %id, "failed to fetch file content");
                self.ctx
                    .notify(Notification::error("Failed to fetch file content"));
                Err(WorkbenchError::Fetch(e))
            }
        }
    }

    /// Replace the in-memory content
    pub fn set_content(&self, content: impl Into<String>) {
        let content = content.into();
        self.update_file(|file| file.content = Some(content));
    }

    /// Persist the file
    ///
    /// A saved file has its content updated; a rejected update is reported
    /// and comes back as [`SaveOutcome::Failed`]. An unsaved file needs
    /// `name` and is created through the script registry, after which the
    /// tab adopts the new id and name. Only a failed create is an error.
    #[tracing::instrument(skip(self), fields(tab_id = %self.id))]
    pub async fn save(&self, name: Option<&str>) -> WorkbenchResult<SaveOutcome> {
        let file = self.file();

        match file.file_type {
            FileType::ScriptFile => {}
            FileType::MacroFile | FileType::DataFile => {
                self.ctx.notify(Notification::warning(
                    "Currently only script files are supported.",
                ));
                return Ok(SaveOutcome::Skipped);
            }
        }

        let content = file.content.unwrap_or_default();

        if let Some(id) = file.id {
            return match self.ctx.scripts.save_script_content(id, &content).await {
                Ok(()) => {
                    tracing::debug!(file_id = %id, "script content saved");
                    Ok(SaveOutcome::Updated)
                }
                Err(WorkbenchError::Persist(e)) => {
                    tracing::error!(error = %e, file_id = %id, "failed to save script content");
                    self.ctx.notify(Notification::error(format!(
                        "Failed to save file: {}",
                        e.user_message()
                    )));
                    Ok(SaveOutcome::Failed(e))
                }
                Err(e) => Err(e),
            };
        }

        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            self.ctx.notify(Notification::error("Unknown file name"));
            return Ok(SaveOutcome::Skipped);
        };

        let script = self.ctx.scripts.create(name, Some(&content)).await?;
        self.discard_if_closed()?;
        self.update_file(|file| {
            file.id = Some(script.id);
            file.name = Some(name.to_string());
        });
        tracing::info!(file_id = %script.id, "tab bound to new script");
        Ok(SaveOutcome::Created(script))
    }

    /// Rename the bound file
    ///
    /// Returns the updated summary on success; failures are reported as
    /// notices.
    #[tracing::instrument(skip(self, name), fields(tab_id = %self.id, name = %name))]
    pub async fn rename(&self, name: &str) -> Option<ScriptSummary> {
        let file = self.file();
        let Some(id) = file.id else {
            self.ctx.notify(Notification::warning("File not saved"));
            return None;
        };

        match file.file_type {
            FileType::ScriptFile => {
                let script = self.ctx.scripts.rename_script(id, name).await?;
                if self.is_closed() {
                    return Some(script);
                }
                let new_name = script.name.clone();
                self.update_file(|file| file.name = Some(new_name));
                Some(script)
            }
            FileType::MacroFile | FileType::DataFile => {
                self.ctx.notify(Notification::warning(
                    "Currently only script files are supported.",
                ));
                None
            }
        }
    }

    /// Select the database queries run against; `None` clears it
    pub fn set_database(&self, database_id: Option<DatabaseId>) {
        {
            let mut state = self.state.write();
            let mut options = state.options.clone().unwrap_or_default();
            options.database_id = database_id;
            state.options = Some(options);
        }
        self.events.emit(&TabEvent::OptionsChanged);
    }

    /// Selected database, `None` when options were never set
    pub fn database_id(&self) -> Option<DatabaseId> {
        self.state
            .read()
            .options
            .as_ref()
            .and_then(|options| options.database_id)
    }

    /// Execute `query` against the selected database
    ///
    /// Only script tabs can run queries, and a blank query is reported
    /// instead of sent. Returns the server result, or `None` when nothing
    /// ran or the run failed (the failure has been reported).
    #[tracing::instrument(skip_all, fields(tab_id = %self.id, start_row = ?start_row, end_row = ?end_row))]
    pub async fn run_query(
        &self,
        query: &str,
        start_row: Option<u64>,
        end_row: Option<u64>,
        with_total_count: Option<bool>,
    ) -> Option<RunResult> {
        match self.file_type() {
            FileType::ScriptFile => {}
            FileType::MacroFile | FileType::DataFile => {
                self.ctx
                    .notify(Notification::error("File type is not supported"));
                return None;
            }
        }

        if query.trim().is_empty() {
            self.ctx.notify(Notification::warning("Nothing to run"));
            return None;
        }

        let request = RunRequest::new(self.database_id(), query)
            .with_page(start_row, end_row)
            .with_total_count(with_total_count);
        let follow_up = request.is_follow_up_page();

        let _busy = BusyGuard::enter(self);
        let started = std::time::Instant::now();
        let outcome = match self.race(self.ctx.services.databases.run(request)).await {
            Ok(outcome) => outcome,
            Err(_) => return None,
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    duration_ms,
                    rows = result.row_count(),
                    affected_rows = ?result.affected_rows,
                    "statement executed"
                );
                if let Some(affected) = result.affected_rows {
                    self.ctx
                        .notify(Notification::success(format!("Affected rows {}", affected)));
                } else if !follow_up {
                    // Pagination follow-ups stay quiet.
                    self.ctx.notify(Notification::success("Statement executed"));
                }
                Some(result)
            }
            Err(e) => {
                tracing::warn!(duration_ms, error = %e, "statement failed");
                self.ctx.notify(Notification::error(e.user_message()));
                None
            }
        }
    }

    /// Text a run or render acts on: the trimmed selection when there is
    /// one, otherwise the trimmed content
    pub fn runnable_text(&self, selection: Option<&str>) -> String {
        match selection.map(str::trim).filter(|s| !s.is_empty()) {
            Some(selection) => selection.to_string(),
            None => self
                .state
                .read()
                .file
                .content_or_empty()
                .trim()
                .to_string(),
        }
    }

    /// Run the selection (or the whole content) as the first result page
    pub async fn execute(&self, selection: Option<&str>) -> Option<RunResult> {
        let query = self.runnable_text(selection);
        if query.is_empty() {
            return None;
        }
        let settings = &self.ctx.settings;
        self.run_query(
            &query,
            Some(0),
            Some(settings.page_size),
            Some(settings.with_total_count),
        )
        .await
    }

    /// Render the selection (or the whole content) as a macro
    ///
    /// Text without any template markup is already SQL and comes back
    /// unchanged without a render call.
    #[tracing::instrument(skip(self, selection), fields(tab_id = %self.id))]
    pub async fn render_macro(&self, selection: Option<&str>) -> Option<String> {
        let text = self.runnable_text(selection);
        if !MacroEngine::is_macro(&text) {
            return Some(text);
        }
        match self.race(self.ctx.services.macros.render(&text)).await {
            Ok(Ok(rendered)) => Some(rendered.content),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "macro render failed");
                self.ctx
                    .notify(Notification::error(format!("Failed to render. {}", e)));
                None
            }
            Err(_) => None,
        }
    }

    /// Display name looked up in the registry matching the file type
    pub fn find_file_name(&self) -> Option<String> {
        let (id, file_type) = {
            let state = self.state.read();
            (state.file.id?, state.file.file_type)
        };
        match file_type {
            FileType::ScriptFile => self.ctx.scripts.find_by_id(id).map(|s| s.name),
            FileType::DataFile => self.ctx.data_files.find_by_id(id).map(|f| f.name),
            FileType::MacroFile => None,
        }
    }

    /// Invalidate the session; in-flight calls are discarded
    pub(crate) fn close(&self) {
        tracing::debug!(tab_id = %self.id, "closing tab session");
        self.cancel.cancel();
    }

    /// Await `fut` unless the tab is closed first
    async fn race<F: Future>(&self, fut: F) -> WorkbenchResult<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!(tab_id = %self.id, "discarding call for closed tab");
                Err(WorkbenchError::Cancelled)
            }
            output = fut => Ok(output),
        }
    }

    fn discard_if_closed(&self) -> WorkbenchResult<()> {
        if self.is_closed() {
            tracing::debug!(tab_id = %self.id, "discarding result for closed tab");
            return Err(WorkbenchError::Cancelled);
        }
        Ok(())
    }

    fn update_file(&self, f: impl FnOnce(&mut FileRef)) {
        f(&mut self.state.write().file);
        self.events.emit(&TabEvent::FileChanged);
    }
}

/// Marks a run in flight; the count drops again however the run ends
struct BusyGuard<'a> {
    session: &'a TabSession,
}

impl<'a> BusyGuard<'a> {
    fn enter(session: &'a TabSession) -> Self {
        let became_busy = {
            let mut state = session.state.write();
            state.running += 1;
            state.running == 1
        };
        if became_busy {
            session.events.emit(&TabEvent::BusyChanged(true));
        }
        Self { session }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let became_idle = {
            let mut state = self.session.state.write();
            state.running = state.running.saturating_sub(1);
            state.running == 0
        };
        if became_idle {
            self.session.events.emit(&TabEvent::BusyChanged(false));
        }
    }
}
