//! Common test utilities and mocks
#![allow(dead_code)]

use async_trait::async_trait;
use owl_core::{
    DataFileApi, DataFileSummary, DatabaseApi, FileId, Notification, NotificationKind, Notifier,
    RunRequest, RunResult, ScriptApi, ScriptSummary, ServiceError, ServiceResult, Services,
    UploadForm,
};
use owl_settings::WorkbenchSettings;
use owl_templates::LocalMacroRenderer;
use owl_workbench::Workbench;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};

/// In-memory script store recording every call it receives.
///
/// Operations named in `failing` (e.g. "create", "delete") return a
/// server error instead of touching the store.
pub struct MockScriptApi {
    pub scripts: Mutex<Vec<ScriptSummary>>,
    pub contents: Mutex<HashMap<FileId, String>>,
    pub next_id: Mutex<i64>,
    pub failing: Mutex<Vec<&'static str>>,
    /// Log of calls as "op:arg", for assertion in tests
    pub calls: Mutex<Vec<String>>,
}

impl MockScriptApi {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
            contents: Mutex::new(HashMap::new()),
            next_id: Mutex::new(100),
            failing: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_script(self, id: i64, name: &str, content: &str) -> Self {
        self.scripts.lock().push(ScriptSummary::new(id, name));
        self.contents.lock().insert(FileId(id), content.to_string());
        self
    }

    pub fn failing(self, op: &'static str) -> Self {
        self.failing.lock().push(op);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of calls of the given operation
    pub fn call_count(&self, op: &str) -> usize {
        let prefix = format!("{}:", op);
        self.calls
            .lock()
            .iter()
            .filter(|c| c.as_str() == op || c.starts_with(&prefix))
            .count()
    }

    pub fn stored_content(&self, id: i64) -> Option<String> {
        self.contents.lock().get(&FileId(id)).cloned()
    }

    fn record(&self, op: &'static str, arg: impl std::fmt::Display) -> ServiceResult<()> {
        self.calls.lock().push(format!("{}:{}", op, arg));
        if self.failing.lock().contains(&op) {
            return Err(ServiceError::Server(format!("{} rejected", op)));
        }
        Ok(())
    }

    fn allocate(&self, name: &str) -> ScriptSummary {
        let mut next_id = self.next_id.lock();
        let script = ScriptSummary::new(*next_id, name);
        *next_id += 1;
        script
    }
}

#[async_trait]
impl ScriptApi for MockScriptApi {
    async fn list(&self) -> ServiceResult<Vec<ScriptSummary>> {
        self.record("list", "")?;
        Ok(self.scripts.lock().clone())
    }

    async fn fetch_content(&self, id: FileId) -> ServiceResult<String> {
        self.record("fetch", id)?;
        self.contents
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("script {}", id)))
    }

    async fn update_content(&self, id: FileId, content: &str) -> ServiceResult<()> {
        self.record("update", id)?;
        self.contents.lock().insert(id, content.to_string());
        Ok(())
    }

    async fn create(&self, name: &str, content: Option<&str>) -> ServiceResult<ScriptSummary> {
        self.record("create", name)?;
        let script = self.allocate(name);
        self.scripts.lock().push(script.clone());
        self.contents
            .lock()
            .insert(script.id, content.unwrap_or_default().to_string());
        Ok(script)
    }

    async fn upload(&self, form: UploadForm) -> ServiceResult<ScriptSummary> {
        self.record("upload", &form.file_name)?;
        let script = self.allocate(&form.file_name);
        self.scripts.lock().push(script.clone());
        self.contents.lock().insert(
            script.id,
            String::from_utf8_lossy(&form.bytes).into_owned(),
        );
        Ok(script)
    }

    async fn delete(&self, id: FileId) -> ServiceResult<()> {
        self.record("delete", id)?;
        self.scripts.lock().retain(|s| s.id != id);
        self.contents.lock().remove(&id);
        Ok(())
    }

    async fn rename(&self, id: FileId, name: &str) -> ServiceResult<ScriptSummary> {
        self.record("rename", id)?;
        let mut scripts = self.scripts.lock();
        let script = scripts
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("script {}", id)))?;
        *script = ScriptSummary::new(id.0, name);
        Ok(script.clone())
    }
}

/// Lets a test hold a run in flight until it decides to release it
pub struct Gate {
    pub started: Arc<Notify>,
    pub release: Arc<Semaphore>,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            started: Arc::new(Notify::new()),
            release: Arc::new(Semaphore::new(0)),
        }
    }

    pub fn open(&self) {
        self.release.add_permits(1);
    }
}

/// Statement executor returning a configurable result
pub struct MockDatabaseApi {
    pub result: Mutex<ServiceResult<RunResult>>,
    pub requests: Mutex<Vec<RunRequest>>,
    pub gate: Option<Gate>,
}

impl MockDatabaseApi {
    pub fn new() -> Self {
        Self {
            result: Mutex::new(Ok(select_result())),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn with_result(self, result: ServiceResult<RunResult>) -> Self {
        *self.result.lock() = result;
        self
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Gate::new());
        self
    }

    pub fn requests(&self) -> Vec<RunRequest> {
        self.requests.lock().clone()
    }

    pub fn gate(&self) -> &Gate {
        self.gate.as_ref().expect("database mock is not gated")
    }
}

#[async_trait]
impl DatabaseApi for MockDatabaseApi {
    async fn run(&self, request: RunRequest) -> ServiceResult<RunResult> {
        self.requests.lock().push(request);
        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release
                .acquire()
                .await
                .expect("gate semaphore closed")
                .forget();
        }
        self.result.lock().clone()
    }
}

pub struct MockDataFileApi {
    pub files: Vec<DataFileSummary>,
    pub should_fail: bool,
}

#[async_trait]
impl DataFileApi for MockDataFileApi {
    async fn list(&self) -> ServiceResult<Vec<DataFileSummary>> {
        if self.should_fail {
            return Err(ServiceError::Transport("connection refused".into()));
        }
        Ok(self.files.clone())
    }
}

/// Notifier remembering every notice it was given
#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications
            .lock()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.notifications.lock().iter().any(|n| n.message == message)
    }

    pub fn count(&self, message: &str) -> usize {
        self.notifications
            .lock()
            .iter()
            .filter(|n| n.message == message)
            .count()
    }

    pub fn of_kind(&self, kind: NotificationKind) -> Vec<Notification> {
        self.notifications
            .lock()
            .iter()
            .filter(|n| n.kind == kind)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.notifications.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}

/// A workbench wired to mocks, with handles to inspect them
pub struct Harness {
    pub workbench: Workbench,
    pub scripts: Arc<MockScriptApi>,
    pub databases: Arc<MockDatabaseApi>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(scripts: MockScriptApi, databases: MockDatabaseApi) -> Self {
        Self::with_data_files(scripts, databases, Vec::new())
    }

    pub fn with_data_files(
        scripts: MockScriptApi,
        databases: MockDatabaseApi,
        files: Vec<DataFileSummary>,
    ) -> Self {
        let scripts = Arc::new(scripts);
        let databases = Arc::new(databases);
        let notifier = Arc::new(RecordingNotifier::default());
        let services = Services::new(
            scripts.clone(),
            databases.clone(),
            Arc::new(LocalMacroRenderer::new()),
            Arc::new(MockDataFileApi {
                files,
                should_fail: false,
            }),
        );
        let workbench = Workbench::new(services, notifier.clone(), &WorkbenchSettings::default());

        Self {
            workbench,
            scripts,
            databases,
            notifier,
        }
    }

    /// Harness with the script list already loaded
    pub async fn loaded(scripts: MockScriptApi, databases: MockDatabaseApi) -> Self {
        let harness = Self::new(scripts, databases);
        harness.workbench.initialize().await;
        harness
    }
}

pub fn sample_scripts() -> MockScriptApi {
    MockScriptApi::new()
        .with_script(1, "orders.sql", "select * from orders")
        .with_script(2, "users.sql", "select * from users")
}

pub fn select_result() -> RunResult {
    let mut row = serde_json::Map::new();
    row.insert("one".to_string(), serde_json::json!(1));
    RunResult {
        query: "SELECT 1".to_string(),
        statement_type: Some("SELECT".to_string()),
        columns: Some(vec!["one".to_string()]),
        data: Some(vec![row]),
        total_count: Some(1),
        start_row: Some(0),
        end_row: Some(25),
        ..RunResult::default()
    }
}

pub fn update_result(affected_rows: u64) -> RunResult {
    RunResult {
        query: "UPDATE t SET x = 1".to_string(),
        statement_type: Some("UPDATE".to_string()),
        affected_rows: Some(affected_rows),
        ..RunResult::default()
    }
}
