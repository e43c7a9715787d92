//! Remote service contracts
//!
//! The workbench talks to the server exclusively through these traits.
//! Transport is up to the implementation; the registries only see typed
//! results or a [`ServiceError`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    DataFileSummary, FileId, RenderedMacro, RunRequest, RunResult, ScriptSummary, ServiceResult,
    UploadForm,
};

/// CRUD operations on script files
#[async_trait]
pub trait ScriptApi: Send + Sync {
    /// List every script known to the server
    async fn list(&self) -> ServiceResult<Vec<ScriptSummary>>;

    /// Fetch the text content of a script
    async fn fetch_content(&self, id: FileId) -> ServiceResult<String>;

    /// Replace the text content of a script
    async fn update_content(&self, id: FileId, content: &str) -> ServiceResult<()>;

    /// Create a new script, optionally with initial content
    async fn create(&self, name: &str, content: Option<&str>) -> ServiceResult<ScriptSummary>;

    /// Upload a script file
    async fn upload(&self, form: UploadForm) -> ServiceResult<ScriptSummary>;

    async fn delete(&self, id: FileId) -> ServiceResult<()>;

    /// Rename a script and return its updated summary
    async fn rename(&self, id: FileId, name: &str) -> ServiceResult<ScriptSummary>;
}

/// Statement execution against a registered database
#[async_trait]
pub trait DatabaseApi: Send + Sync {
    async fn run(&self, request: RunRequest) -> ServiceResult<RunResult>;
}

/// Macro (template) rendering
#[async_trait]
pub trait MacroFileApi: Send + Sync {
    async fn render(&self, template: &str) -> ServiceResult<RenderedMacro>;
}

/// Data file listing
#[async_trait]
pub trait DataFileApi: Send + Sync {
    async fn list(&self) -> ServiceResult<Vec<DataFileSummary>>;
}

/// Bundle of every remote client the workbench needs
#[derive(Clone)]
pub struct Services {
    pub scripts: Arc<dyn ScriptApi>,
    pub databases: Arc<dyn DatabaseApi>,
    pub macros: Arc<dyn MacroFileApi>,
    pub data_files: Arc<dyn DataFileApi>,
}

impl Services {
    pub fn new(
        scripts: Arc<dyn ScriptApi>,
        databases: Arc<dyn DatabaseApi>,
        macros: Arc<dyn MacroFileApi>,
        data_files: Arc<dyn DataFileApi>,
    ) -> Self {
        Self {
            scripts,
            databases,
            macros,
            data_files,
        }
    }
}
