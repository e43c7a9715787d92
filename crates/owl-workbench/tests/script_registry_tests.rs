//! Integration tests for ScriptRegistry

mod common;

use owl_core::{FileId, FileType, NotificationKind, UploadForm};
use owl_workbench::{ScriptEvent, WorkbenchError};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;

use common::{sample_scripts, Harness, MockDatabaseApi, MockScriptApi};

#[tokio::test]
async fn fetch_scripts_fills_cache() {
    let h = Harness::new(sample_scripts(), MockDatabaseApi::new());
    let registry = h.workbench.scripts();
    assert!(registry.is_empty());

    registry.fetch_scripts().await;

    let names: Vec<String> = registry.scripts().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["orders.sql", "users.sql"]);
    assert_eq!(registry.find_by_id(FileId(2)).unwrap().extension, "sql");
}

#[tokio::test]
async fn fetch_failure_is_silent() {
    let h = Harness::new(sample_scripts().failing("list"), MockDatabaseApi::new());

    h.workbench.scripts().fetch_scripts().await;

    assert!(h.workbench.scripts().is_empty());
    assert!(h.notifier.all().is_empty());
}

#[tokio::test]
async fn create_adds_to_cache_and_publishes() {
    let h = Harness::loaded(sample_scripts(), MockDatabaseApi::new()).await;
    let registry = h.workbench.scripts();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let _subscription = registry.subscribe(move |event| sink.lock().push(event.clone()));

    let script = registry.create("new.sql", None).await.unwrap();

    assert_eq!(registry.len(), 3);
    assert_eq!(h.scripts.stored_content(script.id.0).as_deref(), Some(""));
    assert_eq!(*events.lock(), vec![ScriptEvent::Created(script)]);
    assert_eq!(h.notifier.of_kind(NotificationKind::Success).len(), 1);
}

#[tokio::test]
async fn create_failure_is_reported_and_returned() {
    let h = Harness::loaded(sample_scripts().failing("create"), MockDatabaseApi::new()).await;

    let err = h
        .workbench
        .scripts()
        .create("new.sql", Some("select 1"))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkbenchError::Persist(_)));
    assert!(h.notifier.contains("Failed to create file create rejected"));
    assert_eq!(h.workbench.scripts().len(), 2);
}

#[tokio::test]
async fn upload_adds_script() {
    let h = Harness::loaded(MockScriptApi::new(), MockDatabaseApi::new()).await;
    let registry = h.workbench.scripts();

    registry
        .upload(UploadForm::new("import.sql", b"select 42".to_vec()))
        .await;

    let uploaded = registry.scripts().pop().unwrap();
    assert_eq!(uploaded.name, "import.sql");
    assert_eq!(
        h.scripts.stored_content(uploaded.id.0).as_deref(),
        Some("select 42")
    );
    assert!(h.notifier.contains("Script file uploaded successfully"));
}

#[tokio::test]
async fn upload_failure_is_swallowed() {
    let h = Harness::loaded(MockScriptApi::new().failing("upload"), MockDatabaseApi::new()).await;

    h.workbench
        .scripts()
        .upload(UploadForm::new("import.sql", Vec::new()))
        .await;

    assert!(h.workbench.scripts().is_empty());
    assert!(h.notifier.contains("Failed to upload script file upload rejected"));
}

#[tokio::test]
async fn removing_script_closes_only_its_tab() {
    let h = Harness::loaded(sample_scripts(), MockDatabaseApi::new()).await;
    let editor = h.workbench.editor();
    let orders = editor.add_tab(Some(FileId(1)), FileType::ScriptFile).unwrap();
    let users = editor.add_tab(Some(FileId(2)), FileType::ScriptFile).unwrap();
    let scratch = editor.add_tab(None, FileType::ScriptFile).unwrap();
    let orders_session = editor.tab(orders).unwrap();

    h.workbench.scripts().remove_script(FileId(1)).await;

    assert_eq!(editor.tab_ids(), vec![users, scratch]);
    assert!(orders_session.is_closed());
    assert!(h.workbench.scripts().find_by_id(FileId(1)).is_none());
    assert!(h.notifier.contains("Script file deleted successfully"));
}

#[tokio::test]
async fn removing_script_promotes_first_tab_when_active() {
    let h = Harness::loaded(sample_scripts(), MockDatabaseApi::new()).await;
    let editor = h.workbench.editor();
    let scratch = editor.add_tab(None, FileType::ScriptFile).unwrap();
    let users = editor.add_tab(Some(FileId(2)), FileType::ScriptFile).unwrap();
    assert_eq!(editor.active_tab(), Some(users));

    h.workbench.scripts().remove_script(FileId(2)).await;

    assert_eq!(editor.active_tab(), Some(scratch));
}

#[tokio::test]
async fn removing_script_without_tab_leaves_tabs_alone() {
    let h = Harness::loaded(sample_scripts(), MockDatabaseApi::new()).await;
    let editor = h.workbench.editor();
    let orders = editor.add_tab(Some(FileId(1)), FileType::ScriptFile).unwrap();

    h.workbench.scripts().remove_script(FileId(2)).await;

    assert_eq!(editor.tab_ids(), vec![orders]);
    assert_eq!(editor.active_tab(), Some(orders));
}

#[tokio::test]
async fn failed_remove_keeps_script_and_tab() {
    let h = Harness::loaded(sample_scripts().failing("delete"), MockDatabaseApi::new()).await;
    let editor = h.workbench.editor();
    let orders = editor.add_tab(Some(FileId(1)), FileType::ScriptFile).unwrap();

    h.workbench.scripts().remove_script(FileId(1)).await;

    assert_eq!(editor.tab_ids(), vec![orders]);
    assert_eq!(h.workbench.scripts().len(), 2);
    assert!(h
        .notifier
        .contains("Failed to delete script file: delete rejected"));
}

#[tokio::test]
async fn rename_replaces_cached_entry() {
    let h = Harness::loaded(sample_scripts(), MockDatabaseApi::new()).await;
    let registry = h.workbench.scripts();

    let renamed = registry.rename_script(FileId(2), "people.sql").await.unwrap();

    assert_eq!(renamed.name, "people.sql");
    assert_eq!(registry.find_by_id(FileId(2)).unwrap().name, "people.sql");
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn rename_failure_returns_none() {
    let h = Harness::loaded(sample_scripts().failing("rename"), MockDatabaseApi::new()).await;

    let renamed = h
        .workbench
        .scripts()
        .rename_script(FileId(2), "people.sql")
        .await;

    assert_eq!(renamed, None);
    assert_eq!(
        h.workbench.scripts().find_by_id(FileId(2)).unwrap().name,
        "users.sql"
    );
    assert!(h
        .notifier
        .contains("Failed to rename script file: rename rejected"));
}

#[tokio::test]
async fn script_content_round_trips_through_server() {
    let h = Harness::loaded(sample_scripts(), MockDatabaseApi::new()).await;
    let registry = h.workbench.scripts();

    registry
        .save_script_content(FileId(1), "select count(*) from orders")
        .await
        .unwrap();
    let content = registry.get_script_content(FileId(1)).await.unwrap();

    assert_eq!(content, "select count(*) from orders");
}

#[tokio::test]
async fn get_script_content_failure_is_reported() {
    let h = Harness::loaded(sample_scripts(), MockDatabaseApi::new()).await;

    let err = h
        .workbench
        .scripts()
        .get_script_content(FileId(404))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkbenchError::Fetch(_)));
    assert!(h.notifier.contains("Failed to get script content"));
}
