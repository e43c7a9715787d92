//! Owl Workbench - editor state for the script workbench
//!
//! This crate holds the state behind the editor: which tabs are open, what
//! each tab shows, and the cached lists of files known to the server.
//!
//! # Architecture
//!
//! ```text
//! Presentation (tabs, code surface, result panels)
//!     ↓ method calls / subscriptions
//! Workbench (this crate)
//!     EditorRegistry → TabSession → ScriptRegistry / DataFileRegistry
//!     ↓
//! Remote service clients (owl-core traits)
//! ```
//!
//! # Components
//!
//! - [`EditorRegistry`] - open tabs, the active tab, tab lifecycle
//! - [`TabSession`] - one tab: its file, options, busy flag, save/run/render
//! - [`ScriptRegistry`] - cached script list plus create/upload/rename/delete
//! - [`DataFileRegistry`] - cached data file list
//! - [`Autosave`] - debounced saving of edited files
//! - [`Workbench`] - owns and wires all of the above
//!
//! All state is reached through explicit handles; every component publishes
//! its changes through `subscribe`.

mod autosave;
mod context;
mod data_file_registry;
mod editor_registry;
mod error;
pub mod logging;
mod script_registry;
mod tab_session;
mod workbench;

pub use autosave::Autosave;
pub use context::WorkbenchContext;
pub use data_file_registry::{DataFileEvent, DataFileRegistry};
pub use editor_registry::{EditorEvent, EditorRegistry};
pub use error::{WorkbenchError, WorkbenchResult};
pub use script_registry::{ScriptEvent, ScriptRegistry};
pub use tab_session::{SaveOutcome, TabEvent, TabOptions, TabSession};
pub use workbench::Workbench;
