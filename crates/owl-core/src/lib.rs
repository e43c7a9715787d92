//! Owl Core - Shared abstractions for the script workbench
//!
//! This crate provides the types and contracts that the other
//! Owl crates depend on:
//!
//! - File identity (`FileId`, `FileType`, `FileRef`) and tab identity (`TabId`)
//! - Remote service contracts (`ScriptApi`, `DatabaseApi`, `MacroFileApi`, `DataFileApi`)
//! - User-facing notices (`Notification`, `Notifier`)
//! - A small observer primitive (`EventEmitter`, `Subscription`)

mod error;
mod events;
mod notification;
mod service;
mod types;

pub use error::*;
pub use events::*;
pub use notification::*;
pub use service::*;
pub use types::*;
