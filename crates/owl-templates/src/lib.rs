//! Owl Templates - macro file rendering
//!
//! Macro files are SQL templates written in Jinja syntax. The server
//! normally renders them; [`LocalMacroRenderer`] does the same job
//! in-process through MiniJinja so a workbench can render macros offline.
//!
//! ```rust
//! use owl_templates::MacroEngine;
//!
//! let engine = MacroEngine::new();
//! let sql = engine
//!     .render("{% set ids = [] %}SELECT * FROM {{ 'app.users' | identifier }} WHERE id IN {{ ids | inclause }}")
//!     .unwrap();
//! assert_eq!(sql, r#"SELECT * FROM "app"."users" WHERE id IN (NULL)"#);
//! ```

mod engine;
mod filters;
mod renderer;

pub use engine::MacroEngine;
pub use filters::SqlFilters;
pub use renderer::LocalMacroRenderer;
