//! In-process implementation of the macro render contract

use async_trait::async_trait;
use owl_core::{MacroFileApi, RenderedMacro, ServiceError, ServiceResult};

use crate::MacroEngine;

/// Renders macros locally instead of calling the server
#[derive(Default)]
pub struct LocalMacroRenderer {
    engine: MacroEngine,
}

impl LocalMacroRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MacroFileApi for LocalMacroRenderer {
    async fn render(&self, template: &str) -> ServiceResult<RenderedMacro> {
        tracing::debug!(template_len = template.len(), "rendering macro locally");
        self.engine
            .render(template)
            .map(|content| RenderedMacro { content })
            .map_err(|e| {
                tracing::warn!(error = %e, "macro render failed");
                ServiceError::Server(e.to_string())
            })
    }
}
