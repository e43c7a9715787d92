//! Template engine using MiniJinja

use minijinja::Environment;

/// Renders macro text into SQL
pub struct MacroEngine {
    env: Environment<'static>,
}

impl MacroEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        crate::filters::register_filters(&mut env);
        Self { env }
    }

    /// Render a macro into SQL
    ///
    /// Macros carry their own variables (`{% set %}`); nothing is injected.
    pub fn render(&self, template: &str) -> Result<String, minijinja::Error> {
        let tmpl = self.env.template_from_str(template)?;
        tmpl.render(minijinja::context! {})
    }

    /// Whether `text` contains any Jinja markup (`{{`, `{%` or `{#`)
    pub fn is_macro(text: &str) -> bool {
        text.contains("{{") || text.contains("{%") || text.contains("{#")
    }
}

impl Default for MacroEngine {
    fn default() -> Self {
        Self::new()
    }
}
