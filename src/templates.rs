//! HTML template rendering.
//!
//! Templates are looked up by file name under one directory and rendered with
//! [`minijinja`]. Files are read lazily on first use and cached by the
//! environment afterwards.

use crate::error::TemplateError;
use minijinja::{path_loader, Environment};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone)]
pub struct Templates {
    dir: PathBuf,
    env: Environment<'static>,
}

impl Templates {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        let dir = dir.into();
        let mut env = Environment::new();
        env.set_loader(path_loader(dir.clone()));
        Self { dir, env }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render `name` with `context`, which is any serializable value
    /// (a `serde_json::json!` object, a struct, `minijinja::context!`).
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| TemplateError::new(name, e))?;
        let rendered = template
            .render(context)
            .map_err(|e| TemplateError::new(name, e))?;
        debug!(
            template = name,
            size_bytes = rendered.len(),
            "Template rendered"
        );
        Ok(rendered)
    }
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates").field("dir", &self.dir).finish()
    }
}
