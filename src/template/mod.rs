//! Parsed templates and the loaders that read them
//!
//! A [`Template`] owns its source text and the tree parsed from it. Text
//! nodes only hold byte ranges, so the tree is read together with the
//! template it came from. Included templates are owned by the `INCLUDE` node
//! that first needed them, which makes the whole render a single tree that is
//! dropped in one piece.
//!
//! # Example
//!
//! ```text
//! {{INCLUDE header.tmpl}}
//! {{INCLUDE ".../footer.tmpl"}}  resolved next to the including template
//! ```

mod loader;
mod resolver;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Diagnostic, Span, TemplateError};
use crate::parser::{self, Node, ParseContext};

pub use loader::{FsLoader, MemoryLoader, TemplateLoader};
pub use resolver::IncludeResolver;

/// Name used in diagnostics for templates given as literal text
pub const LITERAL_NAME: &str = "(none)";

/// One parsed template
#[derive(Debug)]
pub struct Template {
    name: String,
    path: Option<PathBuf>,
    source: Arc<str>,
    root: Vec<Node>,
    depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Template {
    /// Parse literal template text
    pub fn from_text(text: impl Into<Arc<str>>, ctx: &ParseContext<'_>) -> Self {
        Self::parse(LITERAL_NAME.to_string(), None, text.into(), 0, ctx)
    }

    /// Read a template through `loader` and parse it
    pub fn load(
        path: &Path,
        loader: &dyn TemplateLoader,
        depth: usize,
        ctx: &ParseContext<'_>,
    ) -> Result<Self, TemplateError> {
        let text = loader.load(path)?;
        Ok(Self::parse(
            path.display().to_string(),
            Some(path.to_path_buf()),
            Arc::from(text),
            depth,
            ctx,
        ))
    }

    fn parse(
        name: String,
        path: Option<PathBuf>,
        source: Arc<str>,
        depth: usize,
        ctx: &ParseContext<'_>,
    ) -> Self {
        let (root, diagnostics) = parser::parse(&source, &name, depth, ctx);
        Self {
            name,
            path,
            source,
            root,
            depth,
            diagnostics,
        }
    }

    /// File name, or `(none)` for literal text
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn source(&self) -> &Arc<str> {
        &self.source
    }

    pub fn root(&self) -> &[Node] {
        &self.root
    }

    /// Number of inclusions between this template and the one rendered
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Source text of a text node
    pub fn text(&self, span: &Span) -> &str {
        self.source.get(span.clone()).unwrap_or_default()
    }

    /// Problems found while parsing
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Move the parse diagnostics out, leaving none behind
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// A diagnostic located at a span of this template
    pub(crate) fn diagnostic_at(&self, error: TemplateError, line: usize, span: Span) -> Diagnostic {
        Diagnostic::at(error, self.name.clone(), line, span, Arc::clone(&self.source))
    }
}
