//! tmplwalk - a small template language rendered by walking a parse tree
//!
//! Templates mix literal text with tags for variables, conditionals, loops
//! with labeled `BREAK`/`CONTINUE`, file inclusion and comments. A template
//! is scanned and parsed into a tree, then walked against a [`Scope`] of
//! named values and named loops.
//!
//! # Example
//!
//! ```rust
//! use tmplwalk::{render_to_string, FormatRegistry, Loop, Scope};
//!
//! let rows: Loop = ["1", "2"]
//!     .into_iter()
//!     .map(|n| Scope::new().with_var("n", n))
//!     .collect();
//! let scope = Scope::new().with_var("user", "Amy").with_loop("items", rows);
//!
//! let out = render_to_string(
//!     "Hello, {{VAR user}}! {{LOOP items}}{{VAR n}},{{ENDLOOP}}",
//!     &FormatRegistry::with_builtins(),
//!     &scope,
//! )
//! .unwrap();
//! assert_eq!(out, "Hello, Amy! 1,2,");
//! ```

pub mod bindings;
pub mod data;
pub mod error;
pub mod format;
pub mod parser;
pub mod renderer;
pub mod tagset;
pub mod template;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

pub use bindings::{Context, Loop, Scope};
pub use data::DataError;
pub use error::{Diagnostic, Span, TemplateError};
pub use format::{FormatRegistry, Formatter};
pub use parser::ParseContext;
pub use tagset::{TagKind, TagSet, TagSetError};
pub use template::{FsLoader, IncludeResolver, MemoryLoader, Template, TemplateLoader};

/// Maximum nesting of included templates unless configured otherwise
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 30;

/// Errors that can occur during a render
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template had problems; they were also written to the diagnostics sink
    #[error("template errors: {}", format_diagnostics(.0))]
    Template(Vec<Diagnostic>),

    /// Writing to the output or diagnostics sink failed
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl RenderError {
    /// Diagnostics behind the failure, empty for I/O errors
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            RenderError::Template(diagnostics) => diagnostics,
            RenderError::Io(_) => &[],
        }
    }
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Where the template to render comes from
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// A file read through the configured loader
    Path(&'a Path),
    /// Literal template text
    Text(&'a str),
}

/// Configuration for rendering
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Keywords and delimiters recognized in templates
    pub tags: TagSet,
    /// `INCLUDE` tags nested deeper than this are rejected
    pub max_include_depth: usize,
    /// Reads the top-level template (for [`Source::Path`]) and included ones
    pub loader: Arc<dyn TemplateLoader>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tags: TagSet::default(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            loader: Arc::new(FsLoader),
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tag set
    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    /// Set the maximum inclusion depth
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Set the template loader
    pub fn with_loader(mut self, loader: impl TemplateLoader + 'static) -> Self {
        self.loader = Arc::new(loader);
        self
    }
}

/// Render a template with default configuration
///
/// Output goes to `out` and diagnostics, one per line, to `errout`. On
/// failure the diagnostics are also returned in the error and `out` may hold
/// partial output.
pub fn render(
    source: Source<'_>,
    formats: &FormatRegistry,
    scope: &Scope,
    out: &mut dyn Write,
    errout: &mut dyn Write,
) -> Result<(), RenderError> {
    render_with_config(source, formats, scope, out, errout, &RenderConfig::default())
}

/// Render a template with custom configuration
///
/// # Example
///
/// ```rust
/// use tmplwalk::{render_with_config, FormatRegistry, MemoryLoader, RenderConfig, Scope, Source, TagSet};
/// use std::path::Path;
///
/// let config = RenderConfig::new()
///     .with_tags(TagSet::new().with_delimiters("<%", "%>"))
///     .with_loader(MemoryLoader::new().with_template("page", "Hi <%= who%>"));
///
/// let mut out = Vec::new();
/// render_with_config(
///     Source::Path(Path::new("page")),
///     &FormatRegistry::new(),
///     &Scope::new().with_var("who", "there"),
///     &mut out,
///     &mut std::io::sink(),
///     &config,
/// )
/// .unwrap();
/// assert_eq!(out, b"Hi there");
/// ```
pub fn render_with_config(
    source: Source<'_>,
    formats: &FormatRegistry,
    scope: &Scope,
    out: &mut dyn Write,
    errout: &mut dyn Write,
    config: &RenderConfig,
) -> Result<(), RenderError> {
    let ctx = ParseContext {
        tags: &config.tags,
        formats,
        max_include_depth: config.max_include_depth,
    };

    let mut template = match source {
        Source::Text(text) => Template::from_text(text, &ctx),
        Source::Path(path) => match Template::load(path, config.loader.as_ref(), 0, &ctx) {
            Ok(template) => template,
            Err(error) => {
                let diagnostic = Diagnostic::new(error, path.display().to_string());
                writeln!(errout, "{}", diagnostic)?;
                return Err(RenderError::Template(vec![diagnostic]));
            }
        },
    };

    let resolver = IncludeResolver::new(config.loader.as_ref(), ctx);
    renderer::render_template(&mut template, scope, resolver, out, errout)
}

/// Render literal template text to a string with default configuration
///
/// Diagnostics are only returned in the error.
pub fn render_to_string(
    text: &str,
    formats: &FormatRegistry,
    scope: &Scope,
) -> Result<String, RenderError> {
    let mut out = Vec::new();
    render(Source::Text(text), formats, scope, &mut out, &mut io::sink())?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
