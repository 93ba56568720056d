//! Include resolution - turns an `INCLUDE` reference into a parsed template

use std::path::{Path, PathBuf};

use crate::error::{Diagnostic, TemplateError};
use crate::parser::{Include, ParseContext};
use crate::tagset::TagKind;

use super::loader::TemplateLoader;
use super::Template;

/// Prefix of references resolved against the including template's directory
pub const RELATIVE_MARKER: &str = ".../";

/// Loads and parses included templates
#[derive(Debug, Clone, Copy)]
pub struct IncludeResolver<'a> {
    loader: &'a dyn TemplateLoader,
    ctx: ParseContext<'a>,
}

impl<'a> IncludeResolver<'a> {
    pub fn new(loader: &'a dyn TemplateLoader, ctx: ParseContext<'a>) -> Self {
        Self { loader, ctx }
    }

    /// Path an inclusion reference points to
    ///
    /// A reference starting with `.../` is taken relative to the directory of
    /// the including template; without such a directory the marker is simply
    /// dropped. Any other reference is used as written.
    pub fn effective_path(reference: &str, parent: Option<&Path>) -> PathBuf {
        let Some(rest) = reference.strip_prefix(RELATIVE_MARKER) else {
            return PathBuf::from(reference);
        };
        match parent.and_then(Path::parent) {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(rest),
            _ => PathBuf::from(rest),
        }
    }

    /// Load and parse the template an `INCLUDE` node refers to
    ///
    /// The new template sits one level deeper than `parent`. Failures are
    /// located at the `INCLUDE` tag in `parent`.
    pub fn resolve(&self, include: &Include, parent: &Template) -> Result<Template, Diagnostic> {
        let locate = |error| parent.diagnostic_at(error, include.line, include.span.clone());

        let depth = parent.depth() + 1;
        if depth > self.ctx.max_include_depth {
            return Err(locate(TemplateError::IncludeDepth {
                tag: self.ctx.tags.keyword(TagKind::Include).to_string(),
                max: self.ctx.max_include_depth,
            }));
        }

        let path = Self::effective_path(&include.reference, parent.path());
        tracing::debug!(
            reference = %include.reference,
            path = %path.display(),
            depth,
            "resolving include"
        );

        Template::load(&path, self.loader, depth, &self.ctx).map_err(locate)
    }
}
