//! Error types for scanning, parsing and rendering templates

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum TemplateError {
    /// A discarded comment that never ends
    #[error("\"{open}\" has no matching \"{close}\"")]
    UnterminatedComment { open: String, close: String },

    /// Keyword followed directly by something other than whitespace
    #[error("ignoring bad {tag} tag (missing whitespace after tag name)")]
    MissingWhitespace { tag: String },

    /// Tag without its closing delimiter
    #[error("ignoring bad {tag} tag (no closing \"{end}\")")]
    UnterminatedTag { tag: String, end: String },

    /// `IF`, `LOOP` and their terminators cannot end with `/`
    #[error("ignoring bad {tag} tag (container tags cannot be self-closing)")]
    SelfClosingContainer { tag: String },

    /// Attribute list that could not be tokenized or parsed
    #[error("ignoring bad {tag} tag ({message})")]
    MalformedAttributes { tag: String, message: String },

    #[error("ignoring bad {tag} tag (missing \"name=\" attribute)")]
    MissingName { tag: String },

    #[error("ignoring bad {tag} tag (unknown format \"{format}\")")]
    UnknownFormat { tag: String, format: String },

    #[error("ignoring bad {tag} tag (unknown operator \"{operator}\")")]
    UnknownOperator { tag: String, operator: String },

    #[error("ignoring bad {tag} tag (bad \"level=\" attribute \"{level}\")")]
    BadLevel { tag: String, level: String },

    #[error("ignoring bad {tag} tag (not inside a loop)")]
    OutsideLoop { tag: String },

    #[error("ignoring bad {tag} tag (inclusion deeper than {max}, check for include cycle)")]
    IncludeDepth { tag: String, max: usize },

    /// Terminator tag that does not close anything open
    #[error("unexpected {tag} tag")]
    UnexpectedTerminator { tag: String },

    /// `IF` or `LOOP` reaching end of input without its terminator
    #[error("{tag} tag has no {expected} tag")]
    Unclosed { tag: String, expected: String },

    #[error("failed to read template from file \"{}\": {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read template from file \"{}\": not a regular file", path.display())]
    NotAFile { path: PathBuf },
}

/// A reported problem, located in the template it occurred in
#[derive(Debug)]
pub struct Diagnostic {
    pub error: TemplateError,
    /// Template file name, `(none)` for literal template text
    pub file: String,
    /// Line of the offending tag or comment
    pub line: Option<usize>,
    pub span: Option<Span>,
    source: Option<Arc<str>>,
}

impl Diagnostic {
    /// A diagnostic that is not tied to a position in any template
    pub fn new(error: TemplateError, file: impl Into<String>) -> Self {
        Self {
            error,
            file: file.into(),
            line: None,
            span: None,
            source: None,
        }
    }

    /// A diagnostic pointing at a span of a template's source
    pub fn at(
        error: TemplateError,
        file: impl Into<String>,
        line: usize,
        span: Span,
        source: Arc<str>,
    ) -> Self {
        Self {
            error,
            file: file.into(),
            line: Some(line),
            span: Some(span),
            source: Some(source),
        }
    }

    /// Format the diagnostic with source context using ariadne
    ///
    /// Falls back to the one-line form when there is no source to show.
    pub fn report(&self) -> String {
        let (Some(span), Some(source)) = (&self.span, &self.source) else {
            return self.to_string();
        };

        let filename = self.file.as_str();
        let message = self.error.to_string();
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_config(Config::default().with_color(false))
            .with_message(&message)
            .with_label(
                Label::new((filename, span.clone()))
                    .with_message(&message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(&**source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.file, line, self.error),
            None => write!(f, "{}: {}", self.file, self.error),
        }
    }
}
