//! Scanner splitting template text into text runs and tags
//!
//! The scanner walks the source one character at a time looking for a
//! discarded comment or the start of a tag. Once a keyword is recognized the
//! rest of the tag is handed to the logos lexer and the chumsky attribute
//! grammar. A tag that fails to scan is reported and its first character is
//! treated as text, so scanning resumes right after it.

use std::sync::Arc;

use logos::Logos;

use super::ast::Attr;
use super::grammar::parse_attributes;
use super::lexer::Token;
use crate::error::{Diagnostic, Span, TemplateError};
use crate::tagset::{TagKind, TagSet};

/// One lexical unit of a template
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Unit {
    Text(Span),
    Tag(RawTag),
}

/// A tag that scanned cleanly; its attributes are not validated yet
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawTag {
    pub kind: TagKind,
    pub attrs: Vec<Attr>,
    pub span: Span,
    pub line: usize,
}

/// Collects diagnostics for one template
#[derive(Debug)]
pub(crate) struct Reporter {
    file: String,
    source: Arc<str>,
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub fn new(file: impl Into<String>, source: Arc<str>) -> Self {
        Self {
            file: file.into(),
            source,
            diagnostics: Vec::new(),
        }
    }

    pub fn report(&mut self, error: TemplateError, line: usize, span: Span) {
        tracing::trace!(file = %self.file, line, "{}", error);
        self.diagnostics.push(Diagnostic::at(
            error,
            self.file.clone(),
            line,
            span,
            Arc::clone(&self.source),
        ));
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

pub(crate) struct Scanner<'s> {
    src: &'s str,
    tags: &'s TagSet,
    keywords: Vec<(TagKind, &'s str)>,
    pos: usize,
    pending: Option<RawTag>,
    // line number of `counted`, advanced lazily
    line: usize,
    counted: usize,
    comments_exhausted: bool,
    pub reporter: Reporter,
}

impl<'s> Scanner<'s> {
    pub fn new(src: &'s str, tags: &'s TagSet, reporter: Reporter) -> Self {
        Self {
            src,
            tags,
            keywords: tags.keywords_by_length(),
            pos: 0,
            pending: None,
            line: 1,
            counted: 0,
            comments_exhausted: false,
            reporter,
        }
    }

    /// Line number of a byte offset
    fn line_at(&mut self, offset: usize) -> usize {
        if offset < self.counted {
            self.line = 1;
            self.counted = 0;
        }
        let newlines = self.src.as_bytes()[self.counted..offset]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.line += newlines;
        self.counted = offset;
        self.line
    }

    /// Produce the next text run or tag, or `None` at the end of input
    pub fn next_unit(&mut self) -> Option<Unit> {
        if let Some(tag) = self.pending.take() {
            return Some(Unit::Tag(tag));
        }

        let src = self.src;
        let mut text_start = self.pos;
        let mut i = self.pos;
        while i < src.len() {
            let rest = &src[i..];

            if !self.comments_exhausted && rest.starts_with(&self.tags.comment_start) {
                let body = i + self.tags.comment_start.len();
                match src[body..].find(&self.tags.comment_end) {
                    Some(len) => {
                        let after = body + len + self.tags.comment_end.len();
                        if i > text_start {
                            self.pos = after;
                            return Some(Unit::Text(text_start..i));
                        }
                        text_start = after;
                        i = after;
                        continue;
                    }
                    None => {
                        let line = self.line_at(i);
                        self.reporter.report(
                            TemplateError::UnterminatedComment {
                                open: self.tags.comment_start.clone(),
                                close: self.tags.comment_end.clone(),
                            },
                            line,
                            i..body,
                        );
                        self.comments_exhausted = true;
                    }
                }
            }

            if rest.starts_with(&self.tags.tag_comment_start) || rest.starts_with(&self.tags.start)
            {
                if let Some(tag) = self.scan_tag(i) {
                    self.pos = tag.span.end;
                    if i > text_start {
                        self.pending = Some(tag);
                        return Some(Unit::Text(text_start..i));
                    }
                    return Some(Unit::Tag(tag));
                }
            }

            i += rest.chars().next().map_or(1, char::len_utf8);
        }

        self.pos = src.len();
        (src.len() > text_start).then(|| Unit::Text(text_start..src.len()))
    }

    /// Match a keyword at the start of `text`, returning its kind, whether it
    /// was the variable shorthand, and its length
    fn match_keyword(&self, text: &str) -> Option<(TagKind, bool, usize)> {
        for &(kind, keyword) in &self.keywords {
            let len = keyword.len();
            if text.len() >= len
                && text.is_char_boundary(len)
                && text[..len].eq_ignore_ascii_case(keyword)
            {
                return Some((kind, false, len));
            }
        }
        let shorthand = self.tags.var_shorthand.as_str();
        text.starts_with(shorthand)
            .then_some((TagKind::Var, true, shorthand.len()))
    }

    /// Try to scan a tag starting at `at`
    ///
    /// Returns `None` when there is no tag here, either because no keyword
    /// follows the delimiter or because the tag is malformed. Malformed tags
    /// are reported.
    fn scan_tag(&mut self, at: usize) -> Option<RawTag> {
        let src = self.src;
        let (wrapped, after_open) = if src[at..].starts_with(&self.tags.tag_comment_start) {
            let open = at + self.tags.tag_comment_start.len();
            let skipped = src[open..].len() - src[open..].trim_start().len();
            (true, open + skipped)
        } else {
            (false, at + self.tags.start.len())
        };

        let (kind, shorthand, keyword_len) = self.match_keyword(&src[after_open..])?;
        let body_start = after_open + keyword_len;
        let line = self.line_at(at);

        match self.scan_body(kind, shorthand, wrapped, body_start) {
            Ok((attrs, end)) => Some(RawTag {
                kind,
                attrs,
                span: at..end,
                line,
            }),
            Err((error, end)) => {
                self.reporter.report(error, line, at..end);
                None
            }
        }
    }

    /// Lex and parse the attributes of a tag up to its closing delimiter
    ///
    /// On success returns the attributes and the offset just past the tag.
    fn scan_body(
        &self,
        kind: TagKind,
        shorthand: bool,
        wrapped: bool,
        body_start: usize,
    ) -> Result<(Vec<Attr>, usize), (TemplateError, usize)> {
        let src = self.src;
        let body = &src[body_start..];
        let tag = self.tags.keyword(kind).to_string();
        let close = if wrapped {
            self.tags.tag_comment_end.as_str()
        } else {
            self.tags.end.as_str()
        };

        let mut lexer = Token::lexer(body);
        // offset in `body` where the current lexer's input starts
        let mut base = 0;
        let mut tokens: Vec<(Token, Span)> = Vec::new();
        let (attrs_end, tag_end) = loop {
            let remainder = lexer.remainder();
            let offset = body_start + body.len() - remainder.len();

            if remainder.starts_with(close) {
                break (offset, offset + close.len());
            }
            if !wrapped && remainder.starts_with('/') && remainder[1..].starts_with(close) {
                if kind.is_container() {
                    return Err((TemplateError::SelfClosingContainer { tag }, offset + 1 + close.len()));
                }
                break (offset, offset + 1 + close.len());
            }

            match lexer.next() {
                Some(Ok(Token::Word(word))) => {
                    let start = base + lexer.span().start;
                    // `x--}}` is the word `x` followed by the closing marker
                    let cut = (1..word.len()).find(|&k| body[start + k..].starts_with(close));
                    match cut {
                        Some(k) => {
                            let word = word[..k].to_string();
                            tokens.push((Token::Word(word), body_start + start..body_start + start + k));
                            base = start + k;
                            lexer = Token::lexer(&body[base..]);
                        }
                        None => {
                            let end = start + word.len();
                            tokens.push((Token::Word(word), body_start + start..body_start + end));
                        }
                    }
                }
                Some(Ok(token)) => {
                    let span = lexer.span();
                    tokens.push((token, body_start + base + span.start..body_start + base + span.end));
                }
                Some(Err(())) => {
                    let span = lexer.span();
                    let found = lexer.slice().chars().next().unwrap_or(' ');
                    return Err((
                        TemplateError::MalformedAttributes {
                            tag,
                            message: format!("unexpected character '{}'", found.escape_default()),
                        },
                        body_start + base + span.end,
                    ));
                }
                None => {
                    return Err((
                        TemplateError::UnterminatedTag {
                            tag,
                            end: close.to_string(),
                        },
                        body_start,
                    ));
                }
            }
        };

        let spaced = matches!(tokens.first(), Some((Token::Whitespace, _)));
        if !shorthand && !spaced && (kind.requires_name() || !tokens.is_empty()) {
            return Err((TemplateError::MissingWhitespace { tag }, tag_end));
        }

        tokens.retain(|(token, _)| *token != Token::Whitespace);
        let attrs = parse_attributes(tokens, attrs_end)
            .map_err(|message| (TemplateError::MalformedAttributes { tag, message }, tag_end))?;
        Ok((attrs, tag_end))
    }

    /// Consume the scanner, returning the diagnostics it collected
    pub fn into_reporter(self) -> Reporter {
        self.reporter
    }
}
