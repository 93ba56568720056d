//! Recursive-descent parser building the template tree
//!
//! ```text
//! list        := unit*                  until a terminator in the stop set
//! unit        := TEXT | VAR | INCLUDE | BREAK | CONTINUE | conditional | loop
//! conditional := IF cond list (ELSIF cond list)* (ELSE list)? ENDIF
//! loop        := LOOP name list ENDLOOP
//! ```
//!
//! Problems are reported and parsing goes on. A terminator that nothing is
//! waiting for is discarded, an `IF` or `LOOP` that never closes keeps what
//! was parsed up to the end of input, and a tag with bad attributes is
//! dropped together with its body.

use std::sync::Arc;

use super::ast::{Attr, Condition, Conditional, Include, LoopBlock, Node, Operator, Variable};
use super::scanner::{RawTag, Reporter, Scanner, Unit};
use crate::error::{Diagnostic, TemplateError};
use crate::format::FormatRegistry;
use crate::tagset::{TagKind, TagSet};

/// Everything the parser needs besides the template text
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub tags: &'a TagSet,
    pub formats: &'a FormatRegistry,
    /// `INCLUDE` tags are rejected in templates nested this deep
    pub max_include_depth: usize,
}

/// Terminator kinds that end the list being parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StopSet(u16);

impl StopSet {
    fn with(self, kind: TagKind) -> Self {
        StopSet(self.0 | 1 << kind as u16)
    }

    fn contains(self, kind: TagKind) -> bool {
        self.0 & (1 << kind as u16) != 0
    }
}

/// Parse template text into a tree
///
/// `file` names the template in diagnostics and `include_depth` is how many
/// inclusions deep this template sits. Diagnostics are returned alongside
/// the tree, which is complete but omits every rejected tag.
pub fn parse(
    source: &Arc<str>,
    file: &str,
    include_depth: usize,
    ctx: &ParseContext<'_>,
) -> (Vec<Node>, Vec<Diagnostic>) {
    let reporter = Reporter::new(file, Arc::clone(source));
    let mut parser = Parser {
        scanner: Scanner::new(source, ctx.tags, reporter),
        lookahead: None,
        ctx,
        include_depth,
        loop_depth: 0,
    };

    let mut root = parser.parse_list(StopSet::default());
    // a terminator left over at top level cannot be in the empty stop set
    debug_assert!(parser.lookahead.is_none());
    root.shrink_to_fit();

    let diagnostics = parser.scanner.into_reporter().into_diagnostics();
    tracing::debug!(
        file,
        include_depth,
        nodes = root.len(),
        diagnostics = diagnostics.len(),
        "parsed template"
    );
    (root, diagnostics)
}

struct Parser<'s> {
    scanner: Scanner<'s>,
    lookahead: Option<Unit>,
    ctx: &'s ParseContext<'s>,
    include_depth: usize,
    loop_depth: usize,
}

impl<'s> Parser<'s> {
    fn next(&mut self) -> Option<Unit> {
        self.lookahead.take().or_else(|| self.scanner.next_unit())
    }

    /// Take the lookahead if it is a terminator of the given kind
    fn take_terminator(&mut self, kind: TagKind) -> Option<RawTag> {
        match self.lookahead.take() {
            Some(Unit::Tag(tag)) if tag.kind == kind => Some(tag),
            other => {
                self.lookahead = other;
                None
            }
        }
    }

    fn keyword(&self, kind: TagKind) -> String {
        self.ctx.tags.keyword(kind).to_string()
    }

    fn report(&mut self, error: TemplateError, tag: &RawTag) {
        self.scanner
            .reporter
            .report(error, tag.line, tag.span.clone());
    }

    fn parse_list(&mut self, stop: StopSet) -> Vec<Node> {
        let mut nodes = Vec::new();
        while let Some(unit) = self.next() {
            let tag = match unit {
                Unit::Text(span) => {
                    nodes.push(Node::Text(span));
                    continue;
                }
                Unit::Tag(tag) => tag,
            };

            if tag.kind.is_terminator() {
                if stop.contains(tag.kind) {
                    self.lookahead = Some(Unit::Tag(tag));
                    break;
                }
                let error = TemplateError::UnexpectedTerminator {
                    tag: self.keyword(tag.kind),
                };
                self.report(error, &tag);
                continue;
            }

            let node = match tag.kind {
                TagKind::If => self.conditional(tag, stop),
                TagKind::Loop => self.loop_block(tag, stop),
                _ => self.leaf(&tag),
            };
            nodes.extend(node);
        }
        nodes
    }

    fn conditional(&mut self, opener: RawTag, stop: StopSet) -> Option<Node> {
        let arm_stop = stop
            .with(TagKind::ElseIf)
            .with(TagKind::Else)
            .with(TagKind::EndIf);

        let test = self.condition(&opener);
        let then_branch = self.parse_list(arm_stop);

        let mut arms = Vec::new();
        while let Some(tag) = self.take_terminator(TagKind::ElseIf) {
            let cond = self.condition(&tag);
            let body = self.parse_list(arm_stop);
            arms.push((cond, body));
        }

        let mut else_branch = Vec::new();
        if self.take_terminator(TagKind::Else).is_some() {
            else_branch = self.parse_list(stop.with(TagKind::EndIf));
        }

        if self.take_terminator(TagKind::EndIf).is_none() {
            let error = TemplateError::Unclosed {
                tag: self.keyword(TagKind::If),
                expected: self.keyword(TagKind::EndIf),
            };
            self.report(error, &opener);
        }

        // fold ELSIF arms into nested conditionals, innermost last
        for (cond, body) in arms.into_iter().rev() {
            if let Some(test) = cond {
                else_branch = vec![Node::Conditional(Conditional {
                    test,
                    then_branch: body,
                    else_branch,
                })];
            }
        }

        Some(Node::Conditional(Conditional {
            test: test?,
            then_branch,
            else_branch,
        }))
    }

    fn loop_block(&mut self, opener: RawTag, stop: StopSet) -> Option<Node> {
        let name = self.required_name(&opener);

        self.loop_depth += 1;
        let body = self.parse_list(stop.with(TagKind::EndLoop));
        self.loop_depth -= 1;

        if self.take_terminator(TagKind::EndLoop).is_none() {
            let error = TemplateError::Unclosed {
                tag: self.keyword(TagKind::Loop),
                expected: self.keyword(TagKind::EndLoop),
            };
            self.report(error, &opener);
        }

        Some(Node::Loop(LoopBlock { name: name?, body }))
    }

    /// Build a tag without a body, reporting it if it is invalid
    fn leaf(&mut self, tag: &RawTag) -> Option<Node> {
        let built = match tag.kind {
            TagKind::Var => self.variable(tag),
            TagKind::Include => self.include(tag),
            TagKind::Break | TagKind::Continue => self.break_continue(tag),
            _ => return None,
        };
        match built {
            Ok(node) => Some(node),
            Err(error) => {
                self.report(error, tag);
                None
            }
        }
    }

    fn variable(&self, tag: &RawTag) -> Result<Node, TemplateError> {
        let name = self.name(tag)?;
        let default = named(&tag.attrs, "default").map(str::to_string);
        let formatter = match named(&tag.attrs, "fmt").or_else(|| named(&tag.attrs, "format")) {
            Some(format) => Some(self.ctx.formats.get(format).cloned().ok_or_else(|| {
                TemplateError::UnknownFormat {
                    tag: self.keyword(tag.kind),
                    format: format.to_string(),
                }
            })?),
            None => None,
        };
        Ok(Node::Variable(Variable {
            name,
            default,
            formatter,
        }))
    }

    fn include(&self, tag: &RawTag) -> Result<Node, TemplateError> {
        let reference = self.name(tag)?;
        if self.include_depth >= self.ctx.max_include_depth {
            return Err(TemplateError::IncludeDepth {
                tag: self.keyword(tag.kind),
                max: self.ctx.max_include_depth,
            });
        }
        Ok(Node::Include(Include::new(
            reference,
            tag.line,
            tag.span.clone(),
        )))
    }

    fn break_continue(&self, tag: &RawTag) -> Result<Node, TemplateError> {
        if self.loop_depth == 0 {
            return Err(TemplateError::OutsideLoop {
                tag: self.keyword(tag.kind),
            });
        }

        let level = match named(&tag.attrs, "level") {
            None => 1,
            Some(raw) => match raw.parse::<usize>() {
                Ok(level) if (1..=self.loop_depth).contains(&level) => level,
                _ => {
                    return Err(TemplateError::BadLevel {
                        tag: self.keyword(tag.kind),
                        level: raw.to_string(),
                    })
                }
            },
        };

        Ok(match tag.kind {
            TagKind::Break => Node::Break { level },
            _ => Node::Continue { level },
        })
    }

    /// Test of an `IF` or `ELSIF`, reported and `None` when invalid
    fn condition(&mut self, tag: &RawTag) -> Option<Condition> {
        match self.build_condition(tag) {
            Ok(cond) => Some(cond),
            Err(error) => {
                self.report(error, tag);
                None
            }
        }
    }

    fn build_condition(&self, tag: &RawTag) -> Result<Condition, TemplateError> {
        let name = self.name(tag)?;

        let inline = tag.attrs.iter().find_map(|attr| match attr {
            Attr::Compare { op, value } => Some((op.as_str(), value.as_str())),
            _ => None,
        });
        let comparison = match inline {
            Some((op, value)) => {
                let operator = op.parse::<Operator>().map_err(|()| TemplateError::UnknownOperator {
                    tag: self.keyword(tag.kind),
                    operator: op.to_string(),
                })?;
                Some((operator, value.to_string()))
            }
            None => named(&tag.attrs, "value").map(|value| (Operator::Equal, value.to_string())),
        };

        Ok(Condition { name, comparison })
    }

    fn required_name(&mut self, tag: &RawTag) -> Option<String> {
        match self.name(tag) {
            Ok(name) => Some(name),
            Err(error) => {
                self.report(error, tag);
                None
            }
        }
    }

    /// The `name=` attribute, or else the first bare value
    fn name(&self, tag: &RawTag) -> Result<String, TemplateError> {
        named(&tag.attrs, "name")
            .or_else(|| {
                tag.attrs.iter().find_map(|attr| match attr {
                    Attr::Bare(value) => Some(value.as_str()),
                    _ => None,
                })
            })
            .map(str::to_string)
            .ok_or_else(|| TemplateError::MissingName {
                tag: self.keyword(tag.kind),
            })
    }
}

fn named<'a>(attrs: &'a [Attr], key: &str) -> Option<&'a str> {
    attrs.iter().find_map(|attr| match attr {
        Attr::Named { key: k, value } if k == key => Some(value.as_str()),
        _ => None,
    })
}
