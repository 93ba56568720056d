//! Tree walker producing output from a parsed template and its bindings

use std::io::{self, Write};

use crate::bindings::Context;
use crate::error::Diagnostic;
use crate::parser::{Condition, Node};
use crate::template::{IncludeResolver, Template};

use super::text::write_text;

/// How a list of nodes finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Next,
    /// Leave this many enclosing loops
    Break(usize),
    /// Leave this many enclosing loops minus one, then go to the next row
    Continue(usize),
}

pub(crate) struct Walker<'r> {
    out: &'r mut dyn Write,
    errout: &'r mut dyn Write,
    resolver: IncludeResolver<'r>,
    diagnostics: Vec<Diagnostic>,
    halted: bool,
}

impl<'r> Walker<'r> {
    pub fn new(
        out: &'r mut dyn Write,
        errout: &'r mut dyn Write,
        resolver: IncludeResolver<'r>,
    ) -> Self {
        Self {
            out,
            errout,
            resolver,
            diagnostics: Vec::new(),
            halted: false,
        }
    }

    /// Write a diagnostic to the diagnostics sink and remember it
    pub fn report(&mut self, diagnostic: Diagnostic) -> io::Result<()> {
        writeln!(self.errout, "{}", diagnostic)?;
        self.diagnostics.push(diagnostic);
        Ok(())
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Render a whole template
    pub fn walk(&mut self, template: &Template, ctx: &Context<'_>) -> io::Result<()> {
        self.walk_list(template, template.root(), ctx).map(|_| ())
    }

    fn walk_list<'s>(
        &mut self,
        template: &Template,
        nodes: &[Node],
        ctx: &Context<'s>,
    ) -> io::Result<Flow> {
        for node in nodes {
            if self.halted {
                break;
            }
            let flow = self.walk_node(template, node, ctx)?;
            if flow != Flow::Next {
                return Ok(flow);
            }
        }
        Ok(Flow::Next)
    }

    fn walk_node<'s>(
        &mut self,
        template: &Template,
        node: &Node,
        ctx: &Context<'s>,
    ) -> io::Result<Flow> {
        match node {
            Node::Text(span) => write_text(template.text(span), self.out)?,

            Node::Variable(var) => {
                let value = ctx.value(&var.name).or(var.default.as_deref());
                match (value, &var.formatter) {
                    (Some(value), Some(formatter)) => formatter.write(value, self.out)?,
                    (Some(value), None) => self.out.write_all(value.as_bytes())?,
                    (None, _) => {}
                }
            }

            Node::Conditional(cond) => {
                let branch = if is_true(&cond.test, ctx) {
                    &cond.then_branch
                } else {
                    &cond.else_branch
                };
                return self.walk_list(template, branch, ctx);
            }

            Node::Loop(block) => {
                let Some((mut inner, rows)) = ctx.enter_loop(&block.name) else {
                    return Ok(Flow::Next);
                };
                for row in rows.rows() {
                    inner.push(row);
                    let flow = self.walk_list(template, &block.body, &inner)?;
                    inner.pop();
                    match flow {
                        Flow::Next | Flow::Continue(1) => {}
                        Flow::Break(1) => break,
                        Flow::Break(level) => return Ok(Flow::Break(level - 1)),
                        Flow::Continue(level) => return Ok(Flow::Continue(level - 1)),
                    }
                    if self.halted {
                        break;
                    }
                }
            }

            Node::Break { level } => return Ok(Flow::Break(*level)),
            Node::Continue { level } => return Ok(Flow::Continue(*level)),

            Node::Include(include) => {
                if include.cached.get().is_none() {
                    match self.resolver.resolve(include, template) {
                        Ok(mut nested) => {
                            for diagnostic in nested.take_diagnostics() {
                                self.report(diagnostic)?;
                            }
                            // cannot be filled already, this is the first visit
                            let _ = include.cached.set(Box::new(nested));
                        }
                        Err(diagnostic) => {
                            self.report(diagnostic)?;
                            self.halted = true;
                            return Ok(Flow::Next);
                        }
                    }
                }
                if let Some(nested) = include.cached.get() {
                    return self.walk_list(nested, nested.root(), ctx);
                }
            }
        }
        Ok(Flow::Next)
    }
}

/// Evaluate the test of a conditional
///
/// Without a comparison the test holds for a non-empty value, or for an
/// unbound name that resolves to a loop. A comparison against an unbound
/// name never holds.
fn is_true(test: &Condition, ctx: &Context<'_>) -> bool {
    let value = ctx.value(&test.name);
    match &test.comparison {
        None => match value {
            Some(value) => !value.is_empty(),
            None => ctx.find_loop(&test.name).is_some(),
        },
        Some((operator, literal)) => value.is_some_and(|value| operator.compare(value, literal)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{Loop, Scope};
    use crate::parser::Operator;

    fn condition(name: &str, comparison: Option<(Operator, &str)>) -> Condition {
        Condition {
            name: name.to_string(),
            comparison: comparison.map(|(op, lit)| (op, lit.to_string())),
        }
    }

    #[test]
    fn test_existence() {
        let root = Scope::new()
            .with_var("full", "x")
            .with_var("empty", "")
            .with_loop("rows", Loop::new());
        let ctx = Context::new(&root);

        assert!(is_true(&condition("full", None), &ctx));
        assert!(!is_true(&condition("empty", None), &ctx));
        assert!(!is_true(&condition("missing", None), &ctx));
        assert!(is_true(&condition("rows", None), &ctx));
    }

    #[test]
    fn test_comparisons() {
        let root = Scope::new().with_var("n", "5");
        let ctx = Context::new(&root);

        assert!(is_true(&condition("n", Some((Operator::Equal, "5"))), &ctx));
        assert!(!is_true(&condition("n", Some((Operator::Equal, "05"))), &ctx));
        assert!(is_true(&condition("n", Some((Operator::Greater, "10"))), &ctx));
        assert!(!is_true(&condition("missing", Some((Operator::NotEqual, "5"))), &ctx));
    }
}
