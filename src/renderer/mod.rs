//! Renderer walking a parsed template against a binding scope
//!
//! This module takes a [`Template`] and a root [`Scope`] and writes the
//! expanded text to an output sink, reporting problems to a diagnostics sink
//! as it goes.

mod text;
mod walk;

use std::io::Write;

pub use text::write_text;

use crate::bindings::{Context, Scope};
use crate::template::{IncludeResolver, Template};
use crate::RenderError;

use walk::Walker;

/// Render a parsed template
///
/// Parse diagnostics of `template` are reported first, then the tree is
/// walked. Included templates are loaded through `resolver` on first use.
/// Any diagnostic, from parsing or from a failed inclusion, makes the result
/// an error; the output sink may hold partial output by then.
pub fn render_template(
    template: &mut Template,
    scope: &Scope,
    resolver: IncludeResolver<'_>,
    out: &mut dyn Write,
    errout: &mut dyn Write,
) -> Result<(), RenderError> {
    let mut walker = Walker::new(out, errout, resolver);
    for diagnostic in template.take_diagnostics() {
        walker.report(diagnostic)?;
    }

    walker.walk(template, &Context::new(scope))?;

    let diagnostics = walker.into_diagnostics();
    if diagnostics.is_empty() {
        Ok(())
    } else {
        tracing::debug!(
            file = template.name(),
            errors = diagnostics.len(),
            "render failed"
        );
        Err(RenderError::Template(diagnostics))
    }
}
