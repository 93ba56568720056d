//! Formatting callbacks for `VAR` tags
//!
//! A `VAR` tag may name a formatter with `fmt="name"`. The name is resolved
//! against a [`FormatRegistry`] when the template is parsed and the formatter
//! is invoked with the variable's value at render time.
//!
//! # Example
//!
//! ```text
//! <a href="/search?q={{VAR query fmt=url}}">{{VAR query fmt=entity}}</a>
//! ```

mod encode;
mod registry;

pub use encode::{encode_entity, encode_url};
pub use registry::{FormatFn, FormatRegistry, Formatter};
