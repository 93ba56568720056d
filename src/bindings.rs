//! Binding model: named values and repeated rows a template is rendered against
//!
//! Bindings form a strict tree. A [`Scope`] owns its variables and its loops,
//! and a [`Loop`] owns its rows, which are scopes again. Because attaching moves
//! the child into its parent, a scope or loop can never be attached twice and
//! no attachment can create a cycle.
//!
//! Name resolution walks outward through the scopes that are currently open
//! during evaluation, which is what [`Context`] tracks.

use std::collections::HashMap;

/// A binding scope holding named values and named loops
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    vars: HashMap<String, String>,
    loops: HashMap<String, Loop>,
}

/// An ordered sequence of rows for a `LOOP` tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loop {
    rows: Vec<Scope>,
}

impl Scope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable, replacing any earlier value of the same name
    pub fn add_var(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Bind several variables at once; a later pair wins over an earlier one
    pub fn add_vars<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in pairs {
            self.add_var(name, value);
        }
        self
    }

    /// Attach a loop under a name, replacing any earlier loop of the same name
    pub fn add_loop(&mut self, name: impl Into<String>, rows: Loop) -> &mut Self {
        self.loops.insert(name.into(), rows);
        self
    }

    /// Builder form of [`Scope::add_var`]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_var(name, value);
        self
    }

    /// Builder form of [`Scope::add_loop`]
    pub fn with_loop(mut self, name: impl Into<String>, rows: Loop) -> Self {
        self.add_loop(name, rows);
        self
    }

    /// Value bound directly in this scope
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Loop attached directly to this scope
    pub fn get_loop(&self, name: &str) -> Option<&Loop> {
        self.loops.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.loops.is_empty()
    }
}

impl Loop {
    /// Create a loop with no rows
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row; rows render in the order they were added
    pub fn add_row(&mut self, row: Scope) -> &mut Self {
        self.rows.push(row);
        self
    }

    /// Builder form of [`Loop::add_row`]
    pub fn with_row(mut self, row: Scope) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(&self) -> &[Scope] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<Scope> for Loop {
    fn from_iter<T: IntoIterator<Item = Scope>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// The chain of scopes open at some point of evaluation, innermost last
#[derive(Debug, Clone)]
pub struct Context<'a> {
    frames: Vec<&'a Scope>,
}

impl<'a> Context<'a> {
    pub fn new(root: &'a Scope) -> Self {
        Self { frames: vec![root] }
    }

    /// Enter a loop row
    pub fn push(&mut self, row: &'a Scope) {
        self.frames.push(row);
    }

    /// Leave the innermost loop row; the root scope is never popped
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Resolve a variable, innermost scope first
    pub fn value(&self, name: &str) -> Option<&'a str> {
        self.frames.iter().rev().find_map(|scope| scope.var(name))
    }

    /// Resolve a loop, innermost scope first
    pub fn find_loop(&self, name: &str) -> Option<&'a Loop> {
        self.frames.iter().rev().find_map(|scope| scope.get_loop(name))
    }

    /// Resolve a loop together with the context its rows are evaluated in
    ///
    /// Rows see the scope that owns the loop and that scope's enclosing
    /// scopes, not whatever rows happened to be open when the loop was
    /// reached.
    pub fn enter_loop(&self, name: &str) -> Option<(Context<'a>, &'a Loop)> {
        let (owner, rows) = self
            .frames
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, scope)| scope.get_loop(name).map(|rows| (i, rows)))?;
        let ctx = Context {
            frames: self.frames[..=owner].to_vec(),
        };
        Some((ctx, rows))
    }

    /// Number of open scopes, including the root
    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }
}
