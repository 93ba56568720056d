//! Format registry for looking up formatting callbacks by name

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use super::encode::{encode_entity, encode_url};

/// Signature of a formatting callback: write `value` to the output sink
pub type FormatFn = dyn Fn(&str, &mut dyn Write) -> io::Result<()> + Send + Sync;

/// A named formatting callback
#[derive(Clone)]
pub struct Formatter {
    name: String,
    func: Arc<FormatFn>,
}

impl Formatter {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str, &mut dyn Write) -> io::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write a value through this formatter
    pub fn write(&self, value: &str, out: &mut dyn Write) -> io::Result<()> {
        (self.func)(value, out)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatter").field("name", &self.name).finish()
    }
}

/// Registry of formatting callbacks
///
/// Registering a name twice shadows the earlier entry without removing it.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    entries: Vec<Formatter>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the `entity` and `url` formatters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("entity", encode_entity);
        registry.register("url", encode_url);
        registry
    }

    /// Register a formatter under a name
    pub fn register<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&str, &mut dyn Write) -> io::Result<()> + Send + Sync + 'static,
    {
        self.entries.push(Formatter::new(name, func));
        self
    }

    /// Look up the most recently registered formatter with this exact name
    pub fn get(&self, name: &str) -> Option<&Formatter> {
        self.entries.iter().rev().find(|f| f.name == name)
    }

    /// Check if a formatter exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of registered entries, shadowed ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(formatter: &Formatter, value: &str) -> String {
        let mut out = Vec::new();
        formatter.write(value, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = FormatRegistry::new();
        registry.register("upper", |value, out| {
            out.write_all(value.to_uppercase().as_bytes())
        });

        assert!(registry.contains("upper"));
        assert!(!registry.contains("Upper"));
        let formatter = registry.get("upper").expect("Should be registered");
        assert_eq!(formatter.name(), "upper");
        assert_eq!(render(formatter, "abc"), "ABC");
    }

    #[test]
    fn test_duplicate_shadows_without_removing() {
        let mut registry = FormatRegistry::new();
        registry.register("f", |_, out| out.write_all(b"first"));
        registry.register("f", |_, out| out.write_all(b"second"));

        assert_eq!(registry.len(), 2);
        assert_eq!(render(registry.get("f").unwrap(), "x"), "second");
    }

    #[test]
    fn test_builtins() {
        let registry = FormatRegistry::with_builtins();
        assert_eq!(render(registry.get("entity").unwrap(), "<b>"), "&lt;b&gt;");
        assert_eq!(render(registry.get("url").unwrap(), "a b"), "a+b");
        assert!(registry.get("missing").is_none());
    }
}
