//! Template loaders: where template text comes from

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::TemplateError;

/// Reads the text of a template given its path
pub trait TemplateLoader: fmt::Debug + Send + Sync {
    fn load(&self, path: &Path) -> Result<String, TemplateError>;
}

/// Loads templates from regular files
///
/// Templates are text. Bytes that are not valid UTF-8 are replaced with
/// U+FFFD, so such a template renders but is not copied byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl TemplateLoader for FsLoader {
    fn load(&self, path: &Path) -> Result<String, TemplateError> {
        let unreadable = |source| TemplateError::Unreadable {
            path: path.to_path_buf(),
            source,
        };

        let metadata = std::fs::metadata(path).map_err(unreadable)?;
        if !metadata.is_file() {
            return Err(TemplateError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path).map_err(unreadable)?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    valid_up_to = err.utf8_error().valid_up_to(),
                    "template is not valid UTF-8, replacing invalid bytes"
                );
                Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
            }
        }
    }
}

/// Serves templates from memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    templates: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template
    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> &mut Self {
        self.templates.insert(path.into(), text.into());
        self
    }

    /// Builder form of [`MemoryLoader::insert`]
    pub fn with_template(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }
}

impl TemplateLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<String, TemplateError> {
        self.templates
            .get(path)
            .cloned()
            .ok_or_else(|| TemplateError::Unreadable {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such template"),
            })
    }
}
