//! Tag keyword and delimiter configuration
//!
//! A [`TagSet`] decides how the scanner recognizes tags and comments. It is an
//! immutable value handed to every render, so two renders with different tag
//! sets never interfere with each other.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or validating a tag set
#[derive(Error, Debug)]
pub enum TagSetError {
    #[error("Failed to read tag set file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse tag set TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("tag set entry '{field}' must not be empty")]
    Empty { field: &'static str },
}

/// The kinds of tags the scanner can recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Var,
    Include,
    If,
    ElseIf,
    Else,
    EndIf,
    Loop,
    EndLoop,
    Break,
    Continue,
}

impl TagKind {
    pub const ALL: [TagKind; 10] = [
        TagKind::Var,
        TagKind::Include,
        TagKind::If,
        TagKind::ElseIf,
        TagKind::Else,
        TagKind::EndIf,
        TagKind::Loop,
        TagKind::EndLoop,
        TagKind::Break,
        TagKind::Continue,
    ];

    /// Tags that carry a mandatory name and therefore need whitespace after the keyword
    pub fn requires_name(self) -> bool {
        matches!(
            self,
            TagKind::Var | TagKind::Include | TagKind::If | TagKind::ElseIf | TagKind::Loop
        )
    }

    /// Tags that open or close a body and may not be written self-closing
    pub fn is_container(self) -> bool {
        matches!(
            self,
            TagKind::If | TagKind::EndIf | TagKind::Loop | TagKind::EndLoop
        )
    }

    /// Tags that end a list during parsing
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            TagKind::ElseIf | TagKind::Else | TagKind::EndIf | TagKind::EndLoop
        )
    }
}

/// Keyword and delimiter strings used to recognize tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    pub start: String,
    pub end: String,
    pub comment_start: String,
    pub comment_end: String,
    pub tag_comment_start: String,
    pub tag_comment_end: String,
    pub var_shorthand: String,
    keywords: [String; 10],
}

/// TOML structure for deserializing tag sets; every entry is optional
#[derive(Deserialize, Default)]
#[serde(default)]
struct TomlTagSet {
    delimiters: TomlDelimiters,
    keywords: TomlKeywords,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TomlDelimiters {
    start: Option<String>,
    end: Option<String>,
    comment_start: Option<String>,
    comment_end: Option<String>,
    tag_comment_start: Option<String>,
    tag_comment_end: Option<String>,
    var_shorthand: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TomlKeywords {
    var: Option<String>,
    include: Option<String>,
    #[serde(rename = "if")]
    if_: Option<String>,
    elsif: Option<String>,
    #[serde(rename = "else")]
    else_: Option<String>,
    endif: Option<String>,
    #[serde(rename = "loop")]
    loop_: Option<String>,
    endloop: Option<String>,
    #[serde(rename = "break")]
    break_: Option<String>,
    #[serde(rename = "continue")]
    continue_: Option<String>,
}

fn index(kind: TagKind) -> usize {
    match kind {
        TagKind::Var => 0,
        TagKind::Include => 1,
        TagKind::If => 2,
        TagKind::ElseIf => 3,
        TagKind::Else => 4,
        TagKind::EndIf => 5,
        TagKind::Loop => 6,
        TagKind::EndLoop => 7,
        TagKind::Break => 8,
        TagKind::Continue => 9,
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self {
            start: "{{".to_string(),
            end: "}}".to_string(),
            comment_start: "{{*".to_string(),
            comment_end: "*}}".to_string(),
            tag_comment_start: "{{!--".to_string(),
            tag_comment_end: "--}}".to_string(),
            var_shorthand: "=".to_string(),
            keywords: [
                "VAR", "INCLUDE", "IF", "ELSIF", "ELSE", "ENDIF", "LOOP", "ENDLOOP", "BREAK",
                "CONTINUE",
            ]
            .map(String::from),
        }
    }
}

impl TagSet {
    /// Create the default tag set
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a tag set from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, TagSetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a tag set from a TOML string
    ///
    /// Entries that are not present keep their default value.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, TagSetError> {
        let parsed: TomlTagSet = toml::from_str(content)?;
        let mut tags = Self::default();

        let d = parsed.delimiters;
        let delimiters = [
            (d.start, &mut tags.start),
            (d.end, &mut tags.end),
            (d.comment_start, &mut tags.comment_start),
            (d.comment_end, &mut tags.comment_end),
            (d.tag_comment_start, &mut tags.tag_comment_start),
            (d.tag_comment_end, &mut tags.tag_comment_end),
            (d.var_shorthand, &mut tags.var_shorthand),
        ];
        for (value, slot) in delimiters {
            if let Some(value) = value {
                *slot = value;
            }
        }

        let k = parsed.keywords;
        let keywords = [
            (TagKind::Var, k.var),
            (TagKind::Include, k.include),
            (TagKind::If, k.if_),
            (TagKind::ElseIf, k.elsif),
            (TagKind::Else, k.else_),
            (TagKind::EndIf, k.endif),
            (TagKind::Loop, k.loop_),
            (TagKind::EndLoop, k.endloop),
            (TagKind::Break, k.break_),
            (TagKind::Continue, k.continue_),
        ];
        for (kind, label) in keywords {
            if let Some(label) = label {
                tags.keywords[index(kind)] = label;
            }
        }

        tags.validate()?;
        Ok(tags)
    }

    /// Check that no keyword or delimiter is empty
    pub fn validate(&self) -> Result<(), TagSetError> {
        let fields = [
            ("start", &self.start),
            ("end", &self.end),
            ("comment_start", &self.comment_start),
            ("comment_end", &self.comment_end),
            ("tag_comment_start", &self.tag_comment_start),
            ("tag_comment_end", &self.tag_comment_end),
            ("var_shorthand", &self.var_shorthand),
        ];
        for (field, value) in fields {
            if value.is_empty() {
                return Err(TagSetError::Empty { field });
            }
        }
        for kind in TagKind::ALL {
            if self.keyword(kind).is_empty() {
                return Err(TagSetError::Empty { field: "keyword" });
            }
        }
        Ok(())
    }

    /// The keyword spelling for a tag kind
    pub fn keyword(&self, kind: TagKind) -> &str {
        &self.keywords[index(kind)]
    }

    /// Set the tag start and end delimiters
    pub fn with_delimiters(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start = start.into();
        self.end = end.into();
        self
    }

    /// Set the markers of discarded comments
    pub fn with_comment(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.comment_start = start.into();
        self.comment_end = end.into();
        self
    }

    /// Set the markers that wrap comment-style tags
    pub fn with_tag_comment(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.tag_comment_start = start.into();
        self.tag_comment_end = end.into();
        self
    }

    /// Set the keyword spelling of one tag kind
    pub fn with_keyword(mut self, kind: TagKind, label: impl Into<String>) -> Self {
        self.keywords[index(kind)] = label.into();
        self
    }

    /// Set the variable shorthand keyword
    pub fn with_var_shorthand(mut self, shorthand: impl Into<String>) -> Self {
        self.var_shorthand = shorthand.into();
        self
    }

    /// Keywords ordered longest first, so `ELSIF` is tried before `ELSE`
    pub(crate) fn keywords_by_length(&self) -> Vec<(TagKind, &str)> {
        let mut keywords: Vec<(TagKind, &str)> = TagKind::ALL
            .iter()
            .map(|&kind| (kind, self.keyword(kind)))
            .collect();
        keywords.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        keywords
    }
}
