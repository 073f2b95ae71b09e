//! Syntax definition schema
//!
//! A definition is an ordered list of named components. Each component
//! names a lexical category, the rule that recognizes it, and the color it
//! is displayed in. Definitions are read from TOML:
//!
//! ```toml
//! name = "C"
//! one_line_comment_prefix = "//"
//!
//! [[components]]
//! name = "Comments"
//! type = "block_comment"
//! start = "/*"
//! end = "*/"
//! color = [0.0, 0.5, 0.0]
//!
//! [[components]]
//! name = "Keywords"
//! type = "keywords"
//! keywords = ["if", "else", "while"]
//! color = [0.6, 0.0, 0.6]
//! ```
//!
//! Component order matters: when two components could start at the same
//! position, the earlier one wins.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use regex::Regex;
use serde::Deserialize;

use crate::color::Color;
use crate::error::{Error, Result};

/// Set of characters that make up a word for keyword matching
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Charset {
    /// Explicit characters; `None` means Unicode alphanumerics plus '_'
    chars: Option<HashSet<char>>,
}

impl Charset {
    /// Charset made of exactly the characters in `chars`
    pub fn from_chars(chars: &str) -> Self {
        Self {
            chars: Some(chars.chars().collect()),
        }
    }

    /// Check whether `ch` can be part of a word
    pub fn contains(&self, ch: char) -> bool {
        match &self.chars {
            Some(set) => set.contains(&ch),
            None => ch.is_alphanumeric() || ch == '_',
        }
    }
}

/// How a component recognizes its text
#[derive(Debug, Clone)]
pub enum Rule {
    /// Delimited comment, may span lines
    BlockComment { start: String, end: String },
    /// Comment running to the end of the line
    OneLineComment { start: String },
    /// Delimited string with optional escape character, may span lines
    String {
        start: String,
        end: String,
        escape: Option<char>,
    },
    /// Delimited tag (e.g. markup), may span lines
    Tag { start: String, end: String },
    /// Whole words from a fixed list, extended with user identifiers
    Keywords {
        keywords: BTreeSet<String>,
        charset: Charset,
    },
    /// Whole words supplied only by the user
    UserIdentifiers { charset: Charset },
    /// Regular expression matched within a single line
    Pattern { regex: Regex },
}

impl Rule {
    /// Whether this rule can carry over a line break
    pub fn is_multiline(&self) -> bool {
        matches!(
            self,
            Rule::BlockComment { .. } | Rule::String { .. } | Rule::Tag { .. }
        )
    }

    /// Whether this rule matches words and accepts user identifiers
    pub fn takes_identifiers(&self) -> bool {
        matches!(self, Rule::Keywords { .. } | Rule::UserIdentifiers { .. })
    }
}

/// A named lexical category
#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub rule: Rule,
    pub color: Color,
}

/// A complete, validated syntax definition
#[derive(Debug, Clone, Default)]
pub struct SyntaxDefinition {
    /// Display name (e.g. "C", "Rust")
    pub name: String,
    /// File extensions (e.g. ["rs"], ["py", "pyw"])
    pub extensions: Vec<String>,
    /// Marker used when toggling comments on selected lines
    pub one_line_comment_prefix: Option<String>,
    /// Components in priority order
    pub components: Vec<Component>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RuleKind {
    BlockComment,
    OneLineComment,
    String,
    Tag,
    Keywords,
    UserIdentifiers,
    Pattern,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawComponent {
    name: String,
    #[serde(rename = "type")]
    kind: RuleKind,
    color: Color,
    start: Option<String>,
    end: Option<String>,
    escape: Option<String>,
    keywords: Option<Vec<String>>,
    charset: Option<String>,
    regex: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefinition {
    name: Option<String>,
    #[serde(default)]
    extensions: Vec<String>,
    one_line_comment_prefix: Option<String>,
    #[serde(default)]
    components: Vec<RawComponent>,
}

impl SyntaxDefinition {
    /// Parse and validate a TOML definition
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw: RawDefinition = toml::from_str(contents)?;
        Self::validate(raw)
    }

    /// Load a definition file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut def = Self::from_toml_str(&contents)?;
        if def.name.is_empty() {
            def.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(def)
    }

    /// A definition with no components colors nothing
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Look up a component by name
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Check whether this definition claims a file extension
    pub fn handles_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Index of a component by name
    pub fn component_index(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name == name)
    }

    /// Prefix used for comment toggling
    ///
    /// Falls back to the first one-line comment component's start marker.
    pub fn comment_prefix(&self) -> Option<&str> {
        if let Some(prefix) = self.one_line_comment_prefix.as_deref() {
            return Some(prefix);
        }
        self.components.iter().find_map(|c| match &c.rule {
            Rule::OneLineComment { start } => Some(start.as_str()),
            _ => None,
        })
    }

    fn validate(raw: RawDefinition) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut components = Vec::with_capacity(raw.components.len());

        for rc in raw.components {
            if rc.name.trim().is_empty() {
                return Err(Error::invalid("<unnamed>", "component name is empty"));
            }
            if !seen.insert(rc.name.clone()) {
                return Err(Error::invalid(&rc.name, "duplicate component name"));
            }
            let rule = build_rule(&rc)?;
            components.push(Component {
                name: rc.name,
                rule,
                color: rc.color,
            });
        }

        let one_line_comment_prefix = match raw.one_line_comment_prefix {
            Some(p) if p.is_empty() => {
                return Err(Error::invalid(
                    "one_line_comment_prefix",
                    "prefix is empty",
                ))
            }
            other => other,
        };

        Ok(Self {
            name: raw.name.unwrap_or_default(),
            extensions: raw.extensions,
            one_line_comment_prefix,
            components,
        })
    }
}

impl FromStr for SyntaxDefinition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_toml_str(s)
    }
}

fn required(rc: &RawComponent, field: &Option<String>, what: &str) -> Result<String> {
    match field {
        Some(s) if !s.is_empty() => Ok(s.clone()),
        Some(_) => Err(Error::invalid(&rc.name, format!("'{}' is empty", what))),
        None => Err(Error::invalid(&rc.name, format!("missing '{}'", what))),
    }
}

fn charset(rc: &RawComponent) -> Charset {
    rc.charset
        .as_deref()
        .map(Charset::from_chars)
        .unwrap_or_default()
}

fn build_rule(rc: &RawComponent) -> Result<Rule> {
    let rule = match rc.kind {
        RuleKind::BlockComment => Rule::BlockComment {
            start: required(rc, &rc.start, "start")?,
            end: required(rc, &rc.end, "end")?,
        },
        RuleKind::OneLineComment => Rule::OneLineComment {
            start: required(rc, &rc.start, "start")?,
        },
        RuleKind::String => {
            let escape = match rc.escape.as_deref() {
                None => None,
                Some(s) => {
                    let mut chars = s.chars();
                    match (chars.next(), chars.next()) {
                        (Some(ch), None) => Some(ch),
                        _ => {
                            return Err(Error::invalid(
                                &rc.name,
                                "'escape' must be a single character",
                            ))
                        }
                    }
                }
            };
            Rule::String {
                start: required(rc, &rc.start, "start")?,
                end: required(rc, &rc.end, "end")?,
                escape,
            }
        }
        RuleKind::Tag => Rule::Tag {
            start: required(rc, &rc.start, "start")?,
            end: required(rc, &rc.end, "end")?,
        },
        RuleKind::Keywords => {
            let list = rc
                .keywords
                .as_ref()
                .ok_or_else(|| Error::invalid(&rc.name, "missing 'keywords'"))?;
            if list.iter().any(|k| k.is_empty()) {
                return Err(Error::invalid(&rc.name, "keyword list contains an empty entry"));
            }
            let charset = charset(rc);
            // A keyword with a non-word char could never match as a whole word
            if let Some(k) = list.iter().find(|k| !k.chars().all(|c| charset.contains(c))) {
                return Err(Error::invalid(
                    &rc.name,
                    format!("keyword '{}' has characters outside the word charset", k),
                ));
            }
            Rule::Keywords {
                keywords: list.iter().cloned().collect(),
                charset,
            }
        }
        RuleKind::UserIdentifiers => Rule::UserIdentifiers {
            charset: charset(rc),
        },
        RuleKind::Pattern => {
            let source = required(rc, &rc.regex, "regex")?;
            Rule::Pattern {
                regex: Regex::new(&source)?,
            }
        }
    };
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
name = "Sample"
extensions = ["smp"]
one_line_comment_prefix = "#"

[[components]]
name = "Comments"
type = "one_line_comment"
start = "#"
color = [0.5, 0.5, 0.5]

[[components]]
name = "Strings"
type = "string"
start = "\""
end = "\""
escape = "\\"
color = [0.0, 0.6, 0.0]

[[components]]
name = "Keywords"
type = "keywords"
keywords = ["def", "return"]
color = [0.6, 0.0, 0.6, 1.0]
"##;

    #[test]
    fn test_parse_sample() {
        let def = SyntaxDefinition::from_toml_str(SAMPLE).unwrap();
        assert_eq!(def.name, "Sample");
        assert_eq!(def.components.len(), 3);
        assert_eq!(def.comment_prefix(), Some("#"));
        assert!(def.handles_extension("SMP"));
        assert_eq!(def.component_index("Keywords"), Some(2));
        match &def.component("Strings").unwrap().rule {
            Rule::String { escape, .. } => assert_eq!(*escape, Some('\\')),
            other => panic!("unexpected rule {:?}", other),
        }
    }

    #[test]
    fn test_comment_prefix_fallback() {
        let def = SyntaxDefinition::from_toml_str(
            r#"
[[components]]
name = "Comments"
type = "one_line_comment"
start = "--"
color = [0.5, 0.5, 0.5]
"#,
        )
        .unwrap();
        assert_eq!(def.comment_prefix(), Some("--"));
    }

    #[test]
    fn test_missing_delimiter_is_rejected() {
        let err = SyntaxDefinition::from_toml_str(
            r#"
[[components]]
name = "Block"
type = "block_comment"
start = "/*"
color = [0.5, 0.5, 0.5]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing 'end'"));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = SyntaxDefinition::from_toml_str(
            r##"
[[components]]
name = "A"
type = "one_line_comment"
start = "#"
color = [0.0, 0.0, 0.0]

[[components]]
name = "A"
type = "one_line_comment"
start = ";"
color = [0.0, 0.0, 0.0]
"##,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { .. }));
    }

    #[test]
    fn test_bad_regex_and_escape() {
        let bad_regex = r#"
[[components]]
name = "Numbers"
type = "pattern"
regex = "[0-9"
color = [0.0, 0.0, 1.0]
"#;
        assert!(matches!(
            SyntaxDefinition::from_toml_str(bad_regex),
            Err(Error::InvalidPattern(_))
        ));

        let bad_escape = r#"
[[components]]
name = "Strings"
type = "string"
start = "'"
end = "'"
escape = "ab"
color = [0.0, 0.0, 1.0]
"#;
        assert!(SyntaxDefinition::from_toml_str(bad_escape).is_err());
    }

    #[test]
    fn test_unknown_type_and_bad_color() {
        let unknown = r#"
[[components]]
name = "X"
type = "sparkles"
color = [0.0, 0.0, 1.0]
"#;
        assert!(matches!(
            SyntaxDefinition::from_toml_str(unknown),
            Err(Error::Toml(_))
        ));

        let bad_color = r#"
[[components]]
name = "X"
type = "user_identifiers"
color = [0.0, 1.0]
"#;
        assert!(SyntaxDefinition::from_toml_str(bad_color).is_err());
    }

    #[test]
    fn test_charset() {
        let default = Charset::default();
        assert!(default.contains('a'));
        assert!(default.contains('_'));
        assert!(!default.contains('-'));
        assert!(default.contains('é'));
        assert!(default.contains('ß'));

        let custom = Charset::from_chars("abc-");
        assert!(custom.contains('-'));
        assert!(!custom.contains('d'));
    }

    #[test]
    fn test_keywords_must_fit_the_charset() {
        let hash = r##"
[[components]]
name = "Preprocessor"
type = "keywords"
keywords = ["#include", "define"]
color = [0.5, 0.3, 0.0]
"##;
        match SyntaxDefinition::from_toml_str(hash) {
            Err(Error::InvalidDefinition { component, reason }) => {
                assert_eq!(component, "Preprocessor");
                assert!(reason.contains("#include"));
            }
            other => panic!("expected an invalid definition, got {:?}", other),
        }

        let with_charset = r##"
[[components]]
name = "Preprocessor"
type = "keywords"
keywords = ["#include", "define"]
charset = "#abcdefghijklmnopqrstuvwxyz"
color = [0.5, 0.3, 0.0]
"##;
        assert!(SyntaxDefinition::from_toml_str(with_charset).is_ok());
    }

    #[test]
    fn test_from_file_uses_stem_as_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Lisp.toml");
        fs::write(
            &path,
            "[[components]]\nname = \"Comments\"\ntype = \"one_line_comment\"\nstart = \";\"\ncolor = [0.5, 0.5, 0.5]\n",
        )
        .unwrap();
        let def = SyntaxDefinition::from_file(&path).unwrap();
        assert_eq!(def.name, "Lisp");
        assert!(!def.is_empty());
    }
}
