//! Configuration file support
//!
//! Loads settings from ~/.syntaxcolor.toml (or %USERPROFILE%\.syntaxcolor.toml
//! on Windows). Every key is optional.
//!
//! Example:
//! ```toml
//! # syntaxcolor configuration
//! auto_syntax_coloring = true
//! maintain_indentation = true
//! use_tabs = false
//! indent_width = 4
//! lines_per_chunk = 500
//! definition_filename = "SyntaxDefinition.toml"
//! resource_dir = "/usr/share/syntaxcolor"
//!
//! [default_text_attributes]
//! foreground = [0.0, 0.0, 0.0]
//! font_name = "Menlo"
//! font_size = 12.0
//!
//! [user_identifiers]
//! Identifiers = ["MyWidget", "my_helper"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::syntax::TextAttributes;

/// File name looked up in the resource directory when nothing else is given
pub const DEFAULT_DEFINITION_FILENAME: &str = "SyntaxDefinition.toml";

/// User-defined identifiers, per component name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdentifiers(BTreeMap<String, Vec<String>>);

impl UserIdentifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers registered for a component
    pub fn get(&self, component: &str) -> &[String] {
        self.0.get(component).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Register an identifier; returns false if it was already there
    pub fn add(&mut self, component: &str, identifier: &str) -> bool {
        let list = self.0.entry(component.to_string()).or_default();
        if list.iter().any(|i| i == identifier) {
            return false;
        }
        list.push(identifier.to_string());
        true
    }

    /// Unregister an identifier; returns false if it was not there
    pub fn remove(&mut self, component: &str, identifier: &str) -> bool {
        let Some(list) = self.0.get_mut(component) else {
            return false;
        };
        let before = list.len();
        list.retain(|i| i != identifier);
        let removed = list.len() != before;
        if list.is_empty() {
            self.0.remove(component);
        }
        removed
    }

    /// Iterate over (component, identifiers)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recolor automatically after every edit
    pub auto_syntax_coloring: bool,
    /// Copy the previous line's indentation onto new lines
    pub maintain_indentation: bool,
    /// Indent with a tab instead of spaces
    pub use_tabs: bool,
    /// Spaces per indentation level when not using tabs
    pub indent_width: usize,
    /// Lines highlighted per recolor step
    pub lines_per_chunk: usize,
    /// Definition file looked up in `resource_dir`
    pub definition_filename: String,
    /// Directory holding definition files
    pub resource_dir: Option<PathBuf>,
    /// Base attributes every component's style starts from
    pub default_text_attributes: TextAttributes,
    /// Selection (start, end) applied when text is loaded
    pub default_selection: (usize, usize),
    /// Persisted user identifiers
    pub user_identifiers: UserIdentifiers,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_syntax_coloring: true,
            maintain_indentation: true,
            use_tabs: true,
            indent_width: 4,
            lines_per_chunk: 500,
            definition_filename: DEFAULT_DEFINITION_FILENAME.to_string(),
            resource_dir: None,
            default_text_attributes: TextAttributes::default(),
            default_selection: (0, 0),
            user_identifiers: UserIdentifiers::default(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".syntaxcolor.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".syntaxcolor.toml"))
        }
    }

    /// Load configuration from the default file, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                log::warn!("ignoring config {}: {}", path.display(), e);
                Config::default()
            }),
            _ => Config::default(),
        }
    }

    /// Load configuration from a file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        self.indent_width = self.indent_width.clamp(1, 16); // Between 1 and 16
        self.lines_per_chunk = self.lines_per_chunk.max(1);
        if self.definition_filename.trim().is_empty() {
            self.definition_filename = DEFAULT_DEFINITION_FILENAME.to_string();
        }
    }

    /// One level of indentation
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_width)
        }
    }

    /// Save current configuration to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = format!(
            "# syntaxcolor configuration\n\
             # Generated automatically\n\n{}",
            toml::to_string(self)?
        );
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_parse_config() {
        let contents = r#"
# Comment
auto_syntax_coloring = false
use_tabs = false
indent_width = 2
lines_per_chunk = 0

[default_text_attributes]
font_name = "Menlo"

[user_identifiers]
Identifiers = ["Widget"]
        "#;

        let config = Config::parse(contents).unwrap();
        assert!(!config.auto_syntax_coloring);
        assert!(config.maintain_indentation);
        assert_eq!(config.indent_unit(), "  ");
        assert_eq!(config.lines_per_chunk, 1);
        assert_eq!(config.default_text_attributes.font_name.as_deref(), Some("Menlo"));
        assert_eq!(config.user_identifiers.get("Identifiers").to_vec(), vec!["Widget".to_string()]);
        assert_eq!(config.definition_filename, DEFAULT_DEFINITION_FILENAME);
    }

    #[test]
    fn test_indent_width_is_clamped() {
        let config = Config::parse("indent_width = 99\nuse_tabs = false").unwrap();
        assert_eq!(config.indent_width, 16);
        assert_eq!(Config::default().indent_unit(), "\t");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(Config::parse("indent_width = \"wide\"").is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.maintain_indentation = false;
        config.default_text_attributes = TextAttributes::fg(Color::rgb(0.1, 0.2, 0.3));
        config.user_identifiers.add("Identifiers", "Gadget");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_user_identifiers() {
        let mut ids = UserIdentifiers::new();
        assert!(ids.is_empty());
        assert!(ids.add("Identifiers", "foo"));
        assert!(!ids.add("Identifiers", "foo"));
        assert!(ids.add("Identifiers", "bar"));
        assert_eq!(ids.get("Identifiers").len(), 2);
        assert!(ids.remove("Identifiers", "foo"));
        assert!(!ids.remove("Identifiers", "foo"));
        assert!(ids.remove("Identifiers", "bar"));
        assert!(ids.is_empty());
        assert!(ids.get("Missing").is_empty());
    }
}
