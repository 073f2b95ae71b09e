//! Syntax definition loading
//!
//! Sources are tried in order, and the first one that yields a definition
//! with at least one component wins:
//!
//! 1. a definition supplied by the delegate
//! 2. a file named by the delegate
//! 3. the configured file name (`SyntaxDefinition.toml` by default)
//! 4. the built-in default definition
//!
//! A source that fails to load is logged and skipped, never fatal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::builtin;
use super::definition::SyntaxDefinition;
use super::style::TextAttributes;
use crate::config::Config;
use crate::delegate::{Capabilities, SyntaxColoringDelegate};

/// Where the active definition came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionSource {
    Delegate,
    DelegateFile(PathBuf),
    ConfiguredFile(PathBuf),
    Builtin,
    /// Handed to the controller directly
    Explicit,
}

/// A definition together with its origin
#[derive(Debug, Clone)]
pub struct LoadedDefinition {
    pub definition: SyntaxDefinition,
    pub source: DefinitionSource,
}

/// Attributes per component, indexed like the definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleTable {
    styles: Vec<TextAttributes>,
}

impl StyleTable {
    /// Attributes for the component at `idx`
    pub fn get(&self, idx: usize) -> Option<&TextAttributes> {
        self.styles.get(idx)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Resolves definitions, styles and identifiers against a configuration
pub struct SyntaxDefinitionLoader<'a> {
    config: &'a Config,
}

fn has(delegate: Option<&dyn SyntaxColoringDelegate>, cap: Capabilities) -> Option<&dyn SyntaxColoringDelegate> {
    delegate.filter(|d| d.capabilities().contains(cap))
}

impl<'a> SyntaxDefinitionLoader<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Resolve a definition file name against the resource directory
    pub fn resolve_path(&self, filename: &str) -> PathBuf {
        let path = Path::new(filename);
        match &self.config.resource_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn load_file(&self, path: &Path) -> Option<SyntaxDefinition> {
        match SyntaxDefinition::from_file(path) {
            Ok(def) if !def.is_empty() => Some(def),
            Ok(_) => {
                log::warn!("syntax definition {} has no components", path.display());
                None
            }
            Err(e) => {
                log::warn!("cannot load syntax definition {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Find the definition to use
    pub fn load(&self, delegate: Option<&dyn SyntaxColoringDelegate>) -> LoadedDefinition {
        if let Some(d) = has(delegate, Capabilities::DEFINITION) {
            match d.syntax_definition() {
                Some(def) if !def.is_empty() => {
                    return LoadedDefinition {
                        definition: def,
                        source: DefinitionSource::Delegate,
                    };
                }
                _ => log::debug!("delegate supplied no syntax definition"),
            }
        }

        if let Some(d) = has(delegate, Capabilities::DEFINITION_FILENAME) {
            if let Some(name) = d.syntax_definition_filename().filter(|n| !n.is_empty()) {
                let path = self.resolve_path(&name);
                if let Some(def) = self.load_file(&path) {
                    return LoadedDefinition {
                        definition: def,
                        source: DefinitionSource::DelegateFile(path),
                    };
                }
            }
        }

        let path = self.resolve_path(&self.config.definition_filename);
        if path.exists() {
            if let Some(def) = self.load_file(&path) {
                return LoadedDefinition {
                    definition: def,
                    source: DefinitionSource::ConfiguredFile(path),
                };
            }
        } else {
            log::debug!("no syntax definition at {}", path.display());
        }

        LoadedDefinition {
            definition: builtin::default_definition(),
            source: DefinitionSource::Builtin,
        }
    }

    /// Attributes for every component of `definition`
    ///
    /// The delegate's attributes win verbatim; otherwise the configured
    /// default attributes get the component color as foreground.
    pub fn style_table(
        &self,
        definition: &SyntaxDefinition,
        delegate: Option<&dyn SyntaxColoringDelegate>,
    ) -> StyleTable {
        let delegate = has(delegate, Capabilities::TEXT_ATTRIBUTES);
        let styles = definition
            .components
            .iter()
            .map(|c| {
                delegate
                    .and_then(|d| d.text_attributes(&c.name, c.color))
                    .unwrap_or_else(|| self.config.default_text_attributes.clone().with_fg(c.color))
            })
            .collect();
        StyleTable { styles }
    }

    /// Extra words per component, from the configuration and the delegate
    pub fn identifiers(
        &self,
        definition: &SyntaxDefinition,
        delegate: Option<&dyn SyntaxColoringDelegate>,
    ) -> HashMap<String, Vec<String>> {
        let delegate = has(delegate, Capabilities::USER_IDENTIFIERS);
        let mut map = HashMap::new();
        for component in definition.components.iter().filter(|c| c.rule.takes_identifiers()) {
            let mut words = self.config.user_identifiers.get(&component.name).to_vec();
            if let Some(extra) = delegate.and_then(|d| d.user_identifiers(&component.name)) {
                words.extend(extra);
            }
            if !words.is_empty() {
                map.insert(component.name.clone(), words);
            }
        }
        map
    }
}
