//! Built-in syntax definitions
//!
//! These definitions ship inside the binary, written in the same TOML
//! format users put in their own definition files. The first one is the
//! default used when no other definition can be loaded.

use std::path::Path;

use crate::error::{Error, Result};
use crate::syntax::definition::SyntaxDefinition;

const BUILTIN: &[(&str, &str)] = &[
    ("C", include_str!("c.toml")),
    ("Rust", include_str!("rust.toml")),
    ("Python", include_str!("python.toml")),
    ("TOML", include_str!("toml.toml")),
];

fn parse(name: &str, source: &str) -> Option<SyntaxDefinition> {
    match SyntaxDefinition::from_toml_str(source) {
        Ok(def) => Some(def),
        Err(e) => {
            log::error!("built-in syntax definition '{}' is invalid: {}", name, e);
            None
        }
    }
}

/// Names of all built-in definitions
pub fn names() -> Vec<&'static str> {
    BUILTIN.iter().map(|(name, _)| *name).collect()
}

/// Get all built-in definitions
pub fn all_definitions() -> Vec<SyntaxDefinition> {
    BUILTIN
        .iter()
        .filter_map(|(name, source)| parse(name, source))
        .collect()
}

/// Built-in definition by name (case-insensitive)
pub fn by_name(name: &str) -> Result<SyntaxDefinition> {
    BUILTIN
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .and_then(|(n, source)| parse(n, source))
        .ok_or_else(|| Error::UnknownSyntax(name.to_string()))
}

/// Built-in definition claiming the file's extension
pub fn for_path(path: &Path) -> Option<SyntaxDefinition> {
    let ext = path.extension()?.to_str()?;
    all_definitions()
        .into_iter()
        .find(|def| def.handles_extension(ext))
}

/// The definition used when nothing else is available
pub fn default_definition() -> SyntaxDefinition {
    let (name, source) = BUILTIN[0];
    parse(name, source).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::highlighter::Highlighter;
    use crate::syntax::rules::LineState;
    use std::collections::HashMap;

    #[test]
    fn test_all_builtins_parse() {
        for (name, source) in BUILTIN {
            let def = SyntaxDefinition::from_toml_str(source)
                .unwrap_or_else(|e| panic!("{} failed: {}", name, e));
            assert_eq!(def.name, *name);
            assert!(!def.is_empty());
            assert!(def.comment_prefix().is_some());
        }
        assert_eq!(all_definitions().len(), BUILTIN.len());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(by_name("rust").unwrap().name, "Rust");
        assert!(matches!(by_name("cobol"), Err(Error::UnknownSyntax(_))));
        assert_eq!(for_path(Path::new("main.rs")).unwrap().name, "Rust");
        assert_eq!(for_path(Path::new("test.PY")).unwrap().name, "Python");
        assert_eq!(for_path(Path::new("Cargo.toml")).unwrap().name, "TOML");
        assert_eq!(for_path(Path::new("main.c")).unwrap().name, "C");
        assert!(for_path(Path::new("no_extension")).is_none());
        assert_eq!(default_definition().name, "C");
        assert_eq!(names(), vec!["C", "Rust", "Python", "TOML"]);
    }

    fn components(def: &SyntaxDefinition, text: &str) -> Vec<(String, String)> {
        let h = Highlighter::new(def, &HashMap::new());
        h.highlight_line(text, LineState::default())
            .spans
            .iter()
            .map(|s| {
                (
                    def.components[s.component].name.clone(),
                    text[s.start..s.end].to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_rust_line() {
        let def = by_name("Rust").unwrap();
        let spans = components(&def, "let c = 'x'; println!(\"{}\", 42u8); // done");
        let names: Vec<&str> = spans.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["Keywords", "Characters", "Macros", "Strings", "Numbers", "One Line Comments"]
        );
        assert_eq!(spans[4].1, "42u8");
    }

    #[test]
    fn test_rust_lifetime_is_not_a_char() {
        let def = by_name("Rust").unwrap();
        let spans = components(&def, "fn f<'a>(x: &'a str)");
        assert!(spans.iter().any(|(n, t)| n == "Lifetimes" && t == "'a"));
        assert!(!spans.iter().any(|(n, _)| n == "Characters"));
    }

    #[test]
    fn test_c_preprocessor() {
        let def = by_name("C").unwrap();
        let spans = components(&def, "#include <stdio.h>");
        assert_eq!(spans[0], ("Preprocessor".to_string(), "#include".to_string()));
    }
}
