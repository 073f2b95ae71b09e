//! Line tokenizer
//!
//! The highlighter scans a line left to right. At each position the
//! components are tried in definition order and the first one that
//! starts there wins; its match is consumed as one span. Positions where
//! nothing starts are left uncolored.

use std::collections::HashMap;

use super::definition::{Rule, SyntaxDefinition};
use super::rules::{CompiledRule, HighlightResult, LineState, Matcher, NextMatch};
use super::style::Span;

/// A syntax definition compiled for scanning
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    /// One rule per component, in definition order
    rules: Vec<CompiledRule>,
    /// Component names, indexed like the definition
    names: Vec<String>,
}

impl Highlighter {
    /// Compile a definition
    ///
    /// `identifiers` maps component names to extra words; they are merged
    /// into keyword and user-identifier components.
    pub fn new(definition: &SyntaxDefinition, identifiers: &HashMap<String, Vec<String>>) -> Self {
        let mut rules = Vec::with_capacity(definition.components.len());
        let mut names = Vec::with_capacity(definition.components.len());

        for (idx, component) in definition.components.iter().enumerate() {
            let extra = identifiers
                .get(&component.name)
                .map(|v| v.as_slice())
                .unwrap_or(&[]);
            let matcher = match &component.rule {
                Rule::BlockComment { start, end } | Rule::Tag { start, end } => Matcher::Delimited {
                    start: start.clone(),
                    end: end.clone(),
                    escape: None,
                },
                Rule::String { start, end, escape } => Matcher::Delimited {
                    start: start.clone(),
                    end: end.clone(),
                    escape: *escape,
                },
                Rule::OneLineComment { start } => Matcher::ToEndOfLine {
                    start: start.clone(),
                },
                Rule::Keywords { keywords, charset } => Matcher::Words {
                    words: keywords
                        .iter()
                        .cloned()
                        .chain(extra.iter().cloned())
                        .collect(),
                    charset: charset.clone(),
                },
                Rule::UserIdentifiers { charset } => Matcher::Words {
                    words: extra.iter().cloned().collect(),
                    charset: charset.clone(),
                },
                Rule::Pattern { regex } => Matcher::Pattern {
                    regex: regex.clone(),
                },
            };
            rules.push(CompiledRule::new(idx, matcher));
            names.push(component.name.clone());
        }

        log::debug!(
            "compiled syntax definition '{}' ({} components)",
            definition.name,
            rules.len()
        );

        Self { rules, names }
    }

    /// Name of the component at `idx`
    pub fn component_name(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(|s| s.as_str())
    }

    /// Highlight a single line of text
    ///
    /// Takes the line text and the state from the previous line.
    /// Returns spans and the state for the next line.
    pub fn highlight_line(&self, text: &str, prev_state: LineState) -> HighlightResult {
        let mut spans = Vec::new();
        let mut pos = 0;

        // Finish a construct left open by the previous line
        if let Some(open) = prev_state.open {
            match self.rules.get(open).filter(|r| r.is_multiline()) {
                Some(rule) => {
                    let m = rule.continue_at(text);
                    if m.end > 0 {
                        spans.push(Span::new(0, m.end, open));
                    }
                    if m.open {
                        return HighlightResult {
                            spans,
                            end_state: prev_state,
                        };
                    }
                    pos = m.end;
                }
                None => {
                    // Stale state from a different definition
                    log::debug!("ignoring unknown open component {}", open);
                }
            }
        }

        let mut lookahead: Vec<NextMatch> = vec![None; self.rules.len()];
        while pos < text.len() {
            let found = self
                .rules
                .iter()
                .zip(lookahead.iter_mut())
                .find_map(|(rule, next)| rule.scan_at(text, pos, next).map(|m| (rule.component, m)));

            match found {
                Some((component, m)) => {
                    spans.push(Span::new(pos, m.end, component));
                    if m.open {
                        return HighlightResult {
                            spans,
                            end_state: LineState::inside(component),
                        };
                    }
                    pos = m.end;
                }
                None => {
                    // No match - skip one char
                    pos += text[pos..].chars().next().map_or(1, |c| c.len_utf8());
                }
            }
        }

        HighlightResult {
            spans,
            end_state: LineState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEF: &str = r#"
name = "Test"

[[components]]
name = "Comments"
type = "block_comment"
start = "/*"
end = "*/"
color = [0.5, 0.5, 0.5]

[[components]]
name = "LineComments"
type = "one_line_comment"
start = "//"
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
keywords = ["let", "fn"]
color = [0.6, 0.0, 0.6]

[[components]]
name = "Identifiers"
type = "user_identifiers"
color = [0.0, 0.0, 0.8]

[[components]]
name = "Numbers"
type = "pattern"
regex = "[0-9]+"
color = [0.0, 0.0, 1.0]
"#;

    fn test_highlighter() -> Highlighter {
        let def = SyntaxDefinition::from_toml_str(DEF).unwrap();
        let mut extra = HashMap::new();
        extra.insert("Identifiers".to_string(), vec!["widget".to_string()]);
        extra.insert("Keywords".to_string(), vec!["yield".to_string()]);
        Highlighter::new(&def, &extra)
    }

    fn named(h: &Highlighter, text: &str, result: &HighlightResult) -> Vec<(String, String)> {
        result
            .spans
            .iter()
            .map(|s| {
                (
                    h.component_name(s.component).unwrap().to_string(),
                    text[s.start..s.end].to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_simple_highlighting() {
        let h = test_highlighter();
        let text = "let x = 42;";
        let result = h.highlight_line(text, LineState::default());
        assert!(result.end_state.is_normal());
        assert_eq!(
            named(&h, text, &result),
            vec![
                ("Keywords".to_string(), "let".to_string()),
                ("Numbers".to_string(), "42".to_string()),
            ]
        );
    }

    #[test]
    fn test_keywords_inside_strings_are_not_colored() {
        let h = test_highlighter();
        let text = r#"x = "let \" fn"; // let"#;
        let result = h.highlight_line(text, LineState::default());
        let spans = named(&h, text, &result);
        assert_eq!(spans[0], ("Strings".to_string(), r#""let \" fn""#.to_string()));
        assert_eq!(spans[1], ("LineComments".to_string(), "// let".to_string()));
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_user_identifiers_are_merged() {
        let h = test_highlighter();
        let text = "yield widget widgets";
        let result = h.highlight_line(text, LineState::default());
        assert_eq!(
            named(&h, text, &result),
            vec![
                ("Keywords".to_string(), "yield".to_string()),
                ("Identifiers".to_string(), "widget".to_string()),
            ]
        );
    }

    #[test]
    fn test_multiline_start_continue_end() {
        let h = test_highlighter();
        let first = h.highlight_line("code /* comment", LineState::default());
        assert_eq!(first.end_state, LineState::inside(0));

        let middle = h.highlight_line("still in comment", first.end_state);
        assert_eq!(middle.end_state, LineState::inside(0));
        assert_eq!(middle.spans, vec![Span::new(0, 16, 0)]);

        let last = h.highlight_line("end */ let", middle.end_state);
        assert!(last.end_state.is_normal());
        assert_eq!(last.spans[0], Span::new(0, 6, 0));
        assert_eq!(last.spans[1], Span::new(7, 10, 3));
    }

    #[test]
    fn test_empty_line_keeps_open_state() {
        let h = test_highlighter();
        let result = h.highlight_line("", LineState::inside(2));
        assert!(result.spans.is_empty());
        assert_eq!(result.end_state, LineState::inside(2));
    }

    #[test]
    fn test_unicode_text() {
        let h = test_highlighter();
        let text = "héllo 12 😀 let";
        let result = h.highlight_line(text, LineState::default());
        let spans = named(&h, text, &result);
        assert_eq!(spans[0].1, "12");
        assert_eq!(spans[1].1, "let");
    }

    #[test]
    fn test_long_line_is_linear() {
        let h = test_highlighter();
        let mut text = "a+ ".repeat(40_000);
        text.push_str("let 42");
        let started = std::time::Instant::now();
        let result = h.highlight_line(&text, LineState::default());
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
        assert_eq!(
            named(&h, &text, &result),
            vec![
                ("Keywords".to_string(), "let".to_string()),
                ("Numbers".to_string(), "42".to_string()),
            ]
        );
    }

    #[test]
    fn test_pattern_after_other_spans() {
        let h = test_highlighter();
        let text = "1 \"2\" 3 /* 4 */ 5";
        let result = h.highlight_line(text, LineState::default());
        let spans = named(&h, text, &result);
        assert_eq!(
            spans.iter().map(|(_, t)| t.as_str()).collect::<Vec<_>>(),
            vec!["1", "\"2\"", "3", "/* 4 */", "5"]
        );
    }

    #[test]
    fn test_keyword_glued_to_accented_letter() {
        let h = test_highlighter();
        let text = "élet x ñfn letß let";
        let result = h.highlight_line(text, LineState::default());
        assert_eq!(
            named(&h, text, &result),
            vec![("Keywords".to_string(), "let".to_string())]
        );
        assert_eq!(result.spans[0].start, text.len() - 3);
    }

    #[test]
    fn test_stale_state_is_ignored() {
        let h = test_highlighter();
        let result = h.highlight_line("let", LineState::inside(99));
        assert!(result.end_state.is_normal());
        assert_eq!(result.spans.len(), 1);
    }
}
