//! Compiled matching rules
//!
//! A `SyntaxDefinition` is compiled once into rules that match at a given
//! byte position of a line. Delimited rules (block comments, strings and
//! tags) can stay open across line breaks; the open rule travels from
//! line to line in a `LineState`.

use std::collections::HashSet;

use regex::Regex;

use super::definition::Charset;
use super::style::Span;

/// How a compiled rule matches
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Start marker, end marker, optional escape character
    Delimited {
        start: String,
        end: String,
        escape: Option<char>,
    },
    /// Start marker, runs to end of line
    ToEndOfLine { start: String },
    /// Whole words from a set
    Words {
        words: HashSet<String>,
        charset: Charset,
    },
    /// Regular expression, non-empty matches only
    Pattern { regex: Regex },
}

/// A rule bound to the component it colors
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Index of the component in the definition
    pub component: usize,
    pub matcher: Matcher,
}

impl CompiledRule {
    pub fn new(component: usize, matcher: Matcher) -> Self {
        Self { component, matcher }
    }

    /// Try to match a construct starting exactly at `pos`
    ///
    /// Returns the end of the match, or `None` if nothing starts here.
    /// For delimited rules the end may be `text.len()` with the construct
    /// still open; see `RuleMatch::open`.
    pub fn match_at(&self, text: &str, pos: usize) -> Option<RuleMatch> {
        let rest = &text[pos..];
        match &self.matcher {
            Matcher::Delimited { start, end, escape } => {
                if !rest.starts_with(start.as_str()) {
                    return None;
                }
                let body = pos + start.len();
                Some(match find_end(text, body, end, *escape) {
                    Some(close) => RuleMatch::closed(close),
                    None => RuleMatch::open(text.len()),
                })
            }
            Matcher::ToEndOfLine { start } => {
                if rest.starts_with(start.as_str()) {
                    Some(RuleMatch::closed(text.len()))
                } else {
                    None
                }
            }
            Matcher::Words { words, charset } => {
                let first = rest.chars().next()?;
                if !charset.contains(first) {
                    return None;
                }
                if let Some(prev) = text[..pos].chars().next_back() {
                    if charset.contains(prev) {
                        return None;
                    }
                }
                let len = rest
                    .char_indices()
                    .find(|(_, ch)| !charset.contains(*ch))
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                if words.contains(&rest[..len]) {
                    Some(RuleMatch::closed(pos + len))
                } else {
                    None
                }
            }
            Matcher::Pattern { .. } => self.scan_at(text, pos, &mut None),
        }
    }

    /// Like `match_at`, remembering the next regex match in `next`
    ///
    /// `next` belongs to one left to right scan of `text`. A pattern is
    /// searched again only once the scan has passed the start of the
    /// remembered match, so a line costs one search per match instead of
    /// one per position.
    pub fn scan_at(&self, text: &str, pos: usize, next: &mut NextMatch) -> Option<RuleMatch> {
        let Matcher::Pattern { regex } = &self.matcher else {
            return self.match_at(text, pos);
        };
        let stale = match next {
            Some(Some((start, _))) => *start < pos,
            Some(None) => false,
            None => true,
        };
        if stale {
            *next = Some(regex.find_at(text, pos).map(|m| (m.start(), m.end())));
        }
        match *next {
            Some(Some((start, end))) if start == pos && end > start => Some(RuleMatch::closed(end)),
            _ => None,
        }
    }

    /// Continue an open delimited construct from the start of a line
    pub fn continue_at(&self, text: &str) -> RuleMatch {
        match &self.matcher {
            Matcher::Delimited { end, escape, .. } => match find_end(text, 0, end, *escape) {
                Some(close) => RuleMatch::closed(close),
                None => RuleMatch::open(text.len()),
            },
            _ => RuleMatch::closed(0),
        }
    }

    /// Whether this rule can carry over a line break
    pub fn is_multiline(&self) -> bool {
        matches!(self.matcher, Matcher::Delimited { .. })
    }
}

/// Remembered regex match of a pattern rule during one line scan
///
/// `None` before the first search, `Some(None)` once the rest of the line
/// holds no match.
pub type NextMatch = Option<Option<(usize, usize)>>;

/// Outcome of a successful match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    /// Byte offset just past the match
    pub end: usize,
    /// The construct continues on the next line
    pub open: bool,
}

impl RuleMatch {
    fn closed(end: usize) -> Self {
        Self { end, open: false }
    }

    fn open(end: usize) -> Self {
        Self { end, open: true }
    }
}

/// Find the end marker at or after `from`, respecting escapes
///
/// Returns the byte offset just past the end marker.
pub fn find_end(text: &str, from: usize, end: &str, escape: Option<char>) -> Option<usize> {
    let mut pos = from;
    while pos <= text.len() {
        let found = pos + text[pos..].find(end)?;
        if let Some(esc) = escape {
            let escapes = text[from..found]
                .chars()
                .rev()
                .take_while(|&c| c == esc)
                .count();
            if escapes % 2 == 1 {
                // Odd number of escapes = escaped
                pos = found + end.len();
                continue;
            }
        }
        return Some(found + end.len());
    }
    None
}

/// Line state for tracking multi-line constructs
///
/// This is stored per-line to track whether the line ends inside a
/// block comment, string or tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineState {
    /// Component index of the open construct, if any
    pub open: Option<usize>,
}

impl LineState {
    /// Create state for being inside a multiline construct
    pub fn inside(component: usize) -> Self {
        Self {
            open: Some(component),
        }
    }

    /// Check if we're inside a multiline construct
    pub fn is_inside_multiline(&self) -> bool {
        self.open.is_some()
    }

    /// Check if we're in normal (no multiline) state
    pub fn is_normal(&self) -> bool {
        self.open.is_none()
    }
}

/// Result of highlighting a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightResult {
    /// Colored spans in this line, ordered and non-overlapping
    pub spans: Vec<Span>,
    /// State at end of line (for next line)
    pub end_state: LineState,
}
