//! Document text storage
//!
//! The document is a list of lines. Positions are addressed in chars;
//! each line break counts as one char, so offsets line up with the text
//! returned by `Document::text`.

use std::ops::Range;

use crate::line::Line;
use crate::syntax::LineEdit;

/// A line/column pair, both zero-based, column in chars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Text being edited
#[derive(Debug, Clone)]
pub struct Document {
    /// Lines of text; never empty
    lines: Vec<Line>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self {
            lines: vec![Line::new()], // Always have at least one line
        }
    }

    /// Create a document holding `text`
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(Line::from).collect(),
        }
    }

    /// Full text, lines joined with '\n'
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line.text());
        }
        out
    }

    /// Get number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get a line by index
    pub fn line(&self, idx: usize) -> Option<&Line> {
        self.lines.get(idx)
    }

    /// Get all lines
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Total length in chars
    pub fn char_count(&self) -> usize {
        self.lines.iter().map(Line::char_count).sum::<usize>() + self.lines.len() - 1
    }

    /// Char offset of the first char of a line (clamped to the last line)
    pub fn line_start(&self, line: usize) -> usize {
        let line = line.min(self.lines.len() - 1);
        self.lines[..line]
            .iter()
            .map(|l| l.char_count() + 1)
            .sum()
    }

    /// Char offset just past the last char of a line (before its break)
    pub fn line_end(&self, line: usize) -> usize {
        let line = line.min(self.lines.len() - 1);
        self.line_start(line) + self.lines[line].char_count()
    }

    /// Line and column of a char offset, clamped to the document
    pub fn position_of(&self, offset: usize) -> Position {
        let mut remaining = offset;
        for (idx, line) in self.lines.iter().enumerate() {
            let len = line.char_count();
            if remaining <= len {
                return Position {
                    line: idx,
                    column: remaining,
                };
            }
            remaining -= len + 1;
        }
        let last = self.lines.len() - 1;
        Position {
            line: last,
            column: self.lines[last].char_count(),
        }
    }

    /// Char offset of a line and column, clamped to the document
    pub fn offset_of(&self, pos: Position) -> usize {
        let line = pos.line.min(self.lines.len() - 1);
        self.line_start(line) + pos.column.min(self.lines[line].char_count())
    }

    /// Replace the chars in `range` with `text`
    ///
    /// The range is clamped to the document. Returns the lines affected.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> LineEdit {
        let start = self.position_of(range.start.min(range.end));
        let end = self.position_of(range.end.max(range.start));

        let start_line = &self.lines[start.line];
        let end_line = &self.lines[end.line];
        let mut joined = String::new();
        joined.push_str(&start_line.text()[..start_line.char_to_byte(start.column)]);
        joined.push_str(text);
        joined.push_str(&end_line.text()[end_line.char_to_byte(end.column)..]);

        let new_lines: Vec<Line> = joined.split('\n').map(Line::from).collect();
        let inserted = new_lines.len() - 1;
        self.lines.splice(start.line..=end.line, new_lines);

        LineEdit {
            first: start.line,
            removed: end.line - start.line,
            inserted,
        }
    }

    /// Insert `text` at a char offset
    pub fn insert(&mut self, offset: usize, text: &str) -> LineEdit {
        self.replace(offset..offset, text)
    }

    /// Delete the chars in `range`
    pub fn delete(&mut self, range: Range<usize>) -> LineEdit {
        self.replace(range, "")
    }

    /// Text of a char range, clamped to the document
    pub fn slice(&self, range: Range<usize>) -> String {
        let start = range.start.min(range.end);
        let len = range.end.max(range.start) - start;
        self.text().chars().skip(start).take(len).collect()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_round_trip() {
        for text in ["", "one", "one\ntwo", "one\n", "\n\n", "héllo\n😀 x"] {
            assert_eq!(Document::from_text(text).text(), text);
        }
        assert_eq!(Document::new().line_count(), 1);
    }

    #[test]
    fn test_offsets() {
        let doc = Document::from_text("ab\ncdé\n\nf");
        assert_eq!(doc.char_count(), 9);
        assert_eq!(doc.line_start(0), 0);
        assert_eq!(doc.line_start(1), 3);
        assert_eq!(doc.line_start(2), 7);
        assert_eq!(doc.line_start(3), 8);
        assert_eq!(doc.line_end(1), 6);
        assert_eq!(doc.position_of(5), Position { line: 1, column: 2 });
        assert_eq!(doc.position_of(7), Position { line: 2, column: 0 });
        assert_eq!(doc.position_of(100), Position { line: 3, column: 1 });
        assert_eq!(doc.offset_of(Position { line: 1, column: 99 }), 6);
    }

    #[test]
    fn test_insert_single_line() {
        let mut doc = Document::from_text("hello world");
        let edit = doc.insert(5, ",");
        assert_eq!(doc.text(), "hello, world");
        assert_eq!(edit, LineEdit::single(0));
    }

    #[test]
    fn test_insert_line_breaks() {
        let mut doc = Document::from_text("ab\ncd");
        let edit = doc.insert(1, "x\ny\nz");
        assert_eq!(doc.text(), "ax\ny\nzb\ncd");
        assert_eq!(
            edit,
            LineEdit {
                first: 0,
                removed: 0,
                inserted: 2
            }
        );
    }

    #[test]
    fn test_delete_across_lines() {
        let mut doc = Document::from_text("one\ntwo\nthree");
        let edit = doc.delete(2..9);
        assert_eq!(doc.text(), "onhree");
        assert_eq!(
            edit,
            LineEdit {
                first: 0,
                removed: 2,
                inserted: 0
            }
        );
    }

    #[test]
    fn test_replace_reversed_and_clamped_range() {
        let mut doc = Document::from_text("abc");
        doc.replace(10..1, "X");
        assert_eq!(doc.text(), "aX");
    }

    #[test]
    fn test_slice() {
        let doc = Document::from_text("ab\ncd");
        assert_eq!(doc.slice(1..4), "b\nc");
        assert_eq!(doc.slice(3..99), "cd");
    }
}
