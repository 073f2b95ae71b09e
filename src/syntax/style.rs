//! Style types for colored text
//!
//! Spans are what the highlighter produces per line; colored ranges are
//! the same information in document coordinates, which is what a front
//! end applies to its text storage.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Text style attributes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextAttributes {
    /// Foreground color
    pub foreground: Option<Color>,
    /// Background color
    pub background: Option<Color>,
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Underlined text
    pub underline: bool,
    /// Font family name
    pub font_name: Option<String>,
    /// Font size in points
    pub font_size: Option<f64>,
}

impl TextAttributes {
    /// Attributes with just a foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            foreground: Some(color),
            ..Default::default()
        }
    }

    /// Builder: set foreground color
    pub fn with_fg(mut self, color: Color) -> Self {
        self.foreground = Some(color);
        self
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Builder: set underline
    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Builder: set font
    pub fn with_font(mut self, name: impl Into<String>, size: f64) -> Self {
        self.font_name = Some(name.into());
        self.font_size = Some(size);
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A colored span of text within a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset where this span starts (inclusive)
    pub start: usize,
    /// Byte offset where this span ends (exclusive)
    pub end: usize,
    /// Index of the component in the active syntax definition
    pub component: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, component: usize) -> Self {
        Self {
            start,
            end,
            component,
        }
    }

    /// Check if this span contains a byte position
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Get the length of this span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A run of document text tagged with the component that colored it
///
/// `start` and `len` count chars; a line break counts as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredRange {
    pub start: usize,
    pub len: usize,
    pub component: String,
}

impl ColoredRange {
    pub fn new(start: usize, len: usize, component: impl Into<String>) -> Self {
        Self {
            start,
            len,
            component: component.into(),
        }
    }

    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A colored range together with the attributes to apply to it
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRange {
    pub range: ColoredRange,
    pub attributes: TextAttributes,
}
