//! ANSI rendering of colored text
//!
//! Writes the controller's document with its styled ranges applied,
//! using crossterm commands so any `Write` works as a sink.

use std::io::Write;

use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use unicode_width::UnicodeWidthChar;

use crate::color::Color;
use crate::controller::SyntaxColoredTextController;
use crate::error::Result;
use crate::syntax::{StyledRange, TextAttributes};

/// Rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Columns per tab stop
    pub tab_width: usize,
    /// Prefix each line with its number
    pub line_numbers: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tab_width: 8,
            line_numbers: false,
        }
    }
}

fn term_color(color: Color) -> TermColor {
    let (r, g, b) = color.to_rgb8();
    TermColor::Rgb { r, g, b }
}

/// Width of the line number gutter, separator included
fn line_number_width(line_count: usize) -> usize {
    let digits = line_count.max(1).to_string().len();
    digits.max(3) + 1 // minimum 3 digits + space
}

/// Expand tabs to spaces, starting at display column `col`
///
/// Returns the expanded text and the column after it.
pub fn expand_tabs(text: &str, mut col: usize, tab_width: usize) -> (String, usize) {
    let tab_width = tab_width.max(1);
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\t' {
            let next = (col / tab_width + 1) * tab_width;
            out.extend(std::iter::repeat(' ').take(next - col));
            col = next;
        } else {
            out.push(ch);
            col += UnicodeWidthChar::width(ch).unwrap_or(0);
        }
    }
    (out, col)
}

fn write_styled<W: Write>(out: &mut W, text: &str, attrs: Option<&TextAttributes>) -> Result<()> {
    let Some(attrs) = attrs.filter(|a| !a.is_default()) else {
        queue!(out, Print(text))?;
        return Ok(());
    };
    if let Some(fg) = attrs.foreground {
        queue!(out, SetForegroundColor(term_color(fg)))?;
    }
    if let Some(bg) = attrs.background {
        queue!(out, SetBackgroundColor(term_color(bg)))?;
    }
    if attrs.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if attrs.italic {
        queue!(out, SetAttribute(Attribute::Italic))?;
    }
    if attrs.underline {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)?;
    Ok(())
}

/// Write the controller's text with its coloring
pub fn render<W: Write>(
    out: &mut W,
    controller: &SyntaxColoredTextController,
    options: &RenderOptions,
) -> Result<()> {
    let document = controller.document();
    let ranges = controller.styled_ranges();
    let gutter = line_number_width(document.line_count());

    // Index of the first range that does not end before the current char
    let mut next_range = 0;
    let mut offset = 0;

    for (idx, line) in document.lines().iter().enumerate() {
        if options.line_numbers {
            let lnum = format!("{:>width$} ", idx + 1, width = gutter - 1);
            queue!(out, SetAttribute(Attribute::Dim), Print(lnum), SetAttribute(Attribute::NormalIntensity))?;
        }

        let mut col = 0;
        let mut segment = String::new();
        let mut segment_style: Option<usize> = None;

        for ch in line.text().chars() {
            while next_range < ranges.len() && ranges[next_range].range.end() <= offset {
                next_range += 1;
            }
            let style = ranges
                .get(next_range)
                .filter(|r| r.range.start <= offset)
                .map(|_| next_range);

            if style != segment_style && !segment.is_empty() {
                let (text, end_col) = expand_tabs(&segment, col, options.tab_width);
                write_styled(out, &text, attributes(&ranges, segment_style))?;
                col = end_col;
                segment.clear();
            }
            segment_style = style;
            segment.push(ch);
            offset += 1;
        }
        if !segment.is_empty() {
            let (text, _) = expand_tabs(&segment, col, options.tab_width);
            write_styled(out, &text, attributes(&ranges, segment_style))?;
        }

        // Line break
        offset += 1;
        if idx + 1 < document.line_count() {
            queue!(out, Print("\n"))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn attributes(ranges: &[StyledRange], idx: Option<usize>) -> Option<&TextAttributes> {
    idx.and_then(|i| ranges.get(i)).map(|r| &r.attributes)
}
