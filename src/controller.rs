//! Syntax-colored text controller
//!
//! The controller owns the document, the selection and the active syntax
//! definition. It keeps the highlight cache in step with the text and
//! tells its delegate when recoloring starts, progresses and finishes.
//!
//! Recoloring runs in passes:
//!
//! ```text
//! Idle --recolor_complete_file--> Recoloring --last chunk--> Idle
//! Idle --edit (auto coloring)---> AutoRecoloring --converged--> Idle
//! ```
//!
//! A pass can be driven to completion in one call, or one chunk at a time
//! with `begin_recolor_complete_file` and `recolor_step` so a host event
//! loop can stay responsive. Requests that arrive while a pass is running
//! rewind that pass instead of starting another one.

use std::ops::{Range, RangeInclusive};

use crate::color::Color;
use crate::config::Config;
use crate::delegate::{Capabilities, RecolorProgress, SelectionReport, SyntaxColoringDelegate};
use crate::document::Document;
use crate::line::Line;
use crate::syntax::{
    ColoredRange, DefinitionSource, HighlightCache, Highlighter, LineEdit, StyleTable,
    StyledRange, SyntaxDefinition, SyntaxDefinitionLoader, TextAttributes, UpdateStep,
};

/// What the controller is doing about coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColoringState {
    Idle,
    /// A full pass requested by the host
    Recoloring,
    /// A pass triggered by an edit
    AutoRecoloring,
}

/// Result of driving a pass by one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecolorStatus {
    /// No pass was running
    Idle,
    /// More chunks to go
    InProgress(RecolorProgress),
    /// The pass just completed
    Finished,
}

/// Selected char range; `start <= end`, empty means a caret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn caret(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Controller for a syntax-colored text surface
pub struct SyntaxColoredTextController {
    config: Config,
    document: Document,
    selection: Selection,
    delegate: Option<Box<dyn SyntaxColoringDelegate>>,
    definition: SyntaxDefinition,
    definition_source: DefinitionSource,
    styles: StyleTable,
    highlighter: Highlighter,
    cache: HighlightCache,
    state: ColoringState,
    pass_lines_done: usize,
    auto_syntax_coloring: bool,
    maintain_indentation: bool,
}

impl SyntaxColoredTextController {
    /// Create a controller with an empty document
    ///
    /// The syntax definition is resolved right away; attach a delegate
    /// with `set_delegate` to let it take part in that choice.
    pub fn new(config: Config) -> Self {
        let mut controller = Self {
            auto_syntax_coloring: config.auto_syntax_coloring,
            maintain_indentation: config.maintain_indentation,
            config,
            document: Document::new(),
            selection: Selection::default(),
            delegate: None,
            definition: SyntaxDefinition::default(),
            definition_source: DefinitionSource::Builtin,
            styles: StyleTable::default(),
            highlighter: Highlighter::default(),
            cache: HighlightCache::new(),
            state: ColoringState::Idle,
            pass_lines_done: 0,
        };
        controller.reload_syntax_definition();
        controller
    }

    /// Create a controller holding `text`
    pub fn with_text(config: Config, text: &str) -> Self {
        let mut controller = Self::new(config);
        controller.set_text(text);
        controller
    }

    /// Attach a delegate and re-resolve the syntax definition
    pub fn set_delegate(&mut self, delegate: Box<dyn SyntaxColoringDelegate>) {
        self.delegate = Some(delegate);
        self.reload_syntax_definition();
    }

    fn delegate_with(&mut self, cap: Capabilities) -> Option<&mut Box<dyn SyntaxColoringDelegate>> {
        self.delegate
            .as_mut()
            .filter(|d| d.capabilities().contains(cap))
    }

    // ---- accessors -------------------------------------------------------

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn text(&self) -> String {
        self.document.text()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn syntax_definition(&self) -> &SyntaxDefinition {
        &self.definition
    }

    pub fn definition_source(&self) -> &DefinitionSource {
        &self.definition_source
    }

    pub fn coloring_state(&self) -> ColoringState {
        self.state
    }

    pub fn auto_syntax_coloring(&self) -> bool {
        self.auto_syntax_coloring
    }

    pub fn maintain_indentation(&self) -> bool {
        self.maintain_indentation
    }

    /// Attributes the controller applies to a component
    pub fn attributes_for(&self, component: &str) -> Option<&TextAttributes> {
        self.definition
            .component_index(component)
            .and_then(|idx| self.styles.get(idx))
    }

    // ---- syntax definition ----------------------------------------------

    /// Resolve the syntax definition again and recolor everything
    pub fn reload_syntax_definition(&mut self) {
        let loader = SyntaxDefinitionLoader::new(&self.config);
        let delegate = self.delegate.as_deref();
        let loaded = loader.load(delegate);
        log::debug!(
            "using syntax definition '{}' from {:?}",
            loaded.definition.name,
            loaded.source
        );
        self.styles = loader.style_table(&loaded.definition, delegate);
        let identifiers = loader.identifiers(&loaded.definition, delegate);
        self.highlighter = Highlighter::new(&loaded.definition, &identifiers);
        self.definition = loaded.definition;
        self.definition_source = loaded.source;
        self.recolor_complete_file();
    }

    /// Use `definition` directly, bypassing the usual lookup
    pub fn set_syntax_definition(&mut self, definition: SyntaxDefinition) {
        let loader = SyntaxDefinitionLoader::new(&self.config);
        let delegate = self.delegate.as_deref();
        self.styles = loader.style_table(&definition, delegate);
        let identifiers = loader.identifiers(&definition, delegate);
        self.highlighter = Highlighter::new(&definition, &identifiers);
        self.definition = definition;
        self.definition_source = DefinitionSource::Explicit;
        self.recolor_complete_file();
    }

    /// Remember a user identifier for a component and recolor
    ///
    /// Returns false if it was already known. Persist it with
    /// `config().save_to(..)`.
    pub fn add_user_identifier(&mut self, component: &str, identifier: &str) -> bool {
        if !self.config.user_identifiers.add(component, identifier) {
            return false;
        }
        self.rebuild_highlighter();
        true
    }

    /// Forget a user identifier for a component and recolor
    pub fn remove_user_identifier(&mut self, component: &str, identifier: &str) -> bool {
        if !self.config.user_identifiers.remove(component, identifier) {
            return false;
        }
        self.rebuild_highlighter();
        true
    }

    fn rebuild_highlighter(&mut self) {
        let loader = SyntaxDefinitionLoader::new(&self.config);
        let identifiers = loader.identifiers(&self.definition, self.delegate.as_deref());
        self.highlighter = Highlighter::new(&self.definition, &identifiers);
        self.recolor_complete_file();
    }

    // ---- recoloring -------------------------------------------------------

    /// Recolor the whole document
    ///
    /// Notifies will-start, then progressed after each chunk that is not
    /// the last, then did-finish exactly once.
    pub fn recolor_complete_file(&mut self) {
        self.begin_recolor_complete_file();
        self.finish_pass();
    }

    /// Start a full pass without running it
    ///
    /// Returns false if a pass was already running; that pass is rewound
    /// to the top instead.
    pub fn begin_recolor_complete_file(&mut self) -> bool {
        self.cache.invalidate_all(self.document.line_count());
        if self.state != ColoringState::Idle {
            log::debug!("recolor requested during a pass, rewinding it");
            self.pass_lines_done = 0;
            return false;
        }
        self.start_pass(ColoringState::Recoloring);
        true
    }

    /// Run one chunk of the current pass
    pub fn recolor_step(&mut self) -> RecolorStatus {
        if self.state == ColoringState::Idle {
            return RecolorStatus::Idle;
        }
        let budget = self.config.lines_per_chunk;
        match self.cache.update(&self.highlighter, self.document.lines(), budget) {
            UpdateStep::Progressed { processed, .. } => {
                self.pass_lines_done += processed;
                let line_count = self.document.line_count();
                let progress = RecolorProgress {
                    lines_done: self.pass_lines_done.min(line_count),
                    line_count,
                };
                if let Some(d) = self.delegate_with(Capabilities::RECOLOR_PROGRESS) {
                    d.progressed_while_recoloring(progress);
                }
                RecolorStatus::InProgress(progress)
            }
            UpdateStep::Finished { processed } => {
                self.pass_lines_done += processed;
                log::debug!(
                    "{:?} pass finished after {} lines",
                    self.state,
                    self.pass_lines_done
                );
                self.state = ColoringState::Idle;
                if let Some(d) = self.delegate_with(Capabilities::RECOLOR_PROGRESS) {
                    d.did_finish_recoloring();
                }
                RecolorStatus::Finished
            }
        }
    }

    fn start_pass(&mut self, state: ColoringState) {
        self.state = state;
        self.pass_lines_done = 0;
        if let Some(d) = self.delegate_with(Capabilities::RECOLOR_PROGRESS) {
            d.will_start_recoloring();
        }
    }

    fn finish_pass(&mut self) {
        while let RecolorStatus::InProgress(_) = self.recolor_step() {}
    }

    /// Turn automatic recoloring after edits on or off
    ///
    /// Turning it on catches up on edits made while it was off.
    pub fn set_auto_syntax_coloring(&mut self, enabled: bool) {
        self.auto_syntax_coloring = enabled;
        if enabled && !self.cache.is_clean() && self.state == ColoringState::Idle {
            self.start_pass(ColoringState::AutoRecoloring);
            self.finish_pass();
        }
    }

    pub fn toggle_auto_syntax_coloring(&mut self) {
        self.set_auto_syntax_coloring(!self.auto_syntax_coloring);
    }

    pub fn set_maintain_indentation(&mut self, enabled: bool) {
        self.maintain_indentation = enabled;
    }

    pub fn toggle_maintain_indentation(&mut self) {
        self.maintain_indentation = !self.maintain_indentation;
    }

    fn text_did_change(&mut self, edit: LineEdit) {
        self.cache.apply_edit(&edit);
        if !self.auto_syntax_coloring {
            return;
        }
        if self.state != ColoringState::Idle {
            // The running pass was rewound by apply_edit
            return;
        }
        self.start_pass(ColoringState::AutoRecoloring);
        self.finish_pass();
    }

    // ---- coloring results -------------------------------------------------

    fn ranges_with_index(&self) -> Vec<(ColoredRange, usize)> {
        let mut out: Vec<(ColoredRange, usize)> = Vec::new();
        // Range still open at the end of the previous line
        let mut open_prev: Option<usize> = None;
        let mut line_start = 0;

        for (i, line) in self.document.lines().iter().enumerate() {
            let spans = self.cache.line_spans(i).unwrap_or(&[]);
            let carried = open_prev.take();
            let mut last = None;

            if let Some(idx) = carried {
                // The line break belongs to the open construct
                out[idx].0.len += 1;
                if spans.is_empty() {
                    last = Some(idx);
                }
            }

            for span in spans {
                let start = line.byte_to_char(span.start);
                let len = line.byte_to_char(span.end) - start;
                match carried {
                    Some(idx) if span.start == 0 && out[idx].1 == span.component => {
                        out[idx].0.len += len;
                        last = Some(idx);
                    }
                    _ => {
                        let name = self.highlighter.component_name(span.component).unwrap_or("");
                        out.push((ColoredRange::new(line_start + start, len, name), span.component));
                        last = Some(out.len() - 1);
                    }
                }
            }

            let still_open = self
                .cache
                .end_state(i)
                .map_or(false, |s| s.is_inside_multiline());
            open_prev = if still_open { last } else { None };
            line_start += line.char_count() + 1;
        }
        out
    }

    /// Tagged ranges from the last pass, ordered and non-overlapping
    ///
    /// Lines edited since the last pass (with auto coloring off) carry no
    /// ranges until the next pass.
    pub fn colored_ranges(&self) -> Vec<ColoredRange> {
        self.ranges_with_index().into_iter().map(|(r, _)| r).collect()
    }

    /// Colored ranges with the attributes to apply to them
    pub fn styled_ranges(&self) -> Vec<StyledRange> {
        self.ranges_with_index()
            .into_iter()
            .map(|(range, idx)| StyledRange {
                attributes: self.styles.get(idx).cloned().unwrap_or_default(),
                range,
            })
            .collect()
    }

    /// Component coloring the char at `offset`, if any
    pub fn component_at(&self, offset: usize) -> Option<String> {
        self.colored_ranges()
            .into_iter()
            .find(|r| r.start <= offset && offset < r.end())
            .map(|r| r.component)
    }

    /// Color of a component in the active definition
    pub fn component_color(&self, component: &str) -> Option<Color> {
        self.definition.component(component).map(|c| c.color)
    }

    // ---- text and selection ------------------------------------------------

    /// Replace the whole text, apply the default selection and recolor
    pub fn set_text(&mut self, text: &str) {
        self.document = Document::from_text(text);
        self.recolor_complete_file();
        let (start, end) = self.config.default_selection;
        self.set_selection(start, end);
    }

    /// Select a char range (clamped, in either order)
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let len = self.document.char_count();
        self.selection = Selection::new(start.min(len), end.min(len));
        let report = self.selection_report();
        if let Some(d) = self.delegate_with(Capabilities::SELECTION_CHANGES) {
            d.selection_changed(&report);
        }
    }

    /// The selection in line-relative and document terms
    pub fn selection_report(&self) -> SelectionReport {
        let pos = self.document.position_of(self.selection.start);
        let line_start = self.document.line_start(pos.line);
        SelectionReport {
            start_in_line: self.selection.start - line_start,
            end_in_line: self.selection.end - line_start,
            line: pos.line + 1,
            start_in_document: self.selection.start,
            end_in_document: self.selection.end,
        }
    }

    /// Type `text` over the selection
    ///
    /// With maintain-indentation on, a newline picks up the indentation
    /// of the line it breaks.
    pub fn insert_text(&mut self, text: &str) {
        let mut text = text.to_string();
        if self.maintain_indentation && text == "\n" {
            let pos = self.document.position_of(self.selection.start);
            if let Some(line) = self.document.line(pos.line) {
                let indent: String = line.indentation().chars().take(pos.column).collect();
                text.push_str(&indent);
            }
        }
        let start = self.selection.start;
        let edit = self.document.replace(self.selection.range(), &text);
        self.text_did_change(edit);
        let caret = start + text.chars().count();
        self.set_selection(caret, caret);
    }

    /// Delete the selection, or the char before the caret
    pub fn delete_backward(&mut self) {
        let range = if self.selection.is_empty() {
            if self.selection.start == 0 {
                return;
            }
            self.selection.start - 1..self.selection.start
        } else {
            self.selection.range()
        };
        let caret = range.start;
        let edit = self.document.delete(range);
        self.text_did_change(edit);
        self.set_selection(caret, caret);
    }

    /// Replace a char range, keeping the selection where it is if possible
    pub fn replace_range(&mut self, range: Range<usize>, text: &str) {
        let edit = self.document.replace(range, text);
        self.text_did_change(edit);
        self.set_selection(self.selection.start, self.selection.end);
    }

    // ---- navigation ---------------------------------------------------------

    /// Select the 1-based line `line_number` (clamped to the document)
    pub fn go_to_line(&mut self, line_number: usize) {
        let line = line_number.clamp(1, self.document.line_count()) - 1;
        let start = self.document.line_start(line);
        let end = self.document.line_end(line);
        self.set_selection(start, end);
    }

    /// Put the caret at a char offset (clamped to the document)
    pub fn go_to_character(&mut self, offset: usize) {
        self.set_selection(offset, offset);
    }

    /// Select a char range (clamped to the document)
    pub fn go_to_range(&mut self, start: usize, end: usize) {
        self.set_selection(start, end);
    }

    // ---- line actions -------------------------------------------------------

    /// Lines touched by the selection
    ///
    /// A selection ending at the very start of a line does not include it.
    fn selected_lines(&self) -> RangeInclusive<usize> {
        let first = self.document.position_of(self.selection.start).line;
        let end = self.document.position_of(self.selection.end);
        let last = if !self.selection.is_empty() && end.column == 0 && end.line > first {
            end.line - 1
        } else {
            end.line
        };
        first..=last
    }

    /// Replace whole lines with `new_lines` and select them
    fn replace_lines(&mut self, lines: RangeInclusive<usize>, new_lines: Vec<String>) {
        let (first, last) = (*lines.start(), *lines.end());
        let start = self.document.line_start(first);
        let end = self.document.line_end(last);
        let edit = self.document.replace(start..end, &new_lines.join("\n"));
        self.text_did_change(edit);
        let new_end = self.document.line_end(last);
        self.set_selection(start, new_end);
    }

    fn lines_in(&self, lines: &RangeInclusive<usize>) -> Vec<Line> {
        lines
            .clone()
            .filter_map(|i| self.document.line(i).cloned())
            .collect()
    }

    /// Add one indentation unit to the start of each selected line
    pub fn indent_selection(&mut self) {
        let lines = self.selected_lines();
        let unit = self.config.indent_unit();
        let new_lines = self
            .lines_in(&lines)
            .iter()
            .map(|line| format!("{}{}", unit, line.text()))
            .collect();
        self.replace_lines(lines, new_lines);
    }

    /// Remove one indentation unit from the start of each selected line
    ///
    /// Lines that are not indented are left alone.
    pub fn unindent_selection(&mut self) {
        let lines = self.selected_lines();
        let unit = self.config.indent_unit();
        let width = self.config.indent_width;
        let old_lines = self.lines_in(&lines);
        let new_lines: Vec<String> = old_lines
            .iter()
            .map(|line| {
                let text = line.text();
                if let Some(rest) = text.strip_prefix(unit.as_str()) {
                    rest.to_string()
                } else if let Some(rest) = text.strip_prefix('\t') {
                    rest.to_string()
                } else {
                    let spaces = text.chars().take(width).take_while(|c| *c == ' ').count();
                    text[spaces..].to_string()
                }
            })
            .collect();
        if new_lines.iter().zip(&old_lines).all(|(new, old)| new == old.text()) {
            return;
        }
        self.replace_lines(lines, new_lines);
    }

    /// Comment out the selected lines, or uncomment them if all are commented
    ///
    /// Blank lines are skipped. Comment markers go at the very start of a
    /// line; when uncommenting, a marker after leading whitespace counts too.
    pub fn toggle_comment_for_selection(&mut self) {
        let Some(prefix) = self.definition.comment_prefix().map(str::to_string) else {
            log::debug!("syntax definition '{}' has no comment prefix", self.definition.name);
            return;
        };
        let lines = self.selected_lines();
        let old_lines = self.lines_in(&lines);

        let is_commented = |line: &Line| line.text()[line.indentation().len()..].starts_with(prefix.as_str());

        let mut content = old_lines.iter().filter(|l| !l.is_blank()).peekable();
        if content.peek().is_none() {
            return;
        }
        let uncomment = content.all(is_commented);

        let new_lines = old_lines
            .iter()
            .map(|line| {
                let text = line.text();
                if line.is_blank() {
                    text.to_string()
                } else if uncomment {
                    let indent = line.indentation().len();
                    format!("{}{}", &text[..indent], &text[indent + prefix.len()..])
                } else {
                    format!("{}{}", prefix, text)
                }
            })
            .collect();
        self.replace_lines(lines, new_lines);
    }
}
