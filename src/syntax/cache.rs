//! Per-line highlight cache
//!
//! Each line remembers the state it was highlighted from, its spans and
//! the state it hands to the next line. After an edit only the touched
//! lines are dropped; re-highlighting resumes at the first dropped line
//! and stops at the first untouched line whose start state is unchanged,
//! since every line after it would come out the same.

use super::highlighter::Highlighter;
use super::rules::{HighlightResult, LineState};
use super::style::Span;

/// A change in line structure: old lines `first..=first + removed`
/// were replaced by new lines `first..=first + inserted`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEdit {
    pub first: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl LineEdit {
    /// An edit confined to a single line
    pub fn single(line: usize) -> Self {
        Self {
            first: line,
            removed: 0,
            inserted: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedLine {
    start_state: LineState,
    result: HighlightResult,
}

/// Outcome of one bounded update step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStep {
    /// Budget used up; `next_line` is where the next step resumes
    Progressed { next_line: usize, processed: usize },
    /// Cache is consistent with the text
    Finished { processed: usize },
}

/// Per-document highlighting cache
#[derive(Debug, Clone, Default)]
pub struct HighlightCache {
    /// Cached result per line (None = not computed)
    lines: Vec<Option<CachedLine>>,
    /// First line that needs recomputation
    invalid_from: Option<usize>,
    /// Last line known to need recomputation
    dirty_until: Option<usize>,
}

impl HighlightCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything and size the cache for `line_count` lines
    pub fn invalidate_all(&mut self, line_count: usize) {
        self.lines.clear();
        self.lines.resize(line_count, None);
        self.invalid_from = Some(0);
        self.dirty_until = line_count.checked_sub(1);
    }

    /// Splice the cache to follow a line edit and mark the edit dirty
    pub fn apply_edit(&mut self, edit: &LineEdit) {
        if self.lines.is_empty() {
            self.invalidate_all(edit.inserted + 1);
            return;
        }
        let first = edit.first.min(self.lines.len() - 1);
        let old_last = (first + edit.removed).min(self.lines.len() - 1);
        self.lines
            .splice(first..=old_last, std::iter::repeat_with(|| None).take(edit.inserted + 1));

        // Lines below the edit moved; keep the dirty bound on the same text
        if let Some(until) = self.dirty_until {
            if until > old_last {
                self.dirty_until = Some(until + edit.inserted - (old_last - first));
            }
        }
        self.mark_dirty(first, first + edit.inserted);
    }

    fn mark_dirty(&mut self, from: usize, until: usize) {
        self.invalid_from = Some(self.invalid_from.map_or(from, |f| f.min(from)));
        self.dirty_until = Some(self.dirty_until.map_or(until, |u| u.max(until)));
    }

    /// Whether every line is up to date
    pub fn is_clean(&self) -> bool {
        self.invalid_from.is_none()
    }

    /// Number of lines tracked
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Cached spans of a line, if computed
    pub fn line_spans(&self, line: usize) -> Option<&[Span]> {
        self.lines
            .get(line)
            .and_then(|e| e.as_ref())
            .map(|c| c.result.spans.as_slice())
    }

    /// State at the end of a line, if computed
    pub fn end_state(&self, line: usize) -> Option<LineState> {
        self.lines
            .get(line)
            .and_then(|e| e.as_ref())
            .map(|c| c.result.end_state)
    }

    /// Re-highlight at most `budget` lines
    ///
    /// `lines` must have as many entries as the cache tracks.
    pub fn update<S: AsRef<str>>(
        &mut self,
        highlighter: &Highlighter,
        lines: &[S],
        budget: usize,
    ) -> UpdateStep {
        if self.lines.len() != lines.len() {
            log::warn!(
                "highlight cache out of sync ({} cached, {} lines), starting over",
                self.lines.len(),
                lines.len()
            );
            self.invalidate_all(lines.len());
        }

        let mut line = match self.invalid_from {
            Some(line) => line,
            None => return UpdateStep::Finished { processed: 0 },
        };
        let mut state = match line.checked_sub(1) {
            Some(prev) => self.end_state(prev).unwrap_or_default(),
            None => LineState::default(),
        };
        let dirty_until = self.dirty_until.unwrap_or(0);
        let mut processed = 0;

        while line < lines.len() {
            if line > dirty_until {
                if let Some(cached) = &self.lines[line] {
                    if cached.start_state == state {
                        break;
                    }
                }
            }
            if processed >= budget.max(1) {
                self.invalid_from = Some(line);
                return UpdateStep::Progressed {
                    next_line: line,
                    processed,
                };
            }

            let start_state = state;
            let result = highlighter.highlight_line(lines[line].as_ref(), start_state);
            state = result.end_state;
            self.lines[line] = Some(CachedLine {
                start_state,
                result,
            });
            line += 1;
            processed += 1;
        }

        self.invalid_from = None;
        self.dirty_until = None;
        UpdateStep::Finished { processed }
    }
}
