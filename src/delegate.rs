//! Host delegate
//!
//! The host implements whichever hooks it cares about and advertises them
//! through `capabilities`. The controller only calls a hook whose flag is
//! set, so hosts never pay for (or get surprised by) hooks they did not
//! opt into.

use bitflags::bitflags;

use crate::color::Color;
use crate::syntax::{SyntaxDefinition, TextAttributes};

bitflags! {
    /// Hooks a delegate implements
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        /// will_start / progressed / did_finish recoloring
        const RECOLOR_PROGRESS      = 1 << 0;
        /// selection_changed
        const SELECTION_CHANGES     = 1 << 1;
        /// syntax_definition_filename
        const DEFINITION_FILENAME   = 1 << 2;
        /// syntax_definition
        const DEFINITION            = 1 << 3;
        /// user_identifiers
        const USER_IDENTIFIERS      = 1 << 4;
        /// text_attributes
        const TEXT_ATTRIBUTES       = 1 << 5;
    }
}

/// Progress of a running recolor pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecolorProgress {
    /// Lines highlighted so far in this pass
    pub lines_done: usize,
    /// Lines in the document
    pub line_count: usize,
}

/// Where the selection is, in line-relative and document terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionReport {
    /// Start, in chars from the start of `line`
    pub start_in_line: usize,
    /// End, in chars from the start of `line` (may run past it)
    pub end_in_line: usize,
    /// 1-based line holding the selection start
    pub line: usize,
    /// Start, in chars from the start of the document
    pub start_in_document: usize,
    /// End, in chars from the start of the document
    pub end_in_document: usize,
}

/// Hooks for the host of a `SyntaxColoredTextController`
///
/// Every method has a do-nothing default.
pub trait SyntaxColoringDelegate {
    /// Which hooks this delegate implements
    fn capabilities(&self) -> Capabilities;

    /// Show your progress indicator
    fn will_start_recoloring(&mut self) {}

    /// A chunk of the pass is done
    fn progressed_while_recoloring(&mut self, _progress: RecolorProgress) {}

    /// Hide your progress indicator
    fn did_finish_recoloring(&mut self) {}

    /// Update any selection status display
    fn selection_changed(&mut self, _selection: &SelectionReport) {}

    /// Definition file to load instead of the configured one
    ///
    /// Not consulted when `syntax_definition` provides a definition.
    fn syntax_definition_filename(&self) -> Option<String> {
        None
    }

    /// Definition to use instead of loading one from a file
    fn syntax_definition(&self) -> Option<SyntaxDefinition> {
        None
    }

    /// Identifiers the host found in the text for a component
    fn user_identifiers(&self, _component: &str) -> Option<Vec<String>> {
        None
    }

    /// Full attributes for a component, instead of just its color
    fn text_attributes(&self, _component: &str, _color: Color) -> Option<TextAttributes> {
        None
    }
}
