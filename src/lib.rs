//! syntaxcolor - syntax-coloring text controller
//!
//! A headless controller that keeps a text document colored according to
//! a declarative syntax definition, plus the editing actions a code
//! editor builds on: indentation, comment toggling and navigation.
//!
//! ```no_run
//! use syntaxcolor::{Config, SyntaxColoredTextController};
//!
//! let mut controller = SyntaxColoredTextController::with_text(Config::load(), "int x; /* hi */");
//! for range in controller.colored_ranges() {
//!     println!("{}..{} {}", range.start, range.end(), range.component);
//! }
//! controller.go_to_line(1);
//! controller.toggle_comment_for_selection();
//! ```

pub mod color;
pub mod config;
pub mod controller;
pub mod delegate;
pub mod document;
pub mod error;
pub mod line;
pub mod render;
pub mod syntax;

pub use color::{Color, NativeColor};
pub use config::{Config, UserIdentifiers};
pub use controller::{ColoringState, RecolorStatus, Selection, SyntaxColoredTextController};
pub use delegate::{Capabilities, RecolorProgress, SelectionReport, SyntaxColoringDelegate};
pub use document::{Document, Position};
pub use error::{Error, Result};
pub use syntax::{ColoredRange, StyledRange, SyntaxDefinition, TextAttributes};
