//! Syntax definitions and highlighting
//!
//! This module provides the coloring engine used by the controller:
//! - Definition schema and TOML loading
//! - Line highlighting with state carried across lines
//! - Incremental per-line caching
//! - Built-in definitions

mod style;
mod definition;
mod rules;
mod highlighter;
mod cache;
mod loader;
pub mod builtin;

pub use style::{ColoredRange, Span, StyledRange, TextAttributes};
pub use definition::{Charset, Component, Rule, SyntaxDefinition};
pub use rules::{HighlightResult, LineState};
pub use highlighter::Highlighter;
pub use cache::{HighlightCache, LineEdit, UpdateStep};
pub use loader::{DefinitionSource, LoadedDefinition, StyleTable, SyntaxDefinitionLoader};
