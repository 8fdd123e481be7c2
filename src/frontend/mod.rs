//! Front-ends turn raw source text into the closed [`crate::syntax`] tree.
//!
//! The analyzer never parses on its own; it is handed a `Module` produced by
//! one of these. The tree-sitter Python front-end is available with the
//! `tree-sitter` feature (on by default).

use crate::error::FrontendError;
use crate::syntax::Module;

#[cfg(feature = "tree-sitter")]
pub mod python;

#[cfg(feature = "tree-sitter")]
pub use python::PythonFrontend;

/// A parser for one source language.
///
/// Implementations must be usable from several threads at once; create
/// per-call parser state inside `parse_module`.
pub trait Frontend: Send + Sync {
    /// Language identifier (e.g. "python").
    fn language(&self) -> &'static str;

    /// File extensions this front-end handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse a whole source file.
    ///
    /// Malformed input is an error; no partial tree is returned.
    fn parse_module(&self, source: &str) -> Result<Module, FrontendError>;

    /// Check if this front-end handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}

/// Get a front-end for a file extension (without dot).
///
/// Returns None if no front-end is compiled in for the extension.
#[cfg(feature = "tree-sitter")]
pub fn for_extension(ext: &str) -> Option<Box<dyn Frontend>> {
    let python = PythonFrontend::new();
    if python.handles_extension(ext) {
        return Some(Box::new(python));
    }
    None
}

/// Get a front-end (always None when tree-sitter is disabled).
#[cfg(not(feature = "tree-sitter"))]
pub fn for_extension(_ext: &str) -> Option<Box<dyn Frontend>> {
    None
}
