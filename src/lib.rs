//! code-analyzr - source metadata extraction for Python code.
//!
//! Given the text of a Python module, code-analyzr produces a JSON metadata
//! document listing every top-level function (argument names and type
//! annotations, return annotation) and every import. API and container
//! generators consume that document downstream.
//!
//! # Architecture
//!
//! - `syntax`: the closed syntax tree the analyzer reads
//! - `frontend`: parsers that lower source text into `syntax` (tree-sitter)
//! - `analyzer`: keyword gate, annotation resolver, function and import
//!   extraction
//! - `document`: the metadata document and its JSON schema
//! - `config`: YAML configuration and resolved analysis settings
//! - `batch`: file and directory analysis
//! - `report`: output formatting (JSON, pretty)
//!
//! # Example
//!
//! ```no_run
//! use code_analyzr::{analyze_source, AnalysisConfig};
//!
//! let report = analyze_source("def f(a: int) -> bool:\n    pass\n", &AnalysisConfig::default())?;
//! println!("{}", serde_json::to_string(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analyzer;
pub mod batch;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod frontend;
pub mod logging;
pub mod report;
pub mod syntax;

pub use analyzer::{check_keywords, resolve_annotation, Analyzer};
pub use batch::{analyze_directory, analyze_file, BatchResult, FileOutcome};
pub use config::{AnalysisConfig, Configuration, DialectVersion, KeywordRule};
pub use document::{
    AnalysisReport, Annotation, Argument, Function, Import, ImportFrom, MetadataDocument,
};
pub use error::{AnalysisError, AnnotationError, ConfigError, FrontendError, UnsupportedKeywordError};
pub use frontend::Frontend;

#[cfg(feature = "tree-sitter")]
pub use frontend::PythonFrontend;

/// Parse and analyze Python source text in one call.
#[cfg(feature = "tree-sitter")]
pub fn analyze_source(
    source: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    Analyzer::new(config.clone()).analyze_source(&PythonFrontend::new(), source)
}
