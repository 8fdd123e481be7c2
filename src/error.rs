//! Error types for analysis.

use thiserror::Error;

use crate::config::DialectVersion;

/// The source text appears to use a keyword newer than the target dialect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "The keyword '{keyword}' was introduced in Python {introduced} and might not be \
     recognized in your current version {current}."
)]
pub struct UnsupportedKeywordError {
    pub keyword: String,
    pub introduced: DialectVersion,
    pub current: DialectVersion,
}

/// A type expression falls outside the accepted annotation grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("unsupported binary operator `{0}` in annotation")]
    UnsupportedOperator(String),
    #[error("Tuple annotation requires an explicit tuple of types")]
    MalformedTuple,
    #[error("unhandled annotation node `{0}`")]
    UnsupportedNode(String),
}

/// Failures raised by a front-end while producing a syntax tree.
#[derive(Error, Debug)]
pub enum FrontendError {
    #[cfg(feature = "tree-sitter")]
    #[error("failed to load grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("parser produced no tree")]
    NoTree,
    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
}

/// Hard failures that abort the analysis of one source unit.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("cannot resolve annotation in function `{function}`: {source}")]
    Annotation {
        function: String,
        #[source]
        source: AnnotationError,
    },
    #[error(transparent)]
    Frontend(#[from] FrontendError),
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Invalid configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid version format {0:?}, expected MAJOR.MINOR")]
    InvalidVersion(String),
    #[error("unsupported encoding {0:?}")]
    UnsupportedEncoding(String),
    #[error("invalid excluded_paths pattern {pattern:?}: {reason}")]
    InvalidGlob { pattern: String, reason: String },
}
