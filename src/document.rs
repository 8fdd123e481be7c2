//! Metadata document schema.
//!
//! These types are the stable contract with the downstream generators; field
//! names are serialized exactly as declared here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical, recursively normalized type expression.
///
/// Leaf types (primitives, `any`, `None`, bare names) have an empty `of`.
/// Composite types carry their ordered operands in `of`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub of: Vec<Annotation>,
}

impl Annotation {
    pub const ANY: &'static str = "any";

    /// A leaf annotation.
    pub fn leaf(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            of: Vec::new(),
        }
    }

    /// A composite annotation.
    pub fn composite(type_name: impl Into<String>, of: Vec<Annotation>) -> Self {
        Self {
            type_name: type_name.into(),
            of,
        }
    }

    /// The annotation used when none is declared.
    pub fn any() -> Self {
        Self::leaf(Self::ANY)
    }

    pub fn is_leaf(&self) -> bool {
        self.of.is_empty()
    }
}

impl fmt::Display for Annotation {
    /// Renders the annotation back into annotation-like syntax, e.g.
    /// `List[int]`, `int | None`, `Tuple[int, str]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.of.is_empty() {
            return write!(f, "{}", self.type_name);
        }
        match self.type_name.as_str() {
            "Union" | "Intersection" if self.of.len() == 2 => {
                let op = if self.type_name == "Union" { "|" } else { "&" };
                write!(f, "{} {} {}", self.of[0], op, self.of[1])
            }
            _ => {
                write!(f, "{}[", self.type_name)?;
                for (i, inner) in self.of.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", inner)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// One function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub annotation: Annotation,
}

/// A top-level function selected for extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub args: Vec<Argument>,
    pub returns: Annotation,
    /// Lets downstream generators mark which functions become endpoints.
    pub selected: bool,
}

impl Function {
    /// Render the signature, e.g. `f(a: int, b: str) -> bool`.
    pub fn signature(&self) -> String {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| format!("{}: {}", a.name, a.annotation))
            .collect();
        format!("{}({}) -> {}", self.name, args.join(", "), self.returns)
    }
}

/// One imported name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub name: String,
    pub asname: Option<String>,
}

/// A `from <module> import <names>` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFrom {
    /// Dotted module path, empty for purely relative imports.
    pub module: String,
    /// Count of leading relative dots (0 for absolute imports).
    pub level: u32,
    pub imports: Vec<Import>,
}

/// The root artifact of one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub functions: Vec<Function>,
    pub imports: Vec<Import>,
    pub imports_from: Vec<ImportFrom>,
}

impl MetadataDocument {
    pub fn find_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// What one analysis call hands back: either the metadata document or the
/// single-field error shape produced by the keyword gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Metadata(MetadataDocument),
    Error { error: String },
}

impl AnalysisReport {
    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisReport::Error { .. })
    }

    pub fn metadata(&self) -> Option<&MetadataDocument> {
        match self {
            AnalysisReport::Metadata(doc) => Some(doc),
            AnalysisReport::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AnalysisReport::Metadata(_) => None,
            AnalysisReport::Error { error } => Some(error),
        }
    }
}
