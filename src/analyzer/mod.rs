//! Source metadata extraction.
//!
//! # Pipeline
//!
//! ```text
//! raw text ──▶ keyword gate ──fail──▶ {"error": ...}
//!                  │
//!                  ▼
//!   Module ──▶ statement walk ──▶ imports / imports_from
//!                  │
//!                  └──▶ function defs ──▶ filters ──▶ arguments + annotations
//!                                                        │
//!                                                        ▼
//!                                                MetadataDocument
//! ```
//!
//! The walk enters compound statements (`if`, `try`, `with`, ...) but never
//! function or class bodies.

mod annotation;
mod function;
mod imports;
mod keywords;

pub use annotation::{resolve_annotation, resolve_expr};
pub use function::{build_argument, build_function, extract_functions, is_selected};
pub use imports::{collect_import, collect_import_from};
pub use keywords::check_keywords;

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::document::{AnalysisReport, MetadataDocument};
use crate::error::AnalysisError;
use crate::frontend::Frontend;
use crate::syntax::{FunctionDef, Module, Stmt};

/// Runs one analysis per call against a fixed configuration.
///
/// Holds no state besides the configuration, so one analyzer can serve any
/// number of calls, including concurrently.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze an already parsed module.
    ///
    /// `source` is the raw text the module was parsed from; it is only used by
    /// the keyword gate. A keyword failure is reported as
    /// `AnalysisReport::Error`, while annotation failures abort with `Err`.
    pub fn analyze(&self, source: &str, module: &Module) -> Result<AnalysisReport, AnalysisError> {
        if let Some(report) = self.keyword_gate(source) {
            return Ok(report);
        }
        self.extract(module).map(AnalysisReport::Metadata)
    }

    /// Gate, parse with `frontend`, then extract.
    ///
    /// The gate runs before parsing so that sources using newer syntax are
    /// reported as incompatible rather than as syntax errors.
    pub fn analyze_source(
        &self,
        frontend: &dyn Frontend,
        source: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        if let Some(report) = self.keyword_gate(source) {
            return Ok(report);
        }
        let module = frontend.parse_module(source)?;
        self.extract(&module).map(AnalysisReport::Metadata)
    }

    /// Like [`Analyzer::analyze`], serialized to pretty JSON.
    pub fn analyze_to_json(&self, source: &str, module: &Module) -> Result<String, AnalysisError> {
        let report = self.analyze(source, module)?;
        Ok(serde_json::to_string_pretty(&report)?)
    }

    fn keyword_gate(&self, source: &str) -> Option<AnalysisReport> {
        check_keywords(source, self.config.python_version, &self.config.keywords)
            .err()
            .map(|e| AnalysisReport::Error {
                error: e.to_string(),
            })
    }

    /// Build the metadata document for a module, skipping the keyword gate.
    pub fn extract(&self, module: &Module) -> Result<MetadataDocument, AnalysisError> {
        let mut walk = Walk::default();
        walk.visit(&module.body);

        let functions = extract_functions(
            walk.functions,
            &self.config.functions_to_analyze,
            &self.config.ignore,
        )?;
        debug!(
            functions = functions.len(),
            imports = walk.document.imports.len(),
            imports_from = walk.document.imports_from.len(),
            "extracted metadata"
        );

        Ok(MetadataDocument {
            functions,
            ..walk.document
        })
    }
}

/// Statements gathered from module level, in source order.
#[derive(Default)]
struct Walk<'a> {
    document: MetadataDocument,
    functions: Vec<&'a FunctionDef>,
}

impl<'a> Walk<'a> {
    fn visit(&mut self, stmts: &'a [Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::Import(aliases) => self.document.imports.extend(collect_import(aliases)),
                Stmt::ImportFrom {
                    module,
                    level,
                    names,
                } => self
                    .document
                    .imports_from
                    .push(collect_import_from(module.as_deref(), *level, names)),
                Stmt::FunctionDef(def) => self.functions.push(def),
                Stmt::Block(inner) => self.visit(inner),
                Stmt::ClassDef { name } => {
                    debug!(class = %name, "skipping class body");
                }
                Stmt::Other => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DialectVersion;
    use crate::document::Annotation;
    use crate::syntax::{Alias, Expr, Param, Parameters};
    use serde_json::json;

    fn function(name: &str) -> Stmt {
        Stmt::FunctionDef(FunctionDef {
            name: name.to_string(),
            params: Parameters {
                args: vec![Param::new("x", Some(Expr::name("int")))],
                ..Parameters::default()
            },
            returns: Some(Expr::name("str")),
            is_async: false,
        })
    }

    fn sample_module() -> Module {
        Module::new(vec![
            Stmt::Import(vec![Alias::new("os")]),
            Stmt::ImportFrom {
                module: None,
                level: 1,
                names: vec![Alias::new("utils")],
            },
            function("first"),
            Stmt::ClassDef {
                name: "Model".to_string(),
            },
            Stmt::Block(vec![
                Stmt::Import(vec![Alias::with_asname("numpy", "np")]),
                function("second"),
            ]),
            Stmt::Other,
        ])
    }

    #[test]
    fn test_extract_preserves_order() {
        let analyzer = Analyzer::default();
        let doc = analyzer.extract(&sample_module()).unwrap();

        let names: Vec<_> = doc.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        let imports: Vec<_> = doc.imports.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(imports, vec!["os", "numpy"]);
        assert_eq!(doc.imports_from.len(), 1);
        assert_eq!(doc.imports_from[0].module, "");
        assert_eq!(doc.functions[0].args[0].annotation, Annotation::leaf("int"));
    }

    #[test]
    fn test_keyword_failure_yields_error_only() {
        let config = AnalysisConfig::default().with_python_version(DialectVersion::new(3, 8));
        let analyzer = Analyzer::new(config);
        let report = analyzer
            .analyze("match x:\n    case _: pass\n", &sample_module())
            .unwrap();

        let value = serde_json::to_value(&report).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        let message = object["error"].as_str().unwrap();
        assert!(message.contains("introduced"));
        assert!(message.contains("3.10"));
        assert!(message.contains("3.8"));
    }

    #[test]
    fn test_keyword_failure_skips_extraction() {
        // The module would fail annotation resolution, but the gate fires first.
        let module = Module::new(vec![Stmt::FunctionDef(FunctionDef {
            name: "bad".to_string(),
            params: Parameters::default(),
            returns: Some(Expr::Unsupported("lambda".to_string())),
            is_async: false,
        })]);
        let report = Analyzer::default().analyze("case", &module).unwrap();
        assert!(report.is_error());
    }

    #[test]
    fn test_annotation_failure_aborts() {
        let module = Module::new(vec![Stmt::FunctionDef(FunctionDef {
            name: "bad".to_string(),
            params: Parameters::default(),
            returns: Some(Expr::Unsupported("lambda".to_string())),
            is_async: false,
        })]);
        let err = Analyzer::default().analyze("def bad(): ...", &module).unwrap_err();
        assert!(matches!(err, AnalysisError::Annotation { .. }));
    }

    #[test]
    fn test_filters_come_from_config() {
        let config = AnalysisConfig::default().with_ignore(["first"]);
        let doc = Analyzer::new(config).extract(&sample_module()).unwrap();
        assert_eq!(doc.functions.len(), 1);
        assert_eq!(doc.functions[0].name, "second");
    }

    #[test]
    fn test_json_shape() {
        let module = Module::new(vec![function("f")]);
        let text = Analyzer::default().analyze_to_json("", &module).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!({
                "functions": [{
                    "name": "f",
                    "args": [{"name": "x", "annotation": {"type": "int", "of": []}}],
                    "returns": {"type": "str", "of": []},
                    "selected": true
                }],
                "imports": [],
                "imports_from": []
            })
        );
    }

    #[test]
    fn test_repeated_analysis_is_identical() {
        let analyzer = Analyzer::default();
        let module = sample_module();
        let first = analyzer.analyze_to_json("", &module).unwrap();
        let second = analyzer.analyze_to_json("", &module).unwrap();
        assert_eq!(first, second);
    }
}
