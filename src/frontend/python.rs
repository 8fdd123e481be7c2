//! Python front-end using tree-sitter.
//!
//! Lowers the tree-sitter-python concrete syntax tree into [`crate::syntax`].
//! Annotations can come out of the grammar in two shapes, the plain
//! expression nodes (`subscript`, `binary_operator`, `attribute`) or the
//! dedicated type nodes (`generic_type`, `union_type`, `member_type`); both
//! lower to the same `Expr`.

use tree_sitter::{Language, Node, Parser};

use crate::error::FrontendError;
use crate::frontend::Frontend;
use crate::syntax::{
    Alias, BinOperator, Constant, Expr, FunctionDef, Module, Param, Parameters, Stmt,
};

/// Clause nodes whose suites belong to the enclosing compound statement.
const NESTED_CLAUSES: &[&str] = &[
    "elif_clause",
    "else_clause",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "case_clause",
];

/// Statements that only contain other statements in their suites.
const COMPOUND_STATEMENTS: &[&str] = &[
    "if_statement",
    "for_statement",
    "while_statement",
    "try_statement",
    "with_statement",
    "match_statement",
    "case_clause",
];

pub struct PythonFrontend {
    language: Language,
}

impl PythonFrontend {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser, FrontendError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }
}

impl Default for PythonFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for PythonFrontend {
    fn language(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse_module(&self, source: &str) -> Result<Module, FrontendError> {
        let mut parser = self.create_parser()?;
        let tree = parser.parse(source, None).ok_or(FrontendError::NoTree)?;
        let root = tree.root_node();

        if root.has_error() {
            let bad = first_error(root).unwrap_or(root);
            let position = bad.start_position();
            return Err(FrontendError::Syntax {
                line: position.row + 1,
                column: position.column + 1,
            });
        }

        let lowering = Lowering {
            source: source.as_bytes(),
        };
        Ok(Module::new(lowering.statements(root)))
    }
}

/// Depth-first search for the first ERROR or MISSING node.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

/// Named children without comments.
fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// Whether `node` has an anonymous `,` child (a trailing comma in brackets).
fn has_comma(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == ",");
    found
}

struct Lowering<'s> {
    source: &'s [u8],
}

impl<'s> Lowering<'s> {
    fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source).unwrap_or("")
    }

    /// Lower every statement directly inside `node` (a module or block).
    fn statements(&self, node: Node) -> Vec<Stmt> {
        named_children(node)
            .into_iter()
            .map(|child| self.statement(child))
            .collect()
    }

    fn statement(&self, node: Node) -> Stmt {
        match node.kind() {
            "import_statement" => Stmt::Import(self.import_names(node)),
            "import_from_statement" => self.import_from(node),
            "future_import_statement" => Stmt::ImportFrom {
                module: Some("__future__".to_string()),
                level: 0,
                names: self.import_names(node),
            },
            "function_definition" => Stmt::FunctionDef(self.function(node)),
            "class_definition" => Stmt::ClassDef {
                name: node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default(),
            },
            "decorated_definition" => match node.child_by_field_name("definition") {
                Some(definition) => self.statement(definition),
                None => Stmt::Other,
            },
            kind if COMPOUND_STATEMENTS.contains(&kind) => Stmt::Block(self.nested_suites(node)),
            _ => Stmt::Other,
        }
    }

    /// Statements of every suite of a compound statement, in source order.
    fn nested_suites(&self, node: Node) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        for child in named_children(node) {
            let kind = child.kind();
            if kind == "block" {
                stmts.extend(self.statements(child));
            } else if NESTED_CLAUSES.contains(&kind) {
                stmts.extend(self.nested_suites(child));
            }
        }
        stmts
    }

    fn dotted_name(&self, node: Node) -> String {
        if node.kind() != "dotted_name" {
            return self.text(node).to_string();
        }
        named_children(node)
            .into_iter()
            .map(|part| self.text(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn alias(&self, node: Node) -> Alias {
        if node.kind() == "aliased_import" {
            let name = node
                .child_by_field_name("name")
                .map(|n| self.dotted_name(n))
                .unwrap_or_default();
            return match node.child_by_field_name("alias") {
                Some(alias) => Alias::with_asname(name, self.text(alias)),
                None => Alias::new(name),
            };
        }
        Alias::new(self.dotted_name(node))
    }

    /// The `name` fields of an import statement.
    fn import_names(&self, node: Node) -> Vec<Alias> {
        let mut cursor = node.walk();
        let names: Vec<Alias> = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| self.alias(n))
            .collect();
        names
    }

    fn import_from(&self, node: Node) -> Stmt {
        let (module, level) = match node.child_by_field_name("module_name") {
            Some(m) if m.kind() == "relative_import" => {
                let mut level = 0;
                let mut module = None;
                for part in named_children(m) {
                    match part.kind() {
                        "import_prefix" => {
                            level = self.text(part).matches('.').count() as u32;
                        }
                        "dotted_name" => module = Some(self.dotted_name(part)),
                        _ => {}
                    }
                }
                (module, level)
            }
            Some(m) => (Some(self.dotted_name(m)), 0),
            None => (None, 0),
        };

        let mut names = self.import_names(node);
        let mut cursor = node.walk();
        let wildcard = node
            .children(&mut cursor)
            .any(|c| c.kind() == "wildcard_import");
        if wildcard {
            names.push(Alias::new("*"));
        }

        Stmt::ImportFrom {
            module,
            level,
            names,
        }
    }

    fn function(&self, node: Node) -> FunctionDef {
        let is_async = node.child(0).map(|c| c.kind() == "async").unwrap_or(false);
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.parameters(p))
            .unwrap_or_default();
        let returns = node
            .child_by_field_name("return_type")
            .map(|t| self.expr(t));

        FunctionDef {
            name,
            params,
            returns,
            is_async,
        }
    }

    /// Partition parameters around `/`, `*` and `*args`.
    fn parameters(&self, node: Node) -> Parameters {
        let mut params = Parameters::default();
        let mut keyword_only = false;

        for child in named_children(node) {
            match child.kind() {
                "positional_separator" => {
                    params.posonly.append(&mut params.args);
                }
                "keyword_separator" => keyword_only = true,
                "list_splat_pattern" => {
                    params.vararg = Some(Param::new(self.splat_name(child), None));
                    keyword_only = true;
                }
                "dictionary_splat_pattern" => {
                    params.kwarg = Some(Param::new(self.splat_name(child), None));
                }
                "identifier" => {
                    let param = Param::new(self.text(child), None);
                    push_param(&mut params, param, keyword_only);
                }
                "default_parameter" => {
                    // Python 2 tuple parameters have no single name.
                    if let Some(name) = child
                        .child_by_field_name("name")
                        .filter(|n| n.kind() == "identifier")
                    {
                        push_param(&mut params, Param::new(self.text(name), None), keyword_only);
                    }
                }
                "typed_default_parameter" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n))
                        .unwrap_or_default();
                    let annotation = child.child_by_field_name("type").map(|t| self.expr(t));
                    push_param(&mut params, Param::new(name, annotation), keyword_only);
                }
                "typed_parameter" => {
                    let annotation = child.child_by_field_name("type").map(|t| self.expr(t));
                    let Some(target) = named_children(child).into_iter().next() else {
                        continue;
                    };
                    match target.kind() {
                        "list_splat_pattern" => {
                            params.vararg = Some(Param::new(self.splat_name(target), annotation));
                            keyword_only = true;
                        }
                        "dictionary_splat_pattern" => {
                            params.kwarg = Some(Param::new(self.splat_name(target), annotation));
                        }
                        _ => push_param(
                            &mut params,
                            Param::new(self.text(target), annotation),
                            keyword_only,
                        ),
                    }
                }
                _ => {}
            }
        }

        params
    }

    fn splat_name(&self, node: Node) -> String {
        named_children(node)
            .into_iter()
            .next()
            .map(|n| self.text(n).to_string())
            .unwrap_or_default()
    }

    /// Lower an annotation expression.
    fn expr(&self, node: Node) -> Expr {
        match node.kind() {
            // Wrapper nodes around exactly one expression.
            "type" | "parenthesized_expression" => match named_children(node).into_iter().next() {
                Some(inner) => self.expr(inner),
                None => Expr::Unsupported(node.kind().to_string()),
            },
            "identifier" => Expr::Name(self.text(node).to_string()),
            "attribute" => {
                match (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("attribute"),
                ) {
                    (Some(object), Some(attr)) => Expr::attribute(self.expr(object), self.text(attr)),
                    _ => Expr::Unsupported(node.kind().to_string()),
                }
            }
            "member_type" => {
                let parts = named_children(node);
                match (parts.first(), parts.get(1)) {
                    (Some(base), Some(attr)) => Expr::attribute(self.expr(*base), self.text(*attr)),
                    _ => Expr::Unsupported(node.kind().to_string()),
                }
            }
            "subscript" => {
                let Some(value) = node.child_by_field_name("value") else {
                    return Expr::Unsupported(node.kind().to_string());
                };
                let mut cursor = node.walk();
                let slices: Vec<Node> = node
                    .children_by_field_name("subscript", &mut cursor)
                    .collect();
                let slice = self.slice(&slices, has_comma(node));
                Expr::subscript(self.expr(value), slice)
            }
            "generic_type" => {
                let parts = named_children(node);
                let base = parts.iter().find(|p| p.kind() != "type_parameter");
                let params = parts.iter().find(|p| p.kind() == "type_parameter");
                match (base, params) {
                    (Some(base), Some(params)) => {
                        let types = named_children(*params);
                        let slice = self.slice(&types, has_comma(*params));
                        Expr::subscript(self.expr(*base), slice)
                    }
                    _ => Expr::Unsupported(node.kind().to_string()),
                }
            }
            "list" => Expr::List(self.exprs(node)),
            "tuple" => Expr::Tuple(self.exprs(node)),
            "binary_operator" => {
                match (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("operator"),
                    node.child_by_field_name("right"),
                ) {
                    (Some(left), Some(op), Some(right)) => Expr::binop(
                        self.expr(left),
                        BinOperator::from_symbol(op.kind()),
                        self.expr(right),
                    ),
                    _ => Expr::Unsupported(node.kind().to_string()),
                }
            }
            "union_type" => {
                let parts = named_children(node);
                match (parts.first(), parts.get(1)) {
                    (Some(left), Some(right)) => {
                        Expr::binop(self.expr(*left), BinOperator::BitOr, self.expr(*right))
                    }
                    _ => Expr::Unsupported(node.kind().to_string()),
                }
            }
            "none" => Expr::Constant(Constant::None),
            "true" => Expr::Constant(Constant::Bool(true)),
            "false" => Expr::Constant(Constant::Bool(false)),
            "ellipsis" => Expr::Constant(Constant::Ellipsis),
            "integer" | "float" => Expr::Constant(self.number(node)),
            "string" | "concatenated_string" => Expr::Constant(self.string(node)),
            other => Expr::Unsupported(other.to_string()),
        }
    }

    fn exprs(&self, node: Node) -> Vec<Expr> {
        named_children(node)
            .into_iter()
            .map(|child| self.expr(child))
            .collect()
    }

    /// Several subscripts, or one followed by a comma, form a tuple slice.
    fn slice(&self, nodes: &[Node], trailing_comma: bool) -> Expr {
        match nodes {
            [single] if !trailing_comma => self.expr(*single),
            [] => Expr::Unsupported("subscript".to_string()),
            many => Expr::Tuple(many.iter().map(|n| self.expr(*n)).collect()),
        }
    }

    fn number(&self, node: Node) -> Constant {
        let text = self.text(node).to_string();
        if text.ends_with(|c| c == 'j' || c == 'J') {
            Constant::Complex(text)
        } else if node.kind() == "float" {
            Constant::Float(text)
        } else {
            Constant::Int(text)
        }
    }

    fn string(&self, node: Node) -> Constant {
        let text = self.text(node).to_string();
        // The prefix runs up to the first quote character.
        let prefix: String = text
            .trim_start()
            .chars()
            .take_while(|c| *c != '"' && *c != '\'')
            .collect();
        if prefix.contains(|c| c == 'b' || c == 'B') {
            Constant::Bytes(text)
        } else {
            Constant::Str(text)
        }
    }
}

fn push_param(params: &mut Parameters, param: Param, keyword_only: bool) {
    if keyword_only {
        params.kwonly.push(param);
    } else {
        params.args.push(param);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Module {
        PythonFrontend::new().parse_module(source).unwrap()
    }

    fn only_function(source: &str) -> FunctionDef {
        match parse(source).body.into_iter().next() {
            Some(Stmt::FunctionDef(def)) => def,
            other => panic!("expected a function, got {:?}", other),
        }
    }

    fn return_annotation(annotation: &str) -> Expr {
        let def = only_function(&format!("def f() -> {}:\n    pass\n", annotation));
        def.returns.expect("return annotation")
    }

    #[test]
    fn test_plain_imports() {
        let module = parse("import os\nimport numpy as np, os.path\n");
        assert_eq!(
            module.body,
            vec![
                Stmt::Import(vec![Alias::new("os")]),
                Stmt::Import(vec![
                    Alias::with_asname("numpy", "np"),
                    Alias::new("os.path"),
                ]),
            ]
        );
    }

    #[test]
    fn test_relative_imports() {
        let module = parse("from . import x\nfrom ..pkg import y as z\nfrom a.b import (c, d,)\n");
        assert_eq!(
            module.body,
            vec![
                Stmt::ImportFrom {
                    module: None,
                    level: 1,
                    names: vec![Alias::new("x")],
                },
                Stmt::ImportFrom {
                    module: Some("pkg".to_string()),
                    level: 2,
                    names: vec![Alias::with_asname("y", "z")],
                },
                Stmt::ImportFrom {
                    module: Some("a.b".to_string()),
                    level: 0,
                    names: vec![Alias::new("c"), Alias::new("d")],
                },
            ]
        );
    }

    #[test]
    fn test_future_and_wildcard_imports() {
        let module = parse("from __future__ import annotations\nfrom os.path import *\n");
        assert_eq!(
            module.body,
            vec![
                Stmt::ImportFrom {
                    module: Some("__future__".to_string()),
                    level: 0,
                    names: vec![Alias::new("annotations")],
                },
                Stmt::ImportFrom {
                    module: Some("os.path".to_string()),
                    level: 0,
                    names: vec![Alias::new("*")],
                },
            ]
        );
    }

    #[test]
    fn test_function_signature() {
        let def = only_function("def f(a: int, b: str = \"x\") -> bool:\n    return True\n");
        assert_eq!(def.name, "f");
        assert!(!def.is_async);
        assert_eq!(
            def.params.args,
            vec![
                Param::new("a", Some(Expr::name("int"))),
                Param::new("b", Some(Expr::name("str"))),
            ]
        );
        assert_eq!(def.returns, Some(Expr::name("bool")));
    }

    #[test]
    fn test_parameter_partitions() {
        let def = only_function(
            "def f(p, /, a, b=1, *args: int, k: str, **kwargs) -> None:\n    pass\n",
        );
        let names = |params: &[Param]| params.iter().map(|p| p.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&def.params.posonly), vec!["p"]);
        assert_eq!(names(&def.params.args), vec!["a", "b"]);
        assert_eq!(
            def.params.vararg,
            Some(Param::new("args", Some(Expr::name("int"))))
        );
        assert_eq!(names(&def.params.kwonly), vec!["k"]);
        assert_eq!(def.params.kwarg, Some(Param::new("kwargs", None)));
    }

    #[test]
    fn test_bare_star_marks_keyword_only() {
        let def = only_function("def f(a, *, b):\n    pass\n");
        assert_eq!(def.params.args, vec![Param::new("a", None)]);
        assert_eq!(def.params.kwonly, vec![Param::new("b", None)]);
        assert!(def.params.vararg.is_none());
    }

    #[test]
    fn test_generic_annotation() {
        assert_eq!(
            return_annotation("List[int]"),
            Expr::subscript(Expr::name("List"), Expr::name("int"))
        );
    }

    #[test]
    fn test_multi_argument_generic_is_tuple_slice() {
        assert_eq!(
            return_annotation("Tuple[int, str]"),
            Expr::subscript(
                Expr::name("Tuple"),
                Expr::Tuple(vec![Expr::name("int"), Expr::name("str")])
            )
        );
    }

    #[test]
    fn test_dotted_generic_annotation() {
        assert_eq!(
            return_annotation("typing.List[int]"),
            Expr::subscript(
                Expr::attribute(Expr::name("typing"), "List"),
                Expr::name("int")
            )
        );
    }

    #[test]
    fn test_union_annotation() {
        assert_eq!(
            return_annotation("int | None"),
            Expr::binop(
                Expr::name("int"),
                BinOperator::BitOr,
                Expr::Constant(Constant::None)
            )
        );
    }

    #[test]
    fn test_list_literal_annotation() {
        assert_eq!(
            return_annotation("Callable[[int, str], bool]"),
            Expr::subscript(
                Expr::name("Callable"),
                Expr::Tuple(vec![
                    Expr::List(vec![Expr::name("int"), Expr::name("str")]),
                    Expr::name("bool"),
                ])
            )
        );
    }

    #[test]
    fn test_literal_annotations() {
        assert_eq!(return_annotation("None"), Expr::Constant(Constant::None));
        assert!(matches!(
            return_annotation("'Model'"),
            Expr::Constant(Constant::Str(_))
        ));
        assert!(matches!(
            return_annotation("b'raw'"),
            Expr::Constant(Constant::Bytes(_))
        ));
        assert!(matches!(
            return_annotation("1j"),
            Expr::Constant(Constant::Complex(_))
        ));
    }

    #[test]
    fn test_unsupported_annotation_kind() {
        assert!(matches!(
            return_annotation("-1"),
            Expr::Unsupported(_)
        ));
    }

    #[test]
    fn test_decorated_and_async_functions() {
        let module = parse(
            "@app.get('/')\ndef index():\n    pass\n\nasync def fetch():\n    pass\n",
        );
        match &module.body[..] {
            [Stmt::FunctionDef(index), Stmt::FunctionDef(fetch)] => {
                assert_eq!(index.name, "index");
                assert!(!index.is_async);
                assert_eq!(fetch.name, "fetch");
                assert!(fetch.is_async);
            }
            other => panic!("unexpected statements: {:?}", other),
        }
    }

    #[test]
    fn test_compound_statements_are_flattened() {
        let source = r#"
try:
    import ujson as json
except ImportError:
    import json
else:
    pass

if DEBUG:
    def debug():
        pass
elif OTHER:
    from x import y

class Model:
    import hidden
"#;
        let module = parse(source);
        assert_eq!(module.body.len(), 3);
        match &module.body[0] {
            Stmt::Block(inner) => {
                assert_eq!(inner[0], Stmt::Import(vec![Alias::with_asname("ujson", "json")]));
                assert_eq!(inner[1], Stmt::Import(vec![Alias::new("json")]));
                assert_eq!(inner[2], Stmt::Other);
            }
            other => panic!("expected block, got {:?}", other),
        }
        match &module.body[1] {
            Stmt::Block(inner) => {
                assert!(matches!(&inner[0], Stmt::FunctionDef(def) if def.name == "debug"));
                assert!(matches!(&inner[1], Stmt::ImportFrom { .. }));
            }
            other => panic!("expected block, got {:?}", other),
        }
        assert_eq!(
            module.body[2],
            Stmt::ClassDef {
                name: "Model".to_string()
            }
        );
    }

    #[test]
    fn test_chained_subscript_annotation_is_rejected() {
        // The grammar's `type` rule has no chained subscript, so this valid
        // annotation surfaces as a syntax error at the second bracket.
        let err = PythonFrontend::new()
            .parse_module("def f(x: List[int][str]): pass\n")
            .unwrap_err();
        assert!(matches!(err, FrontendError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_syntax_error() {
        let err = PythonFrontend::new()
            .parse_module("def broken(:\n    pass\n")
            .unwrap_err();
        assert!(matches!(err, FrontendError::Syntax { line: 1, .. }));
    }
}
