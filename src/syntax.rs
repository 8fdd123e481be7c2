//! Closed syntax tree consumed by the analyzer.
//!
//! A front-end lowers its concrete parse tree into these types. Only the
//! shapes the analyzer cares about are modelled; everything else collapses
//! into `Stmt::Other` or `Expr::Unsupported`, so every consumer can match
//! exhaustively.

use std::fmt;

/// A parsed source unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub body: Vec<Stmt>,
}

impl Module {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }
}

/// A statement reachable from module level.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `import a.b as c, d`
    Import(Vec<Alias>),
    /// `from ..pkg import x as y`
    ImportFrom {
        /// Dotted module path, `None` for purely relative imports.
        module: Option<String>,
        /// Number of leading relative dots.
        level: u32,
        names: Vec<Alias>,
    },
    FunctionDef(FunctionDef),
    /// Class bodies are opaque to the analyzer.
    ClassDef { name: String },
    /// The nested suites of a compound statement (`if`, `try`, `with`, ...),
    /// flattened in source order.
    Block(Vec<Stmt>),
    /// Any other simple statement.
    Other,
}

/// One imported element with its optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}

impl Alias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asname: None,
        }
    }

    pub fn with_asname(name: impl Into<String>, asname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asname: Some(asname.into()),
        }
    }
}

/// A function definition. The body is not retained.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Parameters,
    pub returns: Option<Expr>,
    pub is_async: bool,
}

/// Parameters of a function, partitioned the way the call protocol sees them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameters {
    /// Parameters before `/`.
    pub posonly: Vec<Param>,
    /// Regular positional-or-keyword parameters.
    pub args: Vec<Param>,
    /// `*args`
    pub vararg: Option<Param>,
    /// Parameters after `*` or `*args`.
    pub kwonly: Vec<Param>,
    /// `**kwargs`
    pub kwarg: Option<Param>,
}

impl Parameters {
    /// Whether any parameter outside the regular list is declared.
    pub fn has_special(&self) -> bool {
        !self.posonly.is_empty()
            || self.vararg.is_some()
            || !self.kwonly.is_empty()
            || self.kwarg.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<Expr>,
}

impl Param {
    pub fn new(name: impl Into<String>, annotation: Option<Expr>) -> Self {
        Self {
            name: name.into(),
            annotation,
        }
    }
}

/// Expression node kinds that can appear in a type annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        slice: Box<Expr>,
    },
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Constant(Constant),
    BinOp {
        left: Box<Expr>,
        op: BinOperator,
        right: Box<Expr>,
    },
    /// A node kind outside the annotation grammar, named by the front-end.
    Unsupported(String),
}

impl Expr {
    pub fn name(id: impl Into<String>) -> Self {
        Expr::Name(id.into())
    }

    pub fn attribute(value: Expr, attr: impl Into<String>) -> Self {
        Expr::Attribute {
            value: Box::new(value),
            attr: attr.into(),
        }
    }

    pub fn subscript(value: Expr, slice: Expr) -> Self {
        Expr::Subscript {
            value: Box::new(value),
            slice: Box::new(slice),
        }
    }

    pub fn binop(left: Expr, op: BinOperator, right: Expr) -> Self {
        Expr::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }
}

/// Literal constants.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    None,
    Bool(bool),
    Int(String),
    Float(String),
    Complex(String),
    Str(String),
    Bytes(String),
    Ellipsis,
}

impl Constant {
    /// The runtime type name of the literal value, `None` for the null constant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Constant::None => "None",
            Constant::Bool(_) => "bool",
            Constant::Int(_) => "int",
            Constant::Float(_) => "float",
            Constant::Complex(_) => "complex",
            Constant::Str(_) => "str",
            Constant::Bytes(_) => "bytes",
            Constant::Ellipsis => "ellipsis",
        }
    }
}

/// Binary operators. Only `|` and `&` are meaningful in annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinOperator {
    BitOr,
    BitAnd,
    Other(String),
}

impl BinOperator {
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "|" => BinOperator::BitOr,
            "&" => BinOperator::BitAnd,
            other => BinOperator::Other(other.to_string()),
        }
    }
}

impl fmt::Display for BinOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinOperator::BitOr => write!(f, "|"),
            BinOperator::BitAnd => write!(f, "&"),
            BinOperator::Other(symbol) => write!(f, "{}", symbol),
        }
    }
}
