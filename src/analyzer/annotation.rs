//! Annotation resolution.
//!
//! Normalizes one type expression into an [`Annotation`]:
//!
//! | expression            | result                                    |
//! |-----------------------|-------------------------------------------|
//! | absent                | `any`                                     |
//! | `a.b`                 | `resolve(a).type + ".b"`                  |
//! | `Name`                | `Name`                                    |
//! | literal               | `None` or the literal's runtime type name |
//! | `Tuple[A, B]`         | `Tuple` of `[A, B]`                       |
//! | `Base[X]`             | `Base` with `X` appended to its `of`      |
//! | `[A, B]`              | `List` of `[A, B]`                        |
//! | `(A, B)`              | `Tuple` of `[A, B]`                       |
//! | `A \| B`, `A & B`     | `Union` / `Intersection` of `[A, B]`      |
//!
//! Resolution is a pure function of its input; nothing is carried between
//! calls.

use crate::document::Annotation;
use crate::error::AnnotationError;
use crate::syntax::{BinOperator, Expr};

const TUPLE: &str = "Tuple";
const LIST: &str = "List";
const UNION: &str = "Union";
const INTERSECTION: &str = "Intersection";

/// Resolve an optional annotation; absence yields `any`.
pub fn resolve_annotation(expr: Option<&Expr>) -> Result<Annotation, AnnotationError> {
    match expr {
        Some(expr) => resolve_expr(expr),
        None => Ok(Annotation::any()),
    }
}

/// Resolve one type expression.
pub fn resolve_expr(expr: &Expr) -> Result<Annotation, AnnotationError> {
    match expr {
        Expr::Attribute { value, attr } => {
            let base = resolve_expr(value)?;
            Ok(Annotation::leaf(format!("{}.{}", base.type_name, attr)))
        }
        Expr::Name(id) => Ok(Annotation::leaf(id.as_str())),
        Expr::Constant(constant) => Ok(Annotation::leaf(constant.type_name())),
        Expr::Subscript { value, slice } => resolve_subscript(value, slice),
        Expr::List(elts) => Ok(Annotation::composite(LIST, resolve_all(elts)?)),
        Expr::Tuple(elts) => Ok(Annotation::composite(TUPLE, resolve_all(elts)?)),
        Expr::BinOp { left, op, right } => {
            let type_name = match op {
                BinOperator::BitOr => UNION,
                BinOperator::BitAnd => INTERSECTION,
                BinOperator::Other(symbol) => {
                    return Err(AnnotationError::UnsupportedOperator(symbol.clone()))
                }
            };
            let left = resolve_expr(left)?;
            let right = resolve_expr(right)?;
            Ok(Annotation::composite(type_name, vec![left, right]))
        }
        Expr::Unsupported(kind) => Err(AnnotationError::UnsupportedNode(kind.clone())),
    }
}

/// `Base[Args]`.
///
/// A `Tuple` base takes the elements of an explicit tuple slice. Any other
/// base records the slice as one more nested annotation, so `Dict[K, V]`
/// becomes `Dict` of a single `Tuple[K, V]`.
fn resolve_subscript(value: &Expr, slice: &Expr) -> Result<Annotation, AnnotationError> {
    let mut base = resolve_expr(value)?;
    if base.type_name == TUPLE {
        return match slice {
            Expr::Tuple(elts) => Ok(Annotation::composite(TUPLE, resolve_all(elts)?)),
            _ => Err(AnnotationError::MalformedTuple),
        };
    }
    base.of.push(resolve_expr(slice)?);
    Ok(base)
}

fn resolve_all(elts: &[Expr]) -> Result<Vec<Annotation>, AnnotationError> {
    elts.iter().map(resolve_expr).collect()
}
