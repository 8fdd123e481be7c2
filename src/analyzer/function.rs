//! Function and argument extraction.

use tracing::debug;

use crate::document::{Argument, Function};
use crate::error::{AnalysisError, AnnotationError};
use crate::syntax::{FunctionDef, Param};

use super::annotation::resolve_annotation;

/// Build one argument from a declared parameter.
pub fn build_argument(param: &Param) -> Result<Argument, AnnotationError> {
    Ok(Argument {
        name: param.name.clone(),
        annotation: resolve_annotation(param.annotation.as_ref())?,
    })
}

/// Convert one function definition.
///
/// Only regular positional-or-keyword parameters become arguments;
/// positional-only, keyword-only and variadic parameters are skipped.
pub fn build_function(def: &FunctionDef) -> Result<Function, AnalysisError> {
    let with_context = |source| AnalysisError::Annotation {
        function: def.name.clone(),
        source,
    };

    if def.params.has_special() {
        debug!(
            function = %def.name,
            "skipping positional-only, keyword-only and variadic parameters"
        );
    }

    let args = def
        .params
        .args
        .iter()
        .map(build_argument)
        .collect::<Result<Vec<_>, _>>()
        .map_err(with_context)?;
    let returns = resolve_annotation(def.returns.as_ref()).map_err(with_context)?;

    Ok(Function {
        name: def.name.clone(),
        args,
        returns,
        selected: true,
    })
}

/// Whether a function name passes the allow-list then the deny-list.
///
/// An empty allow-list keeps everything.
pub fn is_selected(name: &str, allow: &[String], deny: &[String]) -> bool {
    if !allow.is_empty() && !allow.iter().any(|a| a == name) {
        return false;
    }
    !deny.iter().any(|d| d == name)
}

/// Filter and convert function definitions, preserving declaration order.
pub fn extract_functions<'a, I>(
    defs: I,
    allow: &[String],
    deny: &[String],
) -> Result<Vec<Function>, AnalysisError>
where
    I: IntoIterator<Item = &'a FunctionDef>,
{
    let mut functions = Vec::new();
    for def in defs {
        if def.is_async {
            debug!(function = %def.name, "skipping async function");
            continue;
        }
        if !is_selected(&def.name, allow, deny) {
            debug!(function = %def.name, "function filtered out");
            continue;
        }
        functions.push(build_function(def)?);
    }
    Ok(functions)
}
