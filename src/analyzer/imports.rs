//! Import statement collection.

use crate::document::{Import, ImportFrom};
use crate::syntax::Alias;

fn to_import(alias: &Alias) -> Import {
    Import {
        name: alias.name.clone(),
        asname: alias.asname.clone(),
    }
}

/// One `Import` per element of a plain `import` statement.
pub fn collect_import(aliases: &[Alias]) -> Vec<Import> {
    aliases.iter().map(to_import).collect()
}

/// Normalize a `from <module> import <names>` statement.
///
/// A purely relative import (`from . import x`) has an empty module.
pub fn collect_import_from(module: Option<&str>, level: u32, names: &[Alias]) -> ImportFrom {
    ImportFrom {
        module: module.unwrap_or_default().to_string(),
        level,
        imports: names.iter().map(to_import).collect(),
    }
}
