use std::rc::Rc;

use crate::parser::ast::{FunctionData, ParameterData, StatementType};

/// True when `yield` appears in these statements outside any nested function.
pub(crate) fn contains_yield(statements: &[StatementType]) -> bool {
    statements.iter().any(|statement| match statement {
        StatementType::YieldStatement(_) => true,
        StatementType::IfStatement {
            consequent,
            alternate,
            ..
        } => contains_yield(consequent) || alternate.as_deref().map_or(false, contains_yield),
        StatementType::WhileStatement { body, .. }
        | StatementType::ForStatement { body, .. }
        | StatementType::ForOfStatement { body, .. } => contains_yield(body),
        StatementType::TryStatement {
            block,
            handler,
            finalizer,
        } => {
            contains_yield(block)
                || handler.as_ref().map_or(false, |h| contains_yield(&h.body))
                || finalizer.as_deref().map_or(false, contains_yield)
        }
        _ => false,
    })
}

/// Names bound by the parameter list, in order. Returns the first duplicate as an error.
pub(crate) fn bound_parameter_names(params: &[ParameterData]) -> Result<Vec<&str>, String> {
    let mut names: Vec<&str> = Vec::with_capacity(params.len());
    for p in params {
        if names.contains(&p.name.as_str()) {
            return Err(format!("duplicate parameter name '{}'", p.name));
        }
        names.push(&p.name);
    }
    Ok(names)
}

/// Function declarations directly inside a block; these are hoisted when the block runs.
pub(crate) fn hoisted_functions(statements: &[StatementType]) -> impl Iterator<Item = &Rc<FunctionData>> {
    statements.iter().filter_map(|statement| match statement {
        StatementType::FunctionDeclaration(f) => Some(f),
        _ => None,
    })
}
