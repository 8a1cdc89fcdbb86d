//! Expression evaluation.

use indexmap::IndexMap;

use crate::parser::ast::{
    AssignmentOperator, AssignmentTarget, BinaryOperator, ComprehensionClause, ExpressionType,
    LiteralType, LogicalOperator, PropertyKey, UnaryOperator, UpdateOperator,
};
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::arithmetic::{add, divide, multiply, negate, power, remainder, subtract};
use crate::runner::ds::operations::test_and_comparison::{compare, contains, is_equal};
use crate::runner::ds::operations::type_conversion::{
    get_builtin_object_name, get_type, to_boolean, to_index, to_iterable_items, to_property_key,
};
use crate::runner::ds::scope::ScopeId;
use crate::runner::ds::value::{NumberType, ScriptValue};
use crate::runner::plugin::types::EvalContext;

use super::function::{call_value, make_closure};
use super::statement::{bind_target, with_new_scope};
use super::types::ValueResult;

/// Evaluate an expression and return its value.
pub fn evaluate_expression(expr: &ExpressionType, ctx: &mut EvalContext, scope: ScopeId) -> ValueResult {
    match expr {
        ExpressionType::Literal(lit) => Ok(evaluate_literal(lit)),

        ExpressionType::Identifier(name) => resolve_identifier(name, ctx, scope),

        ExpressionType::ArrayExpression(elements) => {
            let mut items = Vec::with_capacity(elements.len());
            for element in elements {
                items.push(evaluate_expression(element, ctx, scope)?);
            }
            Ok(ScriptValue::new_list(items))
        }

        ExpressionType::ObjectExpression(properties) => {
            let mut entries = IndexMap::with_capacity(properties.len());
            for (key, value) in properties {
                let key = match key {
                    PropertyKey::Name(name) => name.clone(),
                    PropertyKey::Computed(expression) => {
                        to_property_key(&evaluate_expression(expression, ctx, scope)?)?
                    }
                };
                let value = evaluate_expression(value, ctx, scope)?;
                entries.insert(key, value);
            }
            Ok(ScriptValue::new_map(entries))
        }

        ExpressionType::ListComprehension { element, clauses } => {
            let mut items = Vec::new();
            with_new_scope(ctx, scope, false, |ctx, inner| {
                run_comprehension(clauses, ctx, inner, &mut |ctx: &mut EvalContext, inner: ScopeId| {
                    items.push(evaluate_expression(element, ctx, inner)?);
                    Ok(())
                })
            })?;
            Ok(ScriptValue::new_list(items))
        }

        ExpressionType::MapComprehension {
            key,
            value,
            clauses,
        } => {
            let mut entries = IndexMap::new();
            with_new_scope(ctx, scope, false, |ctx, inner| {
                run_comprehension(clauses, ctx, inner, &mut |ctx: &mut EvalContext, inner: ScopeId| {
                    let k = to_property_key(&evaluate_expression(key, ctx, inner)?)?;
                    let v = evaluate_expression(value, ctx, inner)?;
                    entries.insert(k, v);
                    Ok(())
                })
            })?;
            Ok(ScriptValue::new_map(entries))
        }

        ExpressionType::FunctionExpression(function) => Ok(make_closure(function, ctx, scope)),

        ExpressionType::UnaryExpression { operator, argument } => {
            let value = evaluate_expression(argument, ctx, scope)?;
            match operator {
                UnaryOperator::Minus => negate(&value),
                UnaryOperator::LogicalNot => Ok(ScriptValue::Boolean(!to_boolean(&value))),
            }
        }

        ExpressionType::BinaryExpression {
            operator,
            left,
            right,
        } => {
            let left = evaluate_expression(left, ctx, scope)?;
            let right = evaluate_expression(right, ctx, scope)?;
            apply_binary_operator(*operator, &left, &right)
        }

        ExpressionType::LogicalExpression {
            operator,
            left,
            right,
        } => {
            let left = evaluate_expression(left, ctx, scope)?;
            let short_circuit = match operator {
                LogicalOperator::And => !to_boolean(&left),
                LogicalOperator::Or => to_boolean(&left),
            };
            if short_circuit {
                Ok(left)
            } else {
                evaluate_expression(right, ctx, scope)
            }
        }

        ExpressionType::ConditionalExpression {
            test,
            consequent,
            alternate,
        } => {
            if to_boolean(&evaluate_expression(test, ctx, scope)?) {
                evaluate_expression(consequent, ctx, scope)
            } else {
                evaluate_expression(alternate, ctx, scope)
            }
        }

        ExpressionType::AssignmentExpression {
            operator,
            target,
            value,
        } => evaluate_assignment(*operator, target, value, ctx, scope),

        ExpressionType::UpdateExpression { operator, target } => {
            let delta = ScriptValue::integer(1);
            let apply = |old: &ScriptValue| match operator {
                UpdateOperator::Increment => add(old, &delta),
                UpdateOperator::Decrement => subtract(old, &delta),
            };
            let (old, _) = update_target(target, ctx, scope, apply)?;
            Ok(old)
        }

        ExpressionType::MemberExpression { object, property } => {
            let object = evaluate_expression(object, ctx, scope)?;
            get_member(&object, property)
        }

        ExpressionType::IndexExpression { object, index } => {
            let object = evaluate_expression(object, ctx, scope)?;
            let index = evaluate_expression(index, ctx, scope)?;
            get_index(&object, &index)
        }

        ExpressionType::CallExpression { callee, arguments } => {
            evaluate_call_expression(callee, arguments, ctx, scope)
        }
    }
}

fn evaluate_literal(lit: &LiteralType) -> ScriptValue {
    match lit {
        LiteralType::NullLiteral => ScriptValue::Null,
        LiteralType::BooleanLiteral(b) => ScriptValue::Boolean(*b),
        LiteralType::IntegerLiteral(i) => ScriptValue::integer(*i),
        LiteralType::FloatLiteral(f) => ScriptValue::float(*f),
        LiteralType::StringLiteral(s) => ScriptValue::String(s.clone()),
    }
}

/// Scopes first, then the helper allow-list.
fn resolve_identifier(name: &str, ctx: &mut EvalContext, scope: ScopeId) -> ValueResult {
    if let Some(value) = ctx.scopes.lookup(scope, name) {
        return Ok(value.clone());
    }
    if ctx.has_builtin_function(name) {
        return Ok(ScriptValue::BuiltIn(name.to_string()));
    }
    Err(ErrorType::ReferenceError(name.to_string()))
}

pub fn apply_binary_operator(operator: BinaryOperator, left: &ScriptValue, right: &ScriptValue) -> ValueResult {
    match operator {
        BinaryOperator::Add => add(left, right),
        BinaryOperator::Subtract => subtract(left, right),
        BinaryOperator::Multiply => multiply(left, right),
        BinaryOperator::Divide => divide(left, right),
        BinaryOperator::Remainder => remainder(left, right),
        BinaryOperator::Power => power(left, right),
        BinaryOperator::Equal => Ok(ScriptValue::Boolean(is_equal(left, right))),
        BinaryOperator::NotEqual => Ok(ScriptValue::Boolean(!is_equal(left, right))),
        BinaryOperator::LessThan => Ok(ScriptValue::Boolean(compare(left, right)?.is_lt())),
        BinaryOperator::LessThanEqual => Ok(ScriptValue::Boolean(compare(left, right)?.is_le())),
        BinaryOperator::GreaterThan => Ok(ScriptValue::Boolean(compare(left, right)?.is_gt())),
        BinaryOperator::GreaterThanEqual => Ok(ScriptValue::Boolean(compare(left, right)?.is_ge())),
        BinaryOperator::In => Ok(ScriptValue::Boolean(contains(right, left)?)),
    }
}

type ComprehensionSink<'s> = dyn FnMut(&mut EvalContext, ScopeId) -> Result<(), ErrorType> + 's;

fn run_comprehension(
    clauses: &[ComprehensionClause],
    ctx: &mut EvalContext,
    scope: ScopeId,
    sink: &mut ComprehensionSink<'_>,
) -> Result<(), ErrorType> {
    match clauses.split_first() {
        None => sink(ctx, scope),
        Some((ComprehensionClause::If(test), rest)) => {
            if to_boolean(&evaluate_expression(test, ctx, scope)?) {
                run_comprehension(rest, ctx, scope, sink)
            } else {
                Ok(())
            }
        }
        Some((ComprehensionClause::For { target, iterable }, rest)) => {
            let items = to_iterable_items(&evaluate_expression(iterable, ctx, scope)?)?;
            for item in items {
                ctx.check_interrupt()?;
                bind_target(target, item, ctx, scope, true)?;
                run_comprehension(rest, ctx, scope, sink)?;
            }
            Ok(())
        }
    }
}

/// Splits a list (or string) into exactly `count` values for a destructuring pattern.
pub fn destructure(value: &ScriptValue, count: usize) -> Result<Vec<ScriptValue>, ErrorType> {
    let items = match value {
        ScriptValue::List(_) | ScriptValue::String(_) => to_iterable_items(value)?,
        _ => {
            return Err(ErrorType::TypeError(format!(
                "cannot unpack non-sequence '{}'",
                get_type(value)
            )))
        }
    };
    if items.len() != count {
        return Err(ErrorType::TypeError(format!(
            "expected {} values to unpack, got {}",
            count,
            items.len()
        )));
    }
    Ok(items)
}

pub fn get_member(object: &ScriptValue, property: &str) -> ValueResult {
    match object {
        ScriptValue::Map(entries) => entries
            .borrow()
            .get(property)
            .cloned()
            .ok_or_else(|| ErrorType::KeyError(format!("'{}'", property))),
        ScriptValue::List(items) if property == "length" => {
            Ok(ScriptValue::integer(items.borrow().len() as i64))
        }
        ScriptValue::String(s) if property == "length" => {
            Ok(ScriptValue::integer(s.chars().count() as i64))
        }
        _ => Err(ErrorType::TypeError(format!(
            "'{}' object has no attribute '{}'",
            get_type(object),
            property
        ))),
    }
}

pub fn get_index(object: &ScriptValue, index: &ScriptValue) -> ValueResult {
    match (object, index) {
        (ScriptValue::List(items), ScriptValue::Number(NumberType::Integer(i))) => {
            let items = items.borrow();
            to_index(*i, items.len())
                .map(|i| items[i].clone())
                .ok_or_else(|| ErrorType::RangeError("list index out of range".to_string()))
        }
        (ScriptValue::String(s), ScriptValue::Number(NumberType::Integer(i))) => {
            let chars: Vec<char> = s.chars().collect();
            to_index(*i, chars.len())
                .map(|i| ScriptValue::String(chars[i].to_string()))
                .ok_or_else(|| ErrorType::RangeError("string index out of range".to_string()))
        }
        (ScriptValue::Map(entries), key) => {
            let key = to_property_key(key)?;
            entries
                .borrow()
                .get(&key)
                .cloned()
                .ok_or_else(|| ErrorType::KeyError(format!("'{}'", key)))
        }
        _ => Err(ErrorType::TypeError(format!(
            "'{}' object cannot be indexed by '{}'",
            get_type(object),
            get_type(index)
        ))),
    }
}

pub fn set_index(object: &ScriptValue, index: &ScriptValue, value: ScriptValue) -> Result<(), ErrorType> {
    match (object, index) {
        (ScriptValue::List(items), ScriptValue::Number(NumberType::Integer(i))) => {
            let mut items = items.borrow_mut();
            let len = items.len();
            match to_index(*i, len) {
                Some(i) => {
                    items[i] = value;
                    Ok(())
                }
                None => Err(ErrorType::RangeError(
                    "list assignment index out of range".to_string(),
                )),
            }
        }
        (ScriptValue::Map(entries), key) => {
            let key = to_property_key(key)?;
            entries.borrow_mut().insert(key, value);
            Ok(())
        }
        _ => Err(ErrorType::TypeError(format!(
            "'{}' object does not support item assignment",
            get_type(object)
        ))),
    }
}

fn set_member(object: &ScriptValue, property: &str, value: ScriptValue) -> Result<(), ErrorType> {
    match object {
        ScriptValue::Map(entries) => {
            entries.borrow_mut().insert(property.to_string(), value);
            Ok(())
        }
        _ => Err(ErrorType::TypeError(format!(
            "'{}' object has no attribute '{}'",
            get_type(object),
            property
        ))),
    }
}

fn evaluate_assignment(
    operator: AssignmentOperator,
    target: &AssignmentTarget,
    value: &ExpressionType,
    ctx: &mut EvalContext,
    scope: ScopeId,
) -> ValueResult {
    if let AssignmentTarget::ArrayPattern(names) = target {
        let value = evaluate_expression(value, ctx, scope)?;
        for (name, item) in names.iter().zip(destructure(&value, names.len())?) {
            ctx.scopes.assign(scope, name, item)?;
        }
        return Ok(value);
    }
    let rhs = evaluate_expression(value, ctx, scope)?;
    let (_, new) = update_target(target, ctx, scope, |old| match operator.binary_operator() {
        Some(op) => apply_binary_operator(op, old, &rhs),
        None => Ok(rhs.clone()),
    })?;
    Ok(new)
}

/// Reads the target, computes the new value with `apply` and stores it.
/// Returns the old and new values. Plain assignment never reads the old value.
fn update_target(
    target: &AssignmentTarget,
    ctx: &mut EvalContext,
    scope: ScopeId,
    apply: impl FnOnce(&ScriptValue) -> ValueResult,
) -> Result<(ScriptValue, ScriptValue), ErrorType> {
    match target {
        AssignmentTarget::Identifier(name) => {
            let old = ctx.scopes.lookup(scope, name).cloned();
            let new = match &old {
                Some(old) => apply(old)?,
                None => apply(&ScriptValue::Null).map_err(|_| ErrorType::ReferenceError(name.clone()))?,
            };
            ctx.scopes.assign(scope, name, new.clone())?;
            Ok((old.unwrap_or(ScriptValue::Null), new))
        }
        AssignmentTarget::Member { object, property } => {
            let object = evaluate_expression(object, ctx, scope)?;
            let old = match &object {
                ScriptValue::Map(entries) => entries.borrow().get(property.as_str()).cloned(),
                _ => None,
            };
            let new = match &old {
                Some(old) => apply(old)?,
                None => apply(&ScriptValue::Null)
                    .map_err(|_| ErrorType::KeyError(format!("'{}'", property)))?,
            };
            set_member(&object, property, new.clone())?;
            Ok((old.unwrap_or(ScriptValue::Null), new))
        }
        AssignmentTarget::Index { object, index } => {
            let object = evaluate_expression(object, ctx, scope)?;
            let index = evaluate_expression(index, ctx, scope)?;
            let old = get_index(&object, &index).ok();
            let new = match &old {
                Some(old) => apply(old)?,
                None => apply(&ScriptValue::Null).map_err(|e| match e {
                    ErrorType::TypeError(_) => get_index(&object, &index)
                        .err()
                        .unwrap_or(e),
                    other => other,
                })?,
            };
            set_index(&object, &index, new.clone())?;
            Ok((old.unwrap_or(ScriptValue::Null), new))
        }
        AssignmentTarget::ArrayPattern(_) => Err(ErrorType::SyntaxError(
            "cannot update a destructuring pattern".to_string(),
        )),
    }
}

fn evaluate_call_expression(
    callee: &ExpressionType,
    arguments: &[ExpressionType],
    ctx: &mut EvalContext,
    scope: ScopeId,
) -> ValueResult {
    if let ExpressionType::MemberExpression { object, property } = callee {
        let object = evaluate_expression(object, ctx, scope)?;
        let args = evaluate_arguments(arguments, ctx, scope)?;
        return call_method(object, property, args, ctx);
    }
    let function = evaluate_expression(callee, ctx, scope)?;
    let args = evaluate_arguments(arguments, ctx, scope)?;
    call_value(&function, args, ctx)
}

fn evaluate_arguments(
    arguments: &[ExpressionType],
    ctx: &mut EvalContext,
    scope: ScopeId,
) -> Result<Vec<ScriptValue>, ErrorType> {
    let mut args = Vec::with_capacity(arguments.len());
    for argument in arguments {
        args.push(evaluate_expression(argument, ctx, scope)?);
    }
    Ok(args)
}

/// `object.method(args)`: a callable map member first, then the type's method table.
pub fn call_method(
    object: ScriptValue,
    method: &str,
    args: Vec<ScriptValue>,
    ctx: &mut EvalContext,
) -> ValueResult {
    if let ScriptValue::Map(entries) = &object {
        let member = entries.borrow().get(method).cloned();
        if let Some(member) = member {
            if member.is_callable() {
                return call_value(&member, args, ctx);
            }
        }
    }
    let registry = ctx.registry();
    let builtin = get_builtin_object_name(&object).and_then(|name| registry.get_method(name, method));
    match builtin {
        Some(function) => function.call(ctx, object, args),
        None => Err(ErrorType::TypeError(format!(
            "'{}' object has no method '{}'",
            get_type(&object),
            method
        ))),
    }
}
