//! List methods, registered on the `Array` object.
//!
//! Callback methods work on a snapshot of the list so a callback that
//! mutates the list cannot invalidate the iteration.

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::test_and_comparison::is_equal;
use crate::runner::ds::operations::type_conversion::{get_type, to_boolean, to_index, to_integer};
use crate::runner::ds::value::{ListRef, ScriptValue};
use crate::runner::eval::function::call_value;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{arg, expect_args, BuiltInObject, EvalContext};

/// Register the Array methods with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let array = BuiltInObject::new("Array")
        .add_method("push", array_push)
        .add_method("append", array_push)
        .add_method("pop", array_pop)
        .add_method("map", array_map)
        .add_method("filter", array_filter)
        .add_method("reduce", array_reduce)
        .add_method("includes", array_includes)
        .add_method("indexOf", array_index_of)
        .add_method("join", array_join)
        .add_method("slice", array_slice)
        .add_method("concat", array_concat)
        .add_method("reverse", array_reverse);

    registry.register_object(array);
}

fn receiver(this: &ScriptValue) -> Result<ListRef, ErrorType> {
    match this {
        ScriptValue::List(items) => Ok(items.clone()),
        other => Err(ErrorType::TypeError(format!(
            "expected a list, got '{}'",
            get_type(other)
        ))),
    }
}

fn snapshot(this: &ScriptValue) -> Result<Vec<ScriptValue>, ErrorType> {
    Ok(receiver(this)?.borrow().clone())
}

/// Appends every argument and returns the new length.
fn array_push(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    let list = receiver(&this)?;
    let mut items = list.borrow_mut();
    items.extend(args);
    Ok(ScriptValue::integer(items.len() as i64))
}

/// Removes the last item, or the item at the given index.
fn array_pop(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("pop", &args, 0, 1)?;
    let list = receiver(&this)?;
    let mut items = list.borrow_mut();
    if items.is_empty() {
        return Err(ErrorType::RangeError("pop from empty list".to_string()));
    }
    let index = match args.first() {
        Some(index) => {
            let raw = to_integer(index)?;
            to_index(raw, items.len())
                .ok_or_else(|| ErrorType::RangeError(format!("pop index {} out of range", raw)))?
        }
        None => items.len() - 1,
    };
    Ok(items.remove(index))
}

fn array_map(
    ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("map", &args, 1, 1)?;
    let mut mapped = Vec::new();
    for item in snapshot(&this)? {
        mapped.push(call_value(&args[0], vec![item], ctx)?);
    }
    Ok(ScriptValue::new_list(mapped))
}

fn array_filter(
    ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("filter", &args, 1, 1)?;
    let mut kept = Vec::new();
    for item in snapshot(&this)? {
        if to_boolean(&call_value(&args[0], vec![item.clone()], ctx)?) {
            kept.push(item);
        }
    }
    Ok(ScriptValue::new_list(kept))
}

/// `reduce(f[, initial])` calls `f(accumulator, item)` left to right.
fn array_reduce(
    ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("reduce", &args, 1, 2)?;
    let mut items = snapshot(&this)?.into_iter();
    let mut accumulator = match args.get(1) {
        Some(initial) => initial.clone(),
        None => items.next().ok_or_else(|| {
            ErrorType::TypeError("reduce() of empty list with no initial value".to_string())
        })?,
    };
    for item in items {
        accumulator = call_value(&args[0], vec![accumulator, item], ctx)?;
    }
    Ok(accumulator)
}

fn array_includes(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("includes", &args, 1, 1)?;
    let list = receiver(&this)?;
    let found = list.borrow().iter().any(|item| is_equal(item, &args[0]));
    Ok(ScriptValue::Boolean(found))
}

fn array_index_of(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("indexOf", &args, 1, 1)?;
    let list = receiver(&this)?;
    let index = list
        .borrow()
        .iter()
        .position(|item| is_equal(item, &args[0]))
        .map_or(-1, |i| i as i64);
    Ok(ScriptValue::integer(index))
}

/// `items.join(sep)`: the display form of each item, separated by `sep` (default `,`).
fn array_join(
    ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("join", &args, 0, 1)?;
    let sep = match arg(&args, 0) {
        ScriptValue::Null => ",".to_string(),
        sep => sep.to_display_string(),
    };
    ctx.check_interrupt()?;
    let parts: Vec<String> = snapshot(&this)?.iter().map(|v| v.to_display_string()).collect();
    Ok(ScriptValue::String(parts.join(&sep)))
}

/// Clamps a possibly negative bound into `0..=len`.
fn slice_bound(value: &ScriptValue, len: usize, default: usize) -> Result<usize, ErrorType> {
    match value {
        ScriptValue::Null => Ok(default),
        value => {
            let raw = to_integer(value)?;
            let len = len as i64;
            let bound = if raw < 0 { (len + raw).max(0) } else { raw.min(len) };
            Ok(bound as usize)
        }
    }
}

fn array_slice(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("slice", &args, 0, 2)?;
    let items = snapshot(&this)?;
    let start = slice_bound(&arg(&args, 0), items.len(), 0)?;
    let end = slice_bound(&arg(&args, 1), items.len(), items.len())?;
    let sliced = if start < end {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };
    Ok(ScriptValue::new_list(sliced))
}

fn array_concat(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    let mut items = snapshot(&this)?;
    for other in args {
        match other {
            ScriptValue::List(more) => items.extend(more.borrow().iter().cloned()),
            value => items.push(value),
        }
    }
    Ok(ScriptValue::new_list(items))
}

/// Reverses in place and returns the same list.
fn array_reverse(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    _args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    receiver(&this)?.borrow_mut().reverse();
    Ok(this)
}
