//! Core helpers and registration of the whole standard library.

use std::cmp::Ordering;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::test_and_comparison::compare;
use crate::runner::ds::operations::type_conversion::{get_type, to_integer, to_iterable_items};
use crate::runner::ds::value::{NumberType, ScriptValue};
use crate::runner::eval::function::call_value;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{arg, expect_args, EvalContext};

use super::array;
use super::json;
use super::math;
use super::object;
use super::string;

/// Largest list `range` will build.
const MAX_RANGE_LEN: i64 = 10_000_000;

/// Register every standard helper with the registry.
pub fn register_core_builtins(registry: &mut BuiltInRegistry) {
    register(registry);
    json::register(registry);
    math::register(registry);
    string::register(registry);
    array::register(registry);
    object::register(registry);
}

fn register(registry: &mut BuiltInRegistry) {
    registry.register_function("len", core_len);
    registry.register_function("range", core_range);
    registry.register_function("str", core_str);
    registry.register_function("int", core_int);
    registry.register_function("float", core_float);
    registry.register_function("list", core_list);
    registry.register_function("keys", core_keys);
    registry.register_function("enumerate", core_enumerate);
    registry.register_function("zip", core_zip);
    registry.register_function("sorted", core_sorted);
    registry.register_function("type", core_type);
}

fn core_len(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("len", &args, 1, 1)?;
    let len = match &args[0] {
        ScriptValue::String(s) => s.chars().count(),
        ScriptValue::List(items) => items.borrow().len(),
        ScriptValue::Map(entries) => entries.borrow().len(),
        other => {
            return Err(ErrorType::TypeError(format!(
                "object of type '{}' has no len()",
                get_type(other)
            )))
        }
    };
    Ok(ScriptValue::integer(len as i64))
}

/// `range(stop)`, `range(start, stop)` or `range(start, stop, step)`.
fn core_range(
    ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("range", &args, 1, 3)?;
    let (start, stop, step) = match args.len() {
        1 => (0, to_integer(&args[0])?, 1),
        2 => (to_integer(&args[0])?, to_integer(&args[1])?, 1),
        _ => (
            to_integer(&args[0])?,
            to_integer(&args[1])?,
            to_integer(&args[2])?,
        ),
    };
    if step == 0 {
        return Err(ErrorType::RangeError("range() step must not be zero".to_string()));
    }
    let span = if step > 0 {
        stop.saturating_sub(start)
    } else {
        start.saturating_sub(stop)
    };
    let count = if span <= 0 {
        0
    } else {
        (span - 1) / step.saturating_abs() + 1
    };
    if count > MAX_RANGE_LEN {
        return Err(ErrorType::RangeError(format!(
            "range() would produce {} items",
            count
        )));
    }
    let mut items = Vec::with_capacity(count as usize);
    let mut current = start;
    for i in 0..count {
        if i % 4096 == 0 {
            ctx.check_interrupt()?;
        }
        items.push(ScriptValue::integer(current));
        current = current.wrapping_add(step);
    }
    Ok(ScriptValue::new_list(items))
}

fn core_str(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("str", &args, 0, 1)?;
    Ok(ScriptValue::String(
        args.first().map(|v| v.to_display_string()).unwrap_or_default(),
    ))
}

fn core_int(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("int", &args, 1, 1)?;
    match &args[0] {
        ScriptValue::Number(NumberType::Integer(i)) => Ok(ScriptValue::integer(*i)),
        ScriptValue::Number(NumberType::Float(f)) => {
            if f.is_finite() && f.abs() < 9.2e18 {
                Ok(ScriptValue::integer(f.trunc() as i64))
            } else {
                Err(ErrorType::RangeError(format!(
                    "cannot convert {} to an integer",
                    f
                )))
            }
        }
        ScriptValue::Boolean(b) => Ok(ScriptValue::integer(*b as i64)),
        ScriptValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map(ScriptValue::integer)
            .map_err(|_| ErrorType::TypeError(format!("invalid literal for int(): '{}'", s))),
        other => Err(ErrorType::TypeError(format!(
            "int() argument must be a string or a number, not '{}'",
            get_type(other)
        ))),
    }
}

fn core_float(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("float", &args, 1, 1)?;
    match &args[0] {
        ScriptValue::Number(n) => Ok(ScriptValue::float(n.as_f64())),
        ScriptValue::Boolean(b) => Ok(ScriptValue::float(*b as i64 as f64)),
        ScriptValue::String(s) => s
            .trim()
            .parse::<f64>()
            .map(ScriptValue::float)
            .map_err(|_| ErrorType::TypeError(format!("could not convert string to float: '{}'", s))),
        other => Err(ErrorType::TypeError(format!(
            "float() argument must be a string or a number, not '{}'",
            get_type(other)
        ))),
    }
}

fn core_list(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("list", &args, 0, 1)?;
    match args.first() {
        Some(iterable) => Ok(ScriptValue::new_list(to_iterable_items(iterable)?)),
        None => Ok(ScriptValue::new_list(vec![])),
    }
}

fn core_keys(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("keys", &args, 1, 1)?;
    match &args[0] {
        ScriptValue::Map(_) => Ok(ScriptValue::new_list(to_iterable_items(&args[0])?)),
        other => Err(ErrorType::TypeError(format!(
            "keys() expects a map, got '{}'",
            get_type(other)
        ))),
    }
}

fn core_enumerate(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("enumerate", &args, 1, 2)?;
    let start = match args.get(1) {
        Some(v) => to_integer(v)?,
        None => 0,
    };
    let pairs = to_iterable_items(&args[0])?
        .into_iter()
        .enumerate()
        .map(|(i, item)| ScriptValue::new_list(vec![ScriptValue::integer(start + i as i64), item]))
        .collect();
    Ok(ScriptValue::new_list(pairs))
}

fn core_zip(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    let columns = args
        .iter()
        .map(to_iterable_items)
        .collect::<Result<Vec<_>, _>>()?;
    let len = columns.iter().map(|c| c.len()).min().unwrap_or(0);
    let rows = (0..len)
        .map(|i| ScriptValue::new_list(columns.iter().map(|c| c[i].clone()).collect()))
        .collect();
    Ok(ScriptValue::new_list(rows))
}

/// Sorts values that may fail to compare; the first comparison error wins.
fn sort_values(values: &mut [(ScriptValue, ScriptValue)]) -> Result<(), ErrorType> {
    let mut error = None;
    values.sort_by(|(a, _), (b, _)| match compare(a, b) {
        Ok(ordering) => ordering,
        Err(e) => {
            error.get_or_insert(e);
            Ordering::Equal
        }
    });
    match error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// `sorted(iterable[, key[, reverse]])`.
fn core_sorted(
    ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("sorted", &args, 1, 3)?;
    let key = arg(&args, 1);
    let reverse = matches!(args.get(2), Some(ScriptValue::Boolean(true)));
    let mut keyed = Vec::new();
    for item in to_iterable_items(&args[0])? {
        let sort_key = match &key {
            ScriptValue::Null => item.clone(),
            f => call_value(f, vec![item.clone()], ctx)?,
        };
        keyed.push((sort_key, item));
    }
    ctx.check_interrupt()?;
    sort_values(&mut keyed)?;
    let mut sorted: Vec<ScriptValue> = keyed.into_iter().map(|(_, item)| item).collect();
    if reverse {
        sorted.reverse();
    }
    Ok(ScriptValue::new_list(sorted))
}

fn core_type(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("type", &args, 1, 1)?;
    Ok(ScriptValue::string(get_type(&args[0])))
}

