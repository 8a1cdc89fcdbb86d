//! Numeric helpers: `abs`, `min`, `max`, `sum` and `round`.

use std::cmp::Ordering;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::arithmetic::{add, negate};
use crate::runner::ds::operations::test_and_comparison::compare;
use crate::runner::ds::operations::type_conversion::{to_integer, to_iterable_items, to_number};
use crate::runner::ds::value::{NumberType, ScriptValue};
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{expect_args, EvalContext};

pub fn register(registry: &mut BuiltInRegistry) {
    registry.register_function("abs", math_abs);
    registry.register_function("min", math_min);
    registry.register_function("max", math_max);
    registry.register_function("sum", math_sum);
    registry.register_function("round", math_round);
}

fn math_abs(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("abs", &args, 1, 1)?;
    match to_number(&args[0])? {
        NumberType::Integer(i) if i < 0 => negate(&ScriptValue::integer(i)),
        NumberType::Integer(i) => Ok(ScriptValue::integer(i)),
        NumberType::Float(f) => Ok(ScriptValue::float(f.abs())),
    }
}

/// Either a single iterable argument or the arguments themselves.
fn candidates(name: &str, args: Vec<ScriptValue>) -> Result<Vec<ScriptValue>, ErrorType> {
    let values = if args.len() == 1 {
        to_iterable_items(&args[0])?
    } else {
        args
    };
    if values.is_empty() {
        return Err(ErrorType::RangeError(format!(
            "{}() arg is an empty sequence",
            name
        )));
    }
    Ok(values)
}

/// First value whose ordering against the current pick is `wanted`.
fn pick(name: &str, args: Vec<ScriptValue>, wanted: Ordering) -> Result<ScriptValue, ErrorType> {
    let mut values = candidates(name, args)?.into_iter();
    let mut best = match values.next() {
        Some(first) => first,
        None => return Err(ErrorType::RangeError(format!("{}() arg is an empty sequence", name))),
    };
    for value in values {
        if compare(&value, &best)? == wanted {
            best = value;
        }
    }
    Ok(best)
}

fn math_min(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    pick("min", args, Ordering::Less)
}

fn math_max(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    pick("max", args, Ordering::Greater)
}

/// `sum(iterable[, start])`.
fn math_sum(
    ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("sum", &args, 1, 2)?;
    let mut total = args.get(1).cloned().unwrap_or(ScriptValue::integer(0));
    for (i, item) in to_iterable_items(&args[0])?.iter().enumerate() {
        if i % 4096 == 0 {
            ctx.check_interrupt()?;
        }
        total = add(&total, &ScriptValue::Number(to_number(item)?))?;
    }
    Ok(total)
}

/// `round(x)` gives an integer, `round(x, n)` a float with `n` decimals.
fn math_round(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("round", &args, 1, 2)?;
    let number = to_number(&args[0])?;
    match args.get(1) {
        None => match number {
            NumberType::Integer(i) => Ok(ScriptValue::integer(i)),
            NumberType::Float(f) => {
                let rounded = f.round();
                if rounded.is_finite() && rounded.abs() < 9.2e18 {
                    Ok(ScriptValue::integer(rounded as i64))
                } else {
                    Err(ErrorType::RangeError(format!("cannot round {}", f)))
                }
            }
        },
        Some(digits) => {
            let digits = to_integer(digits)?.clamp(-308, 308) as i32;
            let scale = 10f64.powi(digits);
            Ok(ScriptValue::float((number.as_f64() * scale).round() / scale))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: crate::runner::plugin::types::NativeFn, args: Vec<ScriptValue>) -> Result<ScriptValue, ErrorType> {
        let mut ctx = EvalContext::default();
        f(&mut ctx, ScriptValue::Null, args)
    }

    #[test]
    fn test_min_max_over_list_and_args() {
        let list = ScriptValue::new_list(vec![
            ScriptValue::integer(3),
            ScriptValue::integer(-2),
            ScriptValue::float(7.5),
        ]);
        assert_eq!(call(math_min, vec![list.clone()]).unwrap(), ScriptValue::integer(-2));
        assert_eq!(call(math_max, vec![list]).unwrap(), ScriptValue::float(7.5));
        assert_eq!(
            call(math_max, vec![ScriptValue::integer(1), ScriptValue::integer(9)]).unwrap(),
            ScriptValue::integer(9)
        );
    }

    #[test]
    fn test_min_of_empty_list_fails() {
        let result = call(math_min, vec![ScriptValue::new_list(vec![])]);
        assert!(matches!(result, Err(ErrorType::RangeError(_))));
    }

    #[test]
    fn test_sum_and_round() {
        let list = ScriptValue::new_list(vec![ScriptValue::integer(1), ScriptValue::float(2.5)]);
        assert_eq!(call(math_sum, vec![list]).unwrap(), ScriptValue::float(3.5));
        assert_eq!(call(math_round, vec![ScriptValue::float(2.6)]).unwrap(), ScriptValue::integer(3));
        assert_eq!(
            call(math_round, vec![ScriptValue::float(3.14159), ScriptValue::integer(2)]).unwrap(),
            ScriptValue::float(3.14)
        );
    }

    #[test]
    fn test_abs() {
        assert_eq!(call(math_abs, vec![ScriptValue::integer(-4)]).unwrap(), ScriptValue::integer(4));
        assert!(call(math_abs, vec![ScriptValue::integer(i64::MIN)]).is_err());
    }
}
