use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::type_conversion::get_type;
use crate::runner::ds::value::{NumberType, ScriptValue};

/// Longest string or list a repetition may produce.
const MAX_REPEAT_LEN: usize = 1 << 24;

fn unsupported(op: &str, a: &ScriptValue, b: &ScriptValue) -> ErrorType {
    ErrorType::TypeError(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op,
        get_type(a),
        get_type(b)
    ))
}

fn overflow() -> ErrorType {
    ErrorType::RangeError("integer overflow".to_string())
}

fn numbers(a: &ScriptValue, b: &ScriptValue) -> Option<(NumberType, NumberType)> {
    match (a, b) {
        (ScriptValue::Number(x), ScriptValue::Number(y)) => Some((*x, *y)),
        _ => None,
    }
}

pub fn add(a: &ScriptValue, b: &ScriptValue) -> Result<ScriptValue, ErrorType> {
    if let Some(pair) = numbers(a, b) {
        return Ok(ScriptValue::Number(match pair {
            (NumberType::Integer(x), NumberType::Integer(y)) => {
                NumberType::Integer(x.checked_add(y).ok_or_else(overflow)?)
            }
            (x, y) => NumberType::Float(x.as_f64() + y.as_f64()),
        }));
    }
    match (a, b) {
        (ScriptValue::String(x), ScriptValue::String(y)) => {
            let mut s = String::with_capacity(x.len() + y.len());
            s.push_str(x);
            s.push_str(y);
            Ok(ScriptValue::String(s))
        }
        (ScriptValue::List(x), ScriptValue::List(y)) => {
            let mut items = x.borrow().clone();
            items.extend(y.borrow().iter().cloned());
            Ok(ScriptValue::new_list(items))
        }
        _ => Err(unsupported("+", a, b)),
    }
}

pub fn subtract(a: &ScriptValue, b: &ScriptValue) -> Result<ScriptValue, ErrorType> {
    match numbers(a, b) {
        Some((NumberType::Integer(x), NumberType::Integer(y))) => {
            Ok(ScriptValue::integer(x.checked_sub(y).ok_or_else(overflow)?))
        }
        Some((x, y)) => Ok(ScriptValue::float(x.as_f64() - y.as_f64())),
        None => Err(unsupported("-", a, b)),
    }
}

pub fn multiply(a: &ScriptValue, b: &ScriptValue) -> Result<ScriptValue, ErrorType> {
    match numbers(a, b) {
        Some((NumberType::Integer(x), NumberType::Integer(y))) => {
            return Ok(ScriptValue::integer(x.checked_mul(y).ok_or_else(overflow)?))
        }
        Some((x, y)) => return Ok(ScriptValue::float(x.as_f64() * y.as_f64())),
        None => {}
    }
    match (a, b) {
        (ScriptValue::String(s), ScriptValue::Number(NumberType::Integer(n)))
        | (ScriptValue::Number(NumberType::Integer(n)), ScriptValue::String(s)) => {
            if s.is_empty() || *n <= 0 {
                return Ok(ScriptValue::string(""));
            }
            let count = repeat_count(*n, s.len())?;
            Ok(ScriptValue::String(s.repeat(count)))
        }
        (ScriptValue::List(items), ScriptValue::Number(NumberType::Integer(n)))
        | (ScriptValue::Number(NumberType::Integer(n)), ScriptValue::List(items)) => {
            let items = items.borrow();
            if items.is_empty() || *n <= 0 {
                return Ok(ScriptValue::new_list(vec![]));
            }
            let count = repeat_count(*n, items.len())?;
            let mut repeated = Vec::with_capacity(items.len() * count);
            for _ in 0..count {
                repeated.extend(items.iter().cloned());
            }
            Ok(ScriptValue::new_list(repeated))
        }
        _ => Err(unsupported("*", a, b)),
    }
}

fn repeat_count(n: i64, unit: usize) -> Result<usize, ErrorType> {
    let count = n.max(0) as usize;
    match unit.checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(count),
        _ => Err(ErrorType::RangeError("repetition result is too large".to_string())),
    }
}

/// Division. Integer operands that divide exactly stay integers.
pub fn divide(a: &ScriptValue, b: &ScriptValue) -> Result<ScriptValue, ErrorType> {
    let (x, y) = numbers(a, b).ok_or_else(|| unsupported("/", a, b))?;
    if y.as_f64() == 0.0 {
        return Err(ErrorType::RangeError("division by zero".to_string()));
    }
    match (x, y) {
        (NumberType::Integer(x), NumberType::Integer(y)) if x.checked_rem(y) == Some(0) => {
            Ok(ScriptValue::integer(x.checked_div(y).ok_or_else(overflow)?))
        }
        (x, y) => Ok(ScriptValue::float(x.as_f64() / y.as_f64())),
    }
}

/// Remainder with the sign of the divisor.
pub fn remainder(a: &ScriptValue, b: &ScriptValue) -> Result<ScriptValue, ErrorType> {
    let (x, y) = numbers(a, b).ok_or_else(|| unsupported("%", a, b))?;
    if y.as_f64() == 0.0 {
        return Err(ErrorType::RangeError("modulo by zero".to_string()));
    }
    match (x, y) {
        (NumberType::Integer(x), NumberType::Integer(y)) => {
            let r = x.checked_rem(y).ok_or_else(overflow)?;
            Ok(ScriptValue::integer(if r != 0 && (r < 0) != (y < 0) { r + y } else { r }))
        }
        (x, y) => {
            let (x, y) = (x.as_f64(), y.as_f64());
            let r = x % y;
            Ok(ScriptValue::float(if r != 0.0 && (r < 0.0) != (y < 0.0) { r + y } else { r }))
        }
    }
}

pub fn power(a: &ScriptValue, b: &ScriptValue) -> Result<ScriptValue, ErrorType> {
    match numbers(a, b) {
        Some((NumberType::Integer(x), NumberType::Integer(y))) if y >= 0 => {
            let exp = u32::try_from(y).map_err(|_| overflow())?;
            Ok(ScriptValue::integer(x.checked_pow(exp).ok_or_else(overflow)?))
        }
        Some((x, y)) => Ok(ScriptValue::float(x.as_f64().powf(y.as_f64()))),
        None => Err(unsupported("**", a, b)),
    }
}

pub fn negate(a: &ScriptValue) -> Result<ScriptValue, ErrorType> {
    match a {
        ScriptValue::Number(NumberType::Integer(i)) => {
            Ok(ScriptValue::integer(i.checked_neg().ok_or_else(overflow)?))
        }
        ScriptValue::Number(NumberType::Float(f)) => Ok(ScriptValue::float(-f)),
        _ => Err(ErrorType::TypeError(format!(
            "bad operand type for unary -: '{}'",
            get_type(a)
        ))),
    }
}
