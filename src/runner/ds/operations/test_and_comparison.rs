use std::cmp::Ordering;
use std::collections::HashSet;
use std::rc::Rc;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::type_conversion::{get_type, to_property_key};
use crate::runner::ds::value::{ScriptValue, MAX_VALUE_DEPTH};

/// Pairs of shared containers already under comparison. A pair met again
/// compares as equal, so values that share nodes are walked once per pair.
type SeenPairs = HashSet<(usize, usize)>;

fn pair_key<T>(x: &Rc<T>, y: &Rc<T>) -> (usize, usize) {
    (Rc::as_ptr(x) as usize, Rc::as_ptr(y) as usize)
}

/// Structural equality. Integers and floats compare by numeric value.
pub fn is_equal(a: &ScriptValue, b: &ScriptValue) -> bool {
    is_equal_at_depth(a, b, 0, &mut SeenPairs::new())
}

fn is_equal_at_depth(a: &ScriptValue, b: &ScriptValue, depth: usize, seen: &mut SeenPairs) -> bool {
    if depth > MAX_VALUE_DEPTH {
        return false;
    }
    match (a, b) {
        (ScriptValue::Null, ScriptValue::Null) => true,
        (ScriptValue::Boolean(x), ScriptValue::Boolean(y)) => x == y,
        (ScriptValue::Number(x), ScriptValue::Number(y)) => x == y,
        (ScriptValue::String(x), ScriptValue::String(y)) => x == y,
        (ScriptValue::List(x), ScriptValue::List(y)) => {
            if Rc::ptr_eq(x, y) || !seen.insert(pair_key(x, y)) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y.iter())
                    .all(|(p, q)| is_equal_at_depth(p, q, depth + 1, seen))
        }
        (ScriptValue::Map(x), ScriptValue::Map(y)) => {
            if Rc::ptr_eq(x, y) || !seen.insert(pair_key(x, y)) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len()
                && x.iter().all(|(k, v)| match y.get(k) {
                    Some(w) => is_equal_at_depth(v, w, depth + 1, seen),
                    None => false,
                })
        }
        (ScriptValue::Function(x), ScriptValue::Function(y)) => Rc::ptr_eq(x, y),
        (ScriptValue::BuiltIn(x), ScriptValue::BuiltIn(y)) => x == y,
        _ => false,
    }
}

/// Ordering for `<`, `>`, `sorted`, `min` and `max`.
pub fn compare(a: &ScriptValue, b: &ScriptValue) -> Result<Ordering, ErrorType> {
    compare_at_depth(a, b, 0, &mut SeenPairs::new())
}

fn compare_at_depth(
    a: &ScriptValue,
    b: &ScriptValue,
    depth: usize,
    seen: &mut SeenPairs,
) -> Result<Ordering, ErrorType> {
    if depth > MAX_VALUE_DEPTH {
        return Err(ErrorType::RangeError(
            "values are nested too deeply to compare".to_string(),
        ));
    }
    match (a, b) {
        (ScriptValue::Number(x), ScriptValue::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .ok_or_else(|| ErrorType::TypeError("NaN cannot be ordered".to_string())),
        (ScriptValue::String(x), ScriptValue::String(y)) => Ok(x.cmp(y)),
        (ScriptValue::Boolean(x), ScriptValue::Boolean(y)) => Ok(x.cmp(y)),
        (ScriptValue::List(x), ScriptValue::List(y)) => {
            if Rc::ptr_eq(x, y) || !seen.insert(pair_key(x, y)) {
                return Ok(Ordering::Equal);
            }
            let (x, y) = (x.borrow(), y.borrow());
            for (p, q) in x.iter().zip(y.iter()) {
                match compare_at_depth(p, q, depth + 1, seen)? {
                    Ordering::Equal => continue,
                    other => return Ok(other),
                }
            }
            Ok(x.len().cmp(&y.len()))
        }
        _ => Err(ErrorType::TypeError(format!(
            "'<' not supported between '{}' and '{}'",
            get_type(a),
            get_type(b)
        ))),
    }
}

/// The `in` operator: substring, list membership or map key.
pub fn contains(container: &ScriptValue, item: &ScriptValue) -> Result<bool, ErrorType> {
    match container {
        ScriptValue::String(s) => match item {
            ScriptValue::String(needle) => Ok(s.contains(needle.as_str())),
            _ => Err(ErrorType::TypeError(format!(
                "'in <str>' requires a string as left operand, not '{}'",
                get_type(item)
            ))),
        },
        ScriptValue::List(items) => Ok(items.borrow().iter().any(|v| is_equal(v, item))),
        ScriptValue::Map(entries) => Ok(entries.borrow().contains_key(&to_property_key(item)?)),
        _ => Err(ErrorType::TypeError(format!(
            "argument of type '{}' is not a container",
            get_type(container)
        ))),
    }
}
