use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::{NumberType, ScriptValue};

pub const TYPE_STR_NULL: &str = "null";
pub const TYPE_STR_BOOLEAN: &str = "bool";
pub const TYPE_STR_INTEGER: &str = "int";
pub const TYPE_STR_FLOAT: &str = "float";
pub const TYPE_STR_STRING: &str = "str";
pub const TYPE_STR_LIST: &str = "list";
pub const TYPE_STR_MAP: &str = "map";
pub const TYPE_STR_FUNCTION: &str = "function";

pub fn get_type(a: &ScriptValue) -> &'static str {
    match a {
        ScriptValue::Null => TYPE_STR_NULL,
        ScriptValue::Boolean(_) => TYPE_STR_BOOLEAN,
        ScriptValue::Number(NumberType::Integer(_)) => TYPE_STR_INTEGER,
        ScriptValue::Number(NumberType::Float(_)) => TYPE_STR_FLOAT,
        ScriptValue::String(_) => TYPE_STR_STRING,
        ScriptValue::List(_) => TYPE_STR_LIST,
        ScriptValue::Map(_) => TYPE_STR_MAP,
        ScriptValue::Function(_) | ScriptValue::BuiltIn(_) => TYPE_STR_FUNCTION,
    }
}

/// Registry object whose methods apply to values of this type.
pub fn get_builtin_object_name(a: &ScriptValue) -> Option<&'static str> {
    match a {
        ScriptValue::String(_) => Some("String"),
        ScriptValue::List(_) => Some("Array"),
        ScriptValue::Map(_) => Some("Object"),
        _ => None,
    }
}

pub fn to_boolean(a: &ScriptValue) -> bool {
    match a {
        ScriptValue::Null => false,
        ScriptValue::Boolean(b) => *b,
        ScriptValue::Number(NumberType::Integer(i)) => *i != 0,
        ScriptValue::Number(NumberType::Float(f)) => *f != 0.0 && !f.is_nan(),
        ScriptValue::String(s) => !s.is_empty(),
        ScriptValue::List(items) => !items.borrow().is_empty(),
        ScriptValue::Map(entries) => !entries.borrow().is_empty(),
        ScriptValue::Function(_) | ScriptValue::BuiltIn(_) => true,
    }
}

pub fn to_number(a: &ScriptValue) -> Result<NumberType, ErrorType> {
    match a {
        ScriptValue::Number(n) => Ok(*n),
        ScriptValue::Boolean(b) => Ok(NumberType::Integer(*b as i64)),
        _ => Err(ErrorType::TypeError(format!(
            "expected a number, got '{}'",
            get_type(a)
        ))),
    }
}

pub fn to_integer(a: &ScriptValue) -> Result<i64, ErrorType> {
    match to_number(a)? {
        NumberType::Integer(i) => Ok(i),
        NumberType::Float(f) => Err(ErrorType::TypeError(format!(
            "expected an integer, got {}",
            NumberType::Float(f)
        ))),
    }
}

pub fn to_str(a: &ScriptValue) -> Result<&str, ErrorType> {
    match a {
        ScriptValue::String(s) => Ok(s),
        _ => Err(ErrorType::TypeError(format!(
            "expected a string, got '{}'",
            get_type(a)
        ))),
    }
}

/// Map key for a value used in a computed key, comprehension or index.
pub fn to_property_key(a: &ScriptValue) -> Result<String, ErrorType> {
    match a {
        ScriptValue::String(s) => Ok(s.clone()),
        ScriptValue::Null | ScriptValue::Boolean(_) | ScriptValue::Number(_) => Ok(a.to_string()),
        _ => Err(ErrorType::TypeError(format!(
            "unhashable type: '{}'",
            get_type(a)
        ))),
    }
}

/// Snapshot of the items a `for ... of` loop visits: list elements, string
/// characters or map keys.
pub fn to_iterable_items(a: &ScriptValue) -> Result<Vec<ScriptValue>, ErrorType> {
    match a {
        ScriptValue::List(items) => Ok(items.borrow().clone()),
        ScriptValue::String(s) => Ok(s.chars().map(|c| ScriptValue::String(c.to_string())).collect()),
        ScriptValue::Map(entries) => Ok(entries
            .borrow()
            .keys()
            .map(|k| ScriptValue::String(k.clone()))
            .collect()),
        _ => Err(ErrorType::TypeError(format!(
            "'{}' object is not iterable",
            get_type(a)
        ))),
    }
}

/// Resolves a possibly negative index against a length.
pub fn to_index(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 { len as i64 + index } else { index };
    if resolved >= 0 && (resolved as usize) < len {
        Some(resolved as usize)
    } else {
        None
    }
}
