//! String helpers.
//!
//! `chr` and `ord` are global helpers; the rest are methods of the `String`
//! object, called as `"text".method(...)`.

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::type_conversion::{get_type, to_integer, to_iterable_items, to_str};
use crate::runner::ds::value::ScriptValue;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{arg, expect_args, BuiltInObject, EvalContext};

/// Register the String methods and the character helpers.
pub fn register(registry: &mut BuiltInRegistry) {
    registry.register_function("chr", string_chr);
    registry.register_function("ord", string_ord);

    let string = BuiltInObject::new("String")
        .add_method("upper", string_upper)
        .add_method("lower", string_lower)
        .add_method("strip", string_strip)
        .add_method("split", string_split)
        .add_method("join", string_join)
        .add_method("replace", string_replace)
        .add_method("startsWith", string_starts_with)
        .add_method("endsWith", string_ends_with)
        .add_method("includes", string_includes)
        .add_method("indexOf", string_index_of)
        .add_method("format", string_format);

    registry.register_object(string);
}

fn receiver(this: &ScriptValue) -> Result<&str, ErrorType> {
    to_str(this)
}

fn string_chr(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("chr", &args, 1, 1)?;
    let code = to_integer(&args[0])?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(|c| ScriptValue::String(c.to_string()))
        .ok_or_else(|| ErrorType::RangeError(format!("chr() arg not in range: {}", code)))
}

fn string_ord(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("ord", &args, 1, 1)?;
    let s = to_str(&args[0])?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(ScriptValue::integer(c as i64)),
        _ => Err(ErrorType::TypeError(format!(
            "ord() expected a character, but string of length {} found",
            s.chars().count()
        ))),
    }
}

fn string_upper(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    _args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    Ok(ScriptValue::String(receiver(&this)?.to_uppercase()))
}

fn string_lower(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    _args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    Ok(ScriptValue::String(receiver(&this)?.to_lowercase()))
}

fn string_strip(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    _args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    Ok(ScriptValue::string(receiver(&this)?.trim()))
}

/// Without a separator, splits on runs of whitespace.
fn string_split(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("split", &args, 0, 1)?;
    let s = receiver(&this)?;
    let parts: Vec<ScriptValue> = match arg(&args, 0) {
        ScriptValue::Null => s.split_whitespace().map(ScriptValue::string).collect(),
        sep => {
            let sep = to_str(&sep)?;
            if sep.is_empty() {
                return Err(ErrorType::RangeError("empty separator".to_string()));
            }
            s.split(sep).map(ScriptValue::string).collect()
        }
    };
    Ok(ScriptValue::new_list(parts))
}

/// `", ".join(items)`: the receiver separates string items.
fn string_join(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("join", &args, 1, 1)?;
    let sep = receiver(&this)?;
    let mut parts = Vec::new();
    for item in to_iterable_items(&args[0])? {
        match item {
            ScriptValue::String(s) => parts.push(s),
            other => {
                return Err(ErrorType::TypeError(format!(
                    "join() expected str items, found '{}'",
                    get_type(&other)
                )))
            }
        }
    }
    Ok(ScriptValue::String(parts.join(sep)))
}

fn string_replace(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("replace", &args, 2, 2)?;
    let s = receiver(&this)?;
    Ok(ScriptValue::String(s.replace(to_str(&args[0])?, to_str(&args[1])?)))
}

fn string_starts_with(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("startsWith", &args, 1, 1)?;
    Ok(ScriptValue::Boolean(receiver(&this)?.starts_with(to_str(&args[0])?)))
}

fn string_ends_with(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("endsWith", &args, 1, 1)?;
    Ok(ScriptValue::Boolean(receiver(&this)?.ends_with(to_str(&args[0])?)))
}

fn string_includes(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("includes", &args, 1, 1)?;
    Ok(ScriptValue::Boolean(receiver(&this)?.contains(to_str(&args[0])?)))
}

/// Character index of the first match, or -1.
fn string_index_of(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("indexOf", &args, 1, 1)?;
    let s = receiver(&this)?;
    let index = match s.find(to_str(&args[0])?) {
        Some(byte_index) => s[..byte_index].chars().count() as i64,
        None => -1,
    };
    Ok(ScriptValue::integer(index))
}

/// Replacement fields are `{}` (next argument) or `{N}` (argument N);
/// `{{` and `}}` are literal braces.
fn string_format(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    let template = receiver(&this)?;
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_auto = 0;
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => field.push(c),
                        None => {
                            return Err(ErrorType::RangeError(
                                "single '{' encountered in format string".to_string(),
                            ))
                        }
                    }
                }
                let index = if field.is_empty() {
                    next_auto += 1;
                    next_auto - 1
                } else {
                    field.trim().parse::<usize>().map_err(|_| {
                        ErrorType::KeyError(format!("'{}'", field))
                    })?
                };
                match args.get(index) {
                    Some(value) => out.push_str(&value.to_display_string()),
                    None => {
                        return Err(ErrorType::RangeError(format!(
                            "replacement index {} out of range for positional args",
                            index
                        )))
                    }
                }
            }
            '}' => {
                return Err(ErrorType::RangeError(
                    "single '}' encountered in format string".to_string(),
                ))
            }
            c => out.push(c),
        }
    }
    Ok(ScriptValue::String(out))
}
