//! JSON helpers `s2j` and `j2s`.
//!
//! `j2s` writes `", "` between items and `": "` after keys, keeping map
//! insertion order.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};
use serde_json::Value;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::type_conversion::{to_integer, to_str};
use crate::runner::ds::value::ScriptValue;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{expect_args, EvalContext};

/// Largest indent `j2s` accepts.
const MAX_INDENT: i64 = 32;

pub fn register(registry: &mut BuiltInRegistry) {
    registry.register_function("s2j", json_s2j);
    registry.register_function("j2s", json_j2s);
}

/// Single-line output with a space after each separator.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn write_with<F: Formatter>(value: &Value, formatter: F) -> Result<String, ErrorType> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| ErrorType::TypeError(format!("j2s: {}", e)))?;
    String::from_utf8(buf).map_err(|e| ErrorType::TypeError(format!("j2s: {}", e)))
}

/// Serializes plain data to JSON text; `indent` switches to multi-line output.
pub fn to_json_text(value: &Value, indent: Option<usize>) -> Result<String, ErrorType> {
    match indent {
        None => write_with(value, SpacedFormatter),
        Some(width) => {
            let indent = " ".repeat(width);
            write_with(value, PrettyFormatter::with_indent(indent.as_bytes()))
        }
    }
}

/// `s2j(text)`: JSON text to a script value.
fn json_s2j(
    _ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("s2j", &args, 1, 1)?;
    let text = to_str(&args[0])?;
    let parsed: Value = serde_json::from_str(text)
        .map_err(|e| ErrorType::SyntaxError(format!("s2j: invalid JSON: {}", e)))?;
    Ok(ScriptValue::from_json(&parsed))
}

/// `j2s(value[, indent])`: a script value to JSON text.
fn json_j2s(
    ctx: &mut EvalContext,
    _this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("j2s", &args, 1, 2)?;
    let indent = match args.get(1) {
        None | Some(ScriptValue::Null) => None,
        Some(width) => Some(to_integer(width)?.clamp(0, MAX_INDENT) as usize),
    };
    let value = args[0].to_json_in(ctx)?;
    Ok(ScriptValue::String(to_json_text(&value, indent)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_spaced_separators() {
        let text = to_json_text(&json!({"a": [1, 2], "b": {"c": null}}), None).unwrap();
        assert_eq!(text, r#"{"a": [1, 2], "b": {"c": null}}"#);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let text = to_json_text(&json!({"z": 1, "a": 2}), None).unwrap();
        assert_eq!(text, r#"{"z": 1, "a": 2}"#);
    }

    #[test]
    fn test_indent() {
        let text = to_json_text(&json!({"a": [1]}), Some(2)).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1\n  ]\n}");
    }

    #[test]
    fn test_s2j_rejects_bad_json() {
        let mut ctx = EvalContext::default();
        let result = json_s2j(&mut ctx, ScriptValue::Null, vec![ScriptValue::string("[1,")]);
        assert!(matches!(result, Err(ErrorType::SyntaxError(_))));
    }

    #[test]
    fn test_j2s_rejects_functions() {
        let mut ctx = EvalContext::default();
        let result = json_j2s(
            &mut ctx,
            ScriptValue::Null,
            vec![ScriptValue::BuiltIn("len".to_string())],
        );
        assert!(matches!(result, Err(ErrorType::TypeError(_))));
    }
}
