use std::cell::RefCell;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::parser::ast::FunctionData;
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::test_and_comparison::is_equal;
use crate::runner::ds::operations::type_conversion::get_type;
use crate::runner::ds::scope::ScopeId;
use crate::runner::plugin::types::EvalContext;

/// Containers nested deeper than this cannot cross the sandbox boundary.
pub const MAX_VALUE_DEPTH: usize = 512;

/// Most nodes one conversion or rendering visits. Shared lists and maps make
/// the expanded size of a value independent of the memory it occupies.
pub const MAX_VALUE_NODES: usize = 1 << 20;

/// Conversions poll for cancellation once per this many nodes.
const NODES_PER_INTERRUPT_CHECK: usize = 4096;

pub type ListRef = Rc<RefCell<Vec<ScriptValue>>>;
pub type MapRef = Rc<RefCell<IndexMap<String, ScriptValue>>>;

/// A value inside a running script. Lists and maps are shared by reference.
#[derive(Clone)]
pub enum ScriptValue {
    Null,
    Boolean(bool),
    Number(NumberType),
    String(String),
    List(ListRef),
    Map(MapRef),
    Function(Rc<FunctionObject>),
    /// A helper from the allow-list, referenced by name.
    BuiltIn(String),
}

/// A script function together with the scope it closes over.
pub struct FunctionObject {
    pub data: Rc<FunctionData>,
    pub env: ScopeId,
}

impl FunctionObject {
    pub fn name(&self) -> &str {
        self.data.name.as_deref().unwrap_or("<anonymous>")
    }
}

impl ScriptValue {
    pub fn string(s: impl Into<String>) -> Self {
        ScriptValue::String(s.into())
    }

    pub fn integer(i: i64) -> Self {
        ScriptValue::Number(NumberType::Integer(i))
    }

    pub fn float(f: f64) -> Self {
        ScriptValue::Number(NumberType::Float(f))
    }

    pub fn new_list(items: Vec<ScriptValue>) -> Self {
        ScriptValue::List(Rc::new(RefCell::new(items)))
    }

    pub fn new_map(entries: IndexMap<String, ScriptValue>) -> Self {
        ScriptValue::Map(Rc::new(RefCell::new(entries)))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, ScriptValue::Function(_) | ScriptValue::BuiltIn(_))
    }

    /// Builds a script value from plain data. Numbers that fit `i64` stay integers.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => ScriptValue::Null,
            Value::Bool(b) => ScriptValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ScriptValue::integer(i),
                None => ScriptValue::float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ScriptValue::String(s.clone()),
            Value::Array(items) => ScriptValue::new_list(items.iter().map(Self::from_json).collect()),
            Value::Object(o) => ScriptValue::new_map(
                o.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts to plain data. Functions and non-finite floats have no plain form.
    pub fn to_json(&self) -> Result<Value, ErrorType> {
        self.to_json_at_depth(&mut Walk::new(None), 0)
    }

    /// Like [`to_json`](Self::to_json), stopping with `Interrupted` once the
    /// invocation behind `ctx` is cancelled.
    pub fn to_json_in(&self, ctx: &EvalContext) -> Result<Value, ErrorType> {
        self.to_json_at_depth(&mut Walk::new(Some(ctx)), 0)
    }

    fn to_json_at_depth(&self, walk: &mut Walk<'_>, depth: usize) -> Result<Value, ErrorType> {
        walk.enter(depth)?;
        Ok(match self {
            ScriptValue::Null => Value::Null,
            ScriptValue::Boolean(b) => Value::Bool(*b),
            ScriptValue::Number(NumberType::Integer(i)) => Value::from(*i),
            ScriptValue::Number(NumberType::Float(f)) => match Number::from_f64(*f) {
                Some(n) => Value::Number(n),
                None => {
                    return Err(ErrorType::TypeError(format!(
                        "{} cannot be converted to plain data",
                        f
                    )))
                }
            },
            ScriptValue::String(s) => Value::String(s.clone()),
            ScriptValue::List(items) => {
                let items = items.borrow();
                let mut array = Vec::with_capacity(items.len());
                for item in items.iter() {
                    array.push(item.to_json_at_depth(walk, depth + 1)?);
                }
                Value::Array(array)
            }
            ScriptValue::Map(entries) => {
                let mut map = Map::new();
                for (k, v) in entries.borrow().iter() {
                    map.insert(k.clone(), v.to_json_at_depth(walk, depth + 1)?);
                }
                Value::Object(map)
            }
            ScriptValue::Function(_) | ScriptValue::BuiltIn(_) => {
                return Err(ErrorType::TypeError(
                    "a function cannot be converted to plain data".to_string(),
                ))
            }
        })
    }

    /// Text form used by `str()` and string formatting. Strings render bare.
    pub fn to_display_string(&self) -> String {
        match self {
            ScriptValue::String(s) => s.clone(),
            _ => self.to_string(),
        }
    }

    /// Renders at most `budget` nodes; anything past the budget or the depth
    /// limit shows as `...`.
    fn fmt_at_depth(&self, f: &mut Formatter<'_>, depth: usize, budget: &mut usize) -> fmt::Result {
        if depth > MAX_VALUE_DEPTH || *budget == 0 {
            return write!(f, "...");
        }
        *budget -= 1;
        match self {
            ScriptValue::Null => write!(f, "null"),
            ScriptValue::Boolean(b) => write!(f, "{}", b),
            ScriptValue::Number(n) => write!(f, "{}", n),
            ScriptValue::String(s) => write!(
                f,
                "{}",
                serde_json::to_string(s).map_err(|_| fmt::Error)?
            ),
            ScriptValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_at_depth(f, depth + 1, budget)?;
                }
                write!(f, "]")
            }
            ScriptValue::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", serde_json::to_string(k).map_err(|_| fmt::Error)?)?;
                    v.fmt_at_depth(f, depth + 1, budget)?;
                }
                write!(f, "}}")
            }
            ScriptValue::Function(func) => write!(f, "<function {}>", func.name()),
            ScriptValue::BuiltIn(name) => write!(f, "<built-in function {}>", name),
        }
    }
}

impl Display for ScriptValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut budget = MAX_VALUE_NODES;
        self.fmt_at_depth(f, 0, &mut budget)
    }
}

/// Node accounting for one conversion.
struct Walk<'a> {
    visited: usize,
    ctx: Option<&'a EvalContext>,
}

impl<'a> Walk<'a> {
    fn new(ctx: Option<&'a EvalContext>) -> Self {
        Walk { visited: 0, ctx }
    }

    fn enter(&mut self, depth: usize) -> Result<(), ErrorType> {
        if depth > MAX_VALUE_DEPTH {
            return Err(ErrorType::RangeError(
                "value is nested too deeply to convert".to_string(),
            ));
        }
        self.visited += 1;
        if self.visited > MAX_VALUE_NODES {
            return Err(ErrorType::RangeError(
                "value is too large to convert".to_string(),
            ));
        }
        if self.visited % NODES_PER_INTERRUPT_CHECK == 0 {
            if let Some(ctx) = self.ctx {
                ctx.check_interrupt()?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ScriptValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptValue::{}({})", get_type(self), self)
    }
}

impl PartialEq for ScriptValue {
    fn eq(&self, other: &Self) -> bool {
        is_equal(self, other)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum NumberType {
    Integer(i64),
    Float(f64),
}

impl NumberType {
    pub fn as_f64(&self) -> f64 {
        match self {
            NumberType::Integer(i) => *i as f64,
            NumberType::Float(f) => *f,
        }
    }
}

impl PartialEq for NumberType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NumberType::Integer(a), NumberType::Integer(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl Display for NumberType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NumberType::Integer(i) => write!(f, "{}", i),
            // Whole floats keep a trailing ".0" so they read differently from integers.
            NumberType::Float(nf) if nf.is_finite() && nf.fract() == 0.0 && nf.abs() < 1e16 => {
                write!(f, "{:.1}", nf)
            }
            NumberType::Float(nf) => write!(f, "{}", nf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::api::CancelToken;
    use crate::runner::plugin::config::DEFAULT_MAX_CALL_DEPTH;
    use crate::runner::plugin::registry::BuiltInRegistry;

    fn doubled(times: usize) -> ScriptValue {
        let mut value = ScriptValue::new_list(vec![ScriptValue::integer(1)]);
        for _ in 0..times {
            value = ScriptValue::new_list(vec![value.clone(), value]);
        }
        value
    }

    #[test]
    fn test_shared_structure_converts_when_small() {
        let json = doubled(3).to_json().unwrap();
        assert_eq!(json[1][0][1], serde_json::json!([1]));
        assert_eq!(doubled(1).to_string(), "[[1], [1]]");
    }

    #[test]
    fn test_oversized_conversion_fails() {
        match doubled(24).to_json() {
            Err(ErrorType::RangeError(message)) => assert_eq!(message, "value is too large to convert"),
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_oversized_display_is_truncated() {
        let text = doubled(24).to_string();
        assert!(text.ends_with(", ...]"), "unexpected tail {:?}", &text[text.len() - 20..]);
        assert!(text.len() < 8 * MAX_VALUE_NODES);
    }

    #[test]
    fn test_cancelled_conversion_is_interrupted() {
        let token = CancelToken::new();
        let ctx = EvalContext::new(BuiltInRegistry::shared_core(), token.clone(), DEFAULT_MAX_CALL_DEPTH);
        let value = ScriptValue::new_list((0..10_000).map(ScriptValue::integer).collect());
        assert!(value.to_json_in(&ctx).is_ok());
        token.cancel();
        assert!(matches!(value.to_json_in(&ctx), Err(ErrorType::Interrupted)));
    }

    #[test]
    fn test_deep_nesting_fails() {
        let mut value = ScriptValue::Null;
        for _ in 0..=MAX_VALUE_DEPTH + 1 {
            value = ScriptValue::new_list(vec![value]);
        }
        assert!(matches!(value.to_json(), Err(ErrorType::RangeError(_))));
    }
}
