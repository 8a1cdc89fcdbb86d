//! Map methods, registered on the `Object` object.

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::type_conversion::{get_type, to_property_key};
use crate::runner::ds::value::{MapRef, ScriptValue};
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{arg, expect_args, BuiltInObject, EvalContext};

pub fn register(registry: &mut BuiltInRegistry) {
    let object = BuiltInObject::new("Object")
        .add_method("keys", object_keys)
        .add_method("values", object_values)
        .add_method("items", object_items)
        .add_method("get", object_get)
        .add_method("has", object_has);

    registry.register_object(object);
}

fn receiver(this: &ScriptValue) -> Result<MapRef, ErrorType> {
    match this {
        ScriptValue::Map(entries) => Ok(entries.clone()),
        other => Err(ErrorType::TypeError(format!(
            "expected a map, got '{}'",
            get_type(other)
        ))),
    }
}

fn object_keys(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    _args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    let entries = receiver(&this)?;
    let keys = entries.borrow().keys().map(ScriptValue::string).collect();
    Ok(ScriptValue::new_list(keys))
}

fn object_values(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    _args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    let entries = receiver(&this)?;
    let values = entries.borrow().values().cloned().collect();
    Ok(ScriptValue::new_list(values))
}

/// `[key, value]` pairs in insertion order.
fn object_items(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    _args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    let entries = receiver(&this)?;
    let items = entries
        .borrow()
        .iter()
        .map(|(k, v)| ScriptValue::new_list(vec![ScriptValue::string(k.as_str()), v.clone()]))
        .collect();
    Ok(ScriptValue::new_list(items))
}

/// `get(key[, default])` never raises for a missing key.
fn object_get(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("get", &args, 1, 2)?;
    let entries = receiver(&this)?;
    let key = to_property_key(&args[0])?;
    let value = entries.borrow().get(&key).cloned();
    Ok(value.unwrap_or_else(|| arg(&args, 1)))
}

fn object_has(
    _ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType> {
    expect_args("has", &args, 1, 1)?;
    let entries = receiver(&this)?;
    let key = to_property_key(&args[0])?;
    let found = entries.borrow().contains_key(&key);
    Ok(ScriptValue::Boolean(found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn sample() -> ScriptValue {
        let mut entries = IndexMap::new();
        entries.insert("b".to_string(), ScriptValue::integer(2));
        entries.insert("a".to_string(), ScriptValue::integer(1));
        ScriptValue::new_map(entries)
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let mut ctx = EvalContext::default();
        let keys = object_keys(&mut ctx, sample(), vec![]).unwrap();
        assert_eq!(keys.to_string(), r#"["b", "a"]"#);
    }

    #[test]
    fn test_items() {
        let mut ctx = EvalContext::default();
        let items = object_items(&mut ctx, sample(), vec![]).unwrap();
        assert_eq!(items.to_string(), r#"[["b", 2], ["a", 1]]"#);
    }

    #[test]
    fn test_get_with_default() {
        let mut ctx = EvalContext::default();
        let present = object_get(&mut ctx, sample(), vec![ScriptValue::string("a")]).unwrap();
        assert_eq!(present, ScriptValue::integer(1));
        let missing = object_get(
            &mut ctx,
            sample(),
            vec![ScriptValue::string("z"), ScriptValue::integer(0)],
        )
        .unwrap();
        assert_eq!(missing, ScriptValue::integer(0));
        let has = object_has(&mut ctx, sample(), vec![ScriptValue::string("z")]).unwrap();
        assert_eq!(has, ScriptValue::Boolean(false));
    }
}
