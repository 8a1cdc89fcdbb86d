//! Registry of the helpers a script may call.

use std::collections::HashMap;
use std::sync::Arc;

use super::types::{BuiltInFn, BuiltInObject, EvalContext, NativeFn};
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::ScriptValue;
use crate::runner::std_lib::register_core_builtins;

lazy_static! {
    static ref CORE_REGISTRY: Arc<BuiltInRegistry> = Arc::new(BuiltInRegistry::with_core());
}

/// The allow-list: global helper functions plus per-type methods.
/// Nothing outside this registry is reachable by name from a script.
pub struct BuiltInRegistry {
    /// Method tables keyed by type object name.
    objects: HashMap<String, BuiltInObject>,

    /// Global helpers such as `s2j` and `len`.
    functions: HashMap<String, BuiltInFn>,
}

impl BuiltInRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        BuiltInRegistry {
            objects: HashMap::new(),
            functions: HashMap::new(),
        }
    }

    /// Create a registry with the standard helpers.
    pub fn with_core() -> Self {
        let mut registry = Self::new();
        register_core_builtins(&mut registry);
        registry
    }

    /// The process-wide core registry.
    pub fn shared_core() -> Arc<BuiltInRegistry> {
        Arc::clone(&CORE_REGISTRY)
    }

    pub fn register_object(&mut self, obj: BuiltInObject) {
        self.objects.insert(obj.name.clone(), obj);
    }

    /// Add (or replace) a method on a type object, creating the object if needed.
    pub fn register_method(&mut self, object: &str, method: impl Into<String>, func: BuiltInFn) {
        self.objects
            .entry(object.to_string())
            .or_insert_with(|| BuiltInObject::new(object))
            .methods
            .insert(method.into(), func);
    }

    pub fn get_method(&self, object: &str, method: &str) -> Option<&BuiltInFn> {
        self.objects
            .get(object)
            .and_then(|obj| obj.methods.get(method))
    }

    pub fn has_method(&self, object: &str, method: &str) -> bool {
        self.get_method(object, method).is_some()
    }

    pub fn register_function(&mut self, name: impl Into<String>, func: NativeFn) {
        self.functions.insert(name.into(), BuiltInFn::Native(func));
    }

    /// Register a closure as a global helper.
    pub fn register_plugin_function<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&mut EvalContext, ScriptValue, Vec<ScriptValue>) -> Result<ScriptValue, ErrorType>
            + Send
            + Sync
            + 'static,
    {
        self.functions
            .insert(name.into(), BuiltInFn::Plugin(Box::new(func)));
    }

    pub fn get_function(&self, name: &str) -> Option<&BuiltInFn> {
        self.functions.get(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

impl Default for BuiltInRegistry {
    fn default() -> Self {
        Self::with_core()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_registry_has_contract_helpers() {
        let registry = BuiltInRegistry::with_core();
        assert!(registry.has_function("s2j"));
        assert!(registry.has_function("j2s"));
        assert!(!registry.has_function("open"));
        assert!(registry.has_method("String", "format"));
        assert!(registry.has_method("Array", "map"));
        assert!(registry.has_method("Object", "keys"));
    }

    #[test]
    fn test_plugin_function_is_callable() {
        let mut registry = BuiltInRegistry::new();
        registry.register_plugin_function("answer", |_ctx, _this, _args| Ok(ScriptValue::integer(42)));
        let mut ctx = EvalContext::default();
        let result = registry
            .get_function("answer")
            .unwrap()
            .call(&mut ctx, ScriptValue::Null, vec![])
            .unwrap();
        assert_eq!(result, ScriptValue::integer(42));
    }

    #[test]
    fn test_registered_method_joins_type_table() {
        fn shout(
            _ctx: &mut EvalContext,
            this: ScriptValue,
            _args: Vec<ScriptValue>,
        ) -> Result<ScriptValue, ErrorType> {
            Ok(ScriptValue::string(format!("{}!", this.to_display_string())))
        }

        let mut registry = BuiltInRegistry::with_core();
        registry.register_method("String", "shout", BuiltInFn::Native(shout));
        assert!(registry.has_method("String", "shout"));
        assert!(registry.has_method("String", "upper"));
        let mut ctx = EvalContext::default();
        let result = registry
            .get_method("String", "shout")
            .unwrap()
            .call(&mut ctx, ScriptValue::string("hey"), vec![])
            .unwrap();
        assert_eq!(result, ScriptValue::string("hey!"));
    }
}
