//! Core types for the helper allow-list.

use std::collections::HashMap;
use std::sync::Arc;

use crate::runner::api::CancelToken;
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::scope::ScopeArena;
use crate::runner::ds::value::ScriptValue;
use crate::runner::plugin::config::DEFAULT_MAX_CALL_DEPTH;
use crate::runner::plugin::registry::BuiltInRegistry;

/// Execution context for one sandbox invocation.
/// Native helpers receive it so they can call back into script functions.
pub struct EvalContext {
    pub scopes: ScopeArena,
    registry: Arc<BuiltInRegistry>,
    cancel: CancelToken,
    call_depth: usize,
    max_call_depth: usize,
    /// Values yielded by the generator bodies currently running, innermost last.
    generators: Vec<Vec<ScriptValue>>,
}

impl EvalContext {
    pub fn new(registry: Arc<BuiltInRegistry>, cancel: CancelToken, max_call_depth: usize) -> Self {
        EvalContext {
            scopes: ScopeArena::new(),
            registry,
            cancel,
            call_depth: 0,
            max_call_depth,
            generators: Vec::new(),
        }
    }

    /// A shared handle to the registry, so a helper can be held while `self` is borrowed mutably.
    pub fn registry(&self) -> Arc<BuiltInRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn has_builtin_function(&self, name: &str) -> bool {
        self.registry.has_function(name)
    }

    /// Fails with `Interrupted` once the invocation has been cancelled.
    pub fn check_interrupt(&self) -> Result<(), ErrorType> {
        if self.cancel.is_cancelled() {
            Err(ErrorType::Interrupted)
        } else {
            Ok(())
        }
    }

    pub fn enter_call(&mut self) -> Result<(), ErrorType> {
        if self.call_depth >= self.max_call_depth {
            return Err(ErrorType::RangeError(
                "maximum recursion depth exceeded".to_string(),
            ));
        }
        self.call_depth += 1;
        Ok(())
    }

    pub fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    pub fn begin_generator(&mut self) {
        self.generators.push(Vec::new());
    }

    pub fn finish_generator(&mut self) -> Vec<ScriptValue> {
        self.generators.pop().unwrap_or_default()
    }

    pub fn yield_value(&mut self, value: ScriptValue) -> Result<(), ErrorType> {
        match self.generators.last_mut() {
            Some(values) => {
                values.push(value);
                Ok(())
            }
            None => Err(ErrorType::SyntaxError(
                "'yield' outside a function".to_string(),
            )),
        }
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        EvalContext::new(
            BuiltInRegistry::shared_core(),
            CancelToken::new(),
            DEFAULT_MAX_CALL_DEPTH,
        )
    }
}

/// Function signature for helpers.
/// Native helpers receive the evaluation context, the receiver (`Null` for global
/// helpers) and the arguments.
pub type NativeFn = fn(
    ctx: &mut EvalContext,
    this: ScriptValue,
    args: Vec<ScriptValue>,
) -> Result<ScriptValue, ErrorType>;

pub type PluginFn =
    dyn Fn(&mut EvalContext, ScriptValue, Vec<ScriptValue>) -> Result<ScriptValue, ErrorType> + Send + Sync;

/// Helper implementation - either compiled-in or supplied by the embedding application.
pub enum BuiltInFn {
    /// Direct function pointer.
    Native(NativeFn),

    /// Closure registered at runtime.
    Plugin(Box<PluginFn>),
}

impl BuiltInFn {
    pub fn call(
        &self,
        ctx: &mut EvalContext,
        this: ScriptValue,
        args: Vec<ScriptValue>,
    ) -> Result<ScriptValue, ErrorType> {
        match self {
            BuiltInFn::Native(f) => f(ctx, this, args),
            BuiltInFn::Plugin(f) => f(ctx, this, args),
        }
    }
}

/// Methods shared by every value of one type (`String`, `Array` or `Object`).
pub struct BuiltInObject {
    pub name: String,
    pub methods: HashMap<String, BuiltInFn>,
}

impl BuiltInObject {
    pub fn new(name: impl Into<String>) -> Self {
        BuiltInObject {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    pub fn add_method(mut self, name: impl Into<String>, func: NativeFn) -> Self {
        self.methods.insert(name.into(), BuiltInFn::Native(func));
        self
    }
}

/// Argument `index`, or `Null` when the caller passed fewer.
pub fn arg(args: &[ScriptValue], index: usize) -> ScriptValue {
    args.get(index).cloned().unwrap_or(ScriptValue::Null)
}

/// Fails unless the argument count is within `min..=max`.
pub fn expect_args(name: &str, args: &[ScriptValue], min: usize, max: usize) -> Result<(), ErrorType> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(ErrorType::TypeError(format!(
            "{}() takes {} argument(s) but {} were given",
            name,
            expected,
            args.len()
        )));
    }
    Ok(())
}
