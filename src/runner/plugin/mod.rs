//! Helper allow-list.
//!
//! A script can only reach names it declares itself or names registered in a
//! [`BuiltInRegistry`]. Lookup order:
//!
//! ```text
//! 1. Local scope (function/block)
//! 2. Outer scopes (lexical chain)
//! 3. Global helpers in the registry   <- s2j, j2s, len, range, ...
//! 4. Otherwise: "<name> is not defined"
//! ```
//!
//! Method calls on strings, lists and maps (`'a'.upper()`, `xs.map(f)`) dispatch
//! to the registry's `String`, `Array` and `Object` method tables.
//!
//! ## Example: extra helper
//!
//! ```
//! use std::sync::Arc;
//! use resolvent::runner::api::{Outcome, Sandbox};
//! use resolvent::runner::ds::value::ScriptValue;
//! use resolvent::runner::plugin::{BuiltInRegistry, SandboxConfig};
//! use resolvent::resolver::classifier::ScriptSource;
//!
//! let mut registry = BuiltInRegistry::with_core();
//! registry.register_plugin_function("triple", |_ctx, _this, args| {
//!     match args.first() {
//!         Some(ScriptValue::Number(n)) => Ok(ScriptValue::float(n.as_f64() * 3.0)),
//!         _ => Ok(ScriptValue::Null),
//!     }
//! });
//!
//! let sandbox = Sandbox::with_registry(SandboxConfig::default(), Arc::new(registry));
//! let outcome = sandbox.run(&ScriptSource::from_text("return triple(7)"));
//! assert_eq!(outcome, Outcome::Success(serde_json::json!(21.0)));
//! ```

pub mod config;
pub mod registry;
pub mod types;

pub use config::SandboxConfig;
pub use registry::BuiltInRegistry;
pub use types::{BuiltInFn, BuiltInObject, EvalContext, NativeFn};
