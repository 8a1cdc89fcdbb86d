//! # resolvent - configuration values that may be scripts
//!
//! Entries of a configuration tree are either literal data or small scripts
//! marked with the `<(` prefix. Scripts run in a sandboxed interpreter for a
//! deliberately small language and only see an allow-list of helpers.
//!
//! ## Quick Start
//!
//! ```
//! use resolvent::resolver::ResolverContainer;
//! use serde_json::json;
//!
//! let mut config = ResolverContainer::new();
//! config.add("name", json!("worker"));
//! config.add("threads", json!("<( 4 * 2"));
//! config.add("ports", json!(["<(", "return [for_port(8000), for_port(8001)]"]));
//!
//! assert_eq!(config.get("threads").unwrap(), json!(8));
//! assert!(config.get("ports").is_err());
//! ```
//!
//! ### Resolving a single entry
//!
//! ```
//! use resolvent::resolver::Resolver;
//! use serde_json::json;
//!
//! let mut resolver = Resolver::new(json!([
//!     "<(",
//!     "function fib(n, a = 0, b = 1) {",
//!     "  return n > 0 ? fib(n - 1, b, a + b) : a",
//!     "}",
//!     "return fib(10)",
//! ]));
//! assert_eq!(resolver.evaluate(), Some(&json!(55)));
//! ```
//!
//! ### Parsing only
//!
//! ```
//! use resolvent::parser::ScriptParser;
//!
//! let program = ScriptParser::parse_to_ast_from_str("let x = 5 + 3; return x").unwrap();
//! assert_eq!(program.body.len(), 2);
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - pest grammar and AST of the script language
//! - **[`runner`]** - evaluation
//!   - **[`runner::ds`]** - values, scopes and operators
//!   - **[`runner::eval`]** - tree-walking evaluator
//!   - **[`runner::plugin`]** - helper registry and sandbox limits
//!   - **[`runner::std_lib`]** - the standard helpers
//!   - **[`runner::api`]** - the sandbox: worker thread, deadline, cancellation
//! - **[`resolver`]** - classification, resolvers and containers

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod resolver;
pub mod runner;

pub use resolver::{ResolveError, Resolver, ResolverContainer};
pub use runner::api::{Outcome, Sandbox};
pub use runner::plugin::config::SandboxConfig;
