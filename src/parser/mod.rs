mod api;
pub mod ast;
pub(crate) mod static_semantics;
#[allow(non_fmt_panics)]
#[cfg(test)]
mod unit_tests;
mod util;

pub use api::{Rule, ScriptParser};
