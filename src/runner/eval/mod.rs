//! Tree-walking evaluation of the script AST.

pub mod expression;
pub mod function;
pub mod statement;
pub mod types;

pub use statement::run_program;
pub use types::{Completion, CompletionType, EvalResult, ValueResult};
