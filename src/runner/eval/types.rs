//! Core types for the evaluation engine.

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::ScriptValue;

/// Completion record type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompletionType {
    /// Execution continues with the next statement.
    Normal,
    /// A `return` is unwinding to the enclosing function.
    Return,
    /// Break out of the innermost loop.
    Break,
    /// Skip to the next iteration of the innermost loop.
    Continue,
}

/// Completion record.
/// Every statement evaluation returns one; errors travel separately as `Err`.
#[derive(Debug, Clone)]
pub struct Completion {
    pub completion_type: CompletionType,
    pub value: Option<ScriptValue>,
}

impl Completion {
    pub fn normal() -> Self {
        Completion {
            completion_type: CompletionType::Normal,
            value: None,
        }
    }

    pub fn return_value(value: ScriptValue) -> Self {
        Completion {
            completion_type: CompletionType::Return,
            value: Some(value),
        }
    }

    pub fn break_completion() -> Self {
        Completion {
            completion_type: CompletionType::Break,
            value: None,
        }
    }

    pub fn continue_completion() -> Self {
        Completion {
            completion_type: CompletionType::Continue,
            value: None,
        }
    }

    pub fn is_normal(&self) -> bool {
        self.completion_type == CompletionType::Normal
    }

    pub fn is_abrupt(&self) -> bool {
        !self.is_normal()
    }

    /// The carried value, or `Null` if none.
    pub fn get_value(&self) -> ScriptValue {
        self.value.clone().unwrap_or(ScriptValue::Null)
    }
}

/// Result type for statement evaluation.
pub type EvalResult = Result<Completion, ErrorType>;

/// Result type for value-returning operations.
pub type ValueResult = Result<ScriptValue, ErrorType>;
