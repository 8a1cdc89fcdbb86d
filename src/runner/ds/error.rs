use indexmap::IndexMap;
use thiserror::Error;

use crate::runner::ds::value::ScriptValue;

/// Errors raised while a script runs. The `Display` form is the cause reported to callers.
#[derive(Debug, Error)]
pub enum ErrorType {
    #[error("{0} is not defined")]
    ReferenceError(String),
    #[error("TypeError: {0}")]
    TypeError(String),
    #[error("RangeError: {0}")]
    RangeError(String),
    #[error("KeyError: {0}")]
    KeyError(String),
    #[error("{0}")]
    SyntaxError(String),
    #[error("import is not available")]
    ImportError,
    /// A value raised with `throw`.
    #[error("{}", .0.to_display_string())]
    Thrown(ScriptValue),
    #[error("script did not return a value")]
    MissingReturn,
    /// The invocation's deadline passed.
    #[error("TIMEOUT")]
    Interrupted,
}

impl ErrorType {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorType::ReferenceError(_) => "ReferenceError",
            ErrorType::TypeError(_) => "TypeError",
            ErrorType::RangeError(_) => "RangeError",
            ErrorType::KeyError(_) => "KeyError",
            ErrorType::SyntaxError(_) => "SyntaxError",
            ErrorType::ImportError => "ImportError",
            ErrorType::Thrown(_) => "Error",
            ErrorType::MissingReturn => "MissingReturn",
            ErrorType::Interrupted => "Interrupted",
        }
    }

    /// Whether a script `catch` clause may handle this error.
    pub fn is_catchable(&self) -> bool {
        !matches!(self, ErrorType::Interrupted | ErrorType::MissingReturn)
    }

    /// The value bound to the `catch` parameter.
    ///
    /// Thrown values are handed back as they were. Other errors become a map with
    /// `name` and `message` keys.
    pub fn to_value(self) -> ScriptValue {
        match self {
            ErrorType::Thrown(v) => v,
            other => {
                let message = match &other {
                    ErrorType::ReferenceError(_) | ErrorType::ImportError => other.to_string(),
                    ErrorType::TypeError(m)
                    | ErrorType::RangeError(m)
                    | ErrorType::KeyError(m)
                    | ErrorType::SyntaxError(m) => m.clone(),
                    _ => other.to_string(),
                };
                let mut entries = IndexMap::new();
                entries.insert("name".to_string(), ScriptValue::string(other.name()));
                entries.insert("message".to_string(), ScriptValue::string(message));
                ScriptValue::new_map(entries)
            }
        }
    }
}
