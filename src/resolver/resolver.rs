//! A single resolvable entry and its state machine.
//!
//! ```text
//! Unresolved --evaluate()--> Resolving --Success--> Resolved
//!                                      \-Failure--> Failed
//! ```
//!
//! Plain values start out `Resolved`. Terminal states are final, and a second
//! `evaluate()` returns the cached outcome without running anything.

use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::classifier::{classify, source_text, CompoundMember, EntryValue};
use crate::runner::api::{Outcome, Sandbox};
use crate::runner::plugin::config::SandboxConfig;

pub const ERROR_PREFIX: &str = "Error in script: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Unresolved,
    Resolving,
    Resolved,
    Failed,
}

pub struct Resolver {
    source: Value,
    entry: EntryValue,
    state: ResolverState,
    result: Option<Value>,
    timeline: Vec<String>,
    sandbox: Sandbox,
}

impl Resolver {
    /// A resolver whose scripts may run for as long as they need.
    pub fn new(source: Value) -> Self {
        Resolver::with_sandbox(source, Sandbox::default())
    }

    pub fn with_timeout(source: Value, timeout: Duration) -> Self {
        Resolver::with_sandbox(source, Sandbox::new(SandboxConfig::new().with_timeout(timeout)))
    }

    pub fn with_sandbox(source: Value, sandbox: Sandbox) -> Self {
        let entry = classify(&source);
        let (state, result) = match &entry {
            EntryValue::Plain(value) => (ResolverState::Resolved, Some(value.clone())),
            _ => (ResolverState::Unresolved, None),
        };
        Resolver {
            source,
            entry,
            state,
            result,
            timeline: Vec::new(),
            sandbox,
        }
    }

    /// Whether `value` holds code: a script or a compound of scripts.
    pub fn contains_code(value: &Value) -> bool {
        classify(value).needs_evaluation()
    }

    /// Runs the entry's scripts once. Returns the result, or `None` on failure.
    pub fn evaluate(&mut self) -> Option<&Value> {
        if self.state == ResolverState::Unresolved {
            self.state = ResolverState::Resolving;
            debug!(state = ?self.state, "evaluating entry");
            match self.run() {
                Outcome::Success(value) => {
                    self.result = Some(value);
                    self.state = ResolverState::Resolved;
                }
                Outcome::Failure(cause) => {
                    self.timeline.push(format!("{}{}", ERROR_PREFIX, cause));
                    self.state = ResolverState::Failed;
                }
            }
            debug!(state = ?self.state, "entry evaluated");
        }
        self.result.as_ref()
    }

    fn run(&self) -> Outcome {
        match &self.entry {
            EntryValue::Plain(value) => Outcome::Success(value.clone()),
            EntryValue::Script(source) => self.sandbox.run(source),
            EntryValue::Compound(members) => {
                let mut resolved = Map::new();
                for (name, member) in members {
                    let value = match member {
                        CompoundMember::Plain(value) => value.clone(),
                        CompoundMember::Script(source) => match self.sandbox.run(source) {
                            Outcome::Success(value) => value,
                            failure => return failure,
                        },
                    };
                    resolved.insert(name.clone(), value);
                }
                Outcome::Success(Value::Object(resolved))
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.state == ResolverState::Resolved
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn timeline(&self) -> &[String] {
        &self.timeline
    }

    pub fn first_msg(&self) -> Option<&str> {
        self.timeline.first().map(String::as_str)
    }

    /// True for script and compound sources, whatever the current state.
    pub fn needs_evaluation(&self) -> bool {
        self.entry.needs_evaluation()
    }

    pub fn source(&self) -> &Value {
        &self.source
    }

    /// Resolution metadata as reported by the verbose container view.
    pub fn to_record(&self) -> Value {
        let resolved = self.is_resolved();
        json!({
            "input": source_text(&self.source),
            "evaluated": resolved,
            "needsEvaluation": self.needs_evaluation(),
            "resolvable": self.needs_evaluation(),
            "resolved": resolved,
            "result": self.result.clone().unwrap_or(Value::Null),
            "timeline": self.timeline
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_is_resolved_on_construction() {
        let resolver = Resolver::new(json!("stuff"));
        assert!(resolver.is_resolved());
        assert!(!resolver.needs_evaluation());
        assert_eq!(resolver.result(), Some(&json!("stuff")));
    }

    #[test]
    fn test_failure_is_memoized() {
        let mut resolver = Resolver::new(json!("<(return nope"));
        assert_eq!(resolver.evaluate(), None);
        assert_eq!(resolver.state(), ResolverState::Failed);
        assert_eq!(resolver.evaluate(), None);
        assert_eq!(resolver.timeline().len(), 1);
        assert_eq!(resolver.first_msg(), Some("Error in script: nope is not defined"));
    }

    #[test]
    fn test_record_of_unevaluated_script() {
        let resolver = Resolver::new(json!("<( 1"));
        assert_eq!(
            resolver.to_record(),
            json!({
                "input": "<( 1",
                "evaluated": false,
                "needsEvaluation": true,
                "resolvable": true,
                "resolved": false,
                "result": null,
                "timeline": []
            })
        );
    }
}
