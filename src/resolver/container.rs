//! Named, ordered collection of resolvers and nested containers.
//!
//! Entries are evaluated lazily on first access. A transform registered with
//! an entry is applied to values handed out by [`ResolverContainer::get`] and
//! the clean view, never to the stored result.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use super::error::ResolveError;
use super::resolver::Resolver;
use crate::runner::api::Sandbox;

pub type Transform = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

pub enum Entry {
    Resolver(Resolver),
    Nested(ResolverContainer),
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Entry::Resolver(Resolver::new(value))
    }
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Entry::from(Value::String(value.to_string()))
    }
}

impl From<Resolver> for Entry {
    fn from(resolver: Resolver) -> Self {
        Entry::Resolver(resolver)
    }
}

impl From<ResolverContainer> for Entry {
    fn from(container: ResolverContainer) -> Self {
        Entry::Nested(container)
    }
}

#[derive(Default)]
pub struct ResolverContainer {
    entries: IndexMap<String, Entry>,
    transforms: HashMap<String, Transform>,
}

impl ResolverContainer {
    pub fn new() -> Self {
        ResolverContainer::default()
    }

    /// A container with one entry per member of a JSON object.
    pub fn from_value(value: &Value) -> Result<Self, ResolveError> {
        ResolverContainer::from_value_with(value, &Sandbox::default())
    }

    /// Like [`from_value`](Self::from_value), running every script in `sandbox`.
    pub fn from_value_with(value: &Value, sandbox: &Sandbox) -> Result<Self, ResolveError> {
        let members = match value {
            Value::Object(members) => members,
            other => return Err(ResolveError::NotAnObject(kind_of(other).to_string())),
        };
        let mut container = ResolverContainer::new();
        for (name, member) in members {
            container.add(
                name.as_str(),
                Resolver::with_sandbox(member.clone(), sandbox.clone()),
            );
        }
        Ok(container)
    }

    /// Adds or replaces an entry. Replacing drops the previous transform.
    pub fn add(&mut self, name: impl Into<String>, entry: impl Into<Entry>) {
        let name = name.into();
        self.transforms.remove(&name);
        self.entries.insert(name, entry.into());
    }

    pub fn add_transformed<F>(&mut self, name: impl Into<String>, entry: impl Into<Entry>, transform: F)
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        self.entries.insert(name.clone(), entry.into());
        self.transforms.insert(name, Arc::new(transform));
    }

    fn transformed(&self, name: &str, value: Value) -> Value {
        match self.transforms.get(name) {
            Some(transform) => transform(&value),
            None => value,
        }
    }

    /// The entry's resolved value with its transform applied. A nested
    /// container yields its clean view.
    pub fn get(&mut self, name: &str) -> Result<Value, ResolveError> {
        trace!(entry = name, "container access");
        let value = match self.entries.get_mut(name) {
            Some(Entry::Resolver(resolver)) => resolved_value(name, resolver)?,
            Some(Entry::Nested(nested)) => nested.to_json(false)?,
            None => return Err(ResolveError::UnknownEntry(name.to_string())),
        };
        Ok(self.transformed(name, value))
    }

    /// Dotted access through nested containers, e.g. `"sub.blue"`.
    pub fn lookup(&mut self, path: &str) -> Result<Value, ResolveError> {
        match path.split_once('.') {
            None => self.get(path),
            Some((head, rest)) => match self.entries.get_mut(head) {
                Some(Entry::Nested(nested)) => nested.lookup(rest),
                _ => Err(ResolveError::UnknownEntry(path.to_string())),
            },
        }
    }

    /// Whether an entry exists. Nothing is evaluated.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn resolver(&self, name: &str) -> Option<&Resolver> {
        match self.entries.get(name) {
            Some(Entry::Resolver(resolver)) => Some(resolver),
            _ => None,
        }
    }

    pub fn nested_mut(&mut self, name: &str) -> Option<&mut ResolverContainer> {
        match self.entries.get_mut(name) {
            Some(Entry::Nested(nested)) => Some(nested),
            _ => None,
        }
    }

    /// Serializes every entry, evaluating as needed.
    ///
    /// The clean view holds transformed values and fails on the first entry
    /// that did not resolve. The verbose view keeps plain entries bare and
    /// reports script entries as resolution records.
    pub fn to_json(&mut self, verbose: bool) -> Result<Value, ResolveError> {
        let mut out = Map::new();
        let names: Vec<String> = self.entries.keys().cloned().collect();
        for name in names {
            let value = match self.entries.get_mut(&name) {
                Some(Entry::Resolver(resolver)) => {
                    if verbose {
                        resolver.evaluate();
                        if resolver.needs_evaluation() {
                            out.insert(name, resolver.to_record());
                            continue;
                        }
                        resolver.result().cloned().unwrap_or(Value::Null)
                    } else {
                        resolved_value(&name, resolver)?
                    }
                }
                Some(Entry::Nested(nested)) => {
                    let nested = nested.to_json(verbose)?;
                    if verbose {
                        out.insert(name, nested);
                        continue;
                    }
                    nested
                }
                None => continue,
            };
            let value = self.transformed(&name, value);
            out.insert(name, value);
        }
        Ok(Value::Object(out))
    }
}

impl fmt::Debug for ResolverContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverContainer")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .field("transforms", &self.transforms.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn resolved_value(name: &str, resolver: &mut Resolver) -> Result<Value, ResolveError> {
    if let Some(value) = resolver.evaluate() {
        return Ok(value.clone());
    }
    Err(ResolveError::EvaluationFailed {
        name: name.to_string(),
        message: resolver.first_msg().unwrap_or_default().to_string(),
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_re_adding_drops_transform() {
        let mut container = ResolverContainer::new();
        container.add_transformed("w", "steel", |v| json!(format!("{}y", v.as_str().unwrap_or(""))));
        assert_eq!(container.get("w").unwrap(), json!("steely"));
        container.add("w", "iron");
        assert_eq!(container.get("w").unwrap(), json!("iron"));
    }

    #[test]
    fn test_unknown_entry() {
        let mut container = ResolverContainer::new();
        assert_eq!(
            container.get("pickle"),
            Err(ResolveError::UnknownEntry("pickle".to_string()))
        );
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(matches!(
            ResolverContainer::from_value(&json!([1, 2])),
            Err(ResolveError::NotAnObject(_))
        ));
        let container = ResolverContainer::from_value(&json!({"a": 1, "b": "<( 2"})).unwrap();
        assert_eq!(container.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
