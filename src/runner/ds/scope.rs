//! Scope arena for one sandbox invocation.
//!
//! Scopes live in a vector and refer to their parent by index, so closures hold a
//! plain `ScopeId` instead of a reference-counted environment. Scopes are released
//! in LIFO order unless a closure has captured them (or anything above them).

use std::collections::HashMap;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::ScriptValue;

pub type ScopeId = usize;

pub const GLOBAL_SCOPE_ID: ScopeId = 0;

struct Binding {
    value: ScriptValue,
    mutable: bool,
}

struct ScopeData {
    parent: Option<ScopeId>,
    /// Function bodies (and the global scope) receive `var` declarations and
    /// implicit assignments.
    is_function: bool,
    bindings: HashMap<String, Binding>,
}

pub struct ScopeArena {
    scopes: Vec<ScopeData>,
    highest_captured: ScopeId,
}

impl ScopeArena {
    pub fn new() -> Self {
        ScopeArena {
            scopes: vec![ScopeData {
                parent: None,
                is_function: true,
                bindings: HashMap::new(),
            }],
            highest_captured: GLOBAL_SCOPE_ID,
        }
    }

    pub fn push(&mut self, parent: ScopeId, is_function: bool) -> ScopeId {
        self.scopes.push(ScopeData {
            parent: Some(parent),
            is_function,
            bindings: HashMap::new(),
        });
        self.scopes.len() - 1
    }

    /// Drops `id` and everything pushed after it, unless one of them is captured.
    pub fn release(&mut self, id: ScopeId) {
        if id > self.highest_captured && id < self.scopes.len() {
            self.scopes.truncate(id);
        }
    }

    /// Keeps `id` alive for the rest of the invocation.
    pub fn mark_captured(&mut self, id: ScopeId) {
        if id > self.highest_captured {
            self.highest_captured = id;
        }
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Nearest enclosing function scope, `id` itself included.
    pub fn function_scope(&self, id: ScopeId) -> ScopeId {
        let mut current = id;
        loop {
            let scope = &self.scopes[current];
            match scope.parent {
                Some(parent) if !scope.is_function => current = parent,
                _ => return current,
            }
        }
    }

    /// Creates (or replaces) a binding directly in `id`.
    pub fn declare(&mut self, id: ScopeId, name: &str, value: ScriptValue, mutable: bool) {
        self.scopes[id]
            .bindings
            .insert(name.to_string(), Binding { value, mutable });
    }

    pub fn lookup(&self, id: ScopeId, name: &str) -> Option<&ScriptValue> {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = &self.scopes[scope_id];
            if let Some(binding) = scope.bindings.get(name) {
                return Some(&binding.value);
            }
            current = scope.parent;
        }
        None
    }

    /// Updates the nearest existing binding. A name with no binding is created in
    /// the enclosing function scope.
    pub fn assign(&mut self, id: ScopeId, name: &str, value: ScriptValue) -> Result<(), ErrorType> {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = &mut self.scopes[scope_id];
            if let Some(binding) = scope.bindings.get_mut(name) {
                if !binding.mutable {
                    return Err(ErrorType::TypeError(format!(
                        "assignment to constant variable '{}'",
                        name
                    )));
                }
                binding.value = value;
                return Ok(());
            }
            current = scope.parent;
        }
        let target = self.function_scope(id);
        self.declare(target, name, value, true);
        Ok(())
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}
