//! Silent handling of missing variables
//!
//! Documents are written by people who expect a missing value to simply print nothing,
//! including `{{ customer.address.city }}` when there is no `customer` at all and
//! `{{ format_date(due) }}` when nobody registered that function. minijinja's chainable
//! undefined covers missing attributes of defined values, but calling an undefined
//! value is still an error. A missing top-level name therefore resolves to
//! [`SilentUndefined`], an object that absorbs every operation.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use minijinja::value::{Enumerator, Object, ObjectRepr, Value};
use minijinja::{Error, State};

/// Functions minijinja registers as globals by default
const BUILTIN_GLOBALS: &[&str] = &["range", "dict", "debug", "namespace"];

/// Value of every name the caller did not provide. Prints as nothing, is false,
/// iterates as empty, and returns itself from attribute access, item access and calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentUndefined;

impl SilentUndefined {
    pub fn value() -> Value {
        Value::from_object(SilentUndefined)
    }
}

/// Whether a value is the silent sentinel
pub fn is_silent(value: &Value) -> bool {
    value.downcast_object_ref::<SilentUndefined>().is_some()
}

/// Sentinel and engine undefined alike
pub fn is_missing(value: &Value) -> bool {
    value.is_undefined() || is_silent(value)
}

impl Object for SilentUndefined {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Iterable
    }

    fn get_value(self: &Arc<Self>, _key: &Value) -> Option<Value> {
        Some(SilentUndefined::value())
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Empty
    }

    fn is_true(self: &Arc<Self>) -> bool {
        false
    }

    fn call(self: &Arc<Self>, _state: &State<'_, '_>, _args: &[Value]) -> Result<Value, Error> {
        Ok(SilentUndefined::value())
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        _method: &str,
        _args: &[Value],
    ) -> Result<Value, Error> {
        Ok(SilentUndefined::value())
    }

    fn render(self: &Arc<Self>, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

/// Root template context: the caller's variables, with [`SilentUndefined`] for every
/// name that is neither a variable nor a global
#[derive(Debug)]
pub struct VariableScope {
    variables: Value,
    globals: Arc<BTreeSet<String>>,
}

impl VariableScope {
    pub fn new(variables: Value, globals: Arc<BTreeSet<String>>) -> Self {
        VariableScope { variables, globals }
    }

    fn is_global(&self, name: &str) -> bool {
        BUILTIN_GLOBALS.contains(&name) || self.globals.contains(name)
    }
}

impl Object for VariableScope {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Map
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        if let Ok(value) = self.variables.get_item(key) {
            if !value.is_undefined() {
                return Some(value);
            }
        }
        match key.as_str() {
            // Fall through to the environment's globals
            Some(name) if self.is_global(name) => None,
            _ => Some(SilentUndefined::value()),
        }
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        match self.variables.try_iter() {
            Ok(keys) => Enumerator::Values(keys.collect()),
            Err(_) => Enumerator::Empty,
        }
    }
}
