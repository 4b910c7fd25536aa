// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Closure-backed native objects.
//
// Hosts that do not want a dedicated type per exposed object can assemble a
// dispatch table from closures instead of implementing `NativeObject`.

use std::collections::BTreeMap;

use jsbridge_core::error::{BridgeError, Result};
use serde_json::Value;

use crate::traits::NativeObject;

type Method = Box<dyn Fn(&[Value]) -> Result<Value>>;

/// A `NativeObject` whose methods are closures.
///
/// ```ignore
/// let clock = Rc::new(
///     NativeMethods::new().method("now", |_| Ok(json!(now_millis()))),
/// );
/// bridge.register_object(&clock, "clock")?;
/// ```
#[derive(Default)]
pub struct NativeMethods {
    methods: BTreeMap<String, Method>,
}

impl NativeMethods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the method `name`.
    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.methods.insert(name.into(), Box::new(body));
        self
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl NativeObject for NativeMethods {
    fn methods(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value> {
        match self.methods.get(method) {
            Some(body) => body(args),
            None => Err(BridgeError::native(format!("no method {method:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lists_and_invokes_methods() {
        let object = NativeMethods::new()
            .method("echo", |args| Ok(Value::Array(args.to_vec())))
            .method("fail", |_| Err(BridgeError::native("always fails")));

        assert_eq!(object.len(), 2);
        assert_eq!(object.methods(), vec!["echo".to_string(), "fail".to_string()]);
        assert_eq!(object.invoke("echo", &[json!(1), json!("a")]).unwrap(), json!([1, "a"]));
        assert!(matches!(object.invoke("fail", &[]), Err(BridgeError::NativeMethod(_))));
        assert!(object.invoke("missing", &[]).is_err());
    }

    #[test]
    fn later_definition_wins() {
        let object = NativeMethods::new()
            .method("value", |_| Ok(json!(1)))
            .method("value", |_| Ok(json!(2)));
        assert_eq!(object.len(), 1);
        assert_eq!(object.invoke("value", &[]).unwrap(), json!(2));
    }
}
