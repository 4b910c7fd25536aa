// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trait definitions at the two seams of the bridge: the script context it
// drives, and the native objects scripts call back into.

use std::collections::BTreeMap;
use std::rc::Rc;

use jsbridge_core::BridgeConfig;
use jsbridge_core::error::Result;
use serde_json::Value;

/// Native callable installed into a script context. Receives the string
/// coercion of each argument and returns a string.
pub type HostFunction = Rc<dyn Fn(&[String]) -> String>;

/// An embedded JavaScript execution context.
///
/// Implementations evaluate source text in the global scope and expose host
/// functions as globals. They are driven from a single thread.
pub trait ScriptEngine {
    /// Create a fresh context.
    fn launch(config: &BridgeConfig) -> Result<Self>
    where
        Self: Sized;

    /// Evaluate `source` and return the string coercion of its completion
    /// value. Uncaught exceptions surface as `BridgeError::ScriptExecution`.
    fn evaluate(&mut self, source: &str) -> Result<String>;

    /// Define a global function `name` backed by `function`.
    fn install_host_function(
        &mut self,
        name: &str,
        arity: usize,
        function: HostFunction,
    ) -> Result<()>;

    /// Human-readable engine name (e.g. "boa").
    fn engine_name(&self) -> &str;
}

/// A native object that scripts may call into once registered.
///
/// There is no reflection: every object lists the methods it exposes and
/// routes calls to them itself.
pub trait NativeObject {
    /// Names of the methods `invoke` accepts.
    fn methods(&self) -> Vec<String>;

    /// Call `method` with JSON arguments decoded from the script side.
    /// Only called with names listed by `methods`.
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value>;
}

/// Restriction of a registration: script-visible method name to the native
/// method it invokes.
pub type MethodMap = BTreeMap<String, String>;
