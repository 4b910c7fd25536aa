// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Script context backed by Boa, an ECMAScript engine written in Rust.

use boa_engine::{Context, JsError, JsObject, JsString, JsValue, NativeFunction, Source};
use jsbridge_core::BridgeConfig;
use jsbridge_core::error::{BridgeError, Result};
use tracing::debug;

use crate::traits::{HostFunction, ScriptEngine};

/// In-process JavaScript context.
pub struct BoaEngine {
    context: Context,
}

impl BoaEngine {
    /// Underlying Boa context, for hosts that need engine-specific setup.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Map an uncaught exception to `ScriptExecution { name, message }`.
    fn describe(&mut self, err: &JsError) -> BridgeError {
        // Engine-raised errors that never became script values, including
        // uncatchable runtime-limit errors.
        if let Some(native) = err.as_native() {
            return BridgeError::ScriptExecution {
                name: native.kind.to_string(),
                message: native.message().to_string(),
            };
        }
        let thrown = err.to_opaque(&mut self.context);
        let Some(object) = thrown.as_object() else {
            // Thrown non-Error values (`throw "nope"`).
            return BridgeError::script(self.text(&thrown).unwrap_or_else(|| err.to_string()));
        };
        let name = self
            .property_text(object, "name")
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Error".to_owned());
        let message = self
            .property_text(object, "message")
            .or_else(|| self.text(&thrown))
            .unwrap_or_else(|| err.to_string());
        BridgeError::ScriptExecution { name, message }
    }

    fn property_text(&mut self, object: &JsObject, key: &str) -> Option<String> {
        let value = object.get(JsString::from(key), &mut self.context).ok()?;
        if value.is_undefined() {
            return None;
        }
        self.text(&value)
    }

    fn text(&mut self, value: &JsValue) -> Option<String> {
        value
            .to_string(&mut self.context)
            .ok()
            .map(|text| text.to_std_string_escaped())
    }
}

impl ScriptEngine for BoaEngine {
    fn launch(config: &BridgeConfig) -> Result<Self> {
        let mut context = Context::default();
        if let Some(limit) = config.loop_iteration_limit {
            context.runtime_limits_mut().set_loop_iteration_limit(limit);
        }
        debug!("boa context created");
        Ok(Self { context })
    }

    fn evaluate(&mut self, source: &str) -> Result<String> {
        let value = match self.context.eval(Source::from_bytes(source)) {
            Ok(value) => value,
            Err(err) => return Err(self.describe(&err)),
        };
        match value.to_string(&mut self.context) {
            Ok(text) => Ok(text.to_std_string_escaped()),
            Err(err) => Err(self.describe(&err)),
        }
    }

    fn install_host_function(
        &mut self,
        name: &str,
        arity: usize,
        function: HostFunction,
    ) -> Result<()> {
        // SAFETY: the closure captures only `HostFunction`, which holds no
        // garbage-collected values, so it needs no tracing.
        let native = unsafe {
            NativeFunction::from_closure(move |_this, args, context| {
                let mut strings = Vec::with_capacity(args.len());
                for arg in args {
                    strings.push(arg.to_string(context)?.to_std_string_escaped());
                }
                let reply = function(&strings);
                Ok(JsValue::from(JsString::from(reply.as_str())))
            })
        };
        self.context
            .register_global_callable(JsString::from(name), arity, native)
            .map_err(|err| BridgeError::Engine(format!("cannot define {name}: {err}")))?;
        debug!(%name, "host function installed");
        Ok(())
    }

    fn engine_name(&self) -> &str {
        "boa"
    }
}
