// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Script-side half of the bridge.
//
// The prelude is evaluated once during `load`. It defines:
//
//   <dispatcher>.call(object, method, ...args)   public dispatch entry point
//   __jsbridge.result(value)                      text form of a call result
//   __jsbridge.expose(object, methods)            define a global proxy object
//   __jsbridge.conceal(object)                    remove a global proxy object
//
// Calls reach native code through the host function installed under
// `HOST_FUNCTION`, which always answers with a JSON envelope.

use jsbridge_core::types::{js_literal, quote_js_string};
use serde_json::Value;

/// Global name of the native host function the prelude calls into.
pub const HOST_FUNCTION: &str = "__jsbridgeHost";

const PRELUDE_TEMPLATE: &str = r#"(function (global) {
  var host = global.__jsbridgeHost;
  var slice = Array.prototype.slice;

  function call(object, method, args) {
    var reply = JSON.parse(host(String(object), String(method), JSON.stringify(args)));
    if (reply.status === "ok") {
      return reply.value;
    }
    var error = new Error(reply.error.message);
    error.name = reply.error.name;
    error.domain = reply.error.domain;
    error.code = reply.error.code;
    throw error;
  }

  var internals = {
    result: function (value) {
      if (value === undefined) {
        return "null";
      }
      if (typeof value === "string") {
        return value;
      }
      try {
        var json = JSON.stringify(value);
        if (json !== undefined) {
          return json;
        }
      } catch (e) {
        // Cyclic structures and BigInts fall back to String(value).
      }
      return String(value);
    },
    expose: function (object, methods) {
      "use strict";
      var proxy = {};
      methods.forEach(function (method) {
        proxy[method] = function () {
          return call(object, method, slice.call(arguments));
        };
      });
      global[object] = proxy;
    },
    conceal: function (object) {
      delete global[object];
    }
  };

  Object.defineProperty(global, "__jsbridge", { value: internals });
  global[__DISPATCHER__] = {
    call: function (object, method) {
      return call(object, method, slice.call(arguments, 2));
    }
  };
})(globalThis);
"#;

/// Prelude source with the dispatch entry point named `dispatcher`.
pub fn prelude(dispatcher: &str) -> String {
    PRELUDE_TEMPLATE.replace("__DISPATCHER__", &quote_js_string(dispatcher))
}

/// Expression that evaluates `call` and yields its result as text: strings
/// as-is, other values as JSON where they serialize, `String(v)` otherwise.
pub fn result_expression(call: &str) -> String {
    format!("__jsbridge.result({call})")
}

/// Statement defining the global proxy `object` with `methods`.
pub fn expose_statement(object: &str, methods: &[String]) -> String {
    let methods = Value::from(methods.to_vec());
    format!(
        "__jsbridge.expose({}, {});",
        quote_js_string(object),
        js_literal(&methods)
    )
}

/// Statement removing the global proxy `object`.
pub fn conceal_statement(object: &str) -> String {
    format!("__jsbridge.conceal({});", quote_js_string(object))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_names_the_dispatcher() {
        let source = prelude("hostBridge");
        assert!(source.contains(r#"global["hostBridge"] = {"#));
        assert!(!source.contains("__DISPATCHER__"));
        assert!(source.contains(HOST_FUNCTION));
    }

    #[test]
    fn result_expression_wraps_the_call() {
        assert_eq!(
            result_expression("add(1, 2)"),
            "__jsbridge.result(add(1, 2))"
        );
    }

    #[test]
    fn expose_and_conceal_statements() {
        assert_eq!(
            expose_statement("calc", &["add".into(), "sub".into()]),
            r#"__jsbridge.expose("calc", ["add","sub"]);"#
        );
        assert_eq!(conceal_statement("calc"), r#"__jsbridge.conceal("calc");"#);
    }
}
