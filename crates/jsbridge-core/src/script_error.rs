// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Script-facing error payloads.
//
// Native failures never cross into the script context as Rust values. They are
// flattened into a `ScriptError`, which the prelude rethrows as an `Error`
// carrying `name`, `domain`, `code` and `message`.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, ERROR_DOMAIN};

/// An error as it is thrown inside, or reported back from, the script context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptError {
    /// `e.name` on the script side (`TypeError`, `UnregisteredMethodError`, ...).
    pub name: String,
    /// Human-readable description.
    pub message: String,
    /// Error domain, present only for errors raised by the bridge itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Numeric code within `domain`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl ScriptError {
    /// Flatten a bridge error for the script side.
    pub fn from_error(err: &BridgeError) -> Self {
        let code = err.code();
        let message = match err {
            // Script exceptions already carry their own name; keep the message bare.
            BridgeError::ScriptExecution { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self {
            name: code.name().to_owned(),
            message,
            domain: Some(ERROR_DOMAIN.to_owned()),
            code: Some(code.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_errors_carry_domain_and_code() {
        let err = BridgeError::UnregisteredObject("ghost".into());
        let payload = ScriptError::from_error(&err);
        assert_eq!(payload.name, "UnregisteredObjectError");
        assert_eq!(payload.domain.as_deref(), Some(ERROR_DOMAIN));
        assert_eq!(payload.code, Some(20));
        assert!(payload.message.contains("ghost"));
    }

    #[test]
    fn script_exceptions_keep_their_message() {
        let err = BridgeError::ScriptExecution {
            name: "RangeError".into(),
            message: "too deep".into(),
        };
        let payload = ScriptError::from_error(&err);
        assert_eq!(payload.name, "ScriptExecutionError");
        assert_eq!(payload.message, "too deep");
    }

    #[test]
    fn native_method_failures_are_named() {
        let payload = ScriptError::from_error(&BridgeError::native("disk full"));
        assert_eq!(payload.name, "NativeMethodError");
        assert_eq!(payload.message, "native method failed: disk full");
    }
}
