// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared by the bridge and its script context.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{BridgeError, Result};
use crate::script_error::ScriptError;

/// Unique identifier for a bridge instance (used to correlate log lines).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BridgeId(pub Uuid);

impl BridgeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BridgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BridgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a bridge. Transitions are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeState {
    /// Created, `load` not yet called.
    Uninitialized,
    /// `load` in progress (or failed part-way).
    Loading,
    /// Script context is up; every operation is accepted.
    Ready,
}

impl std::fmt::Display for BridgeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
        };
        f.write_str(label)
    }
}

/// Reply passed between the script context and native code.
///
/// Serialized as `{"status":"ok","value":...}` or
/// `{"status":"error","error":{...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    Ok { value: Value },
    Error { error: ScriptError },
}

impl Envelope {
    pub fn from_result(result: Result<Value>) -> Self {
        match result {
            Ok(value) => Self::Ok { value },
            Err(err) => Self::Error {
                error: ScriptError::from_error(&err),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Words that cannot name a binding or be called as a bare function.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Whether `name` is a plain (ASCII) JavaScript identifier that is not a
/// reserved word.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        return false;
    }
    !RESERVED_WORDS.contains(&name)
}

/// Global bindings that exist in every context and cannot be reassigned.
const READ_ONLY_GLOBALS: &[&str] = &["undefined", "NaN", "Infinity", "globalThis"];

/// Whether `name` can be bound to a registered object: an identifier that
/// does not shadow a read-only global.
pub fn is_valid_variable_name(name: &str) -> bool {
    is_valid_identifier(name) && !READ_ONLY_GLOBALS.contains(&name)
}

/// Whether `name` is an identifier or a dotted path of identifiers
/// (`add`, `Math.max`, `app.util.format`).
///
/// Member names after the first segment may be reserved words
/// (`promise.catch` is a valid call target).
pub fn is_valid_function_path(name: &str) -> bool {
    let mut segments = name.split('.');
    let Some(head) = segments.next() else {
        return false;
    };
    is_valid_identifier(head)
        && segments.all(|segment| {
            is_valid_identifier(segment) || RESERVED_WORDS.contains(&segment)
        })
}

// ---------------------------------------------------------------------------
// Script text helpers
// ---------------------------------------------------------------------------

/// Quote `text` as a JavaScript string literal.
///
/// JSON string syntax is a subset of JavaScript string syntax once the line
/// and paragraph separators are escaped.
pub fn quote_js_string(text: &str) -> String {
    escape_separators(Value::String(text.to_owned()).to_string())
}

/// Render `value` as a JavaScript expression.
pub fn js_literal(value: &Value) -> String {
    escape_separators(value.to_string())
}

fn escape_separators(json: String) -> String {
    if json.contains(['\u{2028}', '\u{2029}']) {
        json.replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029")
    } else {
        json
    }
}

/// Build `name(arg0, arg1, ...)` for the global function `name`.
pub fn call_expression(name: &str, args: &[Value]) -> Result<String> {
    if !is_valid_function_path(name) {
        return Err(BridgeError::InvalidFunctionName(name.to_owned()));
    }
    let rendered: Vec<String> = args.iter().map(js_literal).collect();
    Ok(format!("{name}({})", rendered.join(", ")))
}

/// Interpret a raw string result: JSON if it parses, otherwise the literal
/// string.
pub fn decode_result(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}
