// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error domain for the bridge.
//
// Every failure maps to a stable `ErrorCode` so hosts and scripts can branch
// on the code rather than on message text.

use thiserror::Error;

use crate::types::BridgeState;

/// Name of the error domain reported alongside every code.
pub const ERROR_DOMAIN: &str = "jsbridge";

/// Top-level error type for all bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Lifecycle --
    #[error("bridge is not ready (state: {0})")]
    NotReady(BridgeState),

    #[error("bridge has already been loaded")]
    AlreadyLoaded,

    #[error("script context failed: {0}")]
    Engine(String),

    // -- Native -> script --
    #[error("{name}: {message}")]
    ScriptExecution { name: String, message: String },

    #[error("invalid function name: {0:?}")]
    InvalidFunctionName(String),

    #[error("failed to fetch script from {location}: {reason}")]
    Transport { location: String, reason: String },

    // -- Script -> native --
    #[error("no object registered as {0:?}")]
    UnregisteredObject(String),

    #[error("object {object:?} has no callable method {method:?}")]
    UnregisteredMethod { object: String, method: String },

    #[error("invalid variable name: {0:?}")]
    InvalidVariableName(String),

    #[error("native method failed: {0}")]
    NativeMethod(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BridgeError {
    /// Shorthand for script exceptions that carry a plain `Error` name.
    pub fn script(message: impl Into<String>) -> Self {
        Self::ScriptExecution {
            name: "Error".into(),
            message: message.into(),
        }
    }

    /// Shorthand for failures raised by a native method implementation.
    pub fn native(message: impl Into<String>) -> Self {
        Self::NativeMethod(message.into())
    }

    /// Stable code for this error within [`ERROR_DOMAIN`].
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotReady(_) => ErrorCode::NotReady,
            Self::AlreadyLoaded => ErrorCode::AlreadyLoaded,
            Self::Engine(_) => ErrorCode::Engine,
            Self::ScriptExecution { .. } => ErrorCode::ScriptExecution,
            Self::InvalidFunctionName(_) => ErrorCode::InvalidFunctionName,
            Self::Transport { .. } => ErrorCode::Transport,
            Self::UnregisteredObject(_) => ErrorCode::UnregisteredObject,
            Self::UnregisteredMethod { .. } => ErrorCode::UnregisteredMethod,
            Self::InvalidVariableName(_) => ErrorCode::InvalidVariableName,
            Self::NativeMethod(_) => ErrorCode::NativeMethod,
            Self::Config(_) => ErrorCode::Config,
            Self::Io(_) => ErrorCode::Io,
            Self::Serialization(_) => ErrorCode::Serialization,
        }
    }
}

/// Numeric codes of the error domain. Values are stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    NotReady = 1,
    AlreadyLoaded = 2,
    Engine = 3,
    ScriptExecution = 10,
    InvalidFunctionName = 11,
    Transport = 12,
    UnregisteredObject = 20,
    UnregisteredMethod = 21,
    InvalidVariableName = 22,
    NativeMethod = 23,
    Config = 30,
    Io = 31,
    Serialization = 32,
}

impl ErrorCode {
    /// Error name as seen by scripts (`e.name` of the thrown error).
    pub fn name(self) -> &'static str {
        match self {
            Self::NotReady => "NotReadyError",
            Self::AlreadyLoaded => "AlreadyLoadedError",
            Self::Engine => "EngineError",
            Self::ScriptExecution => "ScriptExecutionError",
            Self::InvalidFunctionName => "InvalidFunctionNameError",
            Self::Transport => "TransportError",
            Self::UnregisteredObject => "UnregisteredObjectError",
            Self::UnregisteredMethod => "UnregisteredMethodError",
            Self::InvalidVariableName => "InvalidVariableNameError",
            Self::NativeMethod => "NativeMethodError",
            Self::Config => "ConfigError",
            Self::Io => "IoError",
            Self::Serialization => "SerializationError",
        }
    }

    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_variants() {
        let err = BridgeError::UnregisteredMethod {
            object: "calc".into(),
            method: "mul".into(),
        };
        assert_eq!(err.code(), ErrorCode::UnregisteredMethod);
        assert_eq!(err.code().name(), "UnregisteredMethodError");
        assert_eq!(err.code().as_u16(), 21);
    }

    #[test]
    fn script_error_displays_name_and_message() {
        let err = BridgeError::ScriptExecution {
            name: "TypeError".into(),
            message: "x is not a function".into(),
        };
        assert_eq!(err.to_string(), "TypeError: x is not a function");
        assert_eq!(BridgeError::script("boom").to_string(), "Error: boom");
    }

    #[test]
    fn not_ready_reports_state() {
        let err = BridgeError::NotReady(BridgeState::Uninitialized);
        assert_eq!(err.to_string(), "bridge is not ready (state: uninitialized)");
        assert_eq!(err.code(), ErrorCode::NotReady);
    }
}
