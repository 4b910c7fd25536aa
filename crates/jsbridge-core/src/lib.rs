// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// jsbridge — Core types, error domain and configuration shared by the bridge
// and its script context.

pub mod config;
pub mod error;
pub mod script_error;
pub mod types;

pub use config::BridgeConfig;
pub use error::{BridgeError, ERROR_DOMAIN, ErrorCode};
pub use script_error::ScriptError;
pub use types::*;
