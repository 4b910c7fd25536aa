// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// jsbridge — Call JavaScript from native code, and native code from JavaScript.
//
// A `Bridge` owns one embedded script context (Boa by default, any
// `ScriptEngine` otherwise) and one table of registered native objects.
// Native code runs scripts and calls functions; scripts reach registered
// objects through the dispatch entry point injected at load time.

pub mod boa;
pub mod bridge;
pub mod loader;
pub mod methods;
pub mod prelude;
pub mod registry;
pub mod traits;

pub use boa::BoaEngine;
pub use bridge::Bridge;
pub use jsbridge_core::{BridgeConfig, BridgeError, BridgeState, ERROR_DOMAIN, ErrorCode};
pub use loader::{ScriptLoader, ScriptLocation};
pub use methods::NativeMethods;
pub use traits::{HostFunction, MethodMap, NativeObject, ScriptEngine};
