// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Registration table and script -> native dispatch.
//
// Registrations hold `Weak` references: the bridge routes calls to an object
// but never keeps it alive. A released object dispatches like an
// unregistered one.

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use jsbridge_core::error::{BridgeError, Result};
use jsbridge_core::types::Envelope;
use serde_json::Value;
use tracing::{debug, warn};

use crate::traits::{HostFunction, MethodMap, NativeObject};

/// A native object bound to a script-visible variable name.
pub struct Registration {
    name: String,
    object: Weak<dyn NativeObject>,
    method_map: Option<MethodMap>,
}

impl Registration {
    pub fn new(name: impl Into<String>, object: Weak<dyn NativeObject>) -> Self {
        Self {
            name: name.into(),
            object,
            method_map: None,
        }
    }

    pub fn with_method_map(mut self, method_map: MethodMap) -> Self {
        self.method_map = Some(method_map);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the registered object is still alive.
    pub fn is_live(&self) -> bool {
        self.object.strong_count() > 0
    }

    /// Method names callable from script: the method map's keys when one was
    /// given, otherwise everything the object lists.
    pub fn exposed_methods(&self) -> Vec<String> {
        match (&self.method_map, self.object.upgrade()) {
            (Some(map), _) => map.keys().cloned().collect(),
            (None, Some(object)) => object.methods(),
            (None, None) => Vec::new(),
        }
    }

    /// Resolve a script-side method name to the object and native method
    /// that serve it.
    fn resolve(&self, method: &str) -> Result<(Rc<dyn NativeObject>, String)> {
        let Some(object) = self.object.upgrade() else {
            warn!(object = %self.name, "registered object has been released");
            return Err(BridgeError::UnregisteredObject(self.name.clone()));
        };
        let unregistered = || BridgeError::UnregisteredMethod {
            object: self.name.clone(),
            method: method.to_owned(),
        };
        let native = match &self.method_map {
            Some(map) => map.get(method).ok_or_else(unregistered)?.clone(),
            None => method.to_owned(),
        };
        if !object.methods().iter().any(|listed| *listed == native) {
            return Err(unregistered());
        }
        Ok((object, native))
    }
}

/// Ordered table of registrations, unique by name.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Registration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `registration`, replacing any entry with the same name in place.
    /// Returns `true` if an entry was replaced.
    pub fn insert(&mut self, registration: Registration) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.name == registration.name)
        {
            Some(existing) => {
                *existing = registration;
                true
            }
            None => {
                self.entries.push(registration);
                false
            }
        }
    }

    /// Remove the entry named `name`. Returns `true` if one existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.name != name);
        self.entries.len() != before
    }

    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Registered names in table order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }
}

/// Invoke `method` on the object registered as `object`.
///
/// The table is not borrowed while the native method runs, so methods may
/// not observe it mid-update. Panics are caught and reported as
/// `BridgeError::NativeMethod`.
pub fn dispatch(
    registry: &RefCell<Registry>,
    object: &str,
    method: &str,
    args: &[Value],
) -> Result<Value> {
    let (target, native) = {
        let registry = registry
            .try_borrow()
            .map_err(|_| BridgeError::Engine("registration table is being modified".into()))?;
        let registration = registry
            .get(object)
            .ok_or_else(|| BridgeError::UnregisteredObject(object.to_owned()))?;
        registration.resolve(method)?
    };

    debug!(%object, %method, %native, args = args.len(), "dispatching native call");
    match panic::catch_unwind(AssertUnwindSafe(|| target.invoke(&native, args))) {
        Ok(result) => result,
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            warn!(%object, %method, %reason, "native method panicked");
            Err(BridgeError::native(format!("{object}.{method} panicked: {reason}")))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Fallback reply if an envelope cannot be serialized.
const ENCODING_FAILURE: &str = r#"{"status":"error","error":{"name":"SerializationError","message":"failed to encode native reply"}}"#;

/// Build the host function the prelude calls as `host(object, method, argsJson)`.
///
/// Every outcome, including malformed input, is answered with a JSON
/// `Envelope`; nothing propagates out of the script context.
pub fn host_dispatcher(registry: Rc<RefCell<Registry>>) -> HostFunction {
    Rc::new(move |args: &[String]| {
        let result = match args {
            [object, method, encoded, ..] => serde_json::from_str::<Vec<Value>>(encoded)
                .map_err(BridgeError::from)
                .and_then(|decoded| dispatch(&registry, object, method, &decoded)),
            _ => Err(BridgeError::native(format!(
                "host dispatch expects 3 arguments, got {}",
                args.len()
            ))),
        };
        if let Err(err) = &result {
            debug!(error = %err, "native call rejected");
        }
        serde_json::to_string(&Envelope::from_result(result))
            .unwrap_or_else(|_| ENCODING_FAILURE.to_owned())
    })
}
