// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The bridge: one script context plus one registration table.
//
// Lifecycle is Uninitialized -> Loading -> Ready, one-way. Every run, call,
// register and dispatch operation fails with `NotReady` until `load` has
// completed; nothing is queued.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use jsbridge_core::BridgeConfig;
use jsbridge_core::error::{BridgeError, Result};
use jsbridge_core::types::{
    BridgeId, BridgeState, call_expression, decode_result, is_valid_variable_name,
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::boa::BoaEngine;
use crate::loader::{ScriptLoader, ScriptLocation};
use crate::prelude::{
    HOST_FUNCTION, conceal_statement, expose_statement, prelude, result_expression,
};
use crate::registry::{self, Registration, Registry};
use crate::traits::{MethodMap, NativeObject, ScriptEngine};

/// Connects native code with an embedded JavaScript context.
///
/// The bridge is single-threaded: it and its engine stay on the thread that
/// created them, and async operations are driven by a current-thread runtime.
pub struct Bridge<E: ScriptEngine = BoaEngine> {
    id: BridgeId,
    config: BridgeConfig,
    state: BridgeState,
    engine: Option<E>,
    registry: Rc<RefCell<Registry>>,
    loader: ScriptLoader,
}

impl Bridge<BoaEngine> {
    /// Create a bridge backed by the built-in Boa engine.
    pub fn new(config: BridgeConfig) -> Result<Self> {
        Self::with_engine(config)
    }
}

impl<E: ScriptEngine> Bridge<E> {
    /// Create a bridge backed by engine `E`. The engine is not started until
    /// `load`.
    pub fn with_engine(config: BridgeConfig) -> Result<Self> {
        config.validate()?;
        let loader = ScriptLoader::new(&config)?;
        let id = BridgeId::new();
        debug!(bridge = %id, "bridge created");
        Ok(Self {
            id,
            config,
            state: BridgeState::Uninitialized,
            engine: None,
            registry: Rc::new(RefCell::new(Registry::new())),
            loader,
        })
    }

    pub fn id(&self) -> BridgeId {
        self.id
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == BridgeState::Ready
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The underlying script context, once loaded.
    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Registered variable names, in registration order.
    pub fn registrations(&self) -> Vec<String> {
        self.registry.borrow().names()
    }

    // -- Initialization -----------------------------------------------------

    /// Start the script context and call `ready` once it accepts scripts.
    ///
    /// `ready` runs exactly once per bridge. A second `load` fails with
    /// `AlreadyLoaded`. If start-up fails the error is returned, `ready` is
    /// not called, and the bridge stays in `Loading`.
    #[instrument(skip_all, fields(bridge = %self.id))]
    pub async fn load<F>(&mut self, ready: F) -> Result<()>
    where
        F: FnOnce(&mut Self),
    {
        if self.state != BridgeState::Uninitialized {
            warn!(state = %self.state, "load called twice");
            return Err(BridgeError::AlreadyLoaded);
        }
        self.state = BridgeState::Loading;
        info!("starting script context");

        let mut engine = E::launch(&self.config)?;
        engine.install_host_function(
            HOST_FUNCTION,
            3,
            registry::host_dispatcher(Rc::clone(&self.registry)),
        )?;
        engine.evaluate(&prelude(&self.config.dispatcher_name))?;

        if let Some(path) = self.config.baseline_script.clone() {
            let source = self.loader.fetch(&ScriptLocation::File(path)).await?;
            engine.evaluate(&source)?;
            debug!("baseline script evaluated");
        }

        // Deliver readiness from a later scheduler turn, like a page-load
        // notification.
        tokio::task::yield_now().await;

        info!(engine = engine.engine_name(), "bridge ready");
        self.engine = Some(engine);
        self.state = BridgeState::Ready;
        ready(self);
        Ok(())
    }

    // -- Native -> script ---------------------------------------------------

    /// Fetch a script from a path or URL, run it, then call `ready`.
    ///
    /// Fetch failures return `Transport` and script failures return
    /// `ScriptExecution`; `ready` is only called on success.
    #[instrument(skip_all, fields(bridge = %self.id, %location))]
    pub async fn load_script<F>(&mut self, location: &str, ready: F) -> Result<()>
    where
        F: FnOnce(&mut Self),
    {
        self.ensure_ready()?;
        let location = ScriptLocation::parse(location)?;
        let source = self.loader.fetch(&location).await?;
        self.run_script(&source)?;
        info!("script loaded");
        ready(self);
        Ok(())
    }

    /// Run `script` in the global scope and return the string coercion of
    /// its completion value.
    pub fn run_script(&mut self, script: &str) -> Result<String> {
        let id = self.id;
        let engine = self.ready_engine()?;
        let result = engine.evaluate(script);
        if let Err(err) = &result {
            debug!(bridge = %id, error = %err, "script failed");
        }
        result
    }

    /// Call the global function `name` with JSON arguments and decode its
    /// result.
    ///
    /// A returned string is decoded as-is; other values are JSON-serialized,
    /// or coerced with `String(v)` when they cannot be (cyclic objects,
    /// BigInts). Text that parses as JSON comes back parsed, anything else as
    /// a JSON string. `undefined` comes back as `null`.
    pub fn call_function(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        self.ensure_ready()?;
        let call = call_expression(name, args)?;
        debug!(bridge = %self.id, function = %name, args = args.len(), "calling script function");
        let raw = self.run_script(&result_expression(&call))?;
        Ok(decode_result(raw))
    }

    // -- Script -> native ---------------------------------------------------

    /// Make every method `object` lists callable from script as `var_name`.
    pub fn register_object<T>(&mut self, object: &Rc<T>, var_name: &str) -> Result<()>
    where
        T: NativeObject + 'static,
    {
        self.register(Registration::new(var_name, downgrade(object)))
    }

    /// Make only the keys of `method_map` callable from script as
    /// `var_name`; each key invokes the native method it maps to.
    pub fn register_object_with_methods<T>(
        &mut self,
        object: &Rc<T>,
        var_name: &str,
        method_map: MethodMap,
    ) -> Result<()>
    where
        T: NativeObject + 'static,
    {
        self.register(Registration::new(var_name, downgrade(object)).with_method_map(method_map))
    }

    /// Remove the registration for `var_name`. Returns `false` if there was
    /// none.
    pub fn unregister_object(&mut self, var_name: &str) -> Result<bool> {
        self.ensure_ready()?;
        let removed = self.registry.borrow_mut().remove(var_name);
        if removed && self.config.expose_globals {
            let engine = self.ready_engine()?;
            engine.evaluate(&conceal_statement(var_name))?;
        }
        if removed {
            info!(bridge = %self.id, object = %var_name, "object unregistered");
        }
        Ok(removed)
    }

    /// Invoke a registered method from native code, with the same routing
    /// and errors a script call gets.
    pub fn dispatch(&self, var_name: &str, method: &str, args: &[Value]) -> Result<Value> {
        self.ensure_ready()?;
        registry::dispatch(&self.registry, var_name, method, args)
    }

    fn register(&mut self, registration: Registration) -> Result<()> {
        self.ensure_ready()?;
        let name = registration.name().to_owned();
        if !is_valid_variable_name(&name) || name == self.config.dispatcher_name {
            return Err(BridgeError::InvalidVariableName(name));
        }

        // The global goes first: a name the script context refuses never
        // becomes routable.
        let methods = registration.exposed_methods();
        if self.config.expose_globals {
            let engine = self.ready_engine()?;
            engine.evaluate(&expose_statement(&name, &methods))?;
        }
        let replaced = self.registry.borrow_mut().insert(registration);
        info!(
            bridge = %self.id,
            object = %name,
            methods = methods.len(),
            replaced,
            "object registered"
        );
        Ok(())
    }

    // -- Helpers ------------------------------------------------------------

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(BridgeError::NotReady(self.state))
        }
    }

    fn ready_engine(&mut self) -> Result<&mut E> {
        let state = self.state;
        match self.engine.as_mut() {
            Some(engine) if state == BridgeState::Ready => Ok(engine),
            _ => Err(BridgeError::NotReady(state)),
        }
    }
}

fn downgrade<T: NativeObject + 'static>(object: &Rc<T>) -> Weak<dyn NativeObject> {
    let weak: Weak<T> = Rc::downgrade(object);
    weak
}
