// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::types::is_valid_identifier;

/// Settings for a bridge instance. Missing fields take their defaults when
/// read from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Global name of the script-side dispatch entry point.
    pub dispatcher_name: String,
    /// Define a global proxy object for each registered variable name.
    pub expose_globals: bool,
    /// Script evaluated at the end of `load`, before the bridge is ready.
    pub baseline_script: Option<PathBuf>,
    /// Upper bound on a single `load_script` fetch.
    pub fetch_timeout_secs: u64,
    /// Largest script source accepted by `load_script`, in bytes.
    pub max_script_bytes: usize,
    /// Abort scripts after this many loop iterations (unbounded if unset).
    pub loop_iteration_limit: Option<u64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            dispatcher_name: "nativeBridge".into(),
            expose_globals: true,
            baseline_script: None,
            fetch_timeout_secs: 30,
            max_script_bytes: 8 * 1024 * 1024,
            loop_iteration_limit: None,
        }
    }
}

impl BridgeConfig {
    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_identifier(&self.dispatcher_name) {
            return Err(BridgeError::Config(format!(
                "dispatcher_name {:?} is not a JavaScript identifier",
                self.dispatcher_name
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(BridgeError::Config("fetch_timeout_secs must be non-zero".into()));
        }
        if self.max_script_bytes == 0 {
            return Err(BridgeError::Config("max_script_bytes must be non-zero".into()));
        }
        if self.loop_iteration_limit == Some(0) {
            return Err(BridgeError::Config("loop_iteration_limit must be non-zero".into()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
