//! Bridge configuration: module names, reserved hook names, RNG seed and
//! language metadata.
//!
//! Loaded from `bridge_config.json`, embedded at build time and overridable
//! from a file.

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::syntax::SyntaxConfig;

pub const BUILTIN_BRIDGE_CONFIG: &str = include_str!("data/bridge_config.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BridgeConfig {
    /// Native module exposing the console routines to scripts.
    pub api_module: String,
    /// Name and filename of the top-level script module.
    pub main_module: String,
    /// Module whose exception types are reported unqualified.
    pub builtins_module: String,
    pub hooks: HookNames,
    /// xorshift128 state words for the `random` routine.
    pub rng_seed: [u32; 4],
    pub syntax: SyntaxConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            api_module: "tic80".to_string(),
            main_module: "<main>".to_string(),
            builtins_module: "builtins".to_string(),
            hooks: HookNames::default(),
            rng_seed: [123_456_789, 362_436_069, 521_288_629, 88_675_123],
            syntax: SyntaxConfig::default(),
        }
    }
}

/// Reserved global names the runtime resolves hooks by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HookNames {
    pub tick: String,
    pub boot: String,
    pub scanline: String,
    pub border: String,
    pub menu: String,
}

impl Default for HookNames {
    fn default() -> Self {
        Self {
            tick: "TIC".to_string(),
            boot: "BOOT".to_string(),
            scanline: "SCN".to_string(),
            border: "BDR".to_string(),
            menu: "MENU".to_string(),
        }
    }
}

impl HookNames {
    fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("tick", self.tick.as_str()),
            ("boot", self.boot.as_str()),
            ("scanline", self.scanline.as_str()),
            ("border", self.border.as_str()),
            ("menu", self.menu.as_str()),
        ]
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse bridge config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read bridge config from {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid bridge config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl BridgeConfig {
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_BRIDGE_CONFIG).expect("builtin bridge config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        BridgeConfig::from_json_str(&contents)
    }

    /// Rejects blank module or hook names and hooks sharing a name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("api_module", &self.api_module),
            ("main_module", &self.main_module),
            ("builtins_module", &self.builtins_module),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{field} cannot be blank"));
            }
        }

        let mut seen = HashSet::new();
        for (hook, name) in self.hooks.entries() {
            if name.trim().is_empty() {
                errors.push(format!("hook '{hook}' cannot be blank"));
            } else if !seen.insert(name) {
                errors.push(format!("hook '{hook}' reuses the name '{name}'"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

pub fn config_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(BridgeConfig)
}
