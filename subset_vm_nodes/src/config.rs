//! Specialization settings.
//!
//! Read from a TOML table:
//!
//! ```toml
//! max_chain_depth = 5
//! ```
//!
//! or from the `SUBSET_VM_MAX_CHAIN_DEPTH` environment variable.

use std::env;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable overriding [`SpecializeConfig::max_chain_depth`]
pub const MAX_CHAIN_DEPTH_ENV: &str = "SUBSET_VM_MAX_CHAIN_DEPTH";

/// Default number of specialized entries a chain may hold
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecializeConfig {
    /// Specialized entries a chain may hold before it goes generic
    pub max_chain_depth: usize,
}

impl Default for SpecializeConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }
}

static GLOBAL: Lazy<SpecializeConfig> = Lazy::new(|| {
    SpecializeConfig::from_env().unwrap_or_else(|err| {
        log::warn!("{}; using default specialization config", err);
        SpecializeConfig::default()
    })
});

impl SpecializeConfig {
    pub fn new(max_chain_depth: usize) -> Result<Self, ConfigError> {
        Self { max_chain_depth }.validated()
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: SpecializeConfig = toml::from_str(s)?;
        config.validated()
    }

    /// Defaults, overridden by the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(MAX_CHAIN_DEPTH_ENV) {
            Ok(raw) if !raw.trim().is_empty() => {
                let depth = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidEnv {
                        var: MAX_CHAIN_DEPTH_ENV,
                        value: raw.clone(),
                    })?;
                Self::new(depth)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Process-wide configuration, read from the environment once.
    pub fn global() -> &'static SpecializeConfig {
        &GLOBAL
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.max_chain_depth < 1 {
            return Err(ConfigError::InvalidDepth(self.max_chain_depth));
        }
        Ok(self)
    }
}
