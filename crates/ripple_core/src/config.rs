//! Renderer configuration (ripple.toml)

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Renderer configuration
///
/// ```toml
/// [renderer]
/// strict = true
/// log_mutations = false
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RendererConfig {
    /// Verify host-handle, parentage, and sibling-order invariants after
    /// every render. Violations panic.
    #[serde(default)]
    pub strict: bool,
    /// Emit a `debug!` event for every host mutation
    #[serde(default)]
    pub log_mutations: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    renderer: RendererConfig,
}

impl RendererConfig {
    /// Config with invariant checks enabled
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    pub fn with_log_mutations(mut self, enabled: bool) -> Self {
        self.log_mutations = enabled;
        self
    }

    /// Parse from TOML text (the `[renderer]` table)
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.renderer)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
